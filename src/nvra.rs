//! RPM package identifier parsing
//!
//! Splits `name-version-release.arch` strings (NVRA, and the NVREA variant
//! the API also returns) into their components. Package names may contain
//! hyphens, so the string is consumed from the right: the last `.` opens
//! the architecture, then the last two `-` close release and version.
//!
//! ```text
//! tuned-profiles-cpu-partitioning-2.18.0-1.2.20220511git9fa66f19.el8fdp.noarch
//! |------------- name ----------| |ver-| |------------ release -------| |arch-|
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Components of an RPM package identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nvra {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: String,
}

/// Parse a compound package identifier.
///
/// Fails only when there is no `.` at all. A missing `-` leaves the
/// components to its left empty instead of failing.
pub fn parse(compound: &str) -> Result<Nvra> {
    let (rest, arch) = compound
        .rsplit_once('.')
        .ok_or_else(|| Error::malformed_identifier(compound, "no arch info"))?;

    let (rest, release) = split_last_hyphen(rest);
    let (name, version) = split_last_hyphen(rest);

    Ok(Nvra {
        name: name.to_string(),
        version: version.to_string(),
        release: release.to_string(),
        arch: arch.to_string(),
    })
}

/// `("a-b", "c")` for `"a-b-c"`, `("", "abc")` when there is no hyphen
fn split_last_hyphen(s: &str) -> (&str, &str) {
    s.rsplit_once('-').unwrap_or(("", s))
}

impl Nvra {
    /// Parse a compound identifier (alias for [`parse`])
    pub fn parse(compound: &str) -> Result<Self> {
        parse(compound)
    }
}

impl FromStr for Nvra {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl fmt::Display for Nvra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}.{}",
            self.name, self.version, self.release, self.arch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_parse_hyphenated_name() {
        let nvra =
            parse("tuned-profiles-cpu-partitioning-2.18.0-1.2.20220511git9fa66f19.el8fdp.noarch")
                .unwrap();
        assert_eq!(nvra.name, "tuned-profiles-cpu-partitioning");
        assert_eq!(nvra.version, "2.18.0");
        assert_eq!(nvra.release, "1.2.20220511git9fa66f19.el8fdp");
        assert_eq!(nvra.arch, "noarch");
    }

    #[test]
    fn test_parse_simple() {
        let nvra = parse("foo-1.0-1.i386").unwrap();
        assert_eq!(
            nvra,
            Nvra {
                name: "foo".into(),
                version: "1.0".into(),
                release: "1".into(),
                arch: "i386".into(),
            }
        );
    }

    #[test]
    fn test_parse_without_dot_fails() {
        let err = parse("no-dot-here").unwrap_err();
        assert!(matches!(err, Error::MalformedIdentifier { .. }));
        assert!(err.to_string().contains("no-dot-here"));
    }

    #[test]
    fn test_parse_missing_hyphens_leaves_empty_components() {
        let nvra = parse("kernel.x86_64").unwrap();
        assert_eq!(nvra.name, "");
        assert_eq!(nvra.version, "");
        assert_eq!(nvra.release, "kernel");
        assert_eq!(nvra.arch, "x86_64");

        let nvra = parse("1.0-1.noarch").unwrap();
        assert_eq!(nvra.name, "");
        assert_eq!(nvra.version, "1.0");
        assert_eq!(nvra.release, "1");
    }

    #[test]
    fn test_parse_empty_arch() {
        let nvra = parse("foo-1-2.").unwrap();
        assert_eq!(nvra.arch, "");
        assert_eq!(nvra.release, "2");
    }

    #[test_case("foo-1.0-1.i386")]
    #[test_case("bar-9-123a.ia64")]
    #[test_case("python3-dnf-plugin-versionlock-4.0.21-3.el8.noarch")]
    #[test_case("glibc-langpack-en-2.28-164.el8_5.3.x86_64")]
    #[test_case("tuned-profiles-cpu-partitioning-2.18.0-1.2.20220511git9fa66f19.el8fdp.noarch")]
    fn test_display_recombines_original(compound: &str) {
        let nvra: Nvra = compound.parse().unwrap();
        assert_eq!(nvra.to_string(), compound);
    }
}
