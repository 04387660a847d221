//! Satellite resource records
//!
//! Typed views of the records returned by the hosts, host packages and host
//! errata endpoints. Fields the API returns but these types do not name are
//! kept in `extra`.

use crate::error::{Error, Result};
use crate::nvra::Nvra;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Timestamps
// ============================================================================

/// Timestamp in the API's `2020-06-10 10:03:19 UTC` layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SatelliteTime(DateTime<Utc>);

impl SatelliteTime {
    const LAYOUT: &'static str = "%Y-%m-%d %H:%M:%S";

    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl FromStr for SatelliteTime {
    type Err = Error;

    /// Zone abbreviations are read as UTC; RFC 3339 is accepted as well
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((stamp, zone)) = s.rsplit_once(' ') {
            if zone.chars().all(|c| c.is_ascii_alphabetic()) {
                if let Ok(naive) = NaiveDateTime::parse_from_str(stamp, Self::LAYOUT) {
                    return Ok(Self(naive.and_utc()));
                }
            }
        }

        DateTime::parse_from_rfc3339(s)
            .map(|at| Self(at.with_timezone(&Utc)))
            .map_err(|e| Error::decode(format!("invalid timestamp '{s}': {e}")))
    }
}

impl fmt::Display for SatelliteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} UTC", self.0.format(Self::LAYOUT))
    }
}

impl Serialize for SatelliteTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SatelliteTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Render a number of seconds the way Go prints a `time.Duration`
/// (`72h3m0s`, `5m30s`, `45s`)
pub fn format_uptime(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let total = seconds.unsigned_abs();
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{secs}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{secs}s")
    } else {
        format!("{sign}{secs}s")
    }
}

/// Read a JSON `null` as the field's default value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Hosts
// ============================================================================

/// A host as returned by `/api/hosts` and `/api/hosts/{id}`
///
/// With `thin=true` the API only returns `id` and `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, rename = "ip")]
    pub ipv4: Option<String>,
    #[serde(default, rename = "ip6")]
    pub ipv6: Option<String>,
    #[serde(default, rename = "mac")]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub certname: Option<String>,

    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,

    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub architecture_name: Option<String>,
    #[serde(default)]
    pub operatingsystem_name: Option<String>,
    #[serde(default)]
    pub environment_name: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub hostgroup_id: Option<i64>,
    #[serde(default)]
    pub hostgroup_name: Option<String>,
    #[serde(default)]
    pub hostgroup_title: Option<String>,
    #[serde(default)]
    pub compute_resource_name: Option<String>,
    #[serde(default)]
    pub compute_profile_name: Option<String>,
    #[serde(default)]
    pub realm_name: Option<String>,
    #[serde(default)]
    pub image_file: Option<String>,
    #[serde(default)]
    pub provision_method: Option<String>,
    #[serde(default)]
    pub pxe_loader: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub created_at: Option<SatelliteTime>,
    #[serde(default)]
    pub updated_at: Option<SatelliteTime>,
    #[serde(default)]
    pub installed_at: Option<SatelliteTime>,

    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub managed: Option<bool>,
    #[serde(default)]
    pub build: Option<bool>,
    #[serde(default)]
    pub uptime_seconds: Option<i64>,

    #[serde(default)]
    pub global_status_label: Option<String>,
    #[serde(default)]
    pub errata_status_label: Option<String>,
    #[serde(default)]
    pub subscription_status_label: Option<String>,
    #[serde(default)]
    pub purpose_status_label: Option<String>,

    /// Everything else the API returned
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Host {
    /// Uptime as a rounded human duration (`72h3m0s`)
    pub fn uptime_duration(&self) -> Option<String> {
        self.uptime_seconds.map(format_uptime)
    }

    /// Uptime as a std duration; negative values are dropped
    pub fn uptime(&self) -> Option<Duration> {
        self.uptime_seconds
            .and_then(|s| u64::try_from(s).ok())
            .map(Duration::from_secs)
    }

    /// A field from the unnamed remainder
    pub fn extra_field(&self, key: &str) -> Option<&JsonValue> {
        self.extra.get(key)
    }
}

// ============================================================================
// Host Packages
// ============================================================================

/// An installed package as returned by `/api/hosts/{id}/packages`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPackage {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nvrea: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nvra: String,
}

impl HostPackage {
    /// Split the NVRA into its components
    pub fn parsed(&self) -> Result<Nvra> {
        Nvra::parse(&self.nvra)
    }

    pub fn version(&self) -> Option<String> {
        self.parsed().ok().map(|n| n.version)
    }

    pub fn release(&self) -> Option<String> {
        self.parsed().ok().map(|n| n.release)
    }

    pub fn arch(&self) -> Option<String> {
        self.parsed().ok().map(|n| n.arch)
    }
}

// ============================================================================
// Errata
// ============================================================================

/// A CVE or bug reference attached to an erratum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, rename = "bug_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
}

/// An applicable erratum as returned by `/api/hosts/{id}/errata`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Errata {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pulp_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errata_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issued: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub solution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reboot_suggested: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cves: Vec<Reference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bugs: Vec<Reference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts_available_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts_applicable_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub packages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub module_streams: Vec<JsonValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub installable: bool,
}

impl Errata {
    /// Whether the erratum fixes at least one CVE
    pub fn is_security(&self) -> bool {
        self.kind == "security" || !self.cves.is_empty()
    }
}
