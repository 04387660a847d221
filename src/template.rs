//! Endpoint path templates
//!
//! Handles `{name}` placeholders in endpoint paths such as
//! `/api/hosts/{id}/packages`. Values are percent-encoded so that host
//! names can be used as path segments.

use crate::error::{Error, Result};
use crate::types::StringMap;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regex for matching path placeholders: {name}
static PATH_PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Render an endpoint template with the given path parameters
pub fn render_path(template: &str, params: &StringMap) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PATH_PARAM_REGEX.replace_all(template, |cap: &Captures<'_>| {
        let name = &cap[1];
        match params.get(name) {
            Some(value) => encode_segment(value),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::UndefinedPathParam {
            name: missing.join(", "),
        })
    }
}

/// Percent-encode a single path segment
fn encode_segment(value: &str) -> String {
    // form encoding writes spaces as '+', which is literal inside a path
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
