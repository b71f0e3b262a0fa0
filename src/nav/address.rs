//! Deep-link addresses.
//!
//! An address is `/` followed by the node's manifest path with every segment
//! percent-encoded, e.g. `/guide/getting%20started.md`. The root is `/`.

use crate::error::NavError;
use crate::tree::path::normalize_name;

pub const ROOT_ADDRESS: &str = "/";

/// Address for a normalized manifest path.
pub fn format_address(path: &str) -> String {
    if path.is_empty() {
        return ROOT_ADDRESS.to_string();
    }
    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

/// Decode an address into a normalized manifest path.
///
/// Accepts a leading `#` (fragment form), a missing leading slash and a
/// trailing slash. Undecodable segments and `..` are rejected.
pub fn parse_address(address: &str) -> Result<String, NavError> {
    let trimmed = address.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);

    let mut segments = Vec::new();
    for raw in trimmed.split('/').filter(|s| !s.is_empty() && *s != ".") {
        let decoded = urlencoding::decode(raw)
            .map_err(|_| NavError::AddressNotFound(address.to_string()))?;
        if decoded == ".." || decoded.contains('/') {
            return Err(NavError::AddressNotFound(address.to_string()));
        }
        segments.push(normalize_name(&decoded));
    }
    Ok(segments.join("/"))
}
