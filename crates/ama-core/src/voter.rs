//! Voter identity heuristic.
//!
//! A voter is identified by the client network address as reported by proxy
//! headers. This is trivially spoofable by anyone who can set those headers;
//! it only deduplicates honest clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier used when a request carries no proxy address metadata.
pub const FALLBACK_VOTER_ID: &str = "127.0.0.1";

/// Opaque voter identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a voter from request header values.
    ///
    /// Takes the first comma-separated entry of the forwarded-for header,
    /// then the real-ip header, then [`FALLBACK_VOTER_ID`]. Blank values fall
    /// through to the next source.
    pub fn from_headers(forwarded_for: Option<&str>, real_ip: Option<&str>) -> Self {
        let forwarded = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        let real = real_ip.map(str::trim).filter(|ip| !ip.is_empty());

        Self::new(forwarded.or(real).unwrap_or(FALLBACK_VOTER_ID))
    }
}

impl fmt::Debug for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoterId({})", self.0)
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
