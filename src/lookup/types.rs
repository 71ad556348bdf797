//! Search request types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parsed upstream response. Objects and arrays nest arbitrarily.
pub type LookupResult = serde_json::Value;

/// The four supported lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Email,
    Phone,
    Username,
    Domain,
}

impl SearchKind {
    pub const ALL: [SearchKind; 4] = [
        SearchKind::Email,
        SearchKind::Phone,
        SearchKind::Username,
        SearchKind::Domain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Email => "email",
            SearchKind::Phone => "phone",
            SearchKind::Username => "username",
            SearchKind::Domain => "domain",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported search type '{0}'")]
pub struct ParseKindError(pub String);

impl FromStr for SearchKind {
    type Err = ParseKindError;

    /// Exact, case-sensitive match on the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// A validated search, ready for the upstream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub kind: SearchKind,
    /// Query after sanitizing, before encoding.
    pub cleaned_query: String,
    /// Form-encoded query, safe to append to an endpoint template.
    pub encoded_query: String,
}
