//! Strongly-typed identifiers used across the adapter.
//!
//! Downstream crates should not pass raw strings or integers for these.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable host-assigned identifier of a bound table (e.g. its element id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TableId {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}

impl From<String> for TableId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

/// Draw token reported back to the table.
///
/// Successful results echo the request's sequence number; error results carry
/// a freshly generated identifier so they never match a pending draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrawToken {
    Sequence(u64),
    Generated(Uuid),
}

impl DrawToken {
    pub fn generate() -> Self {
        DrawToken::Generated(Uuid::new_v4())
    }

    pub fn sequence(&self) -> Option<u64> {
        match self {
            DrawToken::Sequence(n) => Some(*n),
            DrawToken::Generated(_) => None,
        }
    }
}

impl From<u64> for DrawToken {
    fn from(v: u64) -> Self {
        DrawToken::Sequence(v)
    }
}

impl fmt::Display for DrawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawToken::Sequence(n) => write!(f, "{n}"),
            DrawToken::Generated(id) => write!(f, "{id}"),
        }
    }
}
