//! Migration revision identifiers
//!
//! A revision is the digit prefix of a migration filename. Freshly generated
//! revisions are 14-digit local timestamps (`%Y%m%d%H%M%S`), so lexical order
//! equals chronological order.

use crate::error::{CoreError, CoreResult};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp format used for generated revisions
pub const REVISION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Length of a generated revision
pub const REVISION_LEN: usize = 14;

/// A sortable migration revision
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
    /// Parse a revision, requiring a non-empty run of ASCII digits
    pub fn parse(value: &str) -> CoreResult<Self> {
        if value.is_empty() {
            return Err(CoreError::InvalidRevision {
                value: value.to_string(),
                reason: "revision cannot be empty".to_string(),
            });
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidRevision {
                value: value.to_string(),
                reason: "revision must contain only digits".to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Revision for the current local time
    pub fn now() -> Self {
        Self::from_timestamp(Local::now().naive_local())
    }

    /// Revision for a specific timestamp
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        Self(ts.format(REVISION_FORMAT).to_string())
    }

    /// Parse the revision back into a timestamp, when it has the generated shape
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        if self.0.len() != REVISION_LEN {
            return None;
        }
        NaiveDateTime::parse_from_str(&self.0, REVISION_FORMAT).ok()
    }

    /// Borrow the revision as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Revision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Revision {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Revision> for String {
    fn from(value: Revision) -> Self {
        value.0
    }
}

impl AsRef<str> for Revision {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "revision_test.rs"]
mod tests;
