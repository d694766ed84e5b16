//! Schema version gate for documents that embed expressions.

use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid schema version `{0}`, expected MAJOR.MINOR.PATCH")]
    Malformed(String),
}

/// A `MAJOR.MINOR.PATCH` version, ordered numerically component by
/// component so that `0.0.10` sorts after `0.0.9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SchemaVersion {
    /// Oldest supported schema version.
    pub const MIN: SchemaVersion = SchemaVersion::new(0, 0, 1);
    /// Newest supported schema version.
    pub const MAX: SchemaVersion = SchemaVersion::new(0, 0, 12);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        SchemaVersion {
            major,
            minor,
            patch,
        }
    }

    pub fn is_supported(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(self)
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || VersionError::Malformed(s.to_string());

        let mut parts = s.trim().split('.').map(|part| {
            // `u64::from_str` accepts a leading `+`
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u64>().map_err(|_| malformed())
        });

        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        Ok(SchemaVersion::new(major?, minor?, patch?))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Whether a document declaring `version` can be evaluated by this engine.
///
/// ```
/// use brace_lang::version::is_compatible;
///
/// assert_eq!(is_compatible("0.0.10"), Ok(true));
/// assert_eq!(is_compatible("0.1.0"), Ok(false));
/// assert!(is_compatible("1.0").is_err());
/// ```
pub fn is_compatible(version: &str) -> Result<bool, VersionError> {
    Ok(version.parse::<SchemaVersion>()?.is_supported())
}
