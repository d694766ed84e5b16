//! Schema version compatibility check

use super::CliError;
use crate::SchemaVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub version: SchemaVersion,
    pub supported: bool,
}

impl VersionReport {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "version": self.version.to_string(),
            "supported": self.supported,
            "min": SchemaVersion::MIN.to_string(),
            "max": SchemaVersion::MAX.to_string(),
        })
    }
}

pub fn execute_version_check(version: &str) -> Result<VersionReport, CliError> {
    let version: SchemaVersion = version.parse()?;
    Ok(VersionReport {
        version,
        supported: version.is_supported(),
    })
}
