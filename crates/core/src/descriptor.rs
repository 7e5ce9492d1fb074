//! Registration descriptor reported by a module at load time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurnError};
use crate::version::Version;

/// Metadata a module reports about itself.
///
/// Returned by value from [`crate::TransformModule::register`]; the host owns
/// it outright and the module keeps no handle to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDescriptor {
    /// Target language name, used as the registry key.
    pub lang_name: String,

    /// Human-readable description.
    #[serde(default)]
    pub lang_desc: String,

    /// Version of the target language the module emits.
    pub lang_version: Version,

    /// Revision of the module contract the module implements.
    pub api_version: u32,
}

impl RegistrationDescriptor {
    /// Creates a new descriptor.
    pub fn new(
        lang_name: impl Into<String>,
        lang_desc: impl Into<String>,
        lang_version: Version,
        api_version: u32,
    ) -> Self {
        Self {
            lang_name: lang_name.into(),
            lang_desc: lang_desc.into(),
            lang_version,
            api_version,
        }
    }

    /// Checks the descriptor invariants.
    pub fn validate(&self) -> Result<()> {
        if self.lang_name.trim().is_empty() {
            return Err(SurnError::InvalidDescriptor(
                "lang_name must not be empty".to_string(),
            ));
        }

        if self.api_version == 0 {
            return Err(SurnError::InvalidDescriptor(format!(
                "api_version must be at least 1 for '{}'",
                self.lang_name
            )));
        }

        Ok(())
    }

    /// Returns true if this module satisfies a required language version.
    pub fn supports(&self, required: &Version) -> bool {
        self.lang_version.is_compatible(required)
    }

    /// Loads a descriptor from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SurnError::Serialization(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parses a descriptor from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SurnError::Serialization(e.to_string()))
    }

    /// Converts the descriptor to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SurnError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let json = r#"{
            "lang_name": "php",
            "lang_desc": "Support for PHP 8.x.x",
            "lang_version": "8.0.0",
            "api_version": 1
        }"#;

        let desc = RegistrationDescriptor::from_json(json).unwrap();
        assert_eq!(desc.lang_name, "php");
        assert_eq!(desc.lang_version, Version::new(8, 0, 0));
        assert_eq!(desc.api_version, 1);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_serialize_descriptor() {
        let desc = RegistrationDescriptor::new("php", "PHP", Version::new(8, 1, 0), 1);
        let json = desc.to_json().unwrap();
        assert!(json.contains("\"lang_name\": \"php\""));
        assert!(json.contains("\"lang_version\": \"8.1.0\""));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let desc = RegistrationDescriptor::new("  ", "", Version::new(1, 0, 0), 1);
        assert!(matches!(
            desc.validate(),
            Err(SurnError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_validate_rejects_api_zero() {
        let desc = RegistrationDescriptor::new("php", "", Version::new(8, 0, 0), 0);
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_supports_language_version() {
        let desc = RegistrationDescriptor::new("php", "", Version::new(8, 2, 0), 1);
        assert!(desc.supports(&Version::new(8, 1, 0)));
        assert!(!desc.supports(&Version::new(7, 4, 0)));
    }
}
