//! Run configuration for conversion and scaffolding.
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid configuration. Command-line flags override file values.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! extraction:
//!   block_types: [crud, table, grid, list]
//!   url_placeholder: "${baseUrl}"
//!   base_url: "http://localhost:8080"
//!   first_block_only: false
//!   primary_key_names: [id, pk, trade_id, user_id, ods_id]
//!   field_merge: first_seen
//! batch:
//!   jobs: 4
//! codegen:
//!   package_prefix: com.hg
//!   group_id: com.hg
//!   version: 1.0.0
//!   java_version: "17"
//!   dependencies:
//!     - group_id: com.hg
//!       artifact_id: common-backend
//!       version: 1.0.0
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::FieldMergePolicy;
use crate::error::{ConfigError, Result};

/// Block-type prefixes recognized as list/table/grid containers.
pub const DEFAULT_BLOCK_TYPES: &[&str] = &["crud", "table", "grid", "list"];

/// Field names treated as primary keys, in priority order.
pub const DEFAULT_PRIMARY_KEY_NAMES: &[&str] = &["id", "pk", "trade_id", "user_id", "ods_id"];

/// Placeholder substituted by the base URL in discovered URLs.
pub const DEFAULT_URL_PLACEHOLDER: &str = "${baseUrl}";

/// Settings for the extraction engine.
///
/// # Examples
///
/// ```
/// use amis_contract_core::ExtractionSettings;
///
/// let settings = ExtractionSettings::default();
/// assert!(settings.block_types.iter().any(|t| t == "crud"));
/// assert_eq!(settings.url_placeholder, "${baseUrl}");
/// assert!(settings.base_url.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Case-insensitive `type` prefixes that mark a block.
    pub block_types: Vec<String>,
    /// Token replaced by `base_url` in every discovered URL.
    pub url_placeholder: String,
    /// Base URL substituted for the placeholder. `None` leaves URLs as-is.
    pub base_url: Option<String>,
    /// Keep only the first block's contract per document.
    pub first_block_only: bool,
    /// Candidate primary-key names for delete operations.
    pub primary_key_names: Vec<String>,
    /// Conflict policy for repeated field names.
    pub field_merge: FieldMergePolicy,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            block_types: DEFAULT_BLOCK_TYPES.iter().map(|s| s.to_string()).collect(),
            url_placeholder: DEFAULT_URL_PLACEHOLDER.to_string(),
            base_url: None,
            first_block_only: false,
            primary_key_names: DEFAULT_PRIMARY_KEY_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            field_merge: FieldMergePolicy::FirstSeen,
        }
    }
}

/// Settings for batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Number of documents converted in parallel.
    pub jobs: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

/// One Maven coordinate for the generated build descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MavenDependency {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl MavenDependency {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: None,
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }
}

/// Maven repository entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MavenRepository {
    pub id: String,
    pub url: String,
}

/// Settings for the scaffolding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenSettings {
    /// Root Java package; the system name is appended per project.
    pub package_prefix: String,
    pub group_id: String,
    pub version: String,
    pub java_version: String,
    pub spring_boot_version: String,
    pub spring_cloud_version: String,
    /// Extra dependencies merged after the essential ones.
    pub dependencies: Vec<MavenDependency>,
    pub repositories: Vec<MavenRepository>,
}

impl Default for CodegenSettings {
    fn default() -> Self {
        Self {
            package_prefix: "com.hg".to_string(),
            group_id: "com.hg".to_string(),
            version: "1.0.0".to_string(),
            java_version: "17".to_string(),
            spring_boot_version: "3.2.6".to_string(),
            spring_cloud_version: "2023.0.2".to_string(),
            dependencies: Vec::new(),
            repositories: Vec::new(),
        }
    }
}

/// Top-level configuration file.
///
/// # Examples
///
/// ```
/// use amis_contract_core::AppConfig;
///
/// let config = AppConfig::from_yaml_str("batch:\n  jobs: 2\n").unwrap();
/// assert_eq!(config.batch.jobs, 2);
/// assert_eq!(config.codegen.java_version, "17");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version.
    pub version: String,
    pub extraction: ExtractionSettings,
    pub batch: BatchSettings,
    pub codegen: CodegenSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            extraction: ExtractionSettings::default(),
            batch: BatchSettings::default(),
            codegen: CodegenSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if parsing fails, or [`ConfigError::Invalid`]
    /// if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.check()?;
        Ok(config)
    }

    /// Parses configuration from YAML text. Empty text yields the defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.check()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.batch.jobs == 0 {
            return Err(ConfigError::Invalid("batch.jobs must be at least 1".to_string()));
        }
        if self.extraction.block_types.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "extraction.block_types must name at least one block type".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
extraction:
  block_types: [crud]
  base_url: "http://10.0.0.5:8080"
  first_block_only: true
  field_merge: last_seen
batch:
  jobs: 8
codegen:
  package_prefix: org.acme
  dependencies:
    - group_id: com.hg
      artifact_id: common-backend
      version: 1.0.0
  repositories:
    - id: nexus
      url: http://nexus.local/repository/maven-public/
"#
    }

    #[test]
    fn test_deserialize_partial_sections_keep_defaults() {
        let config = AppConfig::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(config.extraction.block_types, vec!["crud"]);
        assert_eq!(
            config.extraction.base_url.as_deref(),
            Some("http://10.0.0.5:8080")
        );
        assert!(config.extraction.first_block_only);
        assert_eq!(config.extraction.field_merge, FieldMergePolicy::LastSeen);
        assert_eq!(config.extraction.url_placeholder, DEFAULT_URL_PLACEHOLDER);
        assert_eq!(config.batch.jobs, 8);
        assert_eq!(config.codegen.package_prefix, "org.acme");
        assert_eq!(config.codegen.group_id, "com.hg");
        assert_eq!(config.codegen.dependencies.len(), 1);
        assert_eq!(config.codegen.repositories[0].id, "nexus");
    }

    #[test]
    fn test_empty_text_is_default() {
        assert_eq!(AppConfig::from_yaml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_rejects_zero_jobs() {
        let err = AppConfig::from_yaml_str("batch:\n  jobs: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_blank_block_types() {
        let err = AppConfig::from_yaml_str("extraction:\n  block_types: ['']\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amis2api.yml");

        let original = AppConfig::from_yaml_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
