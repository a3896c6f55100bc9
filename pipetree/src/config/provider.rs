//! Typed provider configuration.

use super::constants::{LOCAL_DIRECTORY_STAGE, LOCAL_FILE_STAGE, OPTION_FILEPATH};
use super::StageConfig;
use crate::errors::{InvalidConfigurationFileError, Result};
use serde::{Deserialize, Serialize};

/// Order in which a directory provider yields its entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationOrder {
    /// Sorted byte-wise by file name. Stable across platforms.
    #[default]
    Sorted,
    /// Whatever order the platform's directory listing returns.
    Filesystem,
}

/// Configuration for a local directory stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDirectoryConfig {
    /// Directory to enumerate; relative paths resolve against the working directory.
    pub filepath: String,
    /// Whether enumeration loads file payloads.
    #[serde(default)]
    pub read_content: bool,
    /// Enumeration order.
    #[serde(default)]
    pub order: EnumerationOrder,
}

/// Configuration for a single local file stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFileConfig {
    /// File to provide; relative paths resolve against the working directory.
    pub filepath: String,
    /// Whether enumeration loads the file payload.
    #[serde(default)]
    pub read_content: bool,
}

/// Provider configuration, tagged by stage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    /// A directory of artifacts.
    #[serde(rename = "LocalDirectoryPipelineStage")]
    LocalDirectory(LocalDirectoryConfig),
    /// A single artifact file.
    #[serde(rename = "LocalFilePipelineStage")]
    LocalFile(LocalFileConfig),
}

impl ProviderConfig {
    /// Builds the typed configuration from a stage configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for unknown stage types, missing
    /// required options, or options of the wrong shape.
    pub fn from_stage_config(config: &StageConfig) -> Result<Self> {
        let stage_type = config.stage_type();
        let required = Self::required_options(stage_type).ok_or_else(|| {
            InvalidConfigurationFileError::invalid_option(
                config.name(),
                format!("unknown stage type '{stage_type}'"),
            )
        })?;
        config.require(required)?;

        let options: serde_json::Map<String, serde_json::Value> = config
            .options()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(serde_json::Value::Object(options))
            .map_err(|e| InvalidConfigurationFileError::invalid_option(config.name(), e).into())
    }

    /// Options a stage type cannot do without, or `None` for unknown types.
    #[must_use]
    pub fn required_options(stage_type: &str) -> Option<&'static [&'static str]> {
        match stage_type {
            LOCAL_DIRECTORY_STAGE | LOCAL_FILE_STAGE => Some(&[OPTION_FILEPATH]),
            _ => None,
        }
    }

    /// Returns the stage type literal of this configuration.
    #[must_use]
    pub const fn stage_type(&self) -> &'static str {
        match self {
            Self::LocalDirectory(_) => LOCAL_DIRECTORY_STAGE,
            Self::LocalFile(_) => LOCAL_FILE_STAGE,
        }
    }

    /// Returns the configured source path.
    #[must_use]
    pub fn filepath(&self) -> &str {
        match self {
            Self::LocalDirectory(c) => &c.filepath,
            Self::LocalFile(c) => &c.filepath,
        }
    }

    /// Returns whether payloads are loaded during enumeration.
    #[must_use]
    pub const fn read_content(&self) -> bool {
        match self {
            Self::LocalDirectory(c) => c.read_content,
            Self::LocalFile(c) => c.read_content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipetreeError;
    use serde_json::json;

    fn stage(options: serde_json::Value) -> StageConfig {
        StageConfig::from_json("ingest", options).unwrap()
    }

    #[test]
    fn test_local_directory_defaults() {
        let config = stage(json!({"type": LOCAL_DIRECTORY_STAGE, "filepath": "data"}))
            .provider_config()
            .unwrap();

        assert_eq!(
            config,
            ProviderConfig::LocalDirectory(LocalDirectoryConfig {
                filepath: "data".to_string(),
                read_content: false,
                order: EnumerationOrder::Sorted,
            })
        );
        assert_eq!(config.stage_type(), LOCAL_DIRECTORY_STAGE);
        assert_eq!(config.filepath(), "data");
        assert!(!config.read_content());
    }

    #[test]
    fn test_local_directory_explicit_options() {
        let config = stage(json!({
            "type": LOCAL_DIRECTORY_STAGE,
            "filepath": "data",
            "read_content": true,
            "order": "filesystem"
        }))
        .provider_config()
        .unwrap();

        match config {
            ProviderConfig::LocalDirectory(c) => {
                assert!(c.read_content);
                assert_eq!(c.order, EnumerationOrder::Filesystem);
            }
            other => panic!("unexpected config: {other:?}"),
        }
    }

    #[test]
    fn test_local_file_config() {
        let config = stage(json!({"type": LOCAL_FILE_STAGE, "filepath": "a.txt", "read_content": true}))
            .provider_config()
            .unwrap();

        assert_eq!(config.stage_type(), LOCAL_FILE_STAGE);
        assert!(config.read_content());
    }

    #[test]
    fn test_missing_filepath_is_missing_option() {
        let err = stage(json!({"type": LOCAL_DIRECTORY_STAGE}))
            .provider_config()
            .unwrap_err();

        match err {
            PipetreeError::InvalidConfiguration(e) => {
                assert_eq!(e.error_info.code, "CONFIG-004-MISSING_OPTION");
                assert_eq!(e.key.as_deref(), Some(OPTION_FILEPATH));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = stage(json!({"type": "S3PipelineStage", "filepath": "x"}))
            .provider_config()
            .unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_wrong_shape_rejected() {
        for bad in [
            json!({"type": LOCAL_DIRECTORY_STAGE, "filepath": 7}),
            json!({"type": LOCAL_DIRECTORY_STAGE, "filepath": "x", "read_content": "yes"}),
            json!({"type": LOCAL_DIRECTORY_STAGE, "filepath": "x", "order": "random"}),
        ] {
            let err = stage(bad).provider_config().unwrap_err();
            match err {
                PipetreeError::InvalidConfiguration(e) => {
                    assert_eq!(e.error_info.code, "CONFIG-005-INVALID_OPTION");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
