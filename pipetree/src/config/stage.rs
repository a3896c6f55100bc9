//! The generic stage configuration bag.

use super::constants::OPTION_TYPE;
use super::ProviderConfig;
use crate::errors::{InvalidConfigurationFileError, MissingOptionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An immutable, named key/value configuration for one pipeline stage.
///
/// Construction only checks what every stage needs: a non-empty name and a
/// string `type` option. Options specific to a stage type are checked by the
/// provider that consumes the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStageConfig")]
pub struct StageConfig {
    name: String,
    options: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawStageConfig {
    name: String,
    #[serde(default)]
    options: HashMap<String, serde_json::Value>,
}

impl TryFrom<RawStageConfig> for StageConfig {
    type Error = InvalidConfigurationFileError;

    fn try_from(raw: RawStageConfig) -> std::result::Result<Self, Self::Error> {
        Self::validated(raw.name, raw.options)
    }
}

impl StageConfig {
    /// Creates a new stage configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the name is empty or whitespace-only,
    /// or if `options` has no string `type` entry.
    pub fn new(
        name: impl Into<String>,
        options: HashMap<String, serde_json::Value>,
    ) -> Result<Self> {
        Ok(Self::validated(name.into(), options)?)
    }

    /// Creates a stage configuration from a JSON value holding the options.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `options` is not a JSON object or
    /// fails the checks of [`StageConfig::new`].
    pub fn from_json(name: impl Into<String>, options: serde_json::Value) -> Result<Self> {
        let name = name.into();
        match options {
            serde_json::Value::Object(map) => Self::new(name, map.into_iter().collect()),
            other => Err(InvalidConfigurationFileError::invalid_option(
                &name,
                format!("options must be a mapping, got {other}"),
            )
            .into()),
        }
    }

    fn validated(
        name: String,
        options: HashMap<String, serde_json::Value>,
    ) -> std::result::Result<Self, InvalidConfigurationFileError> {
        if name.trim().is_empty() {
            return Err(InvalidConfigurationFileError::empty_name());
        }

        match options.get(OPTION_TYPE) {
            Some(serde_json::Value::String(t)) if !t.trim().is_empty() => {}
            _ => return Err(InvalidConfigurationFileError::missing_type(&name)),
        }

        Ok(Self { name, options })
    }

    /// Returns the stage name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage type.
    #[must_use]
    pub fn stage_type(&self) -> &str {
        // Presence and shape are checked at construction.
        self.options
            .get(OPTION_TYPE)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    }

    /// Returns all options.
    #[must_use]
    pub const fn options(&self) -> &HashMap<String, serde_json::Value> {
        &self.options
    }

    /// Checks if an option is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Looks up an option.
    ///
    /// # Errors
    ///
    /// Returns `MissingOption` if the key is absent.
    pub fn get(&self, key: &str) -> Result<&serde_json::Value> {
        self.options
            .get(key)
            .ok_or_else(|| MissingOptionError::new(&self.name, key).into())
    }

    /// Looks up an option, falling back to `default` when it is absent.
    #[must_use]
    pub fn get_or(&self, key: &str, default: serde_json::Value) -> serde_json::Value {
        self.options.get(key).cloned().unwrap_or(default)
    }

    /// Verifies that this configuration targets `expected`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` on a type mismatch.
    pub fn expect_type(&self, expected: &str) -> Result<()> {
        let actual = self.stage_type();
        if actual != expected {
            return Err(
                InvalidConfigurationFileError::type_mismatch(&self.name, expected, actual).into(),
            );
        }
        Ok(())
    }

    /// Verifies that every key in `keys` is present.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first missing key.
    pub fn require(&self, keys: &[&str]) -> Result<()> {
        if let Some(missing) = keys.iter().find(|k| !self.options.contains_key(**k)) {
            return Err(InvalidConfigurationFileError::missing_option(&self.name, missing).into());
        }
        Ok(())
    }

    /// Converts the options into the typed configuration for this stage type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for unknown stage types, missing
    /// required options, or options of the wrong shape.
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        ProviderConfig::from_stage_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::{LOCAL_DIRECTORY_STAGE, OPTION_FILEPATH};
    use crate::errors::PipetreeError;
    use serde_json::json;

    fn options(value: serde_json::Value) -> HashMap<String, serde_json::Value> {
        serde_json::from_value(value).unwrap()
    }

    fn directory_stage() -> StageConfig {
        StageConfig::new(
            "test_stage_name",
            options(json!({"type": LOCAL_DIRECTORY_STAGE, "filepath": "foo"})),
        )
        .unwrap()
    }

    #[test]
    fn test_stage_config_creation() {
        let config = directory_stage();

        assert_eq!(config.name(), "test_stage_name");
        assert_eq!(config.stage_type(), LOCAL_DIRECTORY_STAGE);
        assert!(config.contains(OPTION_FILEPATH));
        assert_eq!(config.options().len(), 2);
    }

    #[test]
    fn test_empty_name_rejected() {
        for name in ["", "   "] {
            let err = StageConfig::new(name, options(json!({"type": LOCAL_DIRECTORY_STAGE})))
                .unwrap_err();
            assert!(err.is_invalid_configuration());
        }
    }

    #[test]
    fn test_missing_type_rejected() {
        let err = StageConfig::new("stage", HashMap::new()).unwrap_err();
        match err {
            PipetreeError::InvalidConfiguration(e) => {
                assert_eq!(e.error_info.code, "CONFIG-002-MISSING_TYPE");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_string_type_rejected() {
        for bad in [json!({"type": 3}), json!({"type": null}), json!({"type": ""})] {
            let err = StageConfig::new("stage", options(bad)).unwrap_err();
            assert!(err.is_invalid_configuration());
        }
    }

    #[test]
    fn test_from_json_requires_mapping() {
        let err = StageConfig::from_json("stage", json!(["type"])).unwrap_err();
        assert!(err.is_invalid_configuration());

        let config = StageConfig::from_json("stage", json!({"type": "X"})).unwrap();
        assert_eq!(config.stage_type(), "X");
    }

    #[test]
    fn test_get_and_get_or() {
        let config = directory_stage();

        assert_eq!(config.get(OPTION_FILEPATH).unwrap(), &json!("foo"));
        assert_eq!(config.get_or("read_content", json!(false)), json!(false));
        assert_eq!(config.get_or(OPTION_FILEPATH, json!("bar")), json!("foo"));

        match config.get("missing").unwrap_err() {
            PipetreeError::MissingOption(e) => {
                assert_eq!(e.stage, "test_stage_name");
                assert_eq!(e.key, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_expect_type() {
        let config = directory_stage();

        assert!(config.expect_type(LOCAL_DIRECTORY_STAGE).is_ok());
        assert!(config
            .expect_type("LocalFilePipelineStage")
            .unwrap_err()
            .is_invalid_configuration());
    }

    #[test]
    fn test_require() {
        let config = directory_stage();

        assert!(config.require(&["type", OPTION_FILEPATH]).is_ok());
        match config.require(&[OPTION_FILEPATH, "order"]).unwrap_err() {
            PipetreeError::InvalidConfiguration(e) => assert_eq!(e.key.as_deref(), Some("order")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: StageConfig = serde_json::from_value(json!({
            "name": "ingest",
            "options": {"type": LOCAL_DIRECTORY_STAGE}
        }))
        .unwrap();
        assert_eq!(ok.name(), "ingest");

        let missing_type = serde_json::from_value::<StageConfig>(json!({"name": "ingest"}));
        assert!(missing_type.is_err());

        let empty_name = serde_json::from_value::<StageConfig>(json!({
            "name": "",
            "options": {"type": LOCAL_DIRECTORY_STAGE}
        }));
        assert!(empty_name.is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = directory_stage();
        let json = serde_json::to_string(&config).unwrap();
        let back: StageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
