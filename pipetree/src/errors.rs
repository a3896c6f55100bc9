//! Error types for pipetree.
//!
//! Configuration and source errors are raised at construction time, before a
//! provider is usable. Filesystem failures that happen later, between
//! enumeration and materialization, are carried through untouched as
//! [`PipetreeError::Io`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, PipetreeError>;

/// The main error type for pipetree operations.
#[derive(Debug, Error)]
pub enum PipetreeError {
    /// A stage configuration is structurally invalid or targets the wrong provider.
    #[error("{0}")]
    InvalidConfiguration(#[from] InvalidConfigurationFileError),

    /// The configured artifact source could not be found.
    #[error("{0}")]
    SourceDoesNotExist(#[from] ArtifactSourceDoesNotExistError),

    /// An option lookup failed and no default was supplied.
    #[error("{0}")]
    MissingOption(#[from] MissingOptionError),

    /// A filesystem operation failed after construction.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipetreeError {
    /// Returns true for configuration errors.
    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    /// Returns true when the artifact source was missing.
    #[must_use]
    pub const fn is_source_missing(&self) -> bool {
        matches!(self, Self::SourceDoesNotExist(_))
    }

    /// Returns the underlying IO error kind, if any.
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        match self {
            Self::InvalidConfiguration(err) => err.to_dict(),
            Self::SourceDoesNotExist(err) => err.to_dict(),
            Self::MissingOption(err) => err.to_dict(),
            Self::Io(err) => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("IoError"));
                map.insert("kind".to_string(), serde_json::json!(err.kind().to_string()));
                map.insert("message".to_string(), serde_json::json!(err.to_string()));
                map
            }
        }
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONFIG-002-MISSING_TYPE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info, picking up the default suggestion for `code`.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        let code = code.into();
        let fix_hint = ContractSuggestions::get(&code).map(str::to_string);
        Self {
            code,
            summary: summary.into(),
            fix_hint,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));
        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        if !self.context.is_empty() {
            map.insert("context".to_string(), serde_json::json!(self.context));
        }
        map
    }
}

/// Error raised when a stage configuration is invalid.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InvalidConfigurationFileError {
    /// The error message.
    pub message: String,
    /// The stage the configuration belongs to, when known.
    pub stage: Option<String>,
    /// The offending option key, when there is one.
    pub key: Option<String>,
    /// Contract error info.
    pub error_info: ContractErrorInfo,
}

impl InvalidConfigurationFileError {
    fn build(code: &str, message: String, stage: Option<&str>, key: Option<&str>) -> Self {
        let mut info = ContractErrorInfo::new(code, message.clone());
        if let Some(stage) = stage {
            info = info.with_context_entry("stage", stage);
        }
        if let Some(key) = key {
            info = info.with_context_entry("key", key);
        }
        Self {
            message,
            stage: stage.map(str::to_string),
            key: key.map(str::to_string),
            error_info: info,
        }
    }

    /// The stage name was empty or whitespace-only.
    #[must_use]
    pub fn empty_name() -> Self {
        Self::build(
            "CONFIG-001-EMPTY_NAME",
            "Stage name cannot be empty or whitespace-only".to_string(),
            None,
            None,
        )
    }

    /// The options carry no usable `type` entry.
    #[must_use]
    pub fn missing_type(stage: &str) -> Self {
        Self::build(
            "CONFIG-002-MISSING_TYPE",
            format!("Stage '{stage}' configuration has no string 'type' option"),
            Some(stage),
            Some("type"),
        )
    }

    /// The configuration targets a different provider type.
    #[must_use]
    pub fn type_mismatch(stage: &str, expected: &str, actual: &str) -> Self {
        let mut err = Self::build(
            "CONFIG-003-TYPE_MISMATCH",
            format!("Stage '{stage}' has type '{actual}', expected '{expected}'"),
            Some(stage),
            Some("type"),
        );
        err.error_info = err
            .error_info
            .with_context_entry("expected", expected)
            .with_context_entry("actual", actual);
        err
    }

    /// A type-required option is absent.
    #[must_use]
    pub fn missing_option(stage: &str, key: &str) -> Self {
        Self::build(
            "CONFIG-004-MISSING_OPTION",
            format!("Stage '{stage}' is missing required option '{key}'"),
            Some(stage),
            Some(key),
        )
    }

    /// Options could not be converted into the typed configuration.
    #[must_use]
    pub fn invalid_option(stage: &str, detail: impl fmt::Display) -> Self {
        Self::build(
            "CONFIG-005-INVALID_OPTION",
            format!("Stage '{stage}' has invalid options: {detail}"),
            Some(stage),
            None,
        )
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("InvalidConfigurationFileError"));
        map.insert("message".to_string(), serde_json::json!(self.message));
        if let Some(ref stage) = self.stage {
            map.insert("stage".to_string(), serde_json::json!(stage));
        }
        if let Some(ref key) = self.key {
            map.insert("key".to_string(), serde_json::json!(key));
        }
        map.insert("error_info".to_string(), serde_json::json!(self.error_info.to_dict()));
        map
    }
}

/// The kind of filesystem object a provider expects its source to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A directory whose entries are artifacts.
    Directory,
    /// A single regular file.
    File,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Error raised when an artifact source does not resolve to an existing resource.
#[derive(Debug, Clone, Error)]
#[error("Artifact source {} does not exist or is not a {expected}", .path.display())]
pub struct ArtifactSourceDoesNotExistError {
    /// The resolved source path.
    pub path: PathBuf,
    /// What the provider expected to find there.
    pub expected: SourceKind,
    /// Contract error info.
    pub error_info: ContractErrorInfo,
}

impl ArtifactSourceDoesNotExistError {
    /// Nothing exists at `path`.
    #[must_use]
    pub fn not_found(path: &Path, expected: SourceKind) -> Self {
        Self::build("SOURCE-001-NOT_FOUND", path, expected)
    }

    /// Something exists at `path` but it is not of the expected kind.
    #[must_use]
    pub fn wrong_kind(path: &Path, expected: SourceKind) -> Self {
        Self::build("SOURCE-002-WRONG_KIND", path, expected)
    }

    fn build(code: &str, path: &Path, expected: SourceKind) -> Self {
        let info = ContractErrorInfo::new(
            code,
            format!("Expected a {expected} at {}", path.display()),
        )
        .with_context_entry("path", path.display().to_string());
        Self {
            path: path.to_path_buf(),
            expected,
            error_info: info,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("ArtifactSourceDoesNotExistError"));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map.insert("path".to_string(), serde_json::json!(self.path.display().to_string()));
        map.insert("expected".to_string(), serde_json::json!(self.expected));
        map.insert("error_info".to_string(), serde_json::json!(self.error_info.to_dict()));
        map
    }
}

/// Error raised when an option lookup misses and no default was given.
#[derive(Debug, Clone, Error)]
#[error("Stage '{stage}' has no option '{key}'")]
pub struct MissingOptionError {
    /// The stage name.
    pub stage: String,
    /// The missing key.
    pub key: String,
}

impl MissingOptionError {
    /// Creates a new missing option error.
    #[must_use]
    pub fn new(stage: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            key: key.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("MissingOptionError"));
        map.insert("stage".to_string(), serde_json::json!(self.stage));
        map.insert("key".to_string(), serde_json::json!(self.key));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Provides default suggestions for configuration and source error codes.
pub struct ContractSuggestions;

impl ContractSuggestions {
    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            "CONFIG-001-EMPTY_NAME" => Some("Give every stage a unique, non-empty name."),
            "CONFIG-002-MISSING_TYPE" => Some(
                "Add a string 'type' option naming the stage kind, \
                 e.g. \"LocalDirectoryPipelineStage\".",
            ),
            "CONFIG-003-TYPE_MISMATCH" => Some(
                "Pass the stage configuration to the provider that matches its 'type'.",
            ),
            "CONFIG-004-MISSING_OPTION" => Some(
                "Add the option required by this stage type to the configuration.",
            ),
            "CONFIG-005-INVALID_OPTION" => Some(
                "Check option names and value types against the stage type's schema.",
            ),
            "SOURCE-001-NOT_FOUND" => Some(
                "Check the path; relative paths resolve against the working directory.",
            ),
            "SOURCE-002-WRONG_KIND" => Some(
                "Point directory stages at directories and file stages at regular files.",
            ),
            _ => None,
        }
    }
}
