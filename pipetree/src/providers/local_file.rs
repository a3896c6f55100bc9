//! Provider backed by a single local file.

use super::fs::{absolute_path, ensure_source, read_artifact, utf8_file_name};
use super::{validate_stage_config, ArtifactProvider, EntryIter};
use crate::config::constants::LOCAL_FILE_STAGE;
use crate::config::{LocalFileConfig, ProviderConfig, StageConfig};
use crate::core::Artifact;
use crate::errors::{InvalidConfigurationFileError, Result, SourceKind};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Provides one regular file as a single artifact.
#[derive(Debug, Clone)]
pub struct LocalFileArtifactProvider {
    path: PathBuf,
    file_name: String,
    stage_config: Arc<StageConfig>,
    read_content: bool,
}

impl LocalFileArtifactProvider {
    /// Creates a provider for the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `stage_config` is not a local file
    /// stage, or `SourceDoesNotExist` if `path` is not a regular file.
    pub fn new(
        path: impl AsRef<Path>,
        stage_config: Arc<StageConfig>,
        read_content: bool,
    ) -> Result<Self> {
        validate_stage_config(&stage_config, LOCAL_FILE_STAGE)?;

        let path = absolute_path(path.as_ref())?;
        ensure_source(&path, SourceKind::File)?;
        let file_name = utf8_file_name(&path)?;

        debug!(
            stage = stage_config.name(),
            source = %path.display(),
            read_content,
            "Local file provider ready"
        );

        Ok(Self {
            path,
            file_name,
            stage_config,
            read_content,
        })
    }

    /// Creates a provider from the options of its stage configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the options are missing or malformed,
    /// or `SourceDoesNotExist` if `filepath` is not a regular file.
    pub fn from_config(stage_config: Arc<StageConfig>) -> Result<Self> {
        validate_stage_config(&stage_config, LOCAL_FILE_STAGE)?;
        match stage_config.provider_config()? {
            ProviderConfig::LocalFile(typed) => Self::from_typed(&typed, stage_config),
            other => Err(InvalidConfigurationFileError::type_mismatch(
                stage_config.name(),
                LOCAL_FILE_STAGE,
                other.stage_type(),
            )
            .into()),
        }
    }

    pub(crate) fn from_typed(typed: &LocalFileConfig, stage_config: Arc<StageConfig>) -> Result<Self> {
        Self::new(&typed.filepath, stage_config, typed.read_content)
    }

    /// Returns the file name, the only entry this provider lists.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl ArtifactProvider for LocalFileArtifactProvider {
    fn stage_type(&self) -> &'static str {
        LOCAL_FILE_STAGE
    }

    fn stage_config(&self) -> &StageConfig {
        &self.stage_config
    }

    fn source(&self) -> &Path {
        &self.path
    }

    fn read_content(&self) -> bool {
        self.read_content
    }

    fn list_entries(&self) -> Result<EntryIter<'_>> {
        // Surfaces a removal since construction as NotFound.
        std::fs::metadata(&self.path)?;
        Ok(Box::new(std::iter::once(Ok(self.file_name.clone()))))
    }

    fn resolve(&self, name: &str) -> PathBuf {
        if name == self.file_name {
            self.path.clone()
        } else {
            self.path.with_file_name(name)
        }
    }

    fn fetch_artifact(&self, name: &str) -> Result<Artifact> {
        if name != self.file_name {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("'{name}' is not provided by {}", self.path.display()),
            )
            .into());
        }
        let artifact = read_artifact(&self.path, name)?;
        debug!(
            stage = self.stage_config.name(),
            identifier = %artifact.identifier,
            bytes = artifact.payload_len(),
            "Artifact fetched"
        );
        Ok(artifact)
    }
}
