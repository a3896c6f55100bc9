//! Provider backed by a local filesystem directory.

use super::fs::{absolute_path, ensure_source, entry_name, entry_path, list_names, read_artifact};
use super::{validate_stage_config, ArtifactProvider, EntryIter};
use crate::config::constants::LOCAL_DIRECTORY_STAGE;
use crate::config::{EnumerationOrder, LocalDirectoryConfig, ProviderConfig, StageConfig};
use crate::core::Artifact;
use crate::errors::{InvalidConfigurationFileError, Result, SourceKind};
use crate::observability::SpanTimer;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Provides the entries directly inside a directory as artifacts.
///
/// The directory is checked once at construction. Listing happens when a
/// stream is first pulled and reflects the directory at that moment; there is
/// no snapshot across calls. Every direct entry is listed without being
/// inspected. An entry that is not a readable regular file fails when its
/// payload is fetched. With [`EnumerationOrder::Sorted`] (the default)
/// names come back sorted byte-wise; with [`EnumerationOrder::Filesystem`]
/// they come back in `read_dir` order.
#[derive(Debug, Clone)]
pub struct LocalDirectoryArtifactProvider {
    path: PathBuf,
    stage_config: Arc<StageConfig>,
    read_content: bool,
    order: EnumerationOrder,
}

impl LocalDirectoryArtifactProvider {
    /// Creates a provider that yields identifiers only.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `stage_config` is not a local
    /// directory stage, or `SourceDoesNotExist` if `path` is not a directory.
    pub fn new(path: impl AsRef<Path>, stage_config: Arc<StageConfig>) -> Result<Self> {
        Self::with_read_content(path, stage_config, false)
    }

    /// Creates a provider, choosing whether enumeration loads payloads.
    ///
    /// # Errors
    ///
    /// Same as [`LocalDirectoryArtifactProvider::new`].
    pub fn with_read_content(
        path: impl AsRef<Path>,
        stage_config: Arc<StageConfig>,
        read_content: bool,
    ) -> Result<Self> {
        validate_stage_config(&stage_config, LOCAL_DIRECTORY_STAGE)?;

        let path = absolute_path(path.as_ref())?;
        ensure_source(&path, SourceKind::Directory)?;

        debug!(
            stage = stage_config.name(),
            source = %path.display(),
            read_content,
            "Local directory provider ready"
        );

        Ok(Self {
            path,
            stage_config,
            read_content,
            order: EnumerationOrder::default(),
        })
    }

    /// Creates a provider from the options of its stage configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the options are missing or malformed,
    /// or `SourceDoesNotExist` if `filepath` is not a directory.
    pub fn from_config(stage_config: Arc<StageConfig>) -> Result<Self> {
        validate_stage_config(&stage_config, LOCAL_DIRECTORY_STAGE)?;
        match stage_config.provider_config()? {
            ProviderConfig::LocalDirectory(typed) => Self::from_typed(&typed, stage_config),
            other => Err(InvalidConfigurationFileError::type_mismatch(
                stage_config.name(),
                LOCAL_DIRECTORY_STAGE,
                other.stage_type(),
            )
            .into()),
        }
    }

    pub(crate) fn from_typed(
        typed: &LocalDirectoryConfig,
        stage_config: Arc<StageConfig>,
    ) -> Result<Self> {
        Ok(Self::with_read_content(&typed.filepath, stage_config, typed.read_content)?
            .with_order(typed.order))
    }

    /// Sets the enumeration order.
    #[must_use]
    pub fn with_order(mut self, order: EnumerationOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns the absolute directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the enumeration order.
    #[must_use]
    pub const fn order(&self) -> EnumerationOrder {
        self.order
    }
}

impl ArtifactProvider for LocalDirectoryArtifactProvider {
    fn stage_type(&self) -> &'static str {
        LOCAL_DIRECTORY_STAGE
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
        let names = list_names(&self.path)?;
        match self.order {
            EnumerationOrder::Filesystem => {
                Ok(Box::new(names.map(|name| -> Result<String> { entry_name(name?) })))
            }
            EnumerationOrder::Sorted => {
                let mut names = names.collect::<io::Result<Vec<_>>>()?;
                names.sort_unstable();
                Ok(Box::new(names.into_iter().map(entry_name)))
            }
        }
    }

    fn fetch_artifact(&self, name: &str) -> Result<Artifact> {
        let timer = SpanTimer::start("local_directory.fetch");
        let path = entry_path(&self.path, name)?;
        let artifact = read_artifact(&path, name)?;

        debug!(
            stage = self.stage_config.name(),
            identifier = %artifact.identifier,
            bytes = artifact.payload_len(),
            duration_ms = timer.finish(),
            "Artifact fetched"
        );
        Ok(artifact)
    }
}
