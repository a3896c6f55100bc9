//! Artifact providers.
//!
//! A provider discovers artifacts in one kind of source and materializes
//! their payloads on demand. Every provider:
//!
//! - validates its stage configuration and source at construction,
//! - enumerates entry names afresh on every [`ArtifactProvider::yield_artifacts`] call,
//! - loads payloads only through [`ArtifactProvider::fetch_artifact`].
//!
//! Enumeration is pull-based and synchronous: nothing is listed until the
//! first item is requested, and nothing is read ahead of the caller.

mod fs;
mod local_directory;
mod local_file;

pub use fs::{META_CONTENT_HASH, META_FILE_NAME, META_MODIFIED_AT, META_SIZE_BYTES};
pub use local_directory::LocalDirectoryArtifactProvider;
pub use local_file::LocalFileArtifactProvider;

use crate::config::{ProviderConfig, StageConfig};
use crate::core::{Artifact, YieldedArtifact};
use crate::errors::Result;
use std::fmt::Debug;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A fallible sequence of entry names, relative to a provider's source.
pub type EntryIter<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Views a provider as a trait object.
///
/// Blanket-implemented for every sized provider; lets provided methods of
/// [`ArtifactProvider`] hand `self` to [`ArtifactStream`].
pub trait AsArtifactProvider {
    /// Returns `self` as `&dyn ArtifactProvider`.
    fn as_artifact_provider(&self) -> &dyn ArtifactProvider;
}

impl<T: ArtifactProvider> AsArtifactProvider for T {
    fn as_artifact_provider(&self) -> &dyn ArtifactProvider {
        self
    }
}

/// Trait for artifact providers.
///
/// Implementations supply enumeration ([`list_entries`](Self::list_entries))
/// and the fetch primitive ([`fetch_artifact`](Self::fetch_artifact));
/// [`ArtifactStream`] turns those into the lazy artifact sequence.
pub trait ArtifactProvider: AsArtifactProvider + Send + Sync + Debug {
    /// Returns the stage type this provider serves.
    fn stage_type(&self) -> &'static str;

    /// Returns the stage configuration the provider was built from.
    fn stage_config(&self) -> &StageConfig;

    /// Returns the validated, absolute source locator.
    fn source(&self) -> &Path;

    /// Returns whether enumeration yields materialized artifacts.
    fn read_content(&self) -> bool;

    /// Lists the source's entries as they are right now.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the source cannot be listed.
    fn list_entries(&self) -> Result<EntryIter<'_>>;

    /// Resolves an entry name to its full locator.
    fn resolve(&self, name: &str) -> PathBuf {
        self.source().join(name)
    }

    /// Loads one entry with its payload, regardless of [`read_content`](Self::read_content).
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the entry is missing or unreadable.
    fn fetch_artifact(&self, name: &str) -> Result<Artifact>;

    /// Starts a fresh, lazy enumeration of the source.
    fn yield_artifacts(&self) -> ArtifactStream<'_> {
        ArtifactStream::new(self.as_artifact_provider())
    }
}

/// Checks that `config` targets the provider serving `expected`.
///
/// # Errors
///
/// Returns `InvalidConfiguration` on a type mismatch.
pub fn validate_stage_config(config: &StageConfig, expected: &str) -> Result<()> {
    config.expect_type(expected)
}

/// Builds the provider matching the stage type of `config`.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the options are invalid, or
/// `SourceDoesNotExist` if the configured path is missing.
pub fn provider_from_config(config: Arc<StageConfig>) -> Result<Box<dyn ArtifactProvider>> {
    let provider: Box<dyn ArtifactProvider> = match config.provider_config()? {
        ProviderConfig::LocalDirectory(typed) => {
            Box::new(LocalDirectoryArtifactProvider::from_typed(&typed, config)?)
        }
        ProviderConfig::LocalFile(typed) => {
            Box::new(LocalFileArtifactProvider::from_typed(&typed, config)?)
        }
    };
    Ok(provider)
}

/// A lazy, one-shot pass over a provider's entries.
///
/// The listing happens on the first call to `next`. In read-content mode each
/// pull loads exactly one payload. The first error ends the pass.
pub struct ArtifactStream<'a> {
    provider: &'a dyn ArtifactProvider,
    entries: Option<EntryIter<'a>>,
    pass_id: Uuid,
    yielded: usize,
    done: bool,
}

impl<'a> ArtifactStream<'a> {
    /// Creates a stream over `provider`. Nothing is listed yet.
    #[must_use]
    pub fn new(provider: &'a dyn ArtifactProvider) -> Self {
        Self {
            provider,
            entries: None,
            pass_id: Uuid::new_v4(),
            yielded: 0,
            done: false,
        }
    }

    /// Returns the id correlating this pass in logs.
    #[must_use]
    pub const fn pass_id(&self) -> Uuid {
        self.pass_id
    }

    /// Returns how many items have been yielded successfully.
    #[must_use]
    pub const fn yielded(&self) -> usize {
        self.yielded
    }

    /// Returns true once the listing has been taken.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.entries.is_some() || self.done
    }

    fn materialize(&self, name: &str) -> Result<YieldedArtifact> {
        if self.provider.read_content() {
            self.provider.fetch_artifact(name).map(YieldedArtifact::Loaded)
        } else {
            let path = self.provider.resolve(name);
            Ok(YieldedArtifact::Identifier(path.to_string_lossy().into_owned()))
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.entries = None;
    }
}

impl Iterator for ArtifactStream<'_> {
    type Item = Result<YieldedArtifact>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.entries.is_none() {
            let provider = self.provider;
            debug!(
                stage = provider.stage_config().name(),
                source = %provider.source().display(),
                pass_id = %self.pass_id,
                read_content = provider.read_content(),
                "Enumeration started"
            );
            match provider.list_entries() {
                Ok(entries) => self.entries = Some(entries),
                Err(e) => {
                    self.finish();
                    return Some(Err(e));
                }
            }
        }

        let next = self.entries.as_mut().and_then(Iterator::next);
        let item = match next {
            None => {
                debug!(
                    stage = self.provider.stage_config().name(),
                    pass_id = %self.pass_id,
                    count = self.yielded,
                    "Enumeration finished"
                );
                self.finish();
                return None;
            }
            Some(Ok(name)) => self.materialize(&name),
            Some(Err(e)) => Err(e),
        };

        if item.is_ok() {
            self.yielded += 1;
        } else {
            self.finish();
        }
        Some(item)
    }
}

impl FusedIterator for ArtifactStream<'_> {}

impl Debug for ArtifactStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStream")
            .field("source", &self.provider.source())
            .field("pass_id", &self.pass_id)
            .field("yielded", &self.yielded)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
