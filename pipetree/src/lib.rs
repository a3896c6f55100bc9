//! # Pipetree
//!
//! Artifact acquisition for the pipetree pipeline framework.
//!
//! A stage's input arrives through an [`ArtifactProvider`](providers::ArtifactProvider):
//!
//! - **Stage configuration**: a named, validated option bag with a `type`
//! - **Fail-fast construction**: bad configuration or a missing source is
//!   reported before the provider can be used
//! - **Lazy enumeration**: artifacts are listed on first pull and loaded one
//!   at a time, on the caller's thread
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipetree::prelude::*;
//! use std::sync::Arc;
//!
//! let config = StageConfig::from_json(
//!     "ingest",
//!     serde_json::json!({"type": "LocalDirectoryPipelineStage"}),
//! )?;
//! let provider =
//!     LocalDirectoryArtifactProvider::with_read_content("data", Arc::new(config), true)?;
//!
//! for item in provider.yield_artifacts() {
//!     let artifact = item?.into_artifact();
//!     println!("{} ({} bytes)", artifact.identifier, artifact.payload_len());
//! }
//! # Ok::<(), pipetree::errors::PipetreeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod observability;
pub mod providers;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        EnumerationOrder, LocalDirectoryConfig, LocalFileConfig, ProviderConfig, StageConfig,
    };
    pub use crate::core::{Artifact, YieldedArtifact};
    pub use crate::errors::{
        ArtifactSourceDoesNotExistError, InvalidConfigurationFileError, MissingOptionError,
        PipetreeError, Result,
    };
    pub use crate::providers::{
        provider_from_config, ArtifactProvider, ArtifactStream, LocalDirectoryArtifactProvider,
        LocalFileArtifactProvider,
    };
}
