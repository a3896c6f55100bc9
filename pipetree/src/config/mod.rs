//! Stage configuration.
//!
//! A [`StageConfig`] is the generic, dynamically typed bag handed over by the
//! pipeline loader. [`ProviderConfig`] is its typed counterpart, produced once
//! per stage and consumed by the provider constructors.

pub mod constants;
mod provider;
mod stage;

pub use provider::{EnumerationOrder, LocalDirectoryConfig, LocalFileConfig, ProviderConfig};
pub use stage::StageConfig;
