//! Core domain model types for pipetree.
//!
//! This module contains the values that flow out of artifact providers:
//! - The materialized [`Artifact`]
//! - [`YieldedArtifact`], the item type of a lazy enumeration

mod artifact;

pub use artifact::{Artifact, YieldedArtifact};
