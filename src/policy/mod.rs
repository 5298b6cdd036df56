//! Version policy definitions.

pub mod v1;
pub mod scoring;

pub use v1::{VersionPolicyV1, PolicyError, DEFAULT_BASE_VERSION};
pub use scoring::CompletionStats;
