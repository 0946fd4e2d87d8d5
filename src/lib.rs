//! Manifest-driven dependency resolution for buildpacks
//!
//! A buildpack ships a `manifest.yml` listing the artifacts it may install.
//! This crate answers questions against that manifest: which entry a
//! download URL maps to, which version satisfies a request, whether a newer
//! patch exists, and whether a version line is about to be retired.

pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod resolve;
pub mod version;

pub use error::{ManifestError, ResolveError};
pub use manifest::{Manifest, ManifestIndex, Platform};
