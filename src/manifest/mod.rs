//! Buildpack manifest model
//!
//! - [`types`]: the YAML document as deserialized
//! - [`platform`]: stack applicability of entries
//! - [`index`]: compiled, read-only lookup view

pub mod index;
pub mod platform;
pub mod types;

use std::path::Path;

use tracing::debug;

use crate::error::ManifestError;

pub use index::ManifestIndex;
pub use platform::{Platform, Platforms};
pub use types::{DefaultVersion, DependencyEntry, DeprecationEntry, Manifest, MappingRule};

impl Manifest {
    pub fn from_yaml_str(content: &str) -> Result<Self, ManifestError> {
        // An empty document is an empty manifest rather than an error.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        debug!("Loading manifest from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "dependencies:\n  - name: go\n    version: 1.5.1\n    uri: https://example.com/go"
        )
        .unwrap();

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.dependencies.len(), 1);
        assert_eq!(manifest.dependencies[0].name, "go");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("manifest.yml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }

    #[test]
    fn from_yaml_str_reports_malformed_yaml() {
        let err = Manifest::from_yaml_str("dependencies: [unclosed").unwrap_err();
        assert!(matches!(err, ManifestError::Yaml(_)));
    }

    #[test]
    fn from_yaml_str_accepts_empty_document() {
        assert_eq!(Manifest::from_yaml_str("").unwrap(), Manifest::default());
    }
}
