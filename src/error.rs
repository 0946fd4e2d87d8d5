use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No url_to_dependency_map entry matches {url}")]
    NoMapping { url: String },

    #[error("DEPENDENCY_MISSING_IN_MANIFEST: {name} {version}")]
    MissingInManifest { name: String, version: String },

    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid version constraint '{constraint}'")]
    InvalidConstraint { constraint: String },

    #[error("Misconfigured default version for '{name}': {reason}")]
    MisconfiguredDefault { name: String, reason: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Malformed URI: {0}")]
    MalformedUri(String),
}

impl ResolveError {
    pub(crate) fn invalid_version(version: &str, reason: impl Into<String>) -> Self {
        ResolveError::InvalidVersion {
            version: version.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(name: &str, version: &str) -> Self {
        ResolveError::MissingInManifest {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// True when the manifest simply has nothing for the request.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::NoMapping { .. } | ResolveError::MissingInManifest { .. }
        )
    }

    /// True when the request or the manifest itself is malformed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidVersion { .. }
                | ResolveError::InvalidConstraint { .. }
                | ResolveError::MisconfiguredDefault { .. }
                | ResolveError::InvalidPattern { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
