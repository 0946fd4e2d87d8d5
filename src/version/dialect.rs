//! Version dialects
//!
//! Dependency families do not all publish semver. Each family is mapped to a
//! [`Dialect`] that rewrites its version strings into a form the shared
//! [`VersionValue`] parser understands:
//! - `Semver`: strict semver, or 1-3 dotted numeric components (`1.5`)
//! - `Prefixed`: `v80`, `v0.13.1` (Go tooling)
//! - `Hyphenated`: `2017-03-01` pseudo-dates, hyphens at known positions
//! - `EmbeddedTag`: `ruby-2.3.1-jruby-9.1.5.0`, compared on the inner version

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::ResolveError;
use crate::version::semver::{PartialVersion, VersionValue};

/// Families whose version line is the major version alone
pub const MAJOR_ONLY_LINE_FAMILIES: &[&str] = &["node"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Dialect {
    #[default]
    Semver,
    Prefixed {
        prefix: String,
    },
    Hyphenated {
        separators: usize,
    },
    EmbeddedTag {
        tag: String,
    },
}

impl Dialect {
    /// Normalize `raw` into a comparable value. The value keeps `raw` for display.
    pub fn normalize(&self, raw: &str) -> Result<VersionValue, ResolveError> {
        let canonical = self.canonicalize(raw)?;
        VersionValue::parse_lenient_as(&canonical, raw)
    }

    /// Normalize `raw` without padding missing components.
    pub fn normalize_partial(&self, raw: &str) -> Result<PartialVersion, ResolveError> {
        let canonical = self.canonicalize(raw)?;
        PartialVersion::parse(&canonical)
            .map_err(|_| ResolveError::invalid_version(raw, "not a recognised version format"))
    }

    fn canonicalize(&self, raw: &str) -> Result<String, ResolveError> {
        match self {
            Dialect::Semver => Ok(raw.to_string()),
            Dialect::Prefixed { prefix } => {
                Ok(raw.strip_prefix(prefix.as_str()).unwrap_or(raw).to_string())
            }
            Dialect::Hyphenated { separators } => Ok(raw.replacen('-', ".", *separators)),
            Dialect::EmbeddedTag { tag } => {
                let marker = format!("-{tag}-");
                let inner = match raw.rsplit_once(marker.as_str()) {
                    Some((_, inner)) => inner,
                    None => raw,
                };
                if inner.is_empty() {
                    return Err(ResolveError::invalid_version(
                        raw,
                        format!("nothing follows the '{tag}' tag"),
                    ));
                }
                Ok(fold_extra_components(inner))
            }
        }
    }
}

/// Move numeric components past the third into build metadata, so
/// `9.1.5.0` compares as `9.1.5`.
fn fold_extra_components(version: &str) -> String {
    let (rest, build) = match version.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (version, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() <= 3 {
        return version.to_string();
    }

    let mut folded = parts[..3].join(".");
    if let Some(pre) = pre {
        folded.push('-');
        folded.push_str(pre);
    }
    folded.push('+');
    folded.push_str(&parts[3..].join("."));
    if let Some(build) = build {
        folded.push('.');
        folded.push_str(build);
    }
    folded
}

/// How versions are grouped when looking for "the newest patch of my line"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionLine {
    Major,
    MajorMinor,
}

impl VersionLine {
    pub fn for_family(name: &str) -> Self {
        if MAJOR_ONLY_LINE_FAMILIES.contains(&name) {
            VersionLine::Major
        } else {
            VersionLine::MajorMinor
        }
    }

    pub fn contains(&self, current: &VersionValue, candidate: &VersionValue) -> bool {
        match self {
            VersionLine::Major => candidate.major() == current.major(),
            VersionLine::MajorMinor => {
                candidate.major() == current.major() && candidate.minor() == current.minor()
            }
        }
    }
}

/// Maps dependency names to their dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectTable {
    families: IndexMap<String, Dialect>,
}

impl DialectTable {
    /// Built-in families plus `overrides`, which win on conflicts.
    pub fn with_overrides(overrides: &IndexMap<String, Dialect>) -> Self {
        let mut table = Self::default();
        for (name, dialect) in overrides {
            debug!("Dialect override for {}: {:?}", name, dialect);
            table.families.insert(name.clone(), dialect.clone());
        }
        table
    }

    pub fn dialect_for(&self, name: &str) -> &Dialect {
        static SEMVER: Dialect = Dialect::Semver;
        self.families.get(name).unwrap_or(&SEMVER)
    }
}

impl Default for DialectTable {
    fn default() -> Self {
        let v_prefixed = Dialect::Prefixed {
            prefix: "v".to_string(),
        };
        let mut families = IndexMap::new();
        families.insert(
            "jruby".to_string(),
            Dialect::EmbeddedTag {
                tag: "jruby".to_string(),
            },
        );
        families.insert("godep".to_string(), v_prefixed.clone());
        families.insert("glide".to_string(), v_prefixed.clone());
        families.insert("dep".to_string(), v_prefixed);
        Self { families }
    }
}
