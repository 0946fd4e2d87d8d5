//! Version selection within a dependency family
//!
//! Requests are answered from the manifest only:
//! - an exact version string wins outright
//! - `>=1.6`, `1.*`, `~1.6` pick the greatest satisfying entry
//! - a partial version (`1.5`) picks the greatest entry on that line
//! - a full version must be present (semantically) or the request is not found

use tracing::debug;

use crate::error::ResolveError;
use crate::manifest::index::ManifestIndex;
use crate::manifest::platform::Platform;
use crate::manifest::types::DependencyEntry;
use crate::version::constraint::VersionConstraint;
use crate::version::dialect::{Dialect, DialectTable, VersionLine};
use crate::version::semver::{PartialVersion, VersionValue};

/// How a resolution request is matched against candidates
enum Request {
    Constraint(VersionConstraint),
    Line { partial: PartialVersion, line: VersionLine },
    Exact(VersionValue),
}

impl Request {
    fn classify(name: &str, raw: &str, dialect: &Dialect) -> Result<Self, ResolveError> {
        if VersionConstraint::is_constraint_syntax(raw) {
            return VersionConstraint::parse(raw).map(Request::Constraint);
        }

        let partial = dialect.normalize_partial(raw)?;
        if partial.is_complete() {
            Ok(Request::Exact(partial.into_value(raw)))
        } else {
            Ok(Request::Line {
                partial,
                line: VersionLine::for_family(name),
            })
        }
    }

    fn accepts(&self, candidate: &VersionValue) -> bool {
        match self {
            Request::Constraint(constraint) => constraint.matches(candidate),
            Request::Line { partial, line } => {
                candidate.major() == partial.major
                    && (*line == VersionLine::Major
                        || partial.minor.is_none_or(|minor| candidate.minor() == minor))
            }
            Request::Exact(version) => candidate == version,
        }
    }
}

/// Picks versions for one platform
pub struct VersionSelector<'a> {
    index: &'a ManifestIndex,
    platform: &'a Platform,
    dialects: &'a DialectTable,
}

impl<'a> VersionSelector<'a> {
    pub fn new(index: &'a ManifestIndex, platform: &'a Platform, dialects: &'a DialectTable) -> Self {
        Self {
            index,
            platform,
            dialects,
        }
    }

    /// Resolve `request` (exact version, partial version or constraint) to a
    /// manifest entry for this platform.
    pub fn resolve_by_name(
        &self,
        name: &str,
        request: &str,
    ) -> Result<&'a DependencyEntry, ResolveError> {
        if let Some(entry) = self.index.find_entry(name, request, self.platform) {
            debug!("Exact match for {} {}", name, request);
            return Ok(entry);
        }

        let dialect = self.dialects.dialect_for(name);
        let request_kind = Request::classify(name, request, dialect)?;

        let mut best: Option<(VersionValue, &'a DependencyEntry)> = None;
        for entry in self.index.eligible_entries(name, self.platform) {
            let candidate = dialect.normalize(&entry.version)?;
            if !request_kind.accepts(&candidate) {
                continue;
            }
            // Strictly greater, so ties keep the earlier entry.
            if best.as_ref().is_none_or(|(current, _)| candidate > *current) {
                best = Some((candidate, entry));
            }
        }

        match best {
            Some((value, entry)) => {
                debug!("Resolved {} {} to {}", name, request, value.raw());
                Ok(entry)
            }
            None => Err(ResolveError::missing(name, request)),
        }
    }

    /// The greatest version on the same line as `version`, across every
    /// platform. Returns `version` itself when nothing better is known.
    pub fn newest_patch_version(&self, name: &str, version: &str) -> Result<String, ResolveError> {
        let entries: Vec<&DependencyEntry> = self.index.entries_named(name).collect();
        if entries.len() < 2 {
            return Ok(version.to_string());
        }

        let dialect = self.dialects.dialect_for(name);
        let line = VersionLine::for_family(name);
        let current = dialect.normalize(version)?;

        let mut best: Option<VersionValue> = None;
        for entry in entries {
            let candidate = dialect.normalize(&entry.version)?;
            if !line.contains(&current, &candidate) {
                continue;
            }
            if best.as_ref().is_none_or(|best| candidate > *best) {
                best = Some(candidate);
            }
        }

        Ok(best.map_or_else(|| version.to_string(), |best| best.raw().to_string()))
    }

    /// The newest patch of `version`'s line when it is strictly newer.
    pub fn newer_patch(&self, name: &str, version: &str) -> Result<Option<String>, ResolveError> {
        let newest = self.newest_patch_version(name, version)?;
        if newest == version {
            return Ok(None);
        }

        let dialect = self.dialects.dialect_for(name);
        let is_newer = dialect.normalize(&newest)? > dialect.normalize(version)?;
        Ok(is_newer.then_some(newest))
    }

    /// The entry named by `default_versions` for `name` on this platform.
    pub fn default_version(&self, name: &str) -> Result<&'a DependencyEntry, ResolveError> {
        let misconfigured = |reason: String| ResolveError::MisconfiguredDefault {
            name: name.to_string(),
            reason,
        };

        let defaults: Vec<_> = self
            .index
            .default_versions()
            .iter()
            .filter(|default| default.name == name)
            .collect();
        let default = match defaults.as_slice() {
            [default] => *default,
            [] => return Err(misconfigured("no default version".to_string())),
            many => {
                return Err(misconfigured(format!(
                    "{} default versions declared",
                    many.len()
                )));
            }
        };

        let matches: Vec<&'a DependencyEntry> = self
            .index
            .eligible_entries(name, self.platform)
            .filter(|entry| entry.version == default.version)
            .collect();
        match matches.as_slice() {
            [entry] => Ok(*entry),
            [] => Err(misconfigured(format!(
                "default version {} is not in the manifest for {}",
                default.version, self.platform
            ))),
            many => Err(misconfigured(format!(
                "default version {} matches {} dependencies",
                default.version,
                many.len()
            ))),
        }
    }

    /// Version strings of every entry called `name`, in manifest order
    pub fn versions_of(&self, name: &str) -> Vec<&'a str> {
        self.index
            .entries_named(name)
            .map(|entry| entry.version.as_str())
            .collect()
    }
}
