//! Parsed version values
//!
//! [`VersionValue`] wraps a [`semver::Version`] and keeps the original text
//! for display. Ordering and equality follow semver precedence and ignore
//! build metadata entirely.
//!
//! [`PartialVersion`] is the tolerant form: one to three numeric components
//! (leading zeros allowed) with optional pre-release and build metadata.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use semver::{BuildMetadata, Prerelease, Version};

use crate::error::ResolveError;
use crate::version::constraint::VersionConstraint;

#[derive(Debug, Clone)]
pub struct VersionValue {
    version: Version,
    raw: String,
}

impl VersionValue {
    /// Strict `MAJOR.MINOR.PATCH[-PRE][+BUILD]` parse.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let version =
            Version::parse(raw).map_err(|e| ResolveError::invalid_version(raw, e.to_string()))?;
        Ok(Self {
            version,
            raw: raw.to_string(),
        })
    }

    /// Strict parse, falling back to the dotted-numeric form.
    ///
    /// Examples:
    /// - "1" -> 1.0.0
    /// - "1.5" -> 1.5.0
    /// - "2017.03.01" -> 2017.3.1
    pub fn parse_lenient(raw: &str) -> Result<Self, ResolveError> {
        Self::parse_lenient_as(raw, raw)
    }

    /// Lenient parse of `normalized`, keeping `raw` as the display text.
    pub(crate) fn parse_lenient_as(normalized: &str, raw: &str) -> Result<Self, ResolveError> {
        if let Ok(version) = Version::parse(normalized) {
            return Ok(Self {
                version,
                raw: raw.to_string(),
            });
        }

        let partial = PartialVersion::parse(normalized)
            .map_err(|_| ResolveError::invalid_version(raw, "not a recognised version format"))?;
        Ok(partial.into_value(raw))
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    pub fn pre(&self) -> Option<&str> {
        non_empty(self.version.pre.as_str())
    }

    pub fn build(&self) -> Option<&str> {
        non_empty(self.version.build.as_str())
    }

    /// The text this value was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn prerelease(&self) -> &Prerelease {
        &self.version.pre
    }

    /// Check this version against a constraint such as `>=1.6`, `1.*` or `~1.6`.
    pub fn satisfies(&self, constraint: &str) -> Result<bool, ResolveError> {
        Ok(VersionConstraint::parse(constraint)?.matches(self))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

impl PartialEq for VersionValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionValue {}

impl Hash for VersionValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.major.hash(state);
        self.version.minor.hash(state);
        self.version.patch.hash(state);
        self.version.pre.hash(state);
    }
}

impl PartialOrd for VersionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionValue {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.version, &other.version);
        // An empty Prerelease sorts above every pre-release.
        a.major
            .cmp(&b.major)
            .then(a.minor.cmp(&b.minor))
            .then(a.patch.cmp(&b.patch))
            .then_with(|| a.pre.cmp(&b.pre))
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// A version with possibly missing minor/patch components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub pre: Prerelease,
    pub build: BuildMetadata,
}

impl PartialVersion {
    pub fn parse(s: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: &str| ResolveError::invalid_version(s, reason);

        if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("empty or contains whitespace"));
        }

        let (rest, build) = match s.split_once('+') {
            Some((rest, build)) => (
                rest,
                BuildMetadata::new(build).map_err(|e| invalid(&e.to_string()))?,
            ),
            None => (s, BuildMetadata::EMPTY),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((core, pre)) => (
                core,
                Prerelease::new(pre).map_err(|e| invalid(&e.to_string()))?,
            ),
            None => (rest, Prerelease::EMPTY),
        };

        let components = core
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("version components must be numeric"));
                }
                part.parse::<u64>()
                    .map_err(|_| invalid("version component out of range"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match components.as_slice() {
            [major] => Ok(Self::new(*major, None, None, pre, build)),
            [major, minor] => Ok(Self::new(*major, Some(*minor), None, pre, build)),
            [major, minor, patch] => Ok(Self::new(*major, Some(*minor), Some(*patch), pre, build)),
            _ => Err(invalid("expected one to three numeric components")),
        }
    }

    fn new(
        major: u64,
        minor: Option<u64>,
        patch: Option<u64>,
        pre: Prerelease,
        build: BuildMetadata,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            pre,
            build,
        }
    }

    /// True when major, minor and patch were all given.
    pub fn is_complete(&self) -> bool {
        self.patch.is_some()
    }

    /// Pad missing components with zeros.
    pub fn into_value(self, raw: &str) -> VersionValue {
        VersionValue {
            version: Version {
                major: self.major,
                minor: self.minor.unwrap_or(0),
                patch: self.patch.unwrap_or(0),
                pre: self.pre,
                build: self.build,
            },
            raw: raw.to_string(),
        }
    }

    /// Order `version` relative to this partial version, looking only at the
    /// components that were given. A complete partial also compares the
    /// pre-release.
    pub fn compare(&self, version: &VersionValue) -> Ordering {
        let mut ordering = version.major().cmp(&self.major);
        if let Some(minor) = self.minor {
            ordering = ordering.then(version.minor().cmp(&minor));
        }
        if let Some(patch) = self.patch {
            ordering = ordering
                .then(version.patch().cmp(&patch))
                .then_with(|| version.prerelease().cmp(&self.pre));
        }
        ordering
    }
}
