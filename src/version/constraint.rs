//! Version constraints
//!
//! Supports the request forms callers use against a manifest:
//! - `>=1.6.0`, `>1.5`, `<=1.6.0`, `<1`, `=1.6.0` - comparison operators;
//!   only the components given on the right-hand side are compared
//! - `1.6.*`, `1.*`, `*` (also `x`/`X`) - wildcards
//! - `~1.6` - any patch of 1.6; `~1.6.2` - 1.6.2 or a later 1.6 patch
//! - `1.6` - bare partial version, same as `1.6.*`
//! - `1.6.0` - semantic equality

use std::cmp::Ordering;

use crate::error::ResolveError;
use crate::version::semver::{PartialVersion, VersionValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// `*` matches every version
    Any,
    /// Greater than or equal
    Gte(PartialVersion),
    /// Greater than
    Gt(PartialVersion),
    /// Less than or equal
    Lte(PartialVersion),
    /// Less than
    Lt(PartialVersion),
    /// `=1.6.0` or a bare version; partial versions match as a prefix
    Exact(PartialVersion),
    /// `~1.6`
    Tilde(PartialVersion),
    /// `1.*` or `1.6.*`
    Wildcard { major: u64, minor: Option<u64> },
}

impl VersionConstraint {
    pub fn parse(spec: &str) -> Result<Self, ResolveError> {
        Self::try_parse(spec.trim()).ok_or_else(|| ResolveError::InvalidConstraint {
            constraint: spec.to_string(),
        })
    }

    /// True when `spec` uses operator or wildcard syntax rather than a plain version.
    pub fn is_constraint_syntax(spec: &str) -> bool {
        let spec = spec.trim();
        spec.starts_with(['>', '<', '=', '~'])
            || spec
                .split('.')
                .any(|part| part == "*" || part.eq_ignore_ascii_case("x"))
    }

    fn try_parse(spec: &str) -> Option<Self> {
        let partial = |rest: &str| PartialVersion::parse(rest.trim()).ok();

        if let Some(rest) = spec.strip_prefix(">=") {
            partial(rest).map(VersionConstraint::Gte)
        } else if let Some(rest) = spec.strip_prefix('>') {
            partial(rest).map(VersionConstraint::Gt)
        } else if let Some(rest) = spec.strip_prefix("<=") {
            partial(rest).map(VersionConstraint::Lte)
        } else if let Some(rest) = spec.strip_prefix('<') {
            partial(rest).map(VersionConstraint::Lt)
        } else if let Some(rest) = spec.strip_prefix('=') {
            partial(rest).map(VersionConstraint::Exact)
        } else if let Some(rest) = spec.strip_prefix('~') {
            partial(rest).map(VersionConstraint::Tilde)
        } else if spec == "*" || spec.eq_ignore_ascii_case("x") {
            Some(VersionConstraint::Any)
        } else if let Some(wildcard) = Self::parse_wildcard(spec) {
            Some(wildcard)
        } else {
            partial(spec).map(VersionConstraint::Exact)
        }
    }

    /// Parse wildcard patterns like "1.*" or "1.6.*"
    fn parse_wildcard(spec: &str) -> Option<Self> {
        let is_star = |part: &str| part == "*" || part.eq_ignore_ascii_case("x");
        let parts: Vec<&str> = spec.split('.').collect();

        match parts.as_slice() {
            [major, star] if is_star(star) => Some(VersionConstraint::Wildcard {
                major: major.parse().ok()?,
                minor: None,
            }),
            [major, star, rest] if is_star(star) && is_star(rest) => {
                Some(VersionConstraint::Wildcard {
                    major: major.parse().ok()?,
                    minor: None,
                })
            }
            [major, minor, star] if is_star(star) => Some(VersionConstraint::Wildcard {
                major: major.parse().ok()?,
                minor: Some(minor.parse().ok()?),
            }),
            _ => None,
        }
    }

    /// Check if a version satisfies this constraint
    pub fn matches(&self, version: &VersionValue) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Gte(p) => p.compare(version) != Ordering::Less,
            VersionConstraint::Gt(p) => p.compare(version) == Ordering::Greater,
            VersionConstraint::Lte(p) => p.compare(version) != Ordering::Greater,
            VersionConstraint::Lt(p) => p.compare(version) == Ordering::Less,
            VersionConstraint::Exact(p) => p.compare(version) == Ordering::Equal,
            VersionConstraint::Tilde(p) => {
                // ~1.6 -> 1.6.x, ~1.6.2 -> >=1.6.2 <1.7.0, ~1 -> 1.x
                let same_line = version.major() == p.major
                    && p.minor.is_none_or(|minor| version.minor() == minor);
                same_line && p.compare(version) != Ordering::Less
            }
            VersionConstraint::Wildcard { major, minor } => {
                version.major() == *major && minor.is_none_or(|minor| version.minor() == minor)
            }
        }
    }
}
