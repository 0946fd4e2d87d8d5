//! URL to dependency mapping
//!
//! `url_to_dependency_map` rules are tried in manifest order and only the
//! first rule whose pattern matches the URL is used, even if the dependency
//! it names is missing and a later rule would have matched.

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::ResolveError;
use crate::manifest::index::ManifestIndex;
use crate::manifest::platform::Platform;
use crate::manifest::types::{DependencyEntry, MappingRule};

/// A mapping rule with its pattern compiled
#[derive(Debug, Clone)]
pub struct UrlMapping {
    regex: Regex,
    rule: MappingRule,
}

impl UrlMapping {
    pub fn compile(rule: MappingRule) -> Result<Self, ResolveError> {
        let regex = Regex::new(&rule.pattern).map_err(|source| ResolveError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        Ok(Self { regex, rule })
    }

    pub fn rule(&self) -> &MappingRule {
        &self.rule
    }

    /// The (name, version) this rule derives from `url`, if it matches.
    pub fn apply(&self, url: &str) -> Option<(String, String)> {
        let captures = self.regex.captures(url)?;
        Some((
            expand_template(&self.rule.name, &captures),
            expand_template(&self.rule.version, &captures),
        ))
    }
}

/// Replace `$N` placeholders with capture group N.
///
/// A group that did not participate in the match expands to nothing. When the
/// digits after `$` name a group that does not exist, the longest prefix that
/// does is used (`$10` with two groups is group 1 followed by `0`); with no
/// such prefix the placeholder is kept as written.
pub fn expand_template(template: &str, captures: &Captures<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();

        let group = (1..=digits).rev().find_map(|len| {
            let index: usize = after[..len].parse().ok()?;
            (index >= 1 && index < captures.len()).then_some((index, len))
        });

        match group {
            Some((index, len)) => {
                out.push_str(captures.get(index).map_or("", |m| m.as_str()));
                rest = &after[len..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolves download URLs to manifest entries for one platform
pub struct UrlMapper<'a> {
    index: &'a ManifestIndex,
    platform: &'a Platform,
}

impl<'a> UrlMapper<'a> {
    pub fn new(index: &'a ManifestIndex, platform: &'a Platform) -> Self {
        Self { index, platform }
    }

    /// Find the dependency entry `url` maps to.
    pub fn resolve(&self, url: &str) -> Result<&'a DependencyEntry, ResolveError> {
        let Some((name, version)) = self
            .index
            .url_mappings()
            .iter()
            .find_map(|mapping| mapping.apply(url))
        else {
            debug!("No mapping rule matches {}", url);
            return Err(ResolveError::NoMapping {
                url: url.to_string(),
            });
        };

        debug!("Mapped {} to {} {}", url, name, version);
        self.index
            .find_entry(&name, &version, self.platform)
            .ok_or_else(|| ResolveError::missing(&name, &version))
    }

    /// The manifest uri for `url`
    pub fn translated_uri(&self, url: &str) -> Result<&'a str, ResolveError> {
        self.resolve(url).map(|entry| entry.uri.as_str())
    }
}
