//! End-of-life deprecation checks

use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::config::DEFAULT_DEPRECATION_WINDOW_DAYS;
use crate::error::ResolveError;
use crate::manifest::index::ManifestIndex;
use crate::manifest::types::{DependencyEntry, DeprecationEntry};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A deprecation entry with its version pattern compiled
#[derive(Debug, Clone)]
pub struct DeprecationRule {
    pub name: String,
    pub version_line: String,
    /// `None` when the manifest date is missing or not a calendar date
    pub date: Option<NaiveDate>,
    /// Never empty
    pub link: Option<String>,
    pattern: Regex,
}

impl DeprecationRule {
    pub fn compile(entry: DeprecationEntry) -> Result<Self, ResolveError> {
        let pattern = Regex::new(&entry.pattern).map_err(|source| ResolveError::InvalidPattern {
            pattern: entry.pattern.clone(),
            source,
        })?;

        let date = entry.date.as_deref().and_then(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .inspect_err(|e| {
                    warn!(
                        "Ignoring deprecation date '{}' for {}: {}",
                        raw, entry.name, e
                    )
                })
                .ok()
        });

        Ok(Self {
            version_line: entry.version_line.unwrap_or_else(|| entry.pattern.clone()),
            link: entry.link.filter(|link| !link.trim().is_empty()),
            name: entry.name,
            date,
            pattern,
        })
    }

    pub fn matches(&self, entry: &DependencyEntry) -> bool {
        self.name == entry.name && self.pattern.is_match(&entry.version)
    }

    /// Days from `today` until the deprecation date; negative once past.
    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.date.map(|date| (date - today).num_days())
    }

    /// User-facing warning line
    pub fn warning(&self) -> String {
        let date = self
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "an unknown date".to_string());
        let mut message = format!(
            "WARNING: {} {} will no longer be available in new buildpacks released after {}.",
            self.name, self.version_line, date
        );
        if let Some(link) = &self.link {
            message.push_str(" See: ");
            message.push_str(link);
        }
        message
    }
}

/// Looks up deprecation rules for resolved entries
pub struct DeprecationChecker<'a> {
    index: &'a ManifestIndex,
    window_days: i64,
}

impl<'a> DeprecationChecker<'a> {
    pub fn new(index: &'a ManifestIndex) -> Self {
        Self::with_window(index, DEFAULT_DEPRECATION_WINDOW_DAYS)
    }

    pub fn with_window(index: &'a ManifestIndex, window_days: i64) -> Self {
        Self { index, window_days }
    }

    /// First rule, in manifest order, covering `entry`
    pub fn find(&self, entry: &DependencyEntry) -> Option<&'a DeprecationRule> {
        self.index
            .deprecation_rules()
            .iter()
            .find(|rule| rule.matches(entry))
    }

    /// True when the rule's date is within the window, including dates already past.
    pub fn is_imminent(&self, rule: &DeprecationRule, today: NaiveDate) -> bool {
        rule.days_remaining(today)
            .is_some_and(|days| days <= self.window_days)
    }

    /// The rule for `entry` when its date is imminent
    pub fn imminent(&self, entry: &DependencyEntry, today: NaiveDate) -> Option<&'a DeprecationRule> {
        self.find(entry).filter(|rule| self.is_imminent(rule, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use rstest::rstest;

    use crate::manifest::platform::Platforms;
    use crate::manifest::types::Manifest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn entry(name: &str, version: &str) -> DependencyEntry {
        DependencyEntry {
            name: name.to_string(),
            version: version.to_string(),
            uri: format!("file://{name}.{version}.txt"),
            checksum: None,
            platforms: Platforms::All,
        }
    }

    fn index_with_date(date: &str, link: &str) -> ManifestIndex {
        let manifest: Manifest = serde_yaml::from_str(&format!(
            r#"
dependency_deprecation_dates:
  - match: 1.1.\d
    version_line: 1.1
    name: dependency
    date: 2016-01-18
    link: https://github.com/nodejs/LTS-11
  - match: 1.2.\d
    version_line: 1.2
    name: dependency
    date: {date}
    link: '{link}'
"#
        ))
        .unwrap();
        ManifestIndex::new(manifest).unwrap()
    }

    fn date_offset(days: i64) -> String {
        let date = if days >= 0 {
            today() + Days::new(days as u64)
        } else {
            today() - Days::new(days.unsigned_abs())
        };
        date.format(DATE_FORMAT).to_string()
    }

    #[rstest]
    #[case(-10, true)]
    #[case(0, true)]
    #[case(29, true)]
    #[case(30, true)]
    #[case(31, false)]
    fn is_imminent_within_thirty_days(#[case] offset: i64, #[case] expected: bool) {
        let index = index_with_date(&date_offset(offset), "https://example.com");
        let checker = DeprecationChecker::new(&index);
        let rule = checker.find(&entry("dependency", "1.2.3")).unwrap();

        assert_eq!(checker.is_imminent(rule, today()), expected);
    }

    #[test]
    fn find_matches_name_and_version_line() {
        let index = index_with_date("2030-01-01", "");
        let checker = DeprecationChecker::new(&index);

        let rule = checker.find(&entry("dependency", "1.1.1")).unwrap();
        assert_eq!(rule.version_line, "1.1");

        assert!(checker.find(&entry("dependency", "1.3.1")).is_none());
        assert!(checker.find(&entry("other", "1.1.1")).is_none());
    }

    #[test]
    fn warning_includes_link_when_present() {
        let index = index_with_date("2030-01-01", "https://github.com/nodejs/LTS-11");
        let checker = DeprecationChecker::new(&index);
        let rule = checker.find(&entry("dependency", "1.2.3")).unwrap();

        assert_eq!(
            rule.warning(),
            "WARNING: dependency 1.2 will no longer be available in new buildpacks \
             released after 2030-01-01. See: https://github.com/nodejs/LTS-11"
        );
    }

    #[test]
    fn warning_omits_empty_link() {
        let index = index_with_date("2030-01-01", "");
        let checker = DeprecationChecker::new(&index);
        let rule = checker.find(&entry("dependency", "1.2.3")).unwrap();

        assert_eq!(rule.link, None);
        assert!(!rule.warning().contains("See: "));
    }

    #[test]
    fn invalid_date_is_never_imminent() {
        let index = index_with_date("2016-02-30", "");
        let checker = DeprecationChecker::new(&index);
        let rule = checker.find(&entry("dependency", "1.2.3")).unwrap();

        assert_eq!(rule.date, None);
        assert!(!checker.is_imminent(rule, today()));

        // The other rule still works.
        let rule = checker.find(&entry("dependency", "1.1.1")).unwrap();
        assert!(checker.is_imminent(rule, today()));
    }

    #[test]
    fn custom_window_is_respected() {
        let index = index_with_date(&date_offset(45), "");
        let checker = DeprecationChecker::with_window(&index, 60);

        assert!(
            checker
                .imminent(&entry("dependency", "1.2.3"), today())
                .is_some()
        );
        assert!(
            DeprecationChecker::new(&index)
                .imminent(&entry("dependency", "1.2.3"), today())
                .is_none()
        );
    }
}
