//! Read-only lookup surface over a parsed manifest

use indexmap::IndexMap;
use tracing::debug;

use crate::error::ResolveError;
use crate::manifest::platform::Platform;
use crate::manifest::types::{DefaultVersion, DependencyEntry, Manifest};
use crate::resolve::deprecation::{DeprecationChecker, DeprecationRule};
use crate::resolve::url_mapper::{UrlMapper, UrlMapping};
use crate::version::dialect::DialectTable;
use crate::version::selector::VersionSelector;

/// Immutable view of a manifest with its patterns compiled.
///
/// Built once per invocation and shared freely; nothing here mutates after
/// construction, so it is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct ManifestIndex {
    dependencies: Vec<DependencyEntry>,
    url_mappings: Vec<UrlMapping>,
    deprecation_rules: Vec<DeprecationRule>,
    default_versions: Vec<DefaultVersion>,
    /// Dependency positions by name, in manifest order
    by_name: IndexMap<String, Vec<usize>>,
}

impl ManifestIndex {
    pub fn new(manifest: Manifest) -> Result<Self, ResolveError> {
        let Manifest {
            dependencies,
            url_mappings,
            deprecations,
            default_versions,
        } = manifest;

        let url_mappings = url_mappings
            .into_iter()
            .map(UrlMapping::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let deprecation_rules = deprecations
            .into_iter()
            .map(DeprecationRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_name: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (position, entry) in dependencies.iter().enumerate() {
            by_name.entry(entry.name.clone()).or_default().push(position);
        }

        debug!(
            "Indexed {} dependencies ({} names), {} mapping rules, {} deprecation rules",
            dependencies.len(),
            by_name.len(),
            url_mappings.len(),
            deprecation_rules.len()
        );

        Ok(Self {
            dependencies,
            url_mappings,
            deprecation_rules,
            default_versions,
            by_name,
        })
    }

    pub fn dependencies(&self) -> &[DependencyEntry] {
        &self.dependencies
    }

    pub fn url_mappings(&self) -> &[UrlMapping] {
        &self.url_mappings
    }

    pub fn deprecation_rules(&self) -> &[DeprecationRule] {
        &self.deprecation_rules
    }

    pub fn default_versions(&self) -> &[DefaultVersion] {
        &self.default_versions
    }

    /// Every entry called `name`, in manifest order, on any platform
    pub fn entries_named<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a DependencyEntry> + use<'a> {
        self.by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&position| &self.dependencies[position])
    }

    /// Entries called `name` that apply to `platform`
    pub fn eligible_entries<'a>(
        &'a self,
        name: &str,
        platform: &'a Platform,
    ) -> impl Iterator<Item = &'a DependencyEntry> + use<'a> {
        self.entries_named(name)
            .filter(move |entry| entry.platforms.satisfies(platform))
    }

    /// First entry with exactly this name and version string on `platform`
    pub fn find_entry(
        &self,
        name: &str,
        version: &str,
        platform: &Platform,
    ) -> Option<&DependencyEntry> {
        self.entries_named(name)
            .find(|entry| entry.version == version && entry.platforms.satisfies(platform))
    }

    /// Distinct dependency names, in first-seen order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn url_mapper<'a>(&'a self, platform: &'a Platform) -> UrlMapper<'a> {
        UrlMapper::new(self, platform)
    }

    pub fn selector<'a>(
        &'a self,
        platform: &'a Platform,
        dialects: &'a DialectTable,
    ) -> VersionSelector<'a> {
        VersionSelector::new(self, platform, dialects)
    }

    pub fn deprecation_checker(&self, window_days: i64) -> DeprecationChecker<'_> {
        DeprecationChecker::with_window(self, window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::types::MappingRule;

    fn manifest() -> Manifest {
        serde_yaml::from_str(
            r#"
dependencies:
  - name: go
    version: 1.5.1
    uri: go-1.5.1-fs2
    cf_stacks: [cflinuxfs2]
  - name: ruby
    version: 2.3.1
    uri: ruby-2.3.1
  - name: go
    version: 1.5.1
    uri: go-1.5.1-fs3
    cf_stacks: [cflinuxfs3]
"#,
        )
        .unwrap()
    }

    #[test]
    fn entries_named_preserves_manifest_order() {
        let index = ManifestIndex::new(manifest()).unwrap();
        let uris: Vec<&str> = index.entries_named("go").map(|e| e.uri.as_str()).collect();

        assert_eq!(uris, ["go-1.5.1-fs2", "go-1.5.1-fs3"]);
        assert_eq!(index.entries_named("python").count(), 0);
        assert_eq!(index.names().collect::<Vec<_>>(), ["go", "ruby"]);
    }

    #[test]
    fn find_entry_respects_platform() {
        let index = ManifestIndex::new(manifest()).unwrap();
        let fs3 = Platform::new("cflinuxfs3");

        let entry = index.find_entry("go", "1.5.1", &fs3).unwrap();
        assert_eq!(entry.uri, "go-1.5.1-fs3");

        let entry = index.find_entry("go", "1.5.1", &Platform::default()).unwrap();
        assert_eq!(entry.uri, "go-1.5.1-fs2");

        assert!(index.find_entry("go", "1.5.1", &Platform::new("windows")).is_none());
        assert!(index.find_entry("go", "1.5", &fs3).is_none());
    }

    #[test]
    fn new_rejects_invalid_mapping_pattern() {
        let mut manifest = manifest();
        manifest.url_mappings.push(MappingRule {
            pattern: "[".to_string(),
            name: "go".to_string(),
            version: "$1".to_string(),
        });

        let err = ManifestIndex::new(manifest).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidPattern { .. }));
    }

    #[test]
    fn index_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ManifestIndex>();

        let index = ManifestIndex::new(manifest()).unwrap();
        let platform = Platform::default();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| index.find_entry("go", "1.5.1", &platform).is_some()))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap());
            }
        });
    }
}
