use std::path::{Path, PathBuf};

use buildpack_deps::manifest::{Manifest, ManifestIndex, Platform};
use buildpack_deps::resolve::UriTranslator;
use buildpack_deps::version::DialectTable;
use chrono::NaiveDate;
use rstest::rstest;

fn fixture() -> ManifestIndex {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/manifest.yml");
    ManifestIndex::new(Manifest::load(&path).unwrap()).unwrap()
}

#[rstest]
#[case("cflinuxfs2", "https://example.com/ruby-2.2.5.tgz", Some("2.2.5"))]
#[case("cflinuxfs3", "https://example.com/ruby-2.2.5.tgz", None)]
#[case("cflinuxfs3", "https://example.com/ruby-2.3.1.tgz", Some("2.3.1"))]
#[case("cflinuxfs2", "https://example.com/node-v6.1.0-linux-x64.tgz", Some("6.1.0"))]
#[case("cflinuxfs2", "https://example.com/bundler-1.13.6.tgz", None)]
#[case("cflinuxfs3", "https://example.com/bundler-1.13.6.tgz", Some("1.13.6"))]
#[case("cflinuxfs2", "https://example.com/python-2.7.12.tgz", None)]
fn url_mapping_follows_platform(
    #[case] platform: &str,
    #[case] url: &str,
    #[case] expected: Option<&str>,
) {
    let index = fixture();
    let platform = Platform::new(platform);
    let result = index.url_mapper(&platform).resolve(url);

    match expected {
        Some(version) => assert_eq!(result.unwrap().version, version),
        None => assert!(result.unwrap_err().is_not_found()),
    }
}

#[test]
fn selector_answers_from_fixture() {
    let index = fixture();
    let platform = Platform::default();
    let dialects = DialectTable::default();
    let selector = index.selector(&platform, &dialects);

    assert_eq!(selector.resolve_by_name("ruby", "2.2").unwrap().version, "2.2.6");
    assert_eq!(selector.resolve_by_name("node", "4").unwrap().version, "4.6.0");
    assert_eq!(selector.resolve_by_name("node", ">=5").unwrap().version, "6.1.0");
    assert_eq!(selector.default_version("ruby").unwrap().version, "2.3.1");
    assert!(selector.default_version("node").unwrap_err().is_invalid_input());
    assert_eq!(
        selector.newer_patch("ruby", "2.2.5").unwrap().as_deref(),
        Some("2.2.6")
    );
    assert_eq!(
        selector.newer_patch("node", "4.5.0").unwrap().as_deref(),
        Some("4.6.0")
    );
}

#[test]
fn deprecations_from_fixture() {
    let index = fixture();
    let platform = Platform::default();
    let checker = index.deprecation_checker(30);
    let entry = index
        .url_mapper(&platform)
        .resolve("https://example.com/ruby-2.2.5.tgz")
        .unwrap();

    let before = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    let close = NaiveDate::from_ymd_opt(2016, 3, 15).unwrap();
    assert!(checker.imminent(entry, before).is_none());

    let rule = checker.imminent(entry, close).unwrap();
    assert_eq!(
        rule.warning(),
        "WARNING: ruby 2.2 will no longer be available in new buildpacks released after \
         2016-03-31. See: https://www.ruby-lang.org/en/news/2016/03/30/ruby-2-2-5-released/"
    );

    let node = index
        .url_mapper(&platform)
        .resolve("https://example.com/node-4.5.0.tgz")
        .unwrap();
    assert!(checker.imminent(node, close).is_none());
    let rule = checker
        .imminent(node, NaiveDate::from_ymd_opt(2018, 3, 20).unwrap())
        .unwrap();
    assert!(rule.warning().ends_with("released after 2018-04-01."));
}

#[test]
fn translated_uri_is_redacted_and_cached() {
    let index = fixture();
    let platform = Platform::new("cflinuxfs3");
    let translator = UriTranslator::new(Some(PathBuf::from("/buildpack/dependencies")));

    let uri = index
        .url_mapper(&platform)
        .translated_uri("https://example.com/ruby-2.3.1.tgz")
        .unwrap();

    assert_eq!(
        translator.translate(uri),
        "file:///buildpack/dependencies/\
         https___-redacted-_-redacted-@buildpacks.example.com_ruby-2.3.1.tgz"
    );
}

#[test]
fn index_can_be_shared_between_threads() {
    let index = fixture();
    let platform = Platform::default();
    let dialects = DialectTable::default();

    std::thread::scope(|scope| {
        let handles: Vec<_> = ["2.2", "2.3", "2"]
            .into_iter()
            .map(|request| {
                let index = &index;
                let platform = &platform;
                let dialects = &dialects;
                scope.spawn(move || {
                    index
                        .selector(platform, dialects)
                        .resolve_by_name("ruby", request)
                        .map(|entry| entry.version.clone())
                })
            })
            .collect();

        let versions: Vec<String> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        assert_eq!(versions, ["2.2.6", "2.3.1", "2.3.1"]);
    });
}
