//! Manifest data as it appears in `manifest.yml`

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use crate::manifest::platform::Platforms;

/// The parsed manifest tree. Missing sections are empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "nullable_list")]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(
        default,
        rename = "url_to_dependency_map",
        deserialize_with = "nullable_list"
    )]
    pub url_mappings: Vec<MappingRule>,
    #[serde(
        default,
        rename = "dependency_deprecation_dates",
        deserialize_with = "nullable_list"
    )]
    pub deprecations: Vec<DeprecationEntry>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub default_versions: Vec<DefaultVersion>,
}

/// One downloadable artifact
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    /// Version in the family's dialect (e.g. "1.9.3", "v80", "ruby-2.3.1-jruby-9.1.5.0")
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
    #[serde(default)]
    pub uri: String,
    /// Opaque checksum, carried through untouched
    #[serde(
        default,
        alias = "md5",
        alias = "sha256",
        deserialize_with = "optional_scalar_string"
    )]
    pub checksum: Option<String>,
    /// Stacks this entry applies to; an absent key means all of them
    #[serde(default, rename = "cf_stacks", alias = "platforms")]
    pub platforms: Platforms,
}

/// `url_to_dependency_map` entry. `name` and `version` may reference
/// capture groups of `pattern` as `$1`, `$2`, ...
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MappingRule {
    #[serde(rename = "match", deserialize_with = "scalar_string")]
    pub pattern: String,
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
}

/// `dependency_deprecation_dates` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeprecationEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(rename = "match", deserialize_with = "scalar_string")]
    pub pattern: String,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub version_line: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// `default_versions` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DefaultVersion {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
}

/// Accepts any scalar as text. The scalar is requested as a string so YAML
/// keeps its source spelling (`version: 1.10` stays "1.10", not 1.1).
/// Typed values that still arrive are rendered with `Display`.
struct ScalarText;

impl Visitor<'_> for ScalarText {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(ScalarText)
}

fn optional_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptionalScalarText;

    impl<'de> Visitor<'de> for OptionalScalarText {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an optional string, number or boolean")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            scalar_string(deserializer).map(Some)
        }
    }

    deserializer.deserialize_option(OptionalScalarText)
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
