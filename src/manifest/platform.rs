//! Platform (stack) applicability

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::config::DEFAULT_PLATFORM;

/// Manifest keyword for "applies to every stack"
pub const ALL_PLATFORMS: &str = "all";

/// The stack a resolution request runs on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform(String);

impl Platform {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stacks a dependency entry is published for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Platforms {
    #[default]
    All,
    Only(Vec<String>),
}

impl Platforms {
    pub fn satisfies(&self, platform: &Platform) -> bool {
        match self {
            Platforms::All => true,
            Platforms::Only(ids) => ids.iter().any(|id| id == platform.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for Platforms {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Keyword(String),
            List(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Keyword(keyword) if keyword == ALL_PLATFORMS => Ok(Platforms::All),
            Raw::Keyword(other) => Err(D::Error::custom(format!(
                "expected '{ALL_PLATFORMS}' or a list of stacks, got '{other}'"
            ))),
            Raw::List(ids) => Ok(Platforms::Only(ids)),
        }
    }
}
