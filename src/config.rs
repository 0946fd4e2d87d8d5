use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::platform::Platform;
use crate::version::dialect::{Dialect, DialectTable};

// =============================================================================
// Environment and defaults
// =============================================================================

/// Environment variable naming the stack the buildpack runs on
pub const PLATFORM_ENV_VAR: &str = "CF_STACK";

/// Stack assumed when nothing else names one
pub const DEFAULT_PLATFORM: &str = "cflinuxfs2";

/// Any value turns on debug logging
pub const DEBUG_ENV_VAR: &str = "BP_DEBUG";

/// Cache directory inside a buildpack checkout
pub const CACHE_DIR_NAME: &str = "dependencies";

/// Days before a deprecation date at which warnings start
pub const DEFAULT_DEPRECATION_WINDOW_DAYS: i64 = 30;

const APP_DIR_NAME: &str = "buildpack-deps";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolver configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Stack to resolve for; the environment wins over this
    pub platform: Option<String>,
    /// Overrides `<buildpack-dir>/dependencies`
    pub cache_dir: Option<PathBuf>,
    pub deprecation_window_days: i64,
    /// Version dialects by dependency name, on top of the built-ins
    pub dialects: IndexMap<String, Dialect>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            platform: None,
            cache_dir: None,
            deprecation_window_days: DEFAULT_DEPRECATION_WINDOW_DAYS,
            dialects: IndexMap::new(),
        }
    }
}

impl ResolverConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn dialect_table(&self) -> DialectTable {
        DialectTable::with_overrides(&self.dialects)
    }
}

/// Returns the path to the config file.
/// Uses $XDG_CONFIG_HOME/buildpack-deps/config.json if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/buildpack-deps/config.json,
/// or ./buildpack-deps/config.json if neither is available.
pub fn config_path() -> PathBuf {
    config_path_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

fn config_path_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Returns the platform to resolve for.
pub fn platform(flag: Option<&str>, config: &ResolverConfig) -> Platform {
    platform_with_env(std::env::var(PLATFORM_ENV_VAR).ok(), flag, config)
}

/// Precedence: `--stack`, then `CF_STACK`, then the config file, then
/// [`DEFAULT_PLATFORM`].
fn platform_with_env(
    env_value: Option<String>,
    flag: Option<&str>,
    config: &ResolverConfig,
) -> Platform {
    let present = |id: &String| !id.is_empty();

    flag.map(str::to_string)
        .filter(present)
        .or(env_value.filter(present))
        .or_else(|| config.platform.clone().filter(present))
        .map(Platform::new)
        .unwrap_or_default()
}

/// Returns the absolute cache directory for downloaded dependencies, if it exists.
/// The config `cacheDir` replaces `<buildpack_dir>/dependencies`.
pub fn cache_dir(buildpack_dir: &Path, config: &ResolverConfig) -> Option<PathBuf> {
    let dir = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => buildpack_dir.join(CACHE_DIR_NAME),
    };
    if !dir.is_dir() {
        tracing::debug!("No cache directory at {}", dir.display());
        return None;
    }
    std::path::absolute(&dir)
        .inspect_err(|e| tracing::warn!("Ignoring cache directory {}: {}", dir.display(), e))
        .ok()
}
