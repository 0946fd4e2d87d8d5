use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use buildpack_deps::config::{self, ResolverConfig};
use buildpack_deps::logging;
use buildpack_deps::manifest::{DependencyEntry, Manifest, ManifestIndex, Platform};
use buildpack_deps::resolve::UriTranslator;
use buildpack_deps::version::{DialectTable, VersionSelector};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;

const MISCONFIGURED_DEFAULTS: &str = "The buildpack manifest is misconfigured for 'default_versions'. \
Contact your Cloud Foundry operator/admin. For more information, see \
https://docs.cloudfoundry.org/buildpacks/custom.html#specifying-default-versions";

#[derive(Parser)]
#[command(name = "buildpack-deps")]
#[command(version, about = "Resolve buildpack dependencies against manifest.yml")]
struct Cli {
    /// Manifest to resolve against
    #[arg(long, global = true, default_value = "manifest.yml")]
    manifest: PathBuf,

    /// Buildpack checkout; its `dependencies/` directory is the download cache
    #[arg(long, global = true, default_value = ".")]
    buildpack_dir: PathBuf,

    /// Stack to resolve for (defaults to $CF_STACK)
    #[arg(long, global = true)]
    stack: Option<String>,

    /// Config file (defaults to $XDG_CONFIG_HOME/buildpack-deps/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the manifest uri a download URL maps to
    TranslateUrl { url: String },
    /// Print a URL with its credentials redacted
    FilterUrl { url: String },
    /// Print the greatest manifest version matching a request
    HighestVersion { name: String, version: String },
    /// Print the default version of a dependency
    DefaultVersion { name: String },
    /// Print the uri and checksum of the entry matching a request
    Resolve { name: String, version: String },
    /// Warn when a URL's dependency has a newer patch or is being retired
    WarnNewerPatch {
        url: String,
        /// Date to check deprecations against (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Everything a manifest-backed subcommand needs
struct Session {
    index: ManifestIndex,
    platform: Platform,
    dialects: DialectTable,
    translator: UriTranslator,
    deprecation_window_days: i64,
}

impl Session {
    fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(config::config_path);
        let config = ResolverConfig::load(&config_path)?;

        let manifest = Manifest::load(&cli.manifest)
            .with_context(|| format!("Failed to load {}", cli.manifest.display()))?;
        let index = ManifestIndex::new(manifest)?;

        let platform = config::platform(cli.stack.as_deref(), &config);
        let cache_dir = config::cache_dir(&cli.buildpack_dir, &config);
        debug!("Resolving for {} with cache {:?}", platform, cache_dir);

        Ok(Self {
            index,
            platform,
            dialects: config.dialect_table(),
            translator: UriTranslator::new(cache_dir),
            deprecation_window_days: config.deprecation_window_days,
        })
    }

    fn selector(&self) -> VersionSelector<'_> {
        self.index.selector(&self.platform, &self.dialects)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::FilterUrl { url } => {
            println!("{}", UriTranslator::default().redact_credentials(url));
            Ok(ExitCode::SUCCESS)
        }
        Command::TranslateUrl { url } => {
            let session = Session::load(cli)?;
            match session.index.url_mapper(&session.platform).translated_uri(url) {
                Ok(uri) => {
                    println!("{}", session.translator.translate(uri));
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{e}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::HighestVersion { name, version } => {
            let session = Session::load(cli)?;
            match session.selector().resolve_by_name(name, version) {
                Ok(entry) => {
                    println!("{}", entry.version);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) if e.is_not_found() => {
                    debug!("{}", e);
                    println!();
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{e}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::DefaultVersion { name } => {
            let session = Session::load(cli)?;
            match session.selector().default_version(name) {
                Ok(entry) => {
                    println!("{}", entry.version);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    debug!("{}", e);
                    eprintln!("{MISCONFIGURED_DEFAULTS}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Resolve { name, version } => {
            let session = Session::load(cli)?;
            let selector = session.selector();
            match selector.resolve_by_name(name, version) {
                Ok(entry) => {
                    print_entry(&session, entry);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{e}");
                    let known = selector.versions_of(name);
                    if e.is_not_found() && !known.is_empty() {
                        eprintln!("Available versions of {name}: {}", known.join(", "));
                    }
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::WarnNewerPatch { url, today } => {
            let session = Session::load(cli)?;
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            warn_newer_patch(&session, url, today);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_entry(session: &Session, entry: &DependencyEntry) {
    println!("{}", session.translator.translate(&entry.uri));
    if let Some(checksum) = &entry.checksum {
        println!("{checksum}");
    }
}

fn warn_newer_patch(session: &Session, url: &str, today: NaiveDate) {
    let entry = match session.index.url_mapper(&session.platform).resolve(url) {
        Ok(entry) => entry,
        Err(e) => {
            debug!("No patch check for {}: {}", url, e);
            return;
        }
    };

    match session.selector().newer_patch(&entry.name, &entry.version) {
        Ok(Some(newest)) => println!(
            "**WARNING** A newer version of {name} is available in this buildpack. \
             Please adjust your app to use version {newest} instead of version {current} \
             as soon as possible. Old versions of {name} are only provided to assist in \
             migrating to newer versions.",
            name = entry.name,
            current = entry.version,
        ),
        Ok(None) => {}
        Err(e) => debug!("Skipping patch check for {}: {}", entry.name, e),
    }

    let checker = session
        .index
        .deprecation_checker(session.deprecation_window_days);
    if let Some(rule) = checker.imminent(entry, today) {
        eprintln!("{}", rule.warning());
    }
}
