//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::CacheConfig;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "scenecache";
const ENV_PREFIX: &str = "SCENECACHE";
const DEFAULT_SOAK_DURATION_SECS: u64 = 5;
const DEFAULT_SOAK_WORKERS: usize = 4;
const DEFAULT_SOAK_KEYS: usize = 64;

/// Command-line arguments for the scenecache binary.
#[derive(Debug, Parser)]
#[command(name = "scenecache", version, about = "Scene cache diagnostics")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SCENECACHE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CacheOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Drive the cache with concurrent synthetic collaborators and report stats.
    Soak(SoakArgs),
    /// Print the resolved cache configuration.
    #[command(name = "show-config")]
    ShowConfig,
}

#[derive(Debug, Args, Clone)]
pub struct SoakArgs {
    /// How long the workload runs.
    #[arg(long = "duration-secs", default_value_t = DEFAULT_SOAK_DURATION_SECS)]
    pub duration_secs: u64,

    /// Number of concurrent collaborator tasks.
    #[arg(long, default_value_t = DEFAULT_SOAK_WORKERS)]
    pub workers: usize,

    /// Distinct keys each collaborator cycles through.
    #[arg(long, default_value_t = DEFAULT_SOAK_KEYS)]
    pub keys: usize,
}

impl Default for SoakArgs {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_SOAK_DURATION_SECS,
            workers: DEFAULT_SOAK_WORKERS,
            keys: DEFAULT_SOAK_KEYS,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct CacheOverrides {
    /// Override the default entry TTL in milliseconds.
    #[arg(long = "cache-default-ttl-ms", value_name = "MS", global = true)]
    pub default_ttl_ms: Option<u64>,

    /// Override the mesh bounds TTL in milliseconds.
    #[arg(long = "cache-bounds-ttl-ms", value_name = "MS", global = true)]
    pub bounds_ttl_ms: Option<u64>,

    /// Override the material TTL in milliseconds.
    #[arg(long = "cache-material-ttl-ms", value_name = "MS", global = true)]
    pub material_ttl_ms: Option<u64>,

    /// Override the texture TTL in milliseconds.
    #[arg(long = "cache-texture-ttl-ms", value_name = "MS", global = true)]
    pub texture_ttl_ms: Option<u64>,

    /// Override the sweep period in milliseconds.
    #[arg(long = "cache-sweep-interval-ms", value_name = "MS", global = true)]
    pub sweep_interval_ms: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache: CacheConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    cache: RawCacheSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &CacheOverrides) {
        if let Some(ms) = overrides.default_ttl_ms {
            self.cache.default_ttl_ms = Some(ms);
        }
        if let Some(ms) = overrides.bounds_ttl_ms {
            self.cache.bounds_ttl_ms = Some(ms);
        }
        if let Some(ms) = overrides.material_ttl_ms {
            self.cache.material_ttl_ms = Some(ms);
        }
        if let Some(ms) = overrides.texture_ttl_ms {
            self.cache.texture_ttl_ms = Some(ms);
        }
        if let Some(ms) = overrides.sweep_interval_ms {
            self.cache.sweep_interval_ms = Some(ms);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { cache, logging } = raw;

        let cache = build_cache_settings(cache)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self { cache, logging })
    }
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheConfig, LoadError> {
    let defaults = CacheConfig::default();
    Ok(CacheConfig {
        default_ttl_ms: positive_ms(
            cache.default_ttl_ms,
            defaults.default_ttl_ms,
            "cache.default_ttl_ms",
        )?,
        bounds_ttl_ms: positive_ms(
            cache.bounds_ttl_ms,
            defaults.bounds_ttl_ms,
            "cache.bounds_ttl_ms",
        )?,
        material_ttl_ms: positive_ms(
            cache.material_ttl_ms,
            defaults.material_ttl_ms,
            "cache.material_ttl_ms",
        )?,
        texture_ttl_ms: positive_ms(
            cache.texture_ttl_ms,
            defaults.texture_ttl_ms,
            "cache.texture_ttl_ms",
        )?,
        sweep_interval_ms: positive_ms(
            cache.sweep_interval_ms,
            defaults.sweep_interval_ms,
            "cache.sweep_interval_ms",
        )?,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    default_ttl_ms: Option<u64>,
    bounds_ttl_ms: Option<u64>,
    material_ttl_ms: Option<u64>,
    texture_ttl_ms: Option<u64>,
    sweep_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn positive_ms(value: Option<u64>, default: u64, key: &'static str) -> Result<u64, LoadError> {
    match value {
        Some(0) => Err(LoadError::invalid(key, "must be greater than zero")),
        Some(ms) => Ok(ms),
        None => Ok(default),
    }
}
