use cmb_domain::config::ScannerConfig;
use cmb_logger::LevelFilter;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "CMB";

#[cmb_derive::cmb_error]
pub(crate) enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid log level '{level}'")]
    InvalidLevel { level: String },
}

/// Everything the demo reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) scanner: ScannerConfig,
    pub(crate) log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct LogConfig {
    pub(crate) level: String,
    /// Verbosity of the bridge crates only; native calls are logged at `debug`.
    pub(crate) bridge_level: Option<String>,
    /// Enables the rolling file sink in this directory.
    pub(crate) directory: Option<PathBuf>,
    pub(crate) json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), bridge_level: None, directory: None, json: false }
    }
}

impl LogConfig {
    pub(crate) fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        parse_level(&self.level)
    }

    pub(crate) fn bridge_level_filter(&self) -> Result<Option<LevelFilter>, ConfigError> {
        self.bridge_level.as_deref().map(parse_level).transpose()
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    level.trim().parse().map_err(|_| ConfigError::InvalidLevel { level: level.to_owned() })
}

/// Loads [`AppConfig`] from an optional file, overlaid with `CMB__*` environment variables.
///
/// Nested keys use a double underscore: `CMB__SCANNER__DEVICE=camera` sets `scanner.device`.
/// Without a file the defaults apply before the environment.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<AppConfig>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmb_domain::DeviceType;

    #[test]
    fn defaults_without_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.scanner.device, DeviceType::Mx1000);
        assert_eq!(cfg.log.level_filter().ok(), Some(LevelFilter::INFO));
        assert_eq!(cfg.log.bridge_level_filter().ok(), Some(None));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let log = LogConfig { level: "chatty".to_owned(), ..LogConfig::default() };
        let err = log.level_filter().unwrap_err();
        assert_eq!(err.to_string(), "Invalid log level 'chatty'");
    }

    #[test]
    fn missing_file_is_reported_with_context() {
        let err = load_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(err.to_string().starts_with("Config error (Failed to build config)"), "{err}");
    }
}
