//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for applications embedding the reader bridge.
//!
//! * Console output (compact, ANSI, on stderr) and an optional rolling log file with non-blocking I/O.
//! * [`LoggerBuilder::bridge_level`] raises or lowers the verbosity of the bridge crates only,
//!   which is where every native call and event dispatch is logged.
//! * `RUST_LOG` always wins over the programmatic defaults.
//!
//! ## Example
//!
//! ```rust
//! use cmb_logger::{LevelFilter, Logger};
//!
//! let _guard = Logger::builder()
//!     .name("reader-app")
//!     .level(LevelFilter::INFO)
//!     .bridge_level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";
/// Crates whose targets [`LoggerBuilder::bridge_level`] applies to.
const BRIDGE_TARGETS: [&str; 2] = ["cmb_scanner", "cmb_demo"];

/// Line format of the file sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileFormat {
    #[default]
    Plain,
    Json,
}

/// Where and how log files are written.
#[derive(Debug, Clone)]
pub struct FileSink {
    pub dir: PathBuf,
    pub rotation: Rotation,
    pub max_files: usize,
    pub format: FileFormat,
}

impl FileSink {
    /// A daily-rotated plain text sink in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            format: FileFormat::Plain,
        }
    }

    #[must_use]
    pub const fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    #[must_use]
    pub const fn json(mut self) -> Self {
        self.format = FileFormat::Json;
        self
    }

    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

#[derive(Debug)]
struct Settings {
    console: bool,
    level: LevelFilter,
    bridge_level: Option<LevelFilter>,
    directives: Option<String>,
    file: Option<FileSink>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { console: true, level: LevelFilter::INFO, bridge_level: None, directives: None, file: None }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for Unnamed {}
impl Sealed for Named {}

/// Configures the global subscriber; a name is required before [`LoggerBuilder::init`].
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = Unnamed> {
    settings: Settings,
    name: N,
}

impl LoggerBuilder<Unnamed> {
    /// Names the application; used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()) }
    }
}

impl<N: Sealed> LoggerBuilder<N> {
    #[must_use = "The builder must be initialized to install the subscriber."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Verbosity for the bridge crates, independent of the global level.
    #[must_use = "The builder must be initialized to install the subscriber."]
    pub const fn bridge_level(mut self, level: LevelFilter) -> Self {
        self.settings.bridge_level = Some(level);
        self
    }

    /// Extra filter directives such as `cmb_scanner::invoker=trace`.
    #[must_use = "The builder must be initialized to install the subscriber."]
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.settings.directives = Some(directives.into());
        self
    }

    #[must_use = "The builder must be initialized to install the subscriber."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    #[must_use = "The builder must be initialized to install the subscriber."]
    pub fn file(mut self, sink: FileSink) -> Self {
        self.settings.file = Some(sink);
        self
    }
}

impl LoggerBuilder<Named> {
    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's worker guard; keep it alive until shutdown.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`, malformed
    ///   directives or when no sink is enabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] when the file sink cannot be created.
    /// * [`LoggerError::Subscriber`] when a global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: Named(name) } = self;
        validate(&settings, &name)?;

        let filter = env_filter(&settings)?;
        let mut layers = Vec::new();

        if settings.console {
            layers.push(
                layer().compact().with_writer(std::io::stderr).with_ansi(true).with_target(true).boxed(),
            );
        }

        let guard = match settings.file {
            Some(sink) => {
                fs::create_dir_all(&sink.dir)
                    .context(format!("Creating log directory {}", sink.dir.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(sink.rotation)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(sink.max_files)
                    .build(&sink.dir)?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(match sink.format {
                    FileFormat::Plain => file_layer.boxed(),
                    FileFormat::Json => file_layer.json().boxed(),
                });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Neither console nor file output is enabled".into(),
                context: Some(name.into()),
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }
}

/// Handle to the installed subscriber. Dropping it flushes the file writer.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be initialized to install the subscriber."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: Unnamed }
    }

    /// Whether a file sink (and its worker guard) is active.
    #[must_use]
    pub const fn has_file_sink(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}

fn validate(settings: &Settings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.file.as_ref().is_some_and(|sink| sink.max_files == 0) {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn directives(settings: &Settings) -> String {
    let mut parts = Vec::new();
    if let Some(level) = settings.bridge_level {
        parts.extend(BRIDGE_TARGETS.iter().map(|target| format!("{target}={level}")));
    }
    if let Some(extra) = settings.directives.as_deref().filter(|d| !d.trim().is_empty()) {
        parts.push(extra.to_owned());
    }
    parts.join(",")
}

fn env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    let directives = directives(settings);

    if directives.is_empty() {
        return Ok(builder.from_env_lossy());
    }

    let filter = builder.parse(&directives).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Invalid filter directives '{directives}': {e}").into(),
        context: None,
    })?;

    // RUST_LOG directives are appended last so they take precedence.
    Ok(std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .into_iter()
        .flat_map(|raw| raw.split(',').map(str::to_owned).collect::<Vec<_>>())
        .filter_map(|d| d.parse().ok())
        .fold(filter, EnvFilter::add_directive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn bridge_level_expands_to_every_bridge_target() {
        let settings = Settings { bridge_level: Some(LevelFilter::TRACE), ..Settings::default() };
        assert_eq!(directives(&settings), "cmb_scanner=trace,cmb_demo=trace");
    }

    #[test]
    fn extra_directives_follow_bridge_level() {
        let settings = Settings {
            bridge_level: Some(LevelFilter::DEBUG),
            directives: Some("tokio=warn".to_owned()),
            ..Settings::default()
        };
        assert_eq!(directives(&settings), "cmb_scanner=debug,cmb_demo=debug,tokio=warn");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = validate(&Settings::default(), "  ").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn zero_max_files_is_rejected() {
        let settings =
            Settings { file: Some(FileSink::new("logs").max_files(0)), ..Settings::default() };
        assert!(validate(&settings, "reader").is_err());
    }

    #[test]
    #[serial]
    fn malformed_directives_fail_before_install() {
        let err = Logger::builder()
            .name("reader")
            .directives("cmb_scanner=notalevel")
            .init()
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn no_sink_is_rejected() {
        let settings = Settings { console: false, ..Settings::default() };
        assert!(validate(&settings, "reader").is_ok());
        let err = Logger::builder().name("reader").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
