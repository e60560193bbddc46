mod config;
mod error;
mod format;
mod level;
mod log;
mod rfc3339;
mod timezone;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use rfc3339::LoggerRfc3339;
pub use timezone::{LoggerTimeZone, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] when a global subscriber is already set.
/// With [`LoggerTimeZone::Local`], call [`init_local_offset`] in `main()` before starting the
/// async runtime.
///
/// # Examples
/// ```rust
/// use kjob_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).unwrap();
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::init_text(cfg),
        LoggerFormat::Json => log::init_json(cfg),
        LoggerFormat::Journald => log::init_journald(cfg),
    }
}
