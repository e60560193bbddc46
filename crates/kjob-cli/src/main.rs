//! kjob: run one-shot Kubernetes jobs from JSON files and print their logs.
mod commands;
mod config;
mod report;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::error;

use commands::{Commands, EXIT_USAGE, handle_command};
use config::CliConfig;
use kjob_observe::{LoggerFormat, LoggerLevel, LoggerTimeZone, init_local_offset, init_logger};

#[derive(Debug, Parser)]
#[command(name = "kjob", version)]
#[command(about = "Run one-shot Kubernetes jobs and collect their logs", long_about = None)]
struct Cli {
    /// Config file (JSON) with `logger` and `runner` sections
    #[arg(long, short, global = true, env = "KJOB_CONFIG")]
    config: Option<PathBuf>,

    /// Log format: text, json or journald
    #[arg(long, global = true)]
    log_format: Option<LoggerFormat>,

    /// Log filter, e.g. `info` or `kjob_core=debug,info`
    #[arg(long, global = true, env = "KJOB_LOG")]
    log_level: Option<LoggerLevel>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// File config with command-line overrides applied.
    fn config(&self) -> anyhow::Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;
        if let Some(format) = self.log_format {
            config.logger.format = format;
        }
        if let Some(level) = &self.log_level {
            config.logger.level = level.clone();
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("kjob: {e:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    // Must run before the runtime spawns its worker threads.
    if config.logger.tz == LoggerTimeZone::Local {
        init_local_offset();
    }
    if let Err(e) = init_logger(&config.logger) {
        eprintln!("kjob: {e}");
        return ExitCode::from(EXIT_USAGE);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("kjob: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(handle_command(cli.command, &config)) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("kjob: {e:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kjob",
            "run",
            "job.json",
            "--timeout",
            "90",
            "--log-format",
            "json",
            "--log-level",
            "kjob_core=debug,info",
        ])
        .unwrap();

        assert_eq!(cli.log_format, Some(LoggerFormat::Json));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.job, PathBuf::from("job.json"));
                assert_eq!(args.timeout, Some(90));
                assert!(args.metrics_out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let config = Cli::try_parse_from(["kjob", "--log-level", "warn", "schema"])
            .unwrap()
            .config()
            .unwrap();
        assert_eq!(config.logger.level.as_str(), "warn");
    }

    #[test]
    fn invalid_log_level_is_a_usage_error() {
        let err = Cli::try_parse_from(["kjob", "--log-level", "kjob=loud", "schema"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn validate_requires_a_path() {
        assert!(Cli::try_parse_from(["kjob", "validate"]).is_err());
    }
}
