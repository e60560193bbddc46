use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use kjob_core::RunnerConfig;
use kjob_model::JobSpec;
use kjob_observe::LoggerConfig;

/// Contents of the `--config` file. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliConfig {
    pub logger: LoggerConfig,
    pub runner: RunnerConfig,
}

impl CliConfig {
    /// Read the config file, or the defaults when no path was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .runner
            .validate()
            .with_context(|| format!("invalid runner section in {}", path.display()))?;
        Ok(config)
    }
}

/// Read and validate a job file.
pub fn load_job(path: &Path) -> Result<JobSpec> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read job file {}", path.display()))?;
    let job = JobSpec::from_json(&raw)
        .with_context(|| format!("failed to parse job file {}", path.display()))?;
    job.validate()
        .with_context(|| format!("invalid job in {}", path.display()))?;
    Ok(job)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use kjob_core::PodSelection;
    use kjob_observe::LoggerFormat;

    use super::*;

    fn file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config.runner.poll_interval_ms, 1_000);
        assert_eq!(config.logger.format, LoggerFormat::Text);
    }

    #[test]
    fn sections_are_merged_with_defaults() {
        let f = file(
            r#"{
                "logger": { "format": "json" },
                "runner": { "pollIntervalMs": 250, "podSelection": "first-listed" }
            }"#,
        );
        let config = CliConfig::load(Some(f.path())).unwrap();

        assert_eq!(config.logger.format, LoggerFormat::Json);
        assert_eq!(config.runner.poll_interval_ms, 250);
        assert_eq!(config.runner.pod_selection, PodSelection::FirstListed);
        assert_eq!(config.runner.delete_timeout_ms, 30_000);
    }

    #[test]
    fn invalid_runner_section_is_rejected() {
        let f = file(r#"{ "runner": { "pollIntervalMs": 0 } }"#);
        let err = CliConfig::load(Some(f.path())).unwrap_err();
        assert!(err.to_string().starts_with("invalid runner section"));
    }

    #[test]
    fn job_file_is_validated() {
        let ok = file(
            r#"{
                "name": "migrate",
                "namespace": "tools",
                "selector": { "kjob.run": "migrate-1" },
                "containers": [{ "name": "worker", "image": "alpine:3.20" }]
            }"#,
        );
        let job = load_job(ok.path()).unwrap();
        assert_eq!(job.container_names().collect::<Vec<_>>(), vec!["worker"]);

        let bad = file(r#"{ "name": "migrate", "selector": {}, "containers": [] }"#);
        let err = load_job(bad.path()).unwrap_err();
        assert!(err.to_string().starts_with("invalid job in"));
    }

    #[test]
    fn unreadable_job_file_names_the_path() {
        let err = load_job(Path::new("/nonexistent/job.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/job.json"));
    }
}
