use std::{
    fs, io,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use kjob_core::{JobError, JobRunner, RunContext, RunError};
use kjob_kube::KubeClusterClient;
use kjob_model::JobSpec;
use kjob_prometheus::PrometheusMetrics;

use crate::{
    config::{CliConfig, load_job},
    report::write_report,
};

const EXIT_JOB_FAILED: u8 = 1;
const EXIT_CLUSTER: u8 = 3;
const EXIT_TIMEOUT: u8 = 124;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the job file (JSON)
    pub job: PathBuf,

    /// Give up after this many seconds; overrides `timeoutMs` from the job file
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write metrics in the Prometheus text format to this file when the run ends
    #[arg(long, value_name = "FILE")]
    pub metrics_out: Option<PathBuf>,
}

pub async fn handle_run(args: RunArgs, config: &CliConfig) -> Result<ExitCode> {
    let job = load_job(&args.job)?;

    let client = KubeClusterClient::try_default()
        .await
        .context("failed to connect to the cluster")?;
    let metrics = PrometheusMetrics::new().context("failed to register metrics")?;
    let runner = JobRunner::new(Arc::new(client))
        .with_config(config.runner.clone())?
        .with_metrics(Arc::new(metrics.clone()));

    let cancel = CancellationToken::new();
    let mut ctx = RunContext::new().with_cancel(cancel.clone());
    if let Some(timeout) = run_timeout(args.timeout, &job) {
        ctx = ctx.with_timeout(timeout);
    }
    tokio::spawn(cancel_on_interrupt(cancel));

    info!(job = %job.name, namespace = %job.namespace, "running job");
    let result = runner.run(&ctx, &job).await;

    let code = {
        let mut out = io::stdout().lock();
        match &result {
            Ok(output) => {
                write_report(&mut out, Some(&output.logs), Some(&output.states))?;
                ExitCode::SUCCESS
            }
            Err(err) => {
                write_report(&mut out, err.logs.as_ref(), err.states.as_ref())?;
                ExitCode::from(exit_code(err))
            }
        }
    };

    match &result {
        Ok(_) => info!(job = %job.name, "job succeeded"),
        Err(err) => {
            error!(job = %job.name, kind = err.kind(), "{err}");
            eprintln!("kjob: {err}");
        }
    }

    if let Some(path) = &args.metrics_out {
        let text = metrics.encode_text().context("failed to encode metrics")?;
        fs::write(path, text)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }
    Ok(code)
}

/// Run deadline: the flag wins over the job file.
fn run_timeout(flag_secs: Option<u64>, job: &JobSpec) -> Option<Duration> {
    flag_secs
        .map(Duration::from_secs)
        .or_else(|| job.timeout_ms.map(Duration::from_millis))
}

fn exit_code(err: &RunError) -> u8 {
    match err.error {
        JobError::JobFailed { .. } => EXIT_JOB_FAILED,
        JobError::Timeout => EXIT_TIMEOUT,
        JobError::InvalidSpec(_) => super::EXIT_USAGE,
        _ => EXIT_CLUSTER,
    }
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received; cancelling run and deleting job");
        cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kjob_core::ClusterError;

    fn job(timeout_ms: Option<u64>) -> JobSpec {
        let mut job = JobSpec::new("migrate", "tools");
        job.timeout_ms = timeout_ms;
        job
    }

    #[test]
    fn flag_timeout_wins() {
        assert_eq!(
            run_timeout(Some(5), &job(Some(60_000))),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            run_timeout(None, &job(Some(1_500))),
            Some(Duration::from_millis(1_500))
        );
        assert_eq!(run_timeout(None, &job(None)), None);
    }

    #[test]
    fn huge_flag_timeout_leaves_run_unbounded() {
        let timeout = run_timeout(Some(u64::MAX), &job(None)).unwrap();
        let ctx = RunContext::new().with_timeout(timeout);
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn exit_codes_by_error() {
        assert_eq!(exit_code(&JobError::JobFailed { failed: 1 }.into()), 1);
        assert_eq!(exit_code(&JobError::Timeout.into()), 124);
        assert_eq!(
            exit_code(&JobError::StatusFetch(ClusterError::Transport("reset".into())).into()),
            3
        );
        assert_eq!(
            exit_code(
                &JobError::PodNotFound {
                    selector: "kjob.run=x".into()
                }
                .into()
            ),
            3
        );
    }
}
