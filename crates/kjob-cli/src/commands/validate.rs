use std::{path::Path, process::ExitCode};

use anyhow::Result;

use crate::config::load_job;

pub fn handle_validate(path: &Path) -> Result<ExitCode> {
    let job = load_job(path)?;
    println!(
        "{}: ok (job {}{} in namespace {}, containers: {}, selector: {})",
        path.display(),
        job.name,
        if job.generate_name { "*" } else { "" },
        job.namespace,
        job.container_names().collect::<Vec<_>>().join(", "),
        job.selector.to_selector(),
    );
    Ok(ExitCode::SUCCESS)
}
