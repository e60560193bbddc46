use std::process::ExitCode;

use anyhow::Result;
use kjob_model::JobSpec;

pub fn handle_schema() -> Result<ExitCode> {
    let schema = schemars::schema_for!(JobSpec);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(ExitCode::SUCCESS)
}
