use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use chromatrace::validator::{validate_container_file, Severity};

/// Check one container and print its report; failures exit with status 1
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    let report = validate_container_file(&file)
        .with_context(|| format!("Cannot validate {}", file.display()))?;
    info!(
        "{}: {} checks, outcome {:?}",
        file.display(),
        report.checks.len(),
        report.outcome()
    );

    if json {
        let text =
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        print!("{}", report.format_colored());
    }

    if report.outcome() == Severity::Failed {
        std::process::exit(1);
    }
    Ok(())
}
