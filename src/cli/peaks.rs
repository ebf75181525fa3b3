use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use chromatrace::intrinsic::{
    FieldDiagnostic, IntrinsicPeak, IntrinsicPeakModel, PeakShape, TotalSignalPeak,
};

use super::Config;

#[derive(Serialize)]
struct PeaksOutput<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    intrinsic: Option<&'a [IntrinsicPeak]>,
    total_signal: &'a [TotalSignalPeak],
    diagnostics: &'a [FieldDiagnostic],
}

/// Parse an intrinsic-peak file and report its total-signal peaks
pub fn run(file: PathBuf, config: &Config, json: bool, intrinsic: Option<bool>) -> Result<()> {
    let handle =
        File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?;
    let total_bytes = handle.metadata().map(|m| m.len()).unwrap_or(0);

    let mut last_decile = 0;
    let model = IntrinsicPeakModel::parse_with_progress(BufReader::new(handle), |consumed| {
        if total_bytes == 0 {
            return;
        }
        let decile = consumed * 10 / total_bytes;
        if decile > last_decile {
            last_decile = decile;
            debug!("Read {}% of {}", decile * 10, file.display());
        }
    })
    .with_context(|| format!("Failed to parse {}", file.display()))?;

    info!(
        "{} intrinsic peaks, {} total-signal peaks, {} fields defaulted",
        model.peaks().len(),
        model.total_signal_peaks().len(),
        model.diagnostics().len()
    );

    let show_intrinsic = config.show_intrinsic(intrinsic);

    if json {
        let output = PeaksOutput {
            title: model.title(),
            intrinsic: show_intrinsic.then(|| model.peaks()),
            total_signal: model.total_signal_peaks(),
            diagnostics: model.diagnostics(),
        };
        let text = serde_json::to_string_pretty(&output).context("Failed to serialize peaks")?;
        println!("{}", text);
        return Ok(());
    }

    println!("Intrinsic Peaks: {}", model.title());
    println!("================");
    if show_intrinsic {
        println!("{:<4} {:>8} {:>6} {:>5}", "BASE", "POSITION", "WIDTH", "TYPE");
        for peak in model.peaks() {
            println!(
                "{:<4} {:>8} {:>6} {:>5}",
                peak.base(),
                peak.position(),
                peak.width(),
                peak.peak_type()
            );
        }
        println!();
    }

    println!("Total-signal peaks:");
    println!(
        "{:<4} {:>8} {:>6} {:>8} {:>10} {:>12}",
        "BASE", "BEGIN", "WIDTH", "APEX", "HEIGHT", "AREA"
    );
    for peak in model.total_signal_peaks() {
        let (apex, height) = peak.apex().unwrap_or((peak.begin(), 0.0));
        println!(
            "{:<4} {:>8} {:>6} {:>8} {:>10.2} {:>12.2}",
            peak.base(),
            peak.begin(),
            peak.width(),
            apex,
            height,
            peak.area()
        );
    }

    if !model.diagnostics().is_empty() {
        println!();
        println!("Defaulted fields:");
        for diagnostic in model.diagnostics() {
            println!("  {}", diagnostic);
        }
    }

    Ok(())
}
