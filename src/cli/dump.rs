use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use chromatrace::container::Container;

use super::Config;

/// Decode a container and write it to stdout as JSON
pub fn run(file: PathBuf, config: &Config, edited: Option<bool>, pretty: bool) -> Result<()> {
    let container = Container::open_path(&file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let decode = config.decode_config(edited);
    info!(
        "Decoding {} ({}, {:?} base calls)",
        file.display(),
        container.format(),
        decode.base_calls
    );
    let chromatogram = container.decode(&decode);
    container.release();

    let json = if pretty {
        serde_json::to_string_pretty(&chromatogram)
    } else {
        serde_json::to_string(&chromatogram)
    }
    .context("Failed to serialize chromatogram")?;

    println!("{}", json);
    Ok(())
}
