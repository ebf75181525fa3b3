use anyhow::{Context, Result};
use std::path::PathBuf;

use chromatrace::container::Container;

/// List the directory of an ABIF container
pub fn run(file: PathBuf) -> Result<()> {
    let container = Container::open_path(&file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let Some(abif) = container.as_abif() else {
        anyhow::bail!(
            "{} is an {} container; only ABIF files have a directory",
            file.display(),
            container.format()
        );
    };

    println!(
        "{:<4} {:>6} {:>5} {:>5} {:>8} {:>10} {:>10}",
        "TAG", "NUMBER", "TYPE", "SIZE", "COUNT", "BYTES", "OFFSET"
    );
    let mut listed = 0;
    for entry in abif.entries() {
        let offset = if entry.is_inline() {
            "inline".to_string()
        } else {
            entry.data_offset.to_string()
        };
        println!(
            "{:<4} {:>6} {:>5} {:>5} {:>8} {:>10} {:>10}",
            entry.tag_name(),
            entry.number,
            entry.element_type,
            entry.element_size,
            entry.element_count,
            entry.data_size,
            offset
        );
        listed += 1;
    }

    if listed < abif.entry_count() as usize {
        log::warn!(
            "Listed {} of {} declared entries; the rest lie past the end of the file",
            listed,
            abif.entry_count()
        );
    }

    Ok(())
}
