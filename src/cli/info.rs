use anyhow::{Context, Result};
use std::path::PathBuf;

use chromatrace::container::Container;

use super::Config;

/// Display information about a chromatogram container
pub fn run(file: PathBuf, config: &Config) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let container = Container::open_path(&file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    println!("Chromatogram Information");
    println!("========================");
    println!("File: {}", file.display());
    println!("Size: {} bytes", container.len());
    println!();

    match &container {
        Container::Abif(abif) => {
            println!("ABIF Header:");
            println!("  Version: {}", abif.version());
            println!("  Directory entries: {}", abif.entry_count());
            println!("  Directory offset: {}", abif.directory_offset());
            if let Some(name) = abif.sample_name() {
                println!("  Sample name: {}", name);
            }
            println!("  Fifth channel: {}", container.has_fifth_channel());
        }
        Container::Scf(scf) => {
            let header = scf.header();
            println!("SCF Header:");
            println!("  Version: {}", header.version_text);
            println!("  Layout: {:?}", header.layout());
            println!("  Samples: {} ({:?})", header.samples, header.sample_size);
            println!("  Bases: {}", header.bases);
            println!(
                "  Clip: {} left, {} right",
                header.bases_left_clip, header.bases_right_clip
            );
            let comments = scf.comments();
            if !comments.is_empty() {
                println!("  Comments:");
                for line in comments.lines() {
                    println!("    {}", line);
                }
            }
        }
    }
    println!();

    let chromatogram = container.decode(&config.decode_config(None).with_raw_traces(false));
    print!("{}", chromatogram);

    let calls = &chromatogram.base_calls;
    if !calls.is_empty() {
        let preview: String = calls.bases.chars().take(60).collect();
        let ellipsis = if calls.len() > 60 { "..." } else { "" };
        println!("  {}{}", preview, ellipsis);
    }

    container.release();
    Ok(())
}
