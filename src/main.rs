//! # chromatrace
//!
//! A command-line tool for inspecting sequencing chromatograms.
//!
//! ## Supported Inputs
//!
//! - **ABIF** (`.ab1`) and **SCF** containers
//! - **Intrinsic-peak** text streams
//!
//! ## Usage
//!
//! ```bash
//! # Summarize a container
//! chromatrace info sample.ab1
//!
//! # Decode traces and edited base calls as JSON
//! chromatrace dump sample.ab1 --edited --pretty
//!
//! # Total-signal peaks of an intrinsic-peak file
//! chromatrace peaks sample.peaks --json
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
