use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod dump;
mod entries;
mod info;
mod peaks;
mod validate;

pub use config::Config;

/// chromatrace - Sequencing chromatogram inspector
#[derive(Parser)]
#[command(name = "chromatrace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an ABIF or SCF container
    Info {
        /// Input container path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the directory entries of an ABIF container
    Entries {
        /// Input ABIF container path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Decode a container and print it as JSON
    Dump {
        /// Input container path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Use the edited base calls instead of the called ones
        #[arg(long, overrides_with = "called")]
        edited: bool,

        /// Use the called base calls even if the config file selects edited
        #[arg(long, overrides_with = "edited")]
        called: bool,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Parse an intrinsic-peak stream and list the total-signal peaks
    Peaks {
        /// Input intrinsic-peak file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also list the intrinsic peaks
        #[arg(long, overrides_with = "no_intrinsic")]
        intrinsic: bool,

        /// Do not list the intrinsic peaks, whatever the config file says
        #[arg(long, overrides_with = "intrinsic")]
        no_intrinsic: bool,
    },

    /// Check container integrity
    Validate {
        /// Input container path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Info { file } => info::run(file, &config),
        Commands::Entries { file } => entries::run(file),
        Commands::Dump {
            file,
            edited,
            called,
            pretty,
        } => dump::run(file, &config, switch(edited, called), pretty),
        Commands::Peaks {
            file,
            json,
            intrinsic,
            no_intrinsic,
        } => peaks::run(file, &config, json, switch(intrinsic, no_intrinsic)),
        Commands::Validate { file, json } => validate::run(file, json),
    }
}

/// Collapse an on/off flag pair; `None` leaves the choice to the config file
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
