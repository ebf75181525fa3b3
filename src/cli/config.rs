//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in a
//! config file:
//!
//! ```toml
//! # chromatrace.toml
//! [decode]
//! edited = true
//! fifth_channel = false
//!
//! [peaks]
//! show_intrinsic = false
//! ```
//!
//! Command-line flags take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use chromatrace::container::{BaseCallSet, DecodeConfig};

/// Root configuration structure for chromatrace.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Container decoding settings.
    #[serde(default)]
    pub decode: DecodeSection,

    /// Intrinsic-peak settings.
    #[serde(default)]
    pub peaks: PeaksSection,
}

/// Settings for the info and dump commands.
#[derive(Debug, Default, Deserialize)]
pub struct DecodeSection {
    /// Read the edited base calls instead of the called ones.
    pub edited: Option<bool>,

    /// Decode the fifth dye channel when the container has one.
    pub fifth_channel: Option<bool>,
}

/// Settings for the peaks command.
#[derive(Debug, Default, Deserialize)]
pub struct PeaksSection {
    /// List the intrinsic peaks along with the total-signal peaks.
    pub show_intrinsic: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Decoder settings; `edited` from the command line overrides the file
    pub fn decode_config(&self, edited: Option<bool>) -> DecodeConfig {
        let set = if edited.or(self.decode.edited).unwrap_or(false) {
            BaseCallSet::Edited
        } else {
            BaseCallSet::Called
        };
        DecodeConfig::default()
            .with_base_calls(set)
            .with_fifth_channel(self.decode.fifth_channel.unwrap_or(false))
    }

    /// Whether to list intrinsic peaks; `flag` from the command line overrides
    /// the file
    pub fn show_intrinsic(&self, flag: Option<bool>) -> bool {
        flag.or(self.peaks.show_intrinsic).unwrap_or(false)
    }
}
