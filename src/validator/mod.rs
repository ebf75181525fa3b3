//! # Container Validation
//!
//! Structural integrity checks for ABIF and SCF chromatogram containers.
//! Decoding is lenient and silently truncates damaged regions; the validator
//! reports what was truncated so a user can tell a short read from a healthy
//! file.
//!
//! ## Validation Checklist
//!
//! 1. **Structure**: signature, declared length, header, directory or section
//!    bounds
//! 2. **Data**: analyzed traces present and of equal length, base calls with
//!    matching quality and peak-location arrays, peak locations inside the
//!    trace
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chromatrace::validator::validate_container_file;
//! use std::path::Path;
//!
//! match validate_container_file(Path::new("sample.ab1")) {
//!     Ok(report) => println!("{}", report),
//!     Err(e) => eprintln!("Validation failed: {}", e),
//! }
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bytes::Bytes;
use log::debug;

pub use report::{CheckKind, Severity, Subject, ValidationCheck, ValidationReport};

mod data;
mod report;
mod structure;

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The path is missing or not a regular file
    #[error("Structure error: {0}")]
    StructureError(String),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Validate a container file
///
/// Only failures to read the file are errors; everything wrong with its
/// contents ends up in the report.
pub fn validate_container_file(path: &Path) -> Result<ValidationReport, ValidationError> {
    if !path.exists() {
        return Err(ValidationError::StructureError(format!(
            "Path does not exist: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(ValidationError::StructureError(format!(
            "Not a file: {}",
            path.display()
        )));
    }

    let mut file = File::open(path)?;
    let declared = file.metadata()?.len();
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    Ok(validate_container_bytes(
        path.display().to_string(),
        buffer,
        Some(declared),
    ))
}

/// Validate an in-memory container
///
/// `declared_len` is the size the buffer is expected to have, when known.
pub fn validate_container_bytes(
    label: impl Into<String>,
    bytes: impl Into<Bytes>,
    declared_len: Option<u64>,
) -> ValidationReport {
    let mut report = ValidationReport::new(label);

    // 1. Structure
    let Some(container) = structure::check_structure(bytes.into(), declared_len, &mut report)
    else {
        return report;
    };

    // 2. Data
    data::check_data(&container, &mut report);

    debug!(
        "Validated {}: {} checks, outcome {:?}",
        report.source,
        report.checks.len(),
        report.outcome()
    );
    report
}
