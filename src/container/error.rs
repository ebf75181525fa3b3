use super::ContainerFormat;

/// Errors that can occur while opening a chromatogram container
///
/// Only construction can fail. Once a container is open, missing or
/// out-of-range data is reported as an empty result rather than an error.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// I/O error while reading the source
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The declared byte count does not match the bytes actually read
    #[error("Length mismatch: declared {declared} bytes, read {actual}")]
    LengthMismatch {
        /// Byte count reported by the source (file metadata or caller)
        declared: u64,
        /// Bytes actually available in the buffer
        actual: u64,
    },

    /// Neither the ABIF nor the SCF signature was found
    #[error("Unrecognized container signature: {0:02X?}")]
    UnknownFormat(Vec<u8>),

    /// The buffer ends before the fixed header does
    #[error("Truncated {format} header: need {required} bytes, have {actual}")]
    TruncatedHeader {
        /// Format identified from the signature
        format: ContainerFormat,
        /// Minimum header size for the format
        required: usize,
        /// Bytes available
        actual: usize,
    },

    /// The SCF version field is not a decimal number
    #[error("Invalid SCF version field: {0:?}")]
    InvalidVersion(String),
}

impl ContainerError {
    /// Whether this error means the bytes are not a readable container
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ContainerError::UnknownFormat(_)
                | ContainerError::TruncatedHeader { .. }
                | ContainerError::InvalidVersion(_)
        )
    }

    /// Whether this error came from reading the source rather than its content
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            ContainerError::IoError(_) | ContainerError::LengthMismatch { .. }
        )
    }
}
