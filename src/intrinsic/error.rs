/// Errors that can occur while reading an intrinsic-peak stream
///
/// Malformed numeric fields are not errors; they fall back to defaults and are
/// reported as [`FieldDiagnostic`](super::FieldDiagnostic)s.
#[derive(Debug, thiserror::Error)]
pub enum IntrinsicError {
    /// I/O error while reading the stream
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The first line does not start with `>`
    #[error("Missing '>' header line, found: {0:?}")]
    MissingHeader(String),
}
