use std::fs::File;
use std::io::Read;
use std::path::Path;

use bytes::Bytes;

use super::{AbifContainer, Container, ContainerError, ContainerFormat, ScfContainer};

/// Largest buffer reserved up front from a declared length
const MAX_PREALLOCATION: u64 = 64 << 20;

impl Container {
    /// Classify and open an in-memory container
    ///
    /// The first four bytes select the format; anything other than `ABIF` or
    /// `.scf` is a format error.
    pub fn open(bytes: impl Into<Bytes>) -> Result<Self, ContainerError> {
        let bytes = bytes.into();
        match ContainerFormat::detect(&bytes) {
            Some(ContainerFormat::TaggedBinary) => AbifContainer::parse(bytes).map(Container::Abif),
            Some(ContainerFormat::FixedBinary) => ScfContainer::parse(bytes).map(Container::Scf),
            None => Err(ContainerError::UnknownFormat(
                bytes.iter().take(4).copied().collect(),
            )),
        }
    }

    /// Open a buffer whose expected size is known from an upstream read
    ///
    /// A mismatch between `declared_len` and the buffer length is an I/O error,
    /// checked before the signature.
    pub fn open_with_declared_len(
        bytes: impl Into<Bytes>,
        declared_len: u64,
    ) -> Result<Self, ContainerError> {
        let bytes = bytes.into();
        if bytes.len() as u64 != declared_len {
            return Err(ContainerError::LengthMismatch {
                declared: declared_len,
                actual: bytes.len() as u64,
            });
        }
        Self::open(bytes)
    }

    /// Read a container from any reader
    ///
    /// When `declared_len` is given the bytes read must match it exactly. At
    /// most one byte past the declared length is read.
    pub fn from_reader<R: Read>(
        mut reader: R,
        declared_len: Option<u64>,
    ) -> Result<Self, ContainerError> {
        match declared_len {
            Some(len) => {
                let reserve = usize::try_from(len.min(MAX_PREALLOCATION)).unwrap_or(0);
                let mut buffer = Vec::with_capacity(reserve);
                reader
                    .take(len.saturating_add(1))
                    .read_to_end(&mut buffer)?;
                Self::open_with_declared_len(buffer, len)
            }
            None => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer)?;
                Self::open(buffer)
            }
        }
    }

    /// Open a container file, checking the bytes read against the file size
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let declared = file.metadata()?.len();
        log::debug!("Reading {} ({} bytes)", path.display(), declared);
        Self::from_reader(file, Some(declared))
    }
}
