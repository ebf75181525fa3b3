//! # chromatrace - Sequencing Chromatogram Decoding
//!
//! `chromatrace` reads capillary-sequencer chromatogram containers and the
//! intrinsic-peak streams that accompany them.
//!
//! ## Key Features
//!
//! - **Two container formats**: ABIF (tagged directory, `.ab1`) and SCF
//!   (fixed layout, versions 2 and 3), detected from the file signature.
//!
//! - **Trace and base-call access**: analyzed and raw samples per dye channel,
//!   called and edited base sequences with parallel quality values and peak
//!   locations.
//!
//! - **Lenient decoding**: absent tags and damaged regions yield empty or
//!   truncated results instead of errors, so partially corrupt files still
//!   open.
//!
//! - **Intrinsic-peak model**: rebuilds mirrored per-base peaks from a text
//!   stream and derives the combined peaks of the summed per-channel signal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chromatrace::container::{BaseCallSet, Channel, Container, DecodeConfig};
//!
//! let container = Container::open_path("sample.ab1")?;
//! let chromatogram = container.decode(&DecodeConfig::default());
//! println!("{}", chromatogram);
//!
//! let edited = container.base_calls(BaseCallSet::Edited);
//! println!("{} edited bases", edited.len());
//!
//! let g = container.analyzed_trace(Channel::Dye3);
//! println!("{} samples in channel 3", g.len());
//! container.release();
//! # Ok::<(), chromatrace::container::ContainerError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`container`]: format detection and the ABIF and SCF decoders
//! - [`intrinsic`]: intrinsic-peak parsing, cumulative signal and peak scanning
//! - [`numeric`]: big-endian composition and delta decoding shared by the
//!   decoders
//! - [`validator`]: structural integrity reports for containers

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod container;
pub mod intrinsic;
pub mod numeric;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::container::{
        BaseCall, BaseCallSet, BaseCalls, Channel, Chromatogram, Container, ContainerError,
        ContainerFormat, DecodeConfig, Trace,
    };
    pub use crate::intrinsic::{
        FieldDiagnostic, IntrinsicError, IntrinsicPeak, IntrinsicPeakModel, PeakShape,
        TotalSignalPeak,
    };
    pub use crate::validator::{validate_container_file, ValidationReport};
}
