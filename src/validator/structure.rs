use bytes::Bytes;

use crate::container::{
    AbifContainer, Container, ContainerFormat, ScfContainer, DIRECTORY_ENTRY_SIZE,
};

use super::{CheckKind, Subject, ValidationCheck, ValidationReport};

/// SCF bytes per base in either layout
const SCF_BASE_RECORD: u64 = 12;

/// Step 1: signature, declared length and header
///
/// Returns the opened container when the header could be read.
pub(crate) fn check_structure(
    bytes: Bytes,
    declared_len: Option<u64>,
    report: &mut ValidationReport,
) -> Option<Container> {
    match ContainerFormat::detect(&bytes) {
        Some(format) => {
            report.format = Some(format);
            report.push(ValidationCheck::passed(CheckKind::Signature));
        }
        None => {
            let found: Vec<u8> = bytes.iter().take(4).copied().collect();
            report.push(ValidationCheck::failed(
                CheckKind::Signature,
                format!("{:?} is neither ABIF nor .scf", String::from_utf8_lossy(&found)),
            ));
            return None;
        }
    }

    if let Some(declared) = declared_len {
        let read = bytes.len() as u64;
        report.push(if declared == read {
            ValidationCheck::passed(CheckKind::DeclaredLength)
        } else {
            ValidationCheck::failed(
                CheckKind::DeclaredLength,
                format!("expected {} bytes, read {}", declared, read),
            )
        });
    }

    match Container::open(bytes) {
        Ok(container) => {
            report.push(ValidationCheck::passed(CheckKind::Header));
            match &container {
                Container::Abif(abif) => check_directory(abif, report),
                Container::Scf(scf) => check_scf_regions(scf, report),
            }
            Some(container)
        }
        Err(e) => {
            report.push(ValidationCheck::failed(CheckKind::Header, e.to_string()));
            None
        }
    }
}

fn check_directory(abif: &AbifContainer, report: &mut ValidationReport) {
    let len = abif.as_bytes().len() as u64;
    let declared = abif.entry_count() as u64;
    let directory = Subject::Bytes {
        offset: abif.directory_offset() as u64,
        len: declared.saturating_mul(DIRECTORY_ENTRY_SIZE as u64),
    };

    if (abif.directory_offset() as u64).saturating_add(declared * DIRECTORY_ENTRY_SIZE as u64)
        <= len
    {
        report.push(ValidationCheck::passed(CheckKind::Directory));
    } else {
        let present = abif.entries().count();
        report.push(
            ValidationCheck::failed(
                CheckKind::Directory,
                format!("{} of {} entries fit in {} bytes", present, declared, len),
            )
            .about([directory]),
        );
    }

    let overflowing: Vec<Subject> = abif
        .entries()
        .filter(|entry| {
            !entry.is_inline()
                && (entry.data_offset as u64).saturating_add(entry.data_size as u64) > len
        })
        .map(|entry| Subject::entry(&entry))
        .collect();

    if overflowing.is_empty() {
        report.push(ValidationCheck::passed(CheckKind::EntryData));
    } else {
        report.push(
            ValidationCheck::warning(
                CheckKind::EntryData,
                format!("{} entries point past byte {}", overflowing.len(), len),
            )
            .about(overflowing),
        );
    }
}

fn check_scf_regions(scf: &ScfContainer, report: &mut ValidationReport) {
    let header = scf.header();
    let len = scf.as_bytes().len() as u64;
    let sample_bytes = header.sample_size.bytes() as u64;

    let regions = [
        (
            CheckKind::SampleRegion,
            header.samples_offset,
            header.samples as u64 * sample_bytes * 4,
        ),
        (
            CheckKind::BaseRegion,
            header.bases_offset,
            header.bases as u64 * SCF_BASE_RECORD,
        ),
        (
            CheckKind::CommentRegion,
            header.comments_offset,
            header.comments_size as u64,
        ),
    ];

    for (kind, offset, size) in regions {
        let offset = offset as u64;
        if offset.saturating_add(size) <= len {
            report.push(ValidationCheck::passed(kind));
        } else {
            report.push(
                ValidationCheck::warning(kind, format!("runs past the {}-byte file", len))
                    .about([Subject::Bytes { offset, len: size }]),
            );
        }
    }
}
