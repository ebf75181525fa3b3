//! Integration tests for the ABIF and SCF container decoders
//!
//! This test suite validates:
//! - Directory lookup and tag/id matching
//! - Trace, base-call, quality and peak-location decoding
//! - SCF 2.x and 3.x decode to the same chromatogram
//! - Path-based opening and declared-length checks
//! - Property-based testing for malformed input

use std::io::Write;

use chromatrace::container::{
    BaseCallSet, Channel, Container, ContainerError, ContainerFormat, DecodeConfig,
};
use chromatrace::numeric::{delta_decode_2byte, delta_encode_2byte};
use chromatrace::validator::{validate_container_bytes, CheckKind, Severity, Subject};

// ============================================================================
// Helper Functions
// ============================================================================

/// (tag, number, element type, element size, element count, payload)
type AbifEntry = (&'static [u8; 4], u32, u16, u16, u32, Vec<u8>);

/// Build an ABIF container: 128-byte header, data blocks, then the directory
fn build_abif(entries: &[AbifEntry]) -> Vec<u8> {
    let mut data = vec![0u8; 128];
    let mut directory = Vec::new();

    for (tag, number, element_type, element_size, count, payload) in entries {
        directory.extend_from_slice(&tag[..]);
        directory.extend_from_slice(&number.to_be_bytes());
        directory.extend_from_slice(&element_type.to_be_bytes());
        directory.extend_from_slice(&element_size.to_be_bytes());
        directory.extend_from_slice(&count.to_be_bytes());
        directory.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        if payload.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..payload.len()].copy_from_slice(payload);
            directory.extend_from_slice(&inline);
        } else {
            directory.extend_from_slice(&(data.len() as u32).to_be_bytes());
            data.extend_from_slice(payload);
        }
        directory.extend_from_slice(&[0u8; 4]);
    }

    let directory_offset = data.len() as u32;
    data.extend_from_slice(&directory);

    data[0..4].copy_from_slice(b"ABIF");
    data[4..6].copy_from_slice(&101u16.to_be_bytes());
    data[6..10].copy_from_slice(b"tdir");
    data[18..22].copy_from_slice(&(entries.len() as u32).to_be_bytes());
    data[26..30].copy_from_slice(&directory_offset.to_be_bytes());
    data
}

fn shorts(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

fn analyzed_fixture() -> [Vec<u16>; 4] {
    [
        vec![0, 10, 120, 900, 120, 10, 0, 0, 0, 0],
        vec![0, 0, 0, 15, 300, 1400, 300, 15, 0, 0],
        vec![5, 5, 5, 5, 5, 5, 5, 5, 5, 5],
        vec![0, 0, 0, 0, 0, 0, 40, 800, 2000, 65535],
    ]
}

/// A complete ABIF sample: FWO_, analyzed and raw traces, both call sets
fn sample_abif() -> Vec<u8> {
    let mut entries: Vec<AbifEntry> = vec![
        (b"FWO_", 1, 2, 1, 4, b"GATC".to_vec()),
        (b"SMPL", 1, 18, 1, 9, [&[8u8][..], &b"sample-7"[..]].concat()),
    ];
    for (i, trace) in analyzed_fixture().iter().enumerate() {
        let mut raw = trace.clone();
        delta_encode_2byte(&mut raw);
        entries.push((b"DATA", 9 + i as u32, 4, 2, 10, shorts(trace)));
        entries.push((b"DATA", 1 + i as u32, 4, 2, 10, shorts(&raw)));
    }
    let calls: [AbifEntry; 6] = [
        (b"PBAS", 2, 2, 1, 5, b"GATCN".to_vec()),
        (b"PLOC", 2, 4, 2, 5, shorts(&[3, 5, 1, 8, 9])),
        (b"PCON", 2, 2, 1, 5, vec![40, 38, 12, 30, 2]),
        (b"PBAS", 1, 2, 1, 5, b"GATCA".to_vec()),
        (b"PLOC", 1, 4, 2, 5, shorts(&[3, 5, 1, 8, 9])),
        (b"PCON", 1, 2, 1, 5, vec![40, 38, 12, 30, 20]),
    ];
    entries.extend(calls);
    build_abif(&entries)
}

type BaseRecord = (u32, [u8; 4], u8);

fn scf_header(version: &[u8; 4], samples: usize, bases: usize) -> Vec<u8> {
    let mut data = vec![0u8; 128];
    data[0..4].copy_from_slice(b".scf");
    data[4..8].copy_from_slice(&(samples as u32).to_be_bytes());
    data[8..12].copy_from_slice(&128u32.to_be_bytes());
    data[12..16].copy_from_slice(&(bases as u32).to_be_bytes());
    let bases_offset = 128 + samples * 8;
    data[24..28].copy_from_slice(&(bases_offset as u32).to_be_bytes());
    data[36..40].copy_from_slice(version);
    data[40..44].copy_from_slice(&2u32.to_be_bytes());
    data
}

/// SCF 2.00: interleaved 2-byte samples, 12-byte base records
fn build_scf_v2(traces: &[Vec<u16>; 4], calls: &[BaseRecord]) -> Vec<u8> {
    let samples = traces[0].len();
    let mut data = scf_header(b"2.00", samples, calls.len());
    for i in 0..samples {
        for trace in traces {
            data.extend_from_slice(&trace[i].to_be_bytes());
        }
    }
    for (peak, probs, base) in calls {
        data.extend_from_slice(&peak.to_be_bytes());
        data.extend_from_slice(probs);
        data.push(*base);
        data.extend_from_slice(&[0, 0, 0]);
    }
    data
}

/// SCF 3.00: delta-encoded channel blocks, parallel base arrays
fn build_scf_v3(traces: &[Vec<u16>; 4], calls: &[BaseRecord]) -> Vec<u8> {
    let samples = traces[0].len();
    let mut data = scf_header(b"3.00", samples, calls.len());
    for trace in traces {
        let mut encoded = trace.clone();
        delta_encode_2byte(&mut encoded);
        data.extend_from_slice(&shorts(&encoded));
    }
    for (peak, _, _) in calls {
        data.extend_from_slice(&peak.to_be_bytes());
    }
    for channel in 0..4 {
        data.extend(calls.iter().map(|(_, probs, _)| probs[channel]));
    }
    data.extend(calls.iter().map(|(_, _, base)| *base));
    data.extend(std::iter::repeat(0u8).take(calls.len() * 3));
    data
}

fn scf_calls() -> Vec<BaseRecord> {
    vec![
        (3, [40, 1, 0, 2], b'A'),
        (5, [0, 35, 3, 0], b'C'),
        (8, [1, 0, 2, 28], b'T'),
        (9, [9, 17, 4, 6], b'N'),
    ]
}

// ============================================================================
// ABIF
// ============================================================================

#[test]
fn test_abif_find_entry_exact_offsets() {
    let bytes = build_abif(&[
        (b"DATA", 9, 4, 2, 3, shorts(&[1, 2, 3])),
        (b"PBAS", 2, 2, 1, 6, b"ACGTAC".to_vec()),
        (b"DATA", 10, 4, 2, 3, shorts(&[4, 5, 6])),
    ]);
    let container = Container::open(bytes).unwrap();

    assert_eq!(container.format(), ContainerFormat::TaggedBinary);
    assert_eq!(container.find_entry(b"DATA", 9), Some(128));
    assert_eq!(container.find_entry(b"PBAS", 2), Some(134));
    assert_eq!(container.find_entry(b"DATA", 10), Some(140));
    assert_eq!(container.find_entry(b"PBAS", 1), None);
    assert_eq!(container.find_entry(b"PLOC", 2), None);
}

#[test]
fn test_abif_decode_called_set() {
    let container = Container::open(sample_abif()).unwrap();
    let chromatogram = container.decode(&DecodeConfig::default());

    assert_eq!(chromatogram.format, ContainerFormat::TaggedBinary);
    assert_eq!(chromatogram.base_order, "GATC");
    assert_eq!(chromatogram.traces.len(), 4);

    let expected = analyzed_fixture();
    for (trace, analyzed) in chromatogram.traces.iter().zip(expected.iter()) {
        assert_eq!(&trace.analyzed, analyzed);
        assert_eq!(trace.raw.len(), analyzed.len());
    }
    assert_eq!(chromatogram.trace(Channel::Dye1).unwrap().base, Some('G'));
    assert_eq!(chromatogram.trace(Channel::Dye4).unwrap().base, Some('C'));

    let calls = &chromatogram.base_calls;
    assert_eq!(calls.set, BaseCallSet::Called);
    assert_eq!(calls.bases, "GATCN");
    assert_eq!(calls.qualities, vec![40, 38, 12, 30, 2]);
    assert_eq!(calls.peak_locations, vec![3, 5, 1, 8, 9]);
    assert!(calls.is_consistent());
}

#[test]
fn test_abif_edited_set_selected_by_config() {
    let container = Container::open(sample_abif()).unwrap();
    let config = DecodeConfig::default()
        .with_base_calls(BaseCallSet::Edited)
        .with_raw_traces(false);
    let chromatogram = container.decode(&config);

    assert_eq!(chromatogram.base_calls.bases, "GATCA");
    assert_eq!(chromatogram.base_calls.qualities[4], 20);
    assert!(chromatogram.traces.iter().all(|t| t.raw.is_empty()));
    assert_eq!(container.edited_bases(), b"GATCA".to_vec());
    assert_eq!(container.called_bases(), b"GATCN".to_vec());
}

#[test]
fn test_abif_raw_trace_delta_decodes_to_analyzed() {
    let container = Container::open(sample_abif()).unwrap();
    for channel in Channel::PRIMARY {
        let mut raw = container.raw_trace(channel);
        delta_decode_2byte(&mut raw);
        assert_eq!(raw, container.analyzed_trace(channel), "{}", channel);
    }
}

#[test]
fn test_abif_sample_name() {
    let container = Container::open(sample_abif()).unwrap();
    let abif = container.as_abif().unwrap();
    assert_eq!(abif.sample_name().as_deref(), Some("sample-7"));
    assert!(container.as_scf().is_none());
}

#[test]
fn test_abif_fifth_channel() {
    let bytes = build_abif(&[
        (b"DATA", 9, 4, 2, 3, shorts(&[1, 2, 3])),
        (b"DATA", 205, 4, 2, 3, shorts(&[7, 8, 9])),
    ]);
    let container = Container::open(bytes).unwrap();
    assert!(container.has_fifth_channel());
    assert_eq!(container.analyzed_trace(Channel::Dye5), vec![7, 8, 9]);

    let four = container.decode(&DecodeConfig::default());
    assert_eq!(four.traces.len(), 4);
    let five = container.decode(&DecodeConfig::default().with_fifth_channel(true));
    assert_eq!(five.traces.len(), 5);
    assert_eq!(five.trace(Channel::Dye5).unwrap().base, None);
}

#[test]
fn test_abif_missing_tags_are_empty() {
    let bytes = build_abif(&[(b"DATA", 9, 4, 2, 3, shorts(&[1, 2, 3]))]);
    let container = Container::open(bytes).unwrap();

    assert!(container.analyzed_trace(Channel::Dye2).is_empty());
    assert!(container.raw_trace(Channel::Dye1).is_empty());
    assert!(container.called_bases().is_empty());
    assert!(container.called_peak_locations().is_empty());
    assert!(container.called_qualities().is_empty());
    assert_eq!(&container.base_order(), b"ACGT");
}

#[test]
fn test_abif_data_past_end_is_truncated() {
    let mut bytes = build_abif(&[(b"DATA", 9, 4, 2, 4, shorts(&[1, 2, 3, 4]))]);
    // Point the entry's data at the last 3 bytes of the buffer
    let directory = bytes.len() - 28;
    let offset = (bytes.len() - 3) as u32;
    bytes[directory + 20..directory + 24].copy_from_slice(&offset.to_be_bytes());

    let container = Container::open(bytes).unwrap();
    assert_eq!(container.analyzed_trace(Channel::Dye1).len(), 1);
}

#[test]
fn test_abif_directory_past_end() {
    let mut bytes = build_abif(&[(b"DATA", 9, 4, 2, 3, shorts(&[1, 2, 3]))]);
    bytes[18..22].copy_from_slice(&1000u32.to_be_bytes());

    let container = Container::open(bytes).unwrap();
    assert_eq!(container.analyzed_trace(Channel::Dye1), vec![1, 2, 3]);
    assert_eq!(container.as_abif().unwrap().entries().count(), 1);
}

// ============================================================================
// SCF
// ============================================================================

#[test]
fn test_scf_versions_decode_identically() {
    let traces = analyzed_fixture();
    let calls = scf_calls();
    let v2 = Container::open(build_scf_v2(&traces, &calls)).unwrap();
    let v3 = Container::open(build_scf_v3(&traces, &calls)).unwrap();

    assert_eq!(v2.format(), ContainerFormat::FixedBinary);
    for channel in Channel::PRIMARY {
        assert_eq!(v2.analyzed_trace(channel), traces[channel.index()]);
        assert_eq!(v3.analyzed_trace(channel), traces[channel.index()]);
    }

    let a = v2.base_calls(BaseCallSet::Called);
    let b = v3.base_calls(BaseCallSet::Called);
    assert_eq!(a, b);
    assert_eq!(a.bases, "ACTN");
    assert_eq!(a.peak_locations, vec![3, 5, 8, 9]);
    // Called-base probability, or the maximum for N
    assert_eq!(a.qualities, vec![40, 35, 28, 17]);
}

#[test]
fn test_scf_v3_raw_trace_delta_decodes_to_analyzed() {
    let container = Container::open(build_scf_v3(&analyzed_fixture(), &[])).unwrap();
    for channel in Channel::PRIMARY {
        let mut raw = container.raw_trace(channel);
        assert_ne!(raw, container.analyzed_trace(channel));
        delta_decode_2byte(&mut raw);
        assert_eq!(raw, container.analyzed_trace(channel));
    }
}

#[test]
fn test_scf_v3_missing_spare_keeps_base_arrays() {
    let traces = analyzed_fixture();
    let calls = scf_calls();
    let mut bytes = build_scf_v3(&traces, &calls);
    bytes.truncate(bytes.len() - calls.len() * 3);

    let full = Container::open(build_scf_v3(&traces, &calls)).unwrap();
    let cut = Container::open(bytes).unwrap();
    assert_eq!(
        cut.base_calls(BaseCallSet::Called),
        full.base_calls(BaseCallSet::Called)
    );
    assert_eq!(cut.called_bases(), b"ACTN".to_vec());
}

#[test]
fn test_scf_edited_falls_back_to_called() {
    let container = Container::open(build_scf_v2(&analyzed_fixture(), &scf_calls())).unwrap();
    assert_eq!(container.edited_bases(), container.called_bases());
    assert!(!container.has_fifth_channel());
    assert!(container.analyzed_trace(Channel::Dye5).is_empty());
    assert_eq!(&container.base_order(), b"ACGT");

    let chromatogram = container.decode(&DecodeConfig::default().with_fifth_channel(true));
    assert_eq!(chromatogram.traces.len(), 4);
}

#[test]
fn test_scf_truncated_samples() {
    let mut bytes = build_scf_v2(&analyzed_fixture(), &[]);
    bytes.truncate(128 + 8 * 6 + 3);
    let container = Container::open(bytes).unwrap();
    assert_eq!(container.analyzed_trace(Channel::Dye1).len(), 6);
}

#[test]
fn test_scf_invalid_version() {
    let mut bytes = build_scf_v2(&analyzed_fixture(), &[]);
    bytes[36..40].copy_from_slice(b"v3!!");
    let err = Container::open(bytes).unwrap_err();
    assert!(err.is_format_error());
    assert!(matches!(err, ContainerError::InvalidVersion(ref v) if v == "v3!!"));
}

// ============================================================================
// Opening and validation
// ============================================================================

#[test]
fn test_open_path_roundtrip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&sample_abif()).unwrap();
    file.flush().unwrap();

    let container = Container::open_path(file.path()).unwrap();
    assert_eq!(container.called_bases(), b"GATCN".to_vec());
    let bytes = container.into_bytes();
    assert_eq!(bytes.len(), sample_abif().len());
}

#[test]
fn test_open_path_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Container::open_path(dir.path().join("absent.ab1")).unwrap_err();
    assert!(err.is_io_error());
}

#[test]
fn test_validate_healthy_containers() {
    for (label, bytes) in [
        ("abif", sample_abif()),
        ("scf2", build_scf_v2(&analyzed_fixture(), &scf_calls())),
        ("scf3", build_scf_v3(&analyzed_fixture(), &scf_calls())),
    ] {
        let len = bytes.len() as u64;
        let report = validate_container_bytes(label, bytes, Some(len));
        assert!(!report.has_failures(), "{}", report);
        assert!(!report.has_warnings(), "{}", report);
    }
}

#[test]
fn test_validate_flags_bad_peak_locations() {
    let bytes = build_abif(&[
        (b"DATA", 9, 4, 2, 3, shorts(&[1, 2, 3])),
        (b"DATA", 10, 4, 2, 3, shorts(&[1, 2, 3])),
        (b"DATA", 11, 4, 2, 3, shorts(&[1, 2, 3])),
        (b"DATA", 12, 4, 2, 2, shorts(&[1, 2])),
        (b"PBAS", 2, 2, 1, 5, b"ACGTA".to_vec()),
        (b"PLOC", 2, 4, 2, 5, shorts(&[0, 1, 2, 3, 4000])),
    ]);
    let report = validate_container_bytes("bad", bytes, None);

    assert!(report.has_failures());
    let peaks = report.check(CheckKind::PeakLocations).unwrap();
    assert_eq!(peaks.severity, Severity::Failed);
    assert_eq!(
        peaks.subjects,
        vec![Subject::Base {
            index: 4,
            location: 4000
        }]
    );
    assert_eq!(
        report.severity_of(CheckKind::TraceLengths),
        Some(Severity::Warning)
    );
    assert_eq!(
        report.severity_of(CheckKind::Qualities),
        Some(Severity::Warning)
    );
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Arbitrary bytes behind either signature never panic any accessor
        #[test]
        fn test_malformed_containers_never_panic(
            abif in any::<bool>(),
            body in prop::collection::vec(any::<u8>(), 0..512),
        ) {
            let mut bytes = if abif { b"ABIF".to_vec() } else { b".scf".to_vec() };
            bytes.extend(body);

            if let Ok(container) = Container::open(bytes.clone()) {
                let config = DecodeConfig::default().with_fifth_channel(true);
                let chromatogram = container.decode(&config);
                prop_assert!(chromatogram.traces.len() >= 4);
                let _ = container.base_calls(BaseCallSet::Edited);
                let _ = container.base_order();
            }
            let _ = validate_container_bytes("fuzz", bytes, None);
        }

        /// Encoding then decoding restores any 2-byte trace
        #[test]
        fn test_delta_roundtrip(values in prop::collection::vec(any::<u16>(), 0..256)) {
            let mut samples = values.clone();
            delta_encode_2byte(&mut samples);
            delta_decode_2byte(&mut samples);
            prop_assert_eq!(samples, values);
        }

        /// Directory lookups on a well-formed file find every entry written
        #[test]
        fn test_find_entry_locates_each_channel(
            lengths in prop::collection::vec(3usize..40, 4),
        ) {
            let traces: Vec<Vec<u16>> = lengths
                .iter()
                .map(|&n| (0..n as u16).collect())
                .collect();
            let entries: Vec<AbifEntry> = traces
                .iter()
                .enumerate()
                .map(|(i, t)| (b"DATA", 9 + i as u32, 4, 2, t.len() as u32, shorts(t)))
                .collect();
            let container = Container::open(build_abif(&entries)).unwrap();

            let mut expected_offset = 128u32;
            for (channel, trace) in Channel::PRIMARY.iter().zip(traces.iter()) {
                prop_assert_eq!(
                    container.find_entry(b"DATA", channel.analyzed_data_id()),
                    Some(expected_offset)
                );
                prop_assert_eq!(&container.analyzed_trace(*channel), trace);
                expected_offset += trace.len() as u32 * 2;
            }
        }
    }
}
