use crate::container::{BaseCallSet, Channel, Container};

use super::{CheckKind, Subject, ValidationCheck, ValidationReport};

fn samples(subject: &Subject) -> usize {
    match subject {
        Subject::Channel { samples, .. } => *samples,
        _ => 0,
    }
}

/// Step 2: traces and base calls agree with each other
pub(crate) fn check_data(container: &Container, report: &mut ValidationReport) {
    let channels: Vec<Subject> = Channel::PRIMARY
        .iter()
        .map(|&channel| Subject::Channel {
            channel,
            samples: container.analyzed_trace(channel).len(),
        })
        .collect();
    let empty: Vec<Subject> = channels
        .iter()
        .filter(|c| samples(c) == 0)
        .cloned()
        .collect();
    report.push(if empty.is_empty() {
        ValidationCheck::passed(CheckKind::TracesPresent)
    } else if empty.len() == channels.len() {
        ValidationCheck::failed(CheckKind::TracesPresent, "no channel holds analyzed samples")
    } else {
        ValidationCheck::warning(CheckKind::TracesPresent, "some channels are empty").about(empty)
    });

    let trace_len = channels.iter().map(samples).max().unwrap_or(0);
    report.push(
        if channels.iter().all(|c| samples(c) == 0 || samples(c) == trace_len) {
            ValidationCheck::passed(CheckKind::TraceLengths)
        } else {
            ValidationCheck::warning(CheckKind::TraceLengths, "channels differ in length")
                .about(channels.iter().cloned())
        },
    );

    let calls = container.base_calls(BaseCallSet::Called);
    if calls.is_empty() {
        report.push(ValidationCheck::warning(CheckKind::BaseCalls, "no called bases"));
        return;
    }
    report.push(ValidationCheck::passed(CheckKind::BaseCalls));

    let n = calls.len();
    report.push(if calls.qualities.len() == n {
        ValidationCheck::passed(CheckKind::Qualities)
    } else {
        ValidationCheck::warning(
            CheckKind::Qualities,
            format!("{} values for {} bases", calls.qualities.len(), n),
        )
    });

    if calls.peak_locations.len() != n {
        report.push(ValidationCheck::warning(
            CheckKind::PeakLocations,
            format!("{} locations for {} bases", calls.peak_locations.len(), n),
        ));
        return;
    }

    let outside: Vec<Subject> = calls
        .peak_locations
        .iter()
        .enumerate()
        .filter(|(_, &location)| location as usize >= trace_len)
        .map(|(index, &location)| Subject::Base { index, location })
        .collect();
    report.push(if outside.is_empty() {
        ValidationCheck::passed(CheckKind::PeakLocations)
    } else {
        ValidationCheck::failed(
            CheckKind::PeakLocations,
            format!("{} of {} beyond trace length {}", outside.len(), n, trace_len),
        )
        .about(outside)
    });
}
