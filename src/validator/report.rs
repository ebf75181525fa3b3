//! Findings for one container, grouped by the property they inspect

use std::fmt::{self, Write};

use serde::Serialize;

use crate::container::{Channel, ContainerFormat, DirectoryEntry};

/// Subjects printed per check before the rest are summarized as a count
const LISTED_SUBJECTS: usize = 8;

/// Property of the container a check inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// `ABIF` or `.scf` magic
    Signature,
    /// Bytes read against the size reported by the source
    DeclaredLength,
    /// Fixed header parses
    Header,
    /// ABIF directory fits in the file
    Directory,
    /// ABIF entry data fits in the file
    EntryData,
    /// SCF sample block fits in the file
    SampleRegion,
    /// SCF base block fits in the file
    BaseRegion,
    /// SCF comment block fits in the file
    CommentRegion,
    /// Every primary channel has analyzed samples
    TracesPresent,
    /// Analyzed traces share one length
    TraceLengths,
    /// Called bases exist
    BaseCalls,
    /// One quality value per base
    Qualities,
    /// One peak location per base, inside the trace
    PeakLocations,
}

impl CheckKind {
    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            CheckKind::Signature => "signature",
            CheckKind::DeclaredLength => "declared length",
            CheckKind::Header => "header",
            CheckKind::Directory => "directory",
            CheckKind::EntryData => "entry data",
            CheckKind::SampleRegion => "sample region",
            CheckKind::BaseRegion => "base region",
            CheckKind::CommentRegion => "comment region",
            CheckKind::TracesPresent => "analyzed traces",
            CheckKind::TraceLengths => "trace lengths",
            CheckKind::BaseCalls => "base calls",
            CheckKind::Qualities => "quality values",
            CheckKind::PeakLocations => "peak locations",
        }
    }
}

/// Part of the container a finding points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    /// ABIF directory entry
    Entry {
        /// Four-character tag
        tag: String,
        /// Tag number
        number: u32,
    },
    /// Dye channel
    Channel {
        /// The channel
        channel: Channel,
        /// Samples it holds
        samples: usize,
    },
    /// Byte range `offset..offset + len`
    Bytes {
        /// First byte
        offset: u64,
        /// Range length
        len: u64,
    },
    /// Base call by index
    Base {
        /// Zero-based index in the called set
        index: usize,
        /// Its peak location
        location: u32,
    },
}

impl Subject {
    pub(crate) fn entry(entry: &DirectoryEntry) -> Self {
        Subject::Entry {
            tag: entry.tag_name(),
            number: entry.number,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Entry { tag, number } => write!(f, "{}{}", tag, number),
            Subject::Channel { channel, samples } => write!(f, "{} ({})", channel, samples),
            Subject::Bytes { offset, len } => {
                write!(f, "bytes {}..{}", offset, offset.saturating_add(*len))
            }
            Subject::Base { index, location } => write!(f, "base {} at {}", index, location),
        }
    }
}

/// Outcome of one check, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing wrong
    Passed,
    /// Decodable, but data was truncated or inconsistent
    Warning,
    /// Unusable or contradictory data
    Failed,
}

impl Severity {
    fn symbol(self) -> &'static str {
        match self {
            Severity::Passed => "✓",
            Severity::Warning => "⚠",
            Severity::Failed => "✗",
        }
    }
}

/// Result of one check
#[derive(Debug, Clone, Serialize)]
pub struct ValidationCheck {
    /// What was inspected
    pub kind: CheckKind,
    /// How it went
    pub severity: Severity,
    /// Explanation for warnings and failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Entries, channels, byte ranges or bases involved
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
}

impl ValidationCheck {
    pub(crate) fn passed(kind: CheckKind) -> Self {
        Self {
            kind,
            severity: Severity::Passed,
            message: None,
            subjects: Vec::new(),
        }
    }

    pub(crate) fn warning(kind: CheckKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: Some(message.into()),
            ..Self::passed(kind)
        }
    }

    pub(crate) fn failed(kind: CheckKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Failed,
            message: Some(message.into()),
            ..Self::passed(kind)
        }
    }

    pub(crate) fn about(mut self, subjects: impl IntoIterator<Item = Subject>) -> Self {
        self.subjects.extend(subjects);
        self
    }
}

/// All checks run against one container
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Path or label of the container
    pub source: String,
    /// Format from the signature, if recognized
    pub format: Option<ContainerFormat>,
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// Empty report for `source`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            format: None,
            checks: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// First check of a kind
    pub fn check(&self, kind: CheckKind) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.kind == kind)
    }

    /// Severity of a kind's check, if it ran
    pub fn severity_of(&self, kind: CheckKind) -> Option<Severity> {
        self.check(kind).map(|c| c.severity)
    }

    /// Worst severity over all checks
    pub fn outcome(&self) -> Severity {
        self.checks
            .iter()
            .map(|c| c.severity)
            .max()
            .unwrap_or(Severity::Passed)
    }

    /// Number of checks with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.checks.iter().filter(|c| c.severity == severity).count()
    }

    /// Whether any check failed
    pub fn has_failures(&self) -> bool {
        self.outcome() == Severity::Failed
    }

    /// Whether any check warned
    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    /// Render with terminal colors when the `colorized_output` feature is on
    pub fn format_colored(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.render(&mut out, true);
        out
    }

    fn render(&self, out: &mut impl Write, colored: bool) -> fmt::Result {
        match self.format {
            Some(format) => writeln!(out, "{} container {}", format, self.source)?,
            None => writeln!(out, "Container {}", self.source)?,
        }

        for check in &self.checks {
            let mark = paint(check.severity.symbol(), check.severity, colored);
            write!(out, "  {} {}", mark, check.kind.label())?;
            if let Some(message) = &check.message {
                write!(out, ": {}", message)?;
            }
            if !check.subjects.is_empty() {
                let listed: Vec<String> = check
                    .subjects
                    .iter()
                    .take(LISTED_SUBJECTS)
                    .map(Subject::to_string)
                    .collect();
                write!(out, " [{}", listed.join(", "))?;
                let rest = check.subjects.len().saturating_sub(LISTED_SUBJECTS);
                if rest > 0 {
                    write!(out, ", +{} more", rest)?;
                }
                write!(out, "]")?;
            }
            writeln!(out)?;
        }

        let outcome = self.outcome();
        let verdict = match outcome {
            Severity::Passed => "PASSED",
            Severity::Warning => "PASSED WITH WARNINGS",
            Severity::Failed => "FAILED",
        };
        writeln!(
            out,
            "{} passed, {} warnings, {} failed: {}",
            self.count(Severity::Passed),
            self.count(Severity::Warning),
            self.count(Severity::Failed),
            paint(verdict, outcome, colored)
        )
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, false)
    }
}

#[cfg(feature = "colorized_output")]
fn paint(text: &str, severity: Severity, colored: bool) -> String {
    use console::style;

    if !colored {
        return text.to_string();
    }
    let styled = style(text).bold();
    match severity {
        Severity::Passed => styled.green(),
        Severity::Warning => styled.yellow(),
        Severity::Failed => styled.red(),
    }
    .to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn paint(text: &str, _severity: Severity, _colored: bool) -> String {
    text.to_string()
}
