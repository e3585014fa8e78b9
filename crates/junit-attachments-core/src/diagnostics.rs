//! Recoverable findings raised while scanning for attachments.
//!
//! A missing or malformed reference never aborts collection. The scanner
//! hands a [`ScanWarning`] to the caller's [`DiagnosticSink`] and moves on.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, warn};

/// A reference that was skipped during a collection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// The referenced path does not exist in the workspace.
    ReferenceNotFound { reference: String, resolved: PathBuf },
    /// The referenced path is a directory, not a file.
    ReferenceIsDirectory { reference: String, resolved: PathBuf },
    /// A marker was found but carried no usable path.
    MalformedMarker { marker: String },
    /// The source file exists but could not be opened for reading.
    SourceUnreadable { path: PathBuf, reason: String },
    /// The stored location is already taken by another bucket's file, or
    /// a file and a directory would share one path.
    DestinationConflict {
        class_name: String,
        case_name: String,
        name: String,
        destination: PathBuf,
    },
}

/// How loudly a warning should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Warn,
}

impl ScanWarning {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MalformedMarker { .. } => Severity::Debug,
            _ => Severity::Warn,
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceNotFound {
                reference,
                resolved,
            } => write!(
                f,
                "attachment '{}' not found (resolved to {})",
                reference,
                resolved.display()
            ),
            Self::ReferenceIsDirectory {
                reference,
                resolved,
            } => write!(
                f,
                "attachment '{}' is a directory, only files can be attached ({})",
                reference,
                resolved.display()
            ),
            Self::MalformedMarker { marker } => {
                write!(f, "ignoring attachment marker without a path: {}", marker)
            }
            Self::SourceUnreadable { path, reason } => {
                write!(f, "cannot read attachment {}: {}", path.display(), reason)
            }
            Self::DestinationConflict {
                class_name,
                case_name,
                name,
                destination,
            } => {
                let owner = if case_name.is_empty() {
                    class_name.clone()
                } else {
                    format!("{}#{}", class_name, case_name)
                };
                write!(
                    f,
                    "skipping attachment '{}' of {}: {} is taken by another attachment",
                    name,
                    owner,
                    destination.display()
                )
            }
        }
    }
}

/// Receiver for scan warnings.
pub trait DiagnosticSink {
    fn report(&mut self, warning: ScanWarning);
}

/// Forwards warnings to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, warning: ScanWarning) {
        match warning.severity() {
            Severity::Debug => debug!(%warning, "attachment scan"),
            Severity::Warn => warn!(%warning, "attachment scan"),
        }
    }
}

/// Keeps every warning in memory and forwards it to `tracing` as well.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    warnings: Vec<ScanWarning>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<ScanWarning> {
        self.warnings
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&mut self, warning: ScanWarning) {
        TracingSink.report(warning.clone());
        self.warnings.push(warning);
    }
}
