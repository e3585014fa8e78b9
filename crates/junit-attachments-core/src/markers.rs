//! Inline attachment markers in captured test output.
//!
//! A test attaches a file by printing
//!
//! ```text
//! [[ATTACHMENT|<path>|<reserved>...]]
//! ```
//!
//! anywhere on a line. The first `|`-delimited field is the path, resolved
//! against the workspace root when relative. Further fields are reserved
//! and ignored.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::diagnostics::{DiagnosticSink, ScanWarning};
use crate::store::Workspace;

const MARKER_PREFIX: &str = "[[ATTACHMENT|";

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Non-greedy and single-line: two markers on one line stay separate
    RE.get_or_init(|| Regex::new(r"\[\[ATTACHMENT\|(.*?)\]\]").expect("static marker regex"))
}

/// A marker occurrence found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// The whole marker as it appeared in the text.
    pub raw: String,
    /// The trimmed path field, if any.
    pub path: Option<String>,
}

/// Extract every marker from `text`, in order of appearance.
pub fn extract_markers(text: &str) -> Vec<Marker> {
    marker_regex()
        .captures_iter(text)
        .map(|caps| {
            let raw = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let path = body
                .split('|')
                .next()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from);
            Marker {
                raw: raw.to_string(),
                path,
            }
        })
        .collect()
}

/// True if `text` contains at least one marker prefix.
pub fn has_marker(text: &str) -> bool {
    text.contains(MARKER_PREFIX)
}

/// Resolve the markers in `text` to existing workspace files.
///
/// Directories, missing paths and empty markers are reported to `sink`
/// and skipped. Duplicate references are returned once, first occurrence
/// wins.
pub fn scan_output(
    text: &str,
    workspace: &dyn Workspace,
    sink: &mut dyn DiagnosticSink,
) -> Vec<PathBuf> {
    if !has_marker(text) {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for marker in extract_markers(text) {
        let Some(reference) = marker.path else {
            sink.report(ScanWarning::MalformedMarker { marker: marker.raw });
            continue;
        };

        let resolved = workspace.resolve(&reference);
        if !workspace.exists(&resolved) {
            sink.report(ScanWarning::ReferenceNotFound {
                reference,
                resolved,
            });
            continue;
        }
        if workspace.is_dir(&resolved) {
            sink.report(ScanWarning::ReferenceIsDirectory {
                reference,
                resolved,
            });
            continue;
        }
        if !files.contains(&resolved) {
            files.push(resolved);
        }
    }
    files
}
