//! Attachments discovered by naming convention next to a report file.
//!
//! For a report at `reports/TEST-com.x.Foo.xml` and class `com.x.Foo`:
//!
//! ```text
//! reports/com.x.Foo/...            # every file below, recursively
//! reports/com.x.Foo-output.txt     # combined stdout/stderr capture
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::diagnostics::{DiagnosticSink, ScanWarning};
use crate::paths::OUTPUT_FILE_SUFFIX;
use crate::store::Workspace;

/// Files found for one class by convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionAttachments {
    /// The convention directory, when it exists.
    pub dir: Option<PathBuf>,
    /// Files below `dir`, relative to it, sorted.
    pub files: Vec<PathBuf>,
    /// The `<class>-output.txt` capture file, when present.
    pub output_file: Option<PathBuf>,
}

impl ConventionAttachments {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.output_file.is_none()
    }
}

/// Scan the directory containing `report_file` for `class_name`'s
/// convention attachments. Listing failures are reported to `sink`.
pub fn scan_report_convention(
    workspace: &dyn Workspace,
    report_file: &str,
    class_name: &str,
    sink: &mut dyn DiagnosticSink,
) -> ConventionAttachments {
    let report = workspace.resolve(report_file);
    let report_dir = report
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| workspace.root().to_path_buf());

    let mut found = ConventionAttachments::default();

    let test_dir = report_dir.join(class_name);
    if workspace.is_dir(&test_dir) {
        match workspace.list_files(&test_dir) {
            Ok(files) => {
                debug!(class = class_name, dir = %test_dir.display(), count = files.len(), "convention directory");
                found.files = files;
                found.dir = Some(test_dir);
            }
            Err(e) => sink.report(ScanWarning::SourceUnreadable {
                path: test_dir,
                reason: e.to_string(),
            }),
        }
    }

    let output = report_dir.join(format!("{}{}", class_name, OUTPUT_FILE_SUFFIX));
    if workspace.exists(&output) && !workspace.is_dir(&output) {
        found.output_file = Some(output);
    }

    found
}
