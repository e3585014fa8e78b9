//! Test attachment capture for JUnit-style test runs.
//!
//! After a run finishes, the [`AttachmentCollector`] looks for files that
//! belong to test classes and cases, copies them into durable storage
//! below the run directory and produces an [`AttachmentIndex`]:
//!
//! - **Convention attachments**: a directory named after the class next to
//!   the suite's report file, plus `<class>-output.txt`
//! - **Marker attachments**: `[[ATTACHMENT|path]]` lines in captured
//!   stdout/stderr, attributed to the case (or the class for suite output)
//!
//! # Quick Start
//!
//! ```no_run
//! use junit_attachments_core::{
//!     save_record, AttachmentCollector, CollectOptions, LocalStore, LocalWorkspace,
//!     TestRun, TracingSink,
//! };
//! use std::path::Path;
//!
//! # fn example(run: &TestRun) -> junit_attachments_core::AttachmentResult<()> {
//! let run_root = Path::new("/var/ci/jobs/app/builds/42");
//! let workspace = LocalWorkspace::new("/var/ci/workspace/app");
//! let store = LocalStore::for_run(run_root);
//!
//! let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
//! let index = collector.collect(run, &mut TracingSink)?;
//! save_record(run_root, &index)?;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod convention;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod markers;
pub mod model;
pub mod paths;
pub mod record;
pub mod store;
pub mod view;

pub use collector::{relative_names, AttachmentCollector};
pub use config::{load_config, AttachmentsConfig, CollectOptions, DisplayOptions};
pub use convention::{scan_report_convention, ConventionAttachments};
pub use diagnostics::{DiagnosticSink, RecordingSink, ScanWarning, TracingSink};
pub use error::{AttachmentError, AttachmentResult};
pub use index::{AttachmentIndex, AttachmentQuery, CaseAttachments, IndexBuilder};
pub use markers::{extract_markers, scan_output, Marker};
pub use model::{CaseResult, SuiteResult, TestRun};
pub use paths::{
    attachment_root, case_storage_path, class_storage_path, index_record_path, sanitize,
    ATTACHMENTS_DIR,
};
pub use record::{
    load_record, migrate_record, save_record, IndexRecord, RecordFormat, StorageLayout,
};
pub use store::{ArtifactStore, LocalStore, LocalWorkspace, Workspace};
pub use view::{probe_layout, AttachmentView, ResolvedAttachment};
