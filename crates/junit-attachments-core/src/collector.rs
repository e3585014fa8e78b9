//! Builds the attachment index for one finished run.
//!
//! The pass is synchronous and single-threaded:
//!
//! 1. map every declared class to its suite's report file
//! 2. capture convention attachments per class into the class-level bucket
//! 3. capture marker attachments per case, then per suite (class-level)
//!
//! A reference that cannot be resolved or read, or whose destination is
//! taken by another bucket, is reported to the [`DiagnosticSink`] and
//! skipped. A failing write to the attachment store
//! aborts the pass.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::config::CollectOptions;
use crate::convention::scan_report_convention;
use crate::diagnostics::{DiagnosticSink, ScanWarning};
use crate::error::AttachmentResult;
use crate::index::{AttachmentIndex, IndexBuilder};
use crate::markers::scan_output;
use crate::model::TestRun;
use crate::paths::case_storage_path;
use crate::store::{ArtifactStore, Workspace};

pub struct AttachmentCollector<'a> {
    workspace: &'a dyn Workspace,
    store: &'a dyn ArtifactStore,
    options: CollectOptions,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CaptureStats {
    copied: usize,
    reused: usize,
    conflicts: usize,
}

/// State of one collection pass.
///
/// Every destination taken in this pass is claimed by the bucket
/// (class, case) that stored it, and all its parent directories are
/// remembered, so a later file from another bucket cannot take over the
/// same path or turn a directory into a file.
#[derive(Debug, Default)]
struct CapturePass {
    builder: IndexBuilder,
    stats: CaptureStats,
    claimed_files: HashMap<PathBuf, (String, String)>,
    claimed_dirs: HashSet<PathBuf>,
}

impl CapturePass {
    fn claim(&mut self, dest: &Path, class_name: &str, case_name: &str) {
        self.claimed_files
            .insert(dest.to_path_buf(), (class_name.to_string(), case_name.to_string()));
        for dir in parent_dirs(dest) {
            self.claimed_dirs.insert(dir.to_path_buf());
        }
    }

    /// Whether `dest` is unusable for the bucket (`class_name`, `case_name`).
    fn conflicts(
        &self,
        store: &dyn ArtifactStore,
        dest: &Path,
        class_name: &str,
        case_name: &str,
    ) -> bool {
        if let Some((class, case)) = self.claimed_files.get(dest) {
            if class != class_name || case != case_name {
                return true;
            }
        }
        if self.claimed_dirs.contains(dest) || store.is_dir(dest) {
            return true;
        }
        parent_dirs(dest).any(|dir| {
            self.claimed_files.contains_key(dir) || (store.exists(dir) && !store.is_dir(dir))
        })
    }
}

impl<'a> AttachmentCollector<'a> {
    pub fn new(
        workspace: &'a dyn Workspace,
        store: &'a dyn ArtifactStore,
        options: CollectOptions,
    ) -> Self {
        Self {
            workspace,
            store,
            options,
        }
    }

    /// Run one collection pass over `run`.
    ///
    /// The returned index is empty when nothing was attached; callers then
    /// persist nothing for the run.
    pub fn collect(
        &self,
        run: &TestRun,
        sink: &mut dyn DiagnosticSink,
    ) -> AttachmentResult<AttachmentIndex> {
        let mut pass = CapturePass::default();

        // className -> report file; a later suite wins for the same class
        let mut reports: BTreeMap<&str, &str> = BTreeMap::new();
        for suite in &run.suites {
            if let Some(file) = suite.file.as_deref() {
                for class_name in suite.class_names() {
                    reports.insert(class_name, file);
                }
            }
        }
        debug!(classes = reports.len(), "report files");

        for (class_name, report_file) in &reports {
            let found = scan_report_convention(self.workspace, report_file, class_name, sink);
            if let Some(dir) = &found.dir {
                for rel in &found.files {
                    let name = slash_path(rel);
                    let source = dir.join(rel);
                    self.capture(&mut pass, class_name, "", &source, name, sink)?;
                }
            }
            if let Some(output) = &found.output_file {
                if let Some(name) = output.file_name().map(|n| n.to_string_lossy().into_owned()) {
                    self.capture(&mut pass, class_name, "", output, name, sink)?;
                }
            }
        }

        for suite in &run.suites {
            for case in &suite.cases {
                let Some(text) = case.distinct_output(suite) else {
                    continue;
                };
                let files = scan_output(&text, self.workspace, sink);
                self.capture_set(&mut pass, &case.class_name, &case.name, &files, sink)?;
            }

            let targets = suite.output_classes();
            let suite_texts = [suite.stdout.as_deref(), suite.stderr.as_deref()];
            for text in suite_texts.into_iter().flatten() {
                let files = scan_output(text, self.workspace, sink);
                if files.is_empty() {
                    continue;
                }
                for class_name in &targets {
                    self.capture_set(&mut pass, class_name, "", &files, sink)?;
                }
            }
        }

        let stats = pass.stats;
        let index = pass.builder.build();
        info!(
            classes = index.class_count(),
            files = index.file_count(),
            copied = stats.copied,
            reused = stats.reused,
            conflicts = stats.conflicts,
            "collected attachments"
        );
        Ok(index)
    }

    /// Capture files discovered together by one scan.
    fn capture_set(
        &self,
        pass: &mut CapturePass,
        class_name: &str,
        case_name: &str,
        files: &[PathBuf],
        sink: &mut dyn DiagnosticSink,
    ) -> AttachmentResult<()> {
        let names = relative_names(
            files,
            self.workspace.root(),
            self.options.preserve_directory_structure,
        );
        for (source, name) in files.iter().zip(names) {
            self.capture(pass, class_name, case_name, source, name, sink)?;
        }
        Ok(())
    }

    fn capture(
        &self,
        pass: &mut CapturePass,
        class_name: &str,
        case_name: &str,
        source: &Path,
        name: String,
        sink: &mut dyn DiagnosticSink,
    ) -> AttachmentResult<()> {
        if name.is_empty() {
            return Ok(());
        }
        if pass.builder.contains(class_name, case_name, &name) {
            debug!(class = class_name, case = case_name, name = %name, "already captured");
            return Ok(());
        }

        let dest = case_storage_path(Path::new(""), class_name, case_name).join(&name);
        if pass.conflicts(self.store, &dest, class_name, case_name) {
            pass.stats.conflicts += 1;
            sink.report(ScanWarning::DestinationConflict {
                class_name: class_name.to_string(),
                case_name: case_name.to_string(),
                name,
                destination: self.store.root().join(&dest),
            });
            return Ok(());
        }

        if self.store.exists(&dest) {
            pass.stats.reused += 1;
        } else {
            let mut reader = match self.workspace.open(source) {
                Ok(reader) => reader,
                Err(e) => {
                    sink.report(ScanWarning::SourceUnreadable {
                        path: source.to_path_buf(),
                        reason: e.to_string(),
                    });
                    return Ok(());
                }
            };
            if let Some(parent) = dest.parent() {
                self.store.mkdirs(parent)?;
            }
            self.store.write(&dest, &mut reader)?;
            pass.stats.copied += 1;
        }

        pass.claim(&dest, class_name, case_name);
        pass.builder.record_attachment(class_name, case_name, name);
        Ok(())
    }
}

/// Names under which `files` are stored.
///
/// Without preservation every file keeps its base name. With preservation
/// each file is named relative to the common parent directory of the set.
/// A single file uses its own parent, and a set without a shared directory
/// falls back to base names.
pub fn relative_names(files: &[PathBuf], workspace_root: &Path, preserve: bool) -> Vec<String> {
    if !preserve || files.len() <= 1 {
        return files.iter().map(|f| base_name(f)).collect();
    }

    let root = normalize(workspace_root);
    let located: Vec<(bool, Vec<String>)> = files
        .iter()
        .map(|f| {
            let path = normalize(f);
            match path.strip_prefix(&root) {
                Ok(rel) => (true, normal_components(rel)),
                Err(_) => (false, normal_components(&path)),
            }
        })
        .collect();

    let same_origin = located.iter().all(|(inside, _)| *inside == located[0].0);
    let common = if same_origin {
        common_dir_len(located.iter().map(|(_, parts)| parts.as_slice()))
    } else {
        0
    };
    if common == 0 {
        return files.iter().map(|f| base_name(f)).collect();
    }

    located
        .iter()
        .map(|(_, parts)| parts[common..].join("/"))
        .collect()
}

/// Length of the longest directory prefix shared by all component lists.
fn common_dir_len<'p>(mut paths: impl Iterator<Item = &'p [String]>) -> usize {
    let Some(first) = paths.next() else {
        return 0;
    };
    // The last component is the file name, never part of the prefix
    let mut len = first.len().saturating_sub(1);
    for parts in paths {
        let dir = &parts[..parts.len().saturating_sub(1)];
        len = first[..len]
            .iter()
            .zip(dir)
            .take_while(|(a, b)| a == b)
            .count();
    }
    len
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Resolve `.` and `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Every proper parent of a store-relative path, nearest first.
fn parent_dirs(path: &Path) -> impl Iterator<Item = &Path> {
    path.ancestors()
        .skip(1)
        .filter(|dir| !dir.as_os_str().is_empty())
}

fn slash_path(path: &Path) -> String {
    normal_components(path).join("/")
}
