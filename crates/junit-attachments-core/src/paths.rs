//! Storage path conventions for attachments.
//!
//! # Layout
//!
//! ```text
//! {run_root}/junit-attachments/                      # attachment root
//! {run_root}/junit-attachments/{class}/{file}        # class-level layout
//! {run_root}/junit-attachments/{class}/{case}/{file} # per-case layout
//! {run_root}/junit-attachments.json                  # index record
//! ```
//!
//! Class and case names are passed through [`sanitize`] before they become
//! directory names. Plain Java class names (`com.example.FooTest`) are left
//! untouched so runs written by older versions stay readable.

use std::path::{Path, PathBuf};

/// Directory below the run root holding all attachments of a run.
pub const ATTACHMENTS_DIR: &str = "junit-attachments";

/// File below the run root holding the persisted index record.
pub const INDEX_RECORD_FILE: &str = "junit-attachments.json";

/// Suffix of the combined stdout/stderr capture written next to a report.
pub const OUTPUT_FILE_SUFFIX: &str = "-output.txt";

/// Attachment root for a run: `{run_root}/junit-attachments`.
pub fn attachment_root(run_root: &Path) -> PathBuf {
    run_root.join(ATTACHMENTS_DIR)
}

/// Index record location for a run: `{run_root}/junit-attachments.json`.
pub fn index_record_path(run_root: &Path) -> PathBuf {
    run_root.join(INDEX_RECORD_FILE)
}

/// Storage directory shared by every attachment of a class.
///
/// Returns: `{root}/{sanitize(class_name)}`
pub fn class_storage_path(root: &Path, class_name: &str) -> PathBuf {
    root.join(sanitize(class_name))
}

/// Storage directory for one test case.
///
/// Returns: `{root}/{class}/{case}`, or the class directory when
/// `case_name` is empty (class-level bucket).
pub fn case_storage_path(root: &Path, class_name: &str, case_name: &str) -> PathBuf {
    let class_dir = class_storage_path(root, class_name);
    if case_name.is_empty() {
        class_dir
    } else {
        class_dir.join(sanitize(case_name))
    }
}

/// Encode a class or case name into a single safe path segment.
///
/// Characters outside the safe set (and `%` itself) become `%XX` for each
/// UTF-8 byte. The names `.` and `..` are fully escaped. The mapping is
/// injective: distinct inputs never share an encoding.
pub fn sanitize(name: &str) -> String {
    if name == "." || name == ".." {
        return name.bytes().map(|b| format!("%{:02X}", b)).collect();
    }

    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if is_safe(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}

fn is_safe(c: char) -> bool {
    // Unicode letters and digits are fine on every filesystem we write to
    c.is_alphanumeric()
        || matches!(
            c,
            '-' | '_' | '.' | '$' | '@' | '+' | '=' | ',' | '(' | ')' | '[' | ']' | ' '
        )
}
