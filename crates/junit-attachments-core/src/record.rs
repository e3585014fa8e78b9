//! Persisted form of an attachment index.
//!
//! # Record shapes
//!
//! ```text
//! {"attachments": {class: [names]}}                       # flat, pre per-case
//! {"attachments_map": {class: {case: [names]}}}           # nested, no layout flag
//! {"attachments_map": {...}, "layout": "per_case"}        # current
//! ```
//!
//! Every shape is converted to [`IndexRecord`] once, during
//! deserialization. Nothing downstream ever sees the older shapes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AttachmentError, AttachmentResult};
use crate::index::AttachmentIndex;
use crate::paths::index_record_path;
use crate::store::LocalStore;
use crate::view::probe_layout;

/// How attachment files of a class are arranged on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLayout {
    /// Every file of the class sits directly in the class directory.
    ClassLevel,
    /// Each case has its own subdirectory below the class directory.
    PerCase,
}

/// The shape a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFormat {
    #[default]
    Current,
    NestedWithoutLayout,
    Flat,
    /// Neither legacy nor current fields were populated.
    Empty,
}

/// An index as stored next to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawIndexRecord")]
pub struct IndexRecord {
    pub attachments_map: AttachmentIndex,
    /// `None` for records written before the layout flag existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<StorageLayout>,
    #[serde(skip)]
    pub source_format: RecordFormat,
}

#[derive(Deserialize)]
struct RawIndexRecord {
    #[serde(default)]
    attachments: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    attachments_map: Option<AttachmentIndex>,
    #[serde(default)]
    layout: Option<StorageLayout>,
}

impl From<RawIndexRecord> for IndexRecord {
    fn from(raw: RawIndexRecord) -> Self {
        match (raw.attachments_map, raw.attachments) {
            (Some(map), _) => Self {
                attachments_map: map,
                layout: raw.layout,
                source_format: if raw.layout.is_some() {
                    RecordFormat::Current
                } else {
                    RecordFormat::NestedWithoutLayout
                },
            },
            (None, Some(flat)) => Self {
                attachments_map: AttachmentIndex::from_flat(flat),
                layout: Some(StorageLayout::ClassLevel),
                source_format: RecordFormat::Flat,
            },
            (None, None) => {
                warn!("attachment record has neither legacy nor current data, treating as empty");
                Self {
                    attachments_map: AttachmentIndex::default(),
                    layout: raw.layout,
                    source_format: RecordFormat::Empty,
                }
            }
        }
    }
}

impl IndexRecord {
    /// Record for an index produced by the current collector.
    pub fn current(index: AttachmentIndex) -> Self {
        Self {
            attachments_map: index,
            layout: Some(StorageLayout::PerCase),
            source_format: RecordFormat::Current,
        }
    }

    pub fn index(&self) -> &AttachmentIndex {
        &self.attachments_map
    }

    pub fn is_legacy(&self) -> bool {
        self.source_format != RecordFormat::Current
    }

    pub fn from_json(raw: &str) -> AttachmentResult<Self> {
        serde_json::from_str(raw).map_err(|e| AttachmentError::Record {
            message: format!("failed to parse attachment record: {}", e),
        })
    }

    pub fn to_json(&self) -> AttachmentResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AttachmentError::Record {
            message: format!("failed to serialize attachment record: {}", e),
        })
    }
}

/// Load the record of a run. A missing file means the run has no
/// attachment data.
pub fn load_record(run_root: &Path) -> AttachmentResult<Option<IndexRecord>> {
    let path = index_record_path(run_root);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).map_err(|e| AttachmentError::Record {
        message: format!("failed to read {}: {}", path.display(), e),
    })?;
    IndexRecord::from_json(&raw).map(Some)
}

/// Persist `index` for a run. Empty indexes are not written.
/// Returns whether a record was written.
pub fn save_record(run_root: &Path, index: &AttachmentIndex) -> AttachmentResult<bool> {
    if !index.has_attachments() {
        return Ok(false);
    }
    write_record(run_root, &IndexRecord::current(index.clone()))?;
    Ok(true)
}

/// Rewrite an older record in the current shape, resolving the layout
/// flag from disk. Returns whether the file changed.
pub fn migrate_record(run_root: &Path) -> AttachmentResult<bool> {
    let Some(mut record) = load_record(run_root)? else {
        return Ok(false);
    };
    if !record.is_legacy() {
        return Ok(false);
    }

    if record.layout.is_none() {
        let store = LocalStore::for_run(run_root);
        record.layout = Some(probe_layout(record.index(), &store));
    }
    let from = record.source_format;
    record.source_format = RecordFormat::Current;
    write_record(run_root, &record)?;
    info!(run = %run_root.display(), ?from, layout = ?record.layout, "migrated attachment record");
    Ok(true)
}

fn write_record(run_root: &Path, record: &IndexRecord) -> AttachmentResult<()> {
    let path = index_record_path(run_root);
    let content = record.to_json()?;
    let temp_path = path.with_extension("json.tmp");

    fs::create_dir_all(run_root).map_err(|e| AttachmentError::storage(run_root, e))?;
    fs::write(&temp_path, content).map_err(|e| AttachmentError::storage(&temp_path, e))?;
    fs::rename(&temp_path, &path).map_err(|e| AttachmentError::storage(&path, e))?;
    Ok(())
}
