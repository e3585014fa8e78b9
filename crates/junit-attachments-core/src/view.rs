//! Read-side query context for one run's attachments.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;
use tracing::debug;

use crate::config::DisplayOptions;
use crate::index::{AttachmentIndex, AttachmentQuery};
use crate::paths::{case_storage_path, class_storage_path};
use crate::record::{IndexRecord, StorageLayout};
use crate::store::ArtifactStore;

/// Infer the layout of a run recorded without a layout flag.
///
/// The layout is per-case if any case-attributed file exists at its
/// per-case location. Class-level buckets are not probed: their per-case
/// and class-level locations coincide.
pub fn probe_layout(index: &AttachmentIndex, store: &dyn ArtifactStore) -> StorageLayout {
    let per_case = index
        .iter()
        .filter(|(_, case, _)| !case.is_empty())
        .any(|(class, case, names)| {
            let dir = case_storage_path(Path::new(""), class, case);
            names.iter().any(|name| store.exists(&dir.join(name)))
        });
    if per_case {
        StorageLayout::PerCase
    } else {
        StorageLayout::ClassLevel
    }
}

/// One attachment of a query result with its stored location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAttachment {
    pub name: String,
    /// Bucket the name was recorded in; empty for class-level files.
    #[serde(rename = "case")]
    pub case_name: String,
    pub path: PathBuf,
}

/// A loaded record bound to its attachment root.
///
/// The layout probe runs at most once per view.
pub struct AttachmentView<'a> {
    record: &'a IndexRecord,
    store: &'a dyn ArtifactStore,
    display: DisplayOptions,
    layout: OnceLock<StorageLayout>,
}

impl<'a> AttachmentView<'a> {
    pub fn new(
        record: &'a IndexRecord,
        store: &'a dyn ArtifactStore,
        display: DisplayOptions,
    ) -> Self {
        Self {
            record,
            store,
            display,
            layout: OnceLock::new(),
        }
    }

    pub fn index(&self) -> &AttachmentIndex {
        self.record.index()
    }

    pub fn layout(&self) -> StorageLayout {
        *self.layout.get_or_init(|| match self.record.layout {
            Some(layout) => layout,
            None => {
                let layout = probe_layout(self.record.index(), self.store);
                debug!(?layout, "probed storage layout");
                layout
            }
        })
    }

    /// Ordered attachment names for `query`.
    pub fn attachments(&self, query: &AttachmentQuery) -> Vec<String> {
        self.index().attachments(query, self.display.show_class_level)
    }

    /// The names of [`AttachmentView::attachments`], each with the bucket
    /// it came from and its stored location.
    ///
    /// A name present in several cases of a class query is listed once,
    /// for the first case in name order.
    pub fn resolved_attachments(&self, query: &AttachmentQuery) -> Vec<ResolvedAttachment> {
        let class_name = query.class_name();
        let buckets: Vec<(&str, &[String])> = match query {
            AttachmentQuery::Case {
                class_name,
                case_name,
            } => vec![(
                case_name.as_str(),
                self.index().case_attachments(class_name, case_name),
            )],
            AttachmentQuery::Class { class_name } => {
                if !self.display.show_class_level {
                    return Vec::new();
                }
                self.index()
                    .cases(class_name)
                    .map(|cases| {
                        cases
                            .iter()
                            .map(|(case, names)| (case.as_str(), names.as_slice()))
                            .collect()
                    })
                    .unwrap_or_default()
            }
        };

        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for (case_name, names) in buckets {
            for name in names {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                resolved.push(ResolvedAttachment {
                    name: name.clone(),
                    case_name: case_name.to_string(),
                    path: self.resolve_file(class_name, case_name, name),
                });
            }
        }
        resolved
    }

    /// Directory every name returned for `query` resolves against.
    ///
    /// `None` for a class query whose names are spread over per-case
    /// directories; use [`AttachmentView::resolved_attachments`] there.
    pub fn storage_dir(&self, query: &AttachmentQuery) -> Option<PathBuf> {
        let root = self.store.root();
        match query {
            AttachmentQuery::Class { class_name } => {
                let spread = self.layout() == StorageLayout::PerCase
                    && self
                        .index()
                        .cases(class_name)
                        .is_some_and(|cases| cases.keys().any(|case| !case.is_empty()));
                (!spread).then(|| class_storage_path(root, class_name))
            }
            AttachmentQuery::Case {
                class_name,
                case_name,
            } => Some(match self.layout() {
                StorageLayout::PerCase => case_storage_path(root, class_name, case_name),
                StorageLayout::ClassLevel => class_storage_path(root, class_name),
            }),
        }
    }

    /// Absolute location of one stored attachment.
    pub fn resolve_file(&self, class_name: &str, case_name: &str, name: &str) -> PathBuf {
        let root = self.store.root();
        let dir = match self.layout() {
            StorageLayout::PerCase => case_storage_path(root, class_name, case_name),
            StorageLayout::ClassLevel => class_storage_path(root, class_name),
        };
        dir.join(name)
    }
}
