//! The attachment index: class → case → ordered attachment names.
//!
//! The empty case name is the class-level bucket (attachments that cannot
//! be attributed to one case). Names are relative paths using `/`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attachments of one class, keyed by case name.
pub type CaseAttachments = BTreeMap<String, Vec<String>>;

/// What a caller asks the index about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentQuery {
    /// Every attachment of a class, merged across its cases.
    Class { class_name: String },
    /// The attachments of one case.
    Case {
        class_name: String,
        case_name: String,
    },
}

impl AttachmentQuery {
    pub fn class(class_name: impl Into<String>) -> Self {
        Self::Class {
            class_name: class_name.into(),
        }
    }

    pub fn case(class_name: impl Into<String>, case_name: impl Into<String>) -> Self {
        Self::Case {
            class_name: class_name.into(),
            case_name: case_name.into(),
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            Self::Class { class_name } | Self::Case { class_name, .. } => class_name,
        }
    }
}

/// Immutable result of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentIndex {
    classes: BTreeMap<String, CaseAttachments>,
}

impl AttachmentIndex {
    /// Migrate the legacy flat `class → [names]` form.
    ///
    /// Every list lands in the class-level bucket in its original order;
    /// no per-case attribution is invented.
    pub fn from_flat(flat: BTreeMap<String, Vec<String>>) -> Self {
        let mut builder = IndexBuilder::new();
        for (class_name, names) in flat {
            for name in names {
                builder.record_attachment(&class_name, "", name);
            }
        }
        builder.build()
    }

    /// False when the run produced no attachment data at all.
    pub fn has_attachments(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Total number of recorded (class, case, name) entries.
    pub fn file_count(&self) -> usize {
        self.classes
            .values()
            .flat_map(|cases| cases.values())
            .map(Vec::len)
            .sum()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn cases(&self, class_name: &str) -> Option<&CaseAttachments> {
        self.classes.get(class_name)
    }

    /// Iterate every (class, case, names) bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[String])> {
        self.classes.iter().flat_map(|(class, cases)| {
            cases
                .iter()
                .map(move |(case, names)| (class.as_str(), case.as_str(), names.as_slice()))
        })
    }

    /// Exactly one case's list, or empty.
    pub fn case_attachments(&self, class_name: &str, case_name: &str) -> &[String] {
        self.classes
            .get(class_name)
            .and_then(|cases| cases.get(case_name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All of a class's attachments, cases in name order (the class-level
    /// bucket `""` sorts first), duplicates dropped, order otherwise kept.
    pub fn class_attachments(&self, class_name: &str) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        if let Some(cases) = self.classes.get(class_name) {
            for names in cases.values() {
                for name in names {
                    if !merged.contains(name) {
                        merged.push(name.clone());
                    }
                }
            }
        }
        merged
    }

    /// Answer a query. With `show_class_level` off, class queries are empty.
    pub fn attachments(&self, query: &AttachmentQuery, show_class_level: bool) -> Vec<String> {
        match query {
            AttachmentQuery::Class { class_name } => {
                if show_class_level {
                    self.class_attachments(class_name)
                } else {
                    Vec::new()
                }
            }
            AttachmentQuery::Case {
                class_name,
                case_name,
            } => self.case_attachments(class_name, case_name).to_vec(),
        }
    }
}

/// Accumulates an index during one collection pass.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    classes: BTreeMap<String, CaseAttachments>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class_name: &str, case_name: &str, name: &str) -> bool {
        self.classes
            .get(class_name)
            .and_then(|cases| cases.get(case_name))
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// Append `name` to the (class, case) bucket, creating it on first use.
    /// Returns false if the name was already recorded there.
    pub fn record_attachment(
        &mut self,
        class_name: &str,
        case_name: &str,
        name: impl Into<String>,
    ) -> bool {
        let name = name.into();
        let names = self
            .classes
            .entry(class_name.to_string())
            .or_default()
            .entry(case_name.to_string())
            .or_default();
        if names.contains(&name) {
            return false;
        }
        names.push(name);
        true
    }

    pub fn build(mut self) -> AttachmentIndex {
        for cases in self.classes.values_mut() {
            cases.retain(|_, names| !names.is_empty());
        }
        self.classes.retain(|_, cases| !cases.is_empty());
        AttachmentIndex {
            classes: self.classes,
        }
    }
}
