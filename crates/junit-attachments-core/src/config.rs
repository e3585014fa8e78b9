use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AttachmentError, AttachmentResult};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Settings for collection and display, usually read from YAML.
///
/// ```yaml
/// version: 1
/// collect:
///   preserve_directory_structure: true
/// display:
///   show_class_level: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentsConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub collect: CollectOptions,
    #[serde(default)]
    pub display: DisplayOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectOptions {
    /// Keep the directory structure of marker attachments below their
    /// common parent instead of flattening to base names.
    #[serde(default)]
    pub preserve_directory_structure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayOptions {
    /// Show the merged attachment list on class pages.
    #[serde(default = "default_true")]
    pub show_class_level: bool,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            collect: CollectOptions::default(),
            display: DisplayOptions::default(),
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_class_level: true,
        }
    }
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

impl AttachmentsConfig {
    pub fn parse(raw: &str) -> AttachmentResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(raw).map_err(|e| AttachmentError::Config {
            message: format!("failed to parse YAML: {}", e),
        })?;
        if cfg.version != SUPPORTED_CONFIG_VERSION {
            return Err(AttachmentError::Config {
                message: format!(
                    "unsupported config version {} (supported: {})",
                    cfg.version, SUPPORTED_CONFIG_VERSION
                ),
            });
        }
        Ok(cfg)
    }
}

pub fn load_config(path: &Path) -> AttachmentResult<AttachmentsConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| AttachmentError::Config {
        message: format!("failed to read config {}: {}", path.display(), e),
    })?;
    AttachmentsConfig::parse(&raw)
}
