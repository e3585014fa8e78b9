//! Filesystem seams used by the collector.
//!
//! [`Workspace`] is the ephemeral execution workspace the test run wrote
//! into; [`ArtifactStore`] is the durable attachment root of the run. Both
//! come with a local-disk implementation. Remote transports only need to
//! provide the same primitives.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{AttachmentError, AttachmentResult};

/// Read access to the test execution workspace.
pub trait Workspace {
    /// Workspace root directory.
    fn root(&self) -> &Path;

    /// Resolve a workspace-relative or absolute reference.
    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root().join(path)
        }
    }

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Every file below `dir`, recursively, relative to `dir`, sorted.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
}

/// Durable storage below the attachment root of one run.
///
/// All paths are relative to [`ArtifactStore::root`].
pub trait ArtifactStore {
    fn root(&self) -> &Path;

    fn exists(&self, rel: &Path) -> bool;

    fn is_dir(&self, rel: &Path) -> bool;

    /// Create `rel` and every missing parent directory.
    fn mkdirs(&self, rel: &Path) -> AttachmentResult<()>;

    /// Write `reader` to `rel`. The parent directory must exist.
    /// Returns the number of bytes written.
    fn write(&self, rel: &Path, reader: &mut dyn Read) -> AttachmentResult<u64>;
}

/// Workspace on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Workspace for LocalWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(dir) {
                files.push(rel.to_path_buf());
            }
        }
        Ok(files)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(path)?))
    }
}

/// Attachment root on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store for a run directory, rooted at `{run_root}/junit-attachments`.
    pub fn for_run(run_root: &Path) -> Self {
        Self::new(crate::paths::attachment_root(run_root))
    }

    fn full(&self, rel: &Path) -> AttachmentResult<PathBuf> {
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(AttachmentError::storage(
                self.root.join(rel),
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "path escapes the attachment root",
                ),
            ));
        }
        Ok(self.root.join(rel))
    }
}

impl ArtifactStore for LocalStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, rel: &Path) -> bool {
        self.full(rel).map(|p| p.exists()).unwrap_or(false)
    }

    fn is_dir(&self, rel: &Path) -> bool {
        self.full(rel).map(|p| p.is_dir()).unwrap_or(false)
    }

    fn mkdirs(&self, rel: &Path) -> AttachmentResult<()> {
        let dir = self.full(rel)?;
        fs::create_dir_all(&dir).map_err(|e| AttachmentError::storage(&dir, e))
    }

    fn write(&self, rel: &Path, reader: &mut dyn Read) -> AttachmentResult<u64> {
        let dest = self.full(rel)?;
        let mut file = fs::File::create(&dest).map_err(|e| AttachmentError::storage(&dest, e))?;
        let bytes = io::copy(reader, &mut file).map_err(|e| AttachmentError::storage(&dest, e))?;
        debug!(path = %dest.display(), bytes, "stored attachment");
        Ok(bytes)
    }
}
