//! [`OutputSink`] implementations.
//!
//! - [`DirectorySink`] writes under a root directory with atomic
//!   temp-file-and-rename writes.
//! - [`MemorySink`] keeps everything in a sorted map, for tests and dry runs.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::error::ConvertResult;
use crate::traits::OutputSink;

/// Filesystem sink rooted at the output directory.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create `root` and `root/<resources_dir>` if they do not exist yet.
    pub fn create(root: impl Into<PathBuf>, resources_dir: &str) -> ConvertResult<Self> {
        let root = root.into();
        let resources = root.join(resources_dir);
        fs::create_dir_all(&resources).map_err(|e| {
            warn!(dir = %resources.display(), error = %e, "sink: create_dir_all failed");
            e
        })?;
        Ok(Self { root })
    }

    /// The output root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, relative: &Path, contents: &[u8]) -> ConvertResult<()> {
        let full_path = self.root.join(relative);
        trace!(path = %relative.display(), size = contents.len(), "sink: write");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "sink: File::create failed");
            e
        })?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &full_path).map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "sink: rename failed");
            e
        })?;

        // rw-r--r--, attachments are never executable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, fs::Permissions::from_mode(0o644))?;
        }

        Ok(())
    }
}

/// In-memory sink keyed by relative path.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every file written so far.
    pub fn files(&self) -> &BTreeMap<PathBuf, Vec<u8>> {
        &self.files
    }

    /// Contents of one file.
    pub fn get(&self, relative: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(relative.as_ref()).map(Vec::as_slice)
    }

    /// Contents of one file as UTF-8 text.
    pub fn text(&self, relative: impl AsRef<Path>) -> Option<&str> {
        self.get(relative).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of files written.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, relative: &Path, contents: &[u8]) -> ConvertResult<()> {
        self.files.insert(relative.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
