//! Run configuration for the converter.

use std::path::PathBuf;

use crate::defaults;
use crate::error::{ConvertError, ConvertResult};

/// Settings for one conversion run.
///
/// Everything has a default from [`crate::defaults`]; the binary overrides
/// fields from flags and environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Directory the records are written into.
    pub output_dir: PathBuf,
    /// Name of the attachment subdirectory inside `output_dir`.
    pub resources_dir: String,
    /// Random bytes per generated identifier.
    pub id_bytes: usize,
    /// `source` field stamped on notes.
    pub note_source: String,
    /// `source_application` field stamped on notes.
    pub note_source_application: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            resources_dir: defaults::RESOURCES_DIR.to_string(),
            id_bytes: defaults::ID_BYTES,
            note_source: defaults::NOTE_SOURCE.to_string(),
            note_source_application: defaults::NOTE_SOURCE_APPLICATION.to_string(),
        }
    }
}

impl ConverterConfig {
    /// Replace the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Reject settings that would produce an unusable layout.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConvertError::Config("output directory is empty".into()));
        }
        if self.resources_dir.is_empty() {
            return Err(ConvertError::Config(
                "resources directory name is empty".into(),
            ));
        }
        if self.resources_dir.contains(&['/', '\\'][..]) || self.resources_dir == ".." {
            return Err(ConvertError::Config(format!(
                "resources directory must be a single path component: {}",
                self.resources_dir
            )));
        }
        if self.id_bytes == 0 {
            return Err(ConvertError::Config(
                "identifier length must be at least one byte".into(),
            ));
        }
        Ok(())
    }
}
