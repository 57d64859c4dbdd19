//! Seam traits between the pipeline and its collaborators.
//!
//! The pipeline never touches the wall clock or the filesystem directly:
//! it asks a [`Clock`] for the stamp to put on records and hands finished
//! files to an [`OutputSink`].

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::ConvertResult;

/// Source of the "current time" stamped on every record.
pub trait Clock {
    /// The instant to stamp on a record being written now.
    fn now(&self) -> DateTime<Utc>;
}

/// Destination for rendered records and attachment payloads.
///
/// Paths are relative to the output root, e.g. `0a1b....md` or
/// `resources/0a1b....png`.
pub trait OutputSink {
    /// Persist `contents` at `relative`, replacing anything already there.
    fn write(&mut self, relative: &Path, contents: &[u8]) -> ConvertResult<()>;
}
