//! Data model: normalized source records and the Joplin records built from them.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

// =============================================================================
// SOURCE (Turtl export)
// =============================================================================

/// Top-level Turtl container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpace {
    pub source_id: String,
    pub title: String,
}

/// Second-level Turtl container. `space_id` is unresolved at extraction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBoard {
    pub source_id: String,
    pub title: String,
    pub space_id: String,
}

/// Entry of the export's `files` array, kept opaque until a note claims it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFileBlob {
    pub source_id: String,
    pub data: serde_json::Value,
}

/// File attached to a note: the note's own file metadata merged with the
/// matching blob's payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attachment {
    /// Original display filename.
    pub name: String,
    pub mime: Option<String>,
    pub size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Base64 payload; `None` when no blob matched the note.
    pub payload: Option<String>,
}

impl Attachment {
    /// Pixel dimensions, when both are known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNote {
    pub source_id: String,
    pub board_id: Option<String>,
    /// Absent when the export has no space for the note; the board must
    /// then resolve.
    pub space_id: Option<String>,
    pub tags: Vec<String>,
    pub title: String,
    /// Body already translated to Joplin markdown.
    pub body: String,
    /// Turtl note type ("text", "link", "image", "file", "password").
    pub kind: String,
    pub url: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Everything the extractor pulls out of one export.
#[derive(Debug, Clone, Default)]
pub struct SourceArchive {
    pub spaces: Vec<SourceSpace>,
    pub boards: Vec<SourceBoard>,
    pub blobs: HashMap<String, SourceFileBlob>,
    pub notes: Vec<SourceNote>,
}

// =============================================================================
// TARGET (Joplin raw records)
// =============================================================================

/// Joplin item type codes, as written in the `type_` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Note,
    Notebook,
    Resource,
    Tag,
    TagJoin,
}

impl RecordKind {
    pub fn type_code(self) -> u8 {
        match self {
            Self::Note => 1,
            Self::Notebook => 2,
            Self::Resource => 4,
            Self::Tag => 5,
            Self::TagJoin => 6,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => write!(f, "note"),
            Self::Notebook => write!(f, "notebook"),
            Self::Resource => write!(f, "resource"),
            Self::Tag => write!(f, "tag"),
            Self::TagJoin => write!(f, "tag_join"),
        }
    }
}

/// Joplin folder built from a space (`parent_id = None`) or a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notebook {
    pub id: String,
    pub title: String,
    pub source_id: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source_id: String,
    pub parent_id: String,
    /// Tag titles, resolved to tag ids when joins are written.
    pub tags: Vec<String>,
    pub source_url: Option<String>,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagJoin {
    pub id: String,
    pub note_id: String,
    pub tag_id: String,
}

/// Metadata record for an attachment payload stored under `resources/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub file_extension: String,
    pub mime: String,
    pub size: u64,
}

impl FileResource {
    /// Name of the payload file inside the resources directory.
    pub fn payload_file_name(&self) -> String {
        format!("{}.{}", self.id, self.file_extension)
    }
}

/// Output of the resolver: notebooks and notes with final ids and parents.
#[derive(Debug, Clone, Default)]
pub struct ResolvedArchive {
    pub spaces: Vec<Notebook>,
    pub boards: Vec<Notebook>,
    pub notes: Vec<Note>,
}

impl ResolvedArchive {
    /// Spaces then boards, the order notebooks are written in.
    pub fn notebooks(&self) -> impl Iterator<Item = &Notebook> {
        self.spaces.iter().chain(self.boards.iter())
    }
}

/// Counts for one completed run, printed by the binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub notebooks: usize,
    pub notes: usize,
    pub resources: usize,
    pub tags: usize,
    pub tag_joins: usize,
    /// Resource records whose payload was missing from the export.
    pub missing_payloads: usize,
    pub files_written: usize,
    pub payload_bytes: u64,
}
