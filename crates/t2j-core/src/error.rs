//! Error types for the conversion pipeline.

use thiserror::Error;

/// Result type alias using the converter's error type.
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Every failure the pipeline can surface. All of them abort the run.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A required top-level array is absent or not an array.
    #[error("Missing top-level array: {0}")]
    MissingArray(&'static str),

    /// An element of a top-level array lacks a required field or has the wrong shape.
    #[error("Invalid {kind} record at index {index}: {reason}")]
    InvalidRecord {
        kind: &'static str,
        index: usize,
        reason: String,
    },

    /// A board points at a space that is not in the archive.
    #[error("Board {board_id} references unknown space {space_id}")]
    UnknownSpace { board_id: String, space_id: String },

    /// Neither the note's board nor its space could be resolved.
    #[error("Note {note_id} has no resolvable parent (space {space_id})")]
    UnresolvedParent { note_id: String, space_id: String },

    /// A note carries a tag title that was never registered.
    #[error("Tag not found: {0}")]
    UnknownTag(String),

    /// An attachment payload could not be decoded.
    #[error("Invalid attachment payload for note {note_id}: {reason}")]
    InvalidPayload { note_id: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConvertError {
    fn from(e: serde_json::Error) -> Self {
        ConvertError::Serialization(e.to_string())
    }
}
