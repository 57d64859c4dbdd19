//! Identity & hierarchy resolution.
//!
//! Spaces become top-level notebooks, boards become notebooks under their
//! space's notebook, and every note gets exactly one parent: its board's
//! notebook when the board id resolves, otherwise its space's notebook.
//! Lookups go through maps built once from the converted notebooks.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{ConvertError, ConvertResult};
use crate::ids::IdentifierAllocator;
use crate::logging::{SOURCE_ID, STAGE, TARGET_ID};
use crate::models::{
    Notebook, Note, ResolvedArchive, SourceArchive, SourceBoard, SourceNote, SourceSpace,
};

/// Notebook ids keyed by the source id they were built from.
#[derive(Debug, Default)]
pub struct NotebookIndex<'a> {
    by_source: HashMap<&'a str, &'a str>,
}

impl<'a> NotebookIndex<'a> {
    pub fn build(notebooks: &'a [Notebook]) -> Self {
        Self {
            by_source: notebooks
                .iter()
                .map(|nb| (nb.source_id.as_str(), nb.id.as_str()))
                .collect(),
        }
    }

    pub fn get(&self, source_id: &str) -> Option<&'a str> {
        self.by_source.get(source_id).copied()
    }
}

/// Run the whole resolver stage.
pub fn resolve_archive(
    archive: &SourceArchive,
    ids: &mut IdentifierAllocator,
) -> ConvertResult<ResolvedArchive> {
    let spaces = convert_spaces(&archive.spaces, ids);
    let boards = convert_boards(&archive.boards, &spaces, ids)?;
    let notes = convert_notes(&archive.notes, &spaces, &boards, ids)?;

    info!(
        { STAGE } = "resolve",
        spaces = spaces.len(),
        boards = boards.len(),
        notes = notes.len(),
        "Resolved notebook hierarchy"
    );

    Ok(ResolvedArchive {
        spaces,
        boards,
        notes,
    })
}

/// Spaces are always top-level.
pub fn convert_spaces(spaces: &[SourceSpace], ids: &mut IdentifierAllocator) -> Vec<Notebook> {
    spaces
        .iter()
        .map(|space| Notebook {
            id: ids.allocate(),
            title: space.title.clone(),
            source_id: space.source_id.clone(),
            parent_id: None,
        })
        .collect()
}

/// Boards hang off the notebook of their space. An unknown space is fatal.
pub fn convert_boards(
    boards: &[SourceBoard],
    spaces: &[Notebook],
    ids: &mut IdentifierAllocator,
) -> ConvertResult<Vec<Notebook>> {
    let space_index = NotebookIndex::build(spaces);
    boards
        .iter()
        .map(|board| {
            let parent = space_index.get(&board.space_id).ok_or_else(|| {
                ConvertError::UnknownSpace {
                    board_id: board.source_id.clone(),
                    space_id: board.space_id.clone(),
                }
            })?;
            Ok(Notebook {
                id: ids.allocate(),
                title: board.title.clone(),
                source_id: board.source_id.clone(),
                parent_id: Some(parent.to_string()),
            })
        })
        .collect()
}

/// Give every note an id and a parent notebook.
pub fn convert_notes(
    notes: &[SourceNote],
    spaces: &[Notebook],
    boards: &[Notebook],
    ids: &mut IdentifierAllocator,
) -> ConvertResult<Vec<Note>> {
    let space_index = NotebookIndex::build(spaces);
    let board_index = NotebookIndex::build(boards);

    notes
        .iter()
        .map(|note| {
            let parent_id = select_parent(note, &space_index, &board_index)?;
            let id = ids.allocate();
            debug!({ SOURCE_ID } = %note.source_id, { TARGET_ID } = %id, parent_id, "resolve: note");
            Ok(Note {
                id,
                title: note.title.clone(),
                content: note.body.clone(),
                source_id: note.source_id.clone(),
                parent_id: parent_id.to_string(),
                tags: note.tags.clone(),
                source_url: note.url.clone(),
                attachment: note.attachment.clone(),
            })
        })
        .collect()
}

/// Board first, then space. A board id that matches nothing falls back to
/// the space rather than failing.
pub fn select_parent<'a>(
    note: &SourceNote,
    spaces: &NotebookIndex<'a>,
    boards: &NotebookIndex<'a>,
) -> ConvertResult<&'a str> {
    if let Some(board_parent) = note.board_id.as_deref().and_then(|b| boards.get(b)) {
        return Ok(board_parent);
    }
    if let Some(board_id) = note.board_id.as_deref() {
        debug!(
            note_id = %note.source_id,
            board_id,
            "resolve: board not found, falling back to space"
        );
    }
    note.space_id
        .as_deref()
        .and_then(|s| spaces.get(s))
        .ok_or_else(|| ConvertError::UnresolvedParent {
            note_id: note.source_id.clone(),
            space_id: note.space_id.clone().unwrap_or_default(),
        })
}
