//! Extractor: projects a parsed Turtl export into [`SourceArchive`].
//!
//! The export is a JSON object with four top-level arrays (`spaces`,
//! `boards`, `files`, `notes`). All four must be present before anything is
//! projected. Each element is deserialized into a private `Raw*` shape that
//! encodes which fields are required, then normalized.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::defaults;
use crate::error::{ConvertError, ConvertResult};
use crate::logging::{RECORD_COUNT, STAGE};
use crate::markdown;
use crate::models::{
    Attachment, SourceArchive, SourceBoard, SourceFileBlob, SourceNote, SourceSpace,
};

const TOP_LEVEL_ARRAYS: [&str; 4] = ["spaces", "boards", "files", "notes"];

#[derive(Deserialize)]
struct RawSpace {
    id: String,
    title: String,
}

#[derive(Deserialize)]
struct RawBoard {
    id: String,
    title: String,
    space_id: String,
}

#[derive(Deserialize)]
struct RawFile {
    id: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize, Default)]
struct RawImageMeta {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Deserialize, Default)]
struct RawFileMeta {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type", alias = "mime")]
    mime: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    meta: Option<RawImageMeta>,
}

#[derive(Deserialize)]
struct RawNote {
    id: String,
    #[serde(default)]
    space_id: Option<String>,
    #[serde(default)]
    board_id: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    has_file: Value,
    #[serde(default)]
    file: Option<RawFileMeta>,
}

/// Project the whole export. Fails before projecting anything if a
/// top-level array is missing.
pub fn extract_archive(doc: &Value) -> ConvertResult<SourceArchive> {
    let [spaces, boards, files, notes] = top_level_arrays(doc)?;

    let spaces = extract_spaces(spaces)?;
    let boards = extract_boards(boards)?;
    let blobs = extract_blobs(files)?;
    let notes = extract_notes(notes, &blobs)?;

    info!(
        { STAGE } = "extract",
        spaces = spaces.len(),
        boards = boards.len(),
        files = blobs.len(),
        notes = notes.len(),
        "Extracted Turtl archive"
    );

    Ok(SourceArchive {
        spaces,
        boards,
        blobs,
        notes,
    })
}

fn top_level_arrays(doc: &Value) -> ConvertResult<[&Vec<Value>; 4]> {
    let mut found = Vec::with_capacity(TOP_LEVEL_ARRAYS.len());
    for name in TOP_LEVEL_ARRAYS {
        let array = doc
            .get(name)
            .and_then(Value::as_array)
            .ok_or(ConvertError::MissingArray(name))?;
        found.push(array);
    }
    Ok([found[0], found[1], found[2], found[3]])
}

fn parse_record<'a, T: Deserialize<'a>>(
    kind: &'static str,
    index: usize,
    value: &'a Value,
) -> ConvertResult<T> {
    T::deserialize(value).map_err(|e| ConvertError::InvalidRecord {
        kind,
        index,
        reason: e.to_string(),
    })
}

/// Spaces are an identity projection of id and title.
pub fn extract_spaces(items: &[Value]) -> ConvertResult<Vec<SourceSpace>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let raw: RawSpace = parse_record("space", i, item)?;
            Ok(SourceSpace {
                source_id: raw.id,
                title: raw.title,
            })
        })
        .collect()
}

/// Boards keep their owning space id unresolved.
pub fn extract_boards(items: &[Value]) -> ConvertResult<Vec<SourceBoard>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let raw: RawBoard = parse_record("board", i, item)?;
            Ok(SourceBoard {
                source_id: raw.id,
                title: raw.title,
                space_id: raw.space_id,
            })
        })
        .collect()
}

/// File blobs become a lookup table keyed by id.
pub fn extract_blobs(items: &[Value]) -> ConvertResult<HashMap<String, SourceFileBlob>> {
    let mut blobs = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let raw: RawFile = parse_record("file", i, item)?;
        blobs.insert(
            raw.id.clone(),
            SourceFileBlob {
                source_id: raw.id,
                data: raw.data,
            },
        );
    }
    Ok(blobs)
}

/// Notes get their body translated and their attachment resolved against
/// `blobs`.
pub fn extract_notes(
    items: &[Value],
    blobs: &HashMap<String, SourceFileBlob>,
) -> ConvertResult<Vec<SourceNote>> {
    let mut notes = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let raw: RawNote = parse_record("note", i, item)?;

        let attachment = match raw.file {
            Some(file) if has_attachment(&raw.has_file, &file) => {
                Some(merge_attachment(&raw.id, file, blobs))
            }
            _ => None,
        };

        notes.push(SourceNote {
            body: markdown::translate(raw.text.as_deref().unwrap_or_default()),
            source_id: raw.id,
            board_id: raw.board_id.filter(|b| !b.is_empty()),
            space_id: raw.space_id.filter(|s| !s.is_empty()),
            tags: raw.tags.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            kind: raw
                .kind
                .unwrap_or_else(|| defaults::NOTE_KIND.to_string()),
            url: raw.url.filter(|u| !u.is_empty()),
            attachment,
        });
    }
    debug!({ RECORD_COUNT } = notes.len(), "extract: notes projected");
    Ok(notes)
}

/// Heuristic: some exports drop the `has_file` flag but still embed the
/// file metadata, so a non-empty file name also counts.
fn has_attachment(flag: &Value, file: &RawFileMeta) -> bool {
    let flagged = match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_u64().is_some_and(|n| n != 0),
        _ => false,
    };
    flagged || file.name.as_deref().is_some_and(|n| !n.is_empty())
}

/// Merge the note's file metadata with the blob stored under the note id
/// (or, failing that, under the file's own id). Metadata the note lacks is
/// taken from the blob when the blob is an object.
fn merge_attachment(
    note_id: &str,
    file: RawFileMeta,
    blobs: &HashMap<String, SourceFileBlob>,
) -> Attachment {
    let blob = blobs
        .get(note_id)
        .or_else(|| file.id.as_deref().and_then(|id| blobs.get(id)));
    if blob.is_none() {
        debug!(note_id, "extract: attachment has no matching blob");
    }

    let blob_meta = blob
        .filter(|b| b.data.is_object())
        .and_then(|b| RawFileMeta::deserialize(&b.data).ok())
        .unwrap_or_default();
    let meta = file.meta.unwrap_or_default();

    Attachment {
        name: file
            .name
            .filter(|n| !n.is_empty())
            .or(blob_meta.name)
            .unwrap_or_default(),
        mime: file.mime.filter(|m| !m.is_empty()).or(blob_meta.mime),
        size: file.size.or(blob_meta.size),
        width: meta.width.or(file.width).or(blob_meta.width),
        height: meta.height.or(file.height).or(blob_meta.height),
        payload: blob.and_then(|b| blob_payload(&b.data)),
    }
}

/// The base64 text of a blob: either the value itself or its `data`/`body`
/// field.
fn blob_payload(data: &Value) -> Option<String> {
    match data {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("data")
            .or_else(|| map.get("body"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
