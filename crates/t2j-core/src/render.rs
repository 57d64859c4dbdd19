//! Serialization of records into Joplin's raw text format.
//!
//! A record file is an optional preamble (title line, blank line, and for
//! notes the body plus another blank line) followed by `key: value` lines
//! ending in `type_`. Each record variant owns the ordered list of its
//! fields; [`Record::render`] only handles layout.

use std::path::PathBuf;

use crate::config::ConverterConfig;
use crate::defaults;
use crate::models::{FileResource, Note, Notebook, RecordKind, Tag, TagJoin};

/// Values shared by every record rendered at one instant.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// ISO-8601 stamp used for all four time fields.
    pub timestamp: String,
    pub note_source: &'a str,
    pub note_source_application: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(timestamp: String, config: &'a ConverterConfig) -> Self {
        Self {
            timestamp,
            note_source: &config.note_source,
            note_source_application: &config.note_source_application,
        }
    }
}

/// Borrowed view of any record that can be written.
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    Notebook(&'a Notebook),
    Note(&'a Note),
    Resource(&'a FileResource),
    Tag(&'a Tag),
    TagJoin(&'a TagJoin),
}

type Fields = Vec<(&'static str, String)>;

impl<'a> Record<'a> {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Notebook(_) => RecordKind::Notebook,
            Self::Note(_) => RecordKind::Note,
            Self::Resource(_) => RecordKind::Resource,
            Self::Tag(_) => RecordKind::Tag,
            Self::TagJoin(_) => RecordKind::TagJoin,
        }
    }

    pub fn id(&self) -> &'a str {
        match *self {
            Self::Notebook(r) => &r.id,
            Self::Note(r) => &r.id,
            Self::Resource(r) => &r.id,
            Self::Tag(r) => &r.id,
            Self::TagJoin(r) => &r.id,
        }
    }

    /// File name of the record inside the output root.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.id(), defaults::RECORD_EXTENSION))
    }

    /// Title line; tag joins have none.
    fn title(&self) -> Option<&'a str> {
        match *self {
            Self::Notebook(r) => Some(&r.title),
            Self::Note(r) => Some(&r.title),
            Self::Resource(r) => Some(&r.title),
            Self::Tag(r) => Some(&r.title),
            Self::TagJoin(_) => None,
        }
    }

    /// Ordered `(key, value)` pairs, `type_` last.
    pub fn fields(&self, ctx: &RenderContext<'_>) -> Fields {
        let ts = ctx.timestamp.as_str();
        let mut fields: Fields = match self {
            Self::Notebook(nb) => {
                let mut f = vec![("id", nb.id.clone())];
                f.extend(timestamps(ts));
                f.extend(metadata(ts));
                f.push(("parent_id", nb.parent_id.clone().unwrap_or_default()));
                f
            }
            Self::Note(note) => {
                let mut f = vec![
                    ("id", note.id.clone()),
                    ("parent_id", note.parent_id.clone()),
                ];
                f.extend(timestamps(ts));
                f.extend(note_fields(note, ctx));
                f.extend(metadata(ts));
                f
            }
            Self::Resource(res) => vec![
                ("id", res.id.clone()),
                ("mime", res.mime.clone()),
                ("filename", res.filename.clone()),
                ("created_time", ts.to_string()),
                ("updated_time", ts.to_string()),
                ("user_created_time", ts.to_string()),
                ("user_updated_time", ts.to_string()),
                ("file_extension", res.file_extension.clone()),
                ("encryption_cipher_text", String::new()),
                ("encryption_applied", "0".to_string()),
                ("encryption_blob_encrypted", "0".to_string()),
                ("size", res.size.to_string()),
                ("is_shared", "0".to_string()),
            ],
            Self::Tag(tag) => {
                let mut f = vec![("id", tag.id.clone())];
                f.extend(timestamps(ts));
                f.extend(metadata(ts));
                f.push(("parent_id", String::new()));
                f
            }
            Self::TagJoin(join) => {
                let mut f = vec![
                    ("id", join.id.clone()),
                    ("note_id", join.note_id.clone()),
                    ("tag_id", join.tag_id.clone()),
                ];
                f.extend(timestamps(ts));
                f.extend(metadata(ts));
                f
            }
        };
        fields.push(("type_", self.kind().type_code().to_string()));
        fields
    }

    /// Full file contents, without a trailing newline.
    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        if let Some(title) = self.title() {
            out.push_str(title);
            out.push_str("\n\n");
        }
        if let Self::Note(note) = self {
            out.push_str(&note.content);
            out.push_str("\n\n");
        }

        let lines: Vec<String> = self
            .fields(ctx)
            .into_iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    format!("{}:", key)
                } else {
                    format!("{}: {}", key, value)
                }
            })
            .collect();
        out.push_str(&lines.join("\n"));
        out
    }
}

fn timestamps(ts: &str) -> [(&'static str, String); 2] {
    [
        ("created_time", ts.to_string()),
        ("updated_time", ts.to_string()),
    ]
}

fn metadata(ts: &str) -> [(&'static str, String); 5] {
    [
        ("user_created_time", ts.to_string()),
        ("user_updated_time", ts.to_string()),
        ("encryption_cipher_text", String::new()),
        ("encryption_applied", "0".to_string()),
        ("is_shared", "0".to_string()),
    ]
}

fn note_fields(note: &Note, ctx: &RenderContext<'_>) -> Fields {
    vec![
        ("is_conflict", "0".to_string()),
        ("latitude", "0.00000000".to_string()),
        ("longitude", "0.00000000".to_string()),
        ("altitude", "0.0000".to_string()),
        ("author", String::new()),
        ("source_url", note.source_url.clone().unwrap_or_default()),
        ("is_todo", "0".to_string()),
        ("todo_due", "0".to_string()),
        ("todo_completed", "0".to_string()),
        ("source", ctx.note_source.to_string()),
        ("source_application", ctx.note_source_application.to_string()),
        ("application_data", String::new()),
        ("order", "0".to_string()),
        ("markup_language", defaults::MARKUP_MARKDOWN.to_string()),
    ]
}
