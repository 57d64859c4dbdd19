//! Attachment payload decoding and resource metadata.
//!
//! Turns a note's [`Attachment`] into a [`FileResource`]: decodes the base64
//! payload, settles on an extension and MIME type, and builds the markdown
//! embed that points the note at the resource.

use std::path::Path;

use base64::Engine;

use crate::defaults;
use crate::error::{ConvertError, ConvertResult};
use crate::models::{Attachment, FileResource};

/// Known MIME ↔ extension pairs, used when the filename has no extension
/// or the metadata has no MIME type.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("application/json", "json"),
    ("text/plain", "txt"),
    ("text/markdown", "md"),
    ("text/html", "html"),
    ("text/csv", "csv"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("video/mp4", "mp4"),
];

/// Decode a base64 payload. Accepts `data:` URIs and embedded whitespace,
/// with or without padding.
pub fn decode_payload(note_id: &str, payload: &str) -> ConvertResult<Vec<u8>> {
    let body = match payload.find(";base64,") {
        Some(pos) if payload.starts_with("data:") => &payload[pos + ";base64,".len()..],
        _ => payload,
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    base64::engine::general_purpose::STANDARD
        .decode(&compact)
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(&compact))
        .map_err(|e| ConvertError::InvalidPayload {
            note_id: note_id.to_string(),
            reason: format!("Invalid base64: {}", e),
        })
}

/// Lowercased extension of `name`, if it has a non-empty one.
pub fn extension_from_name(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

fn extension_from_mime(mime: &str) -> Option<&'static str> {
    let mime = mime.to_lowercase();
    MIME_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
}

fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    MIME_EXTENSIONS
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(m, _)| *m)
}

/// Extension for the payload file: filename, then magic bytes, then the
/// MIME table, then [`defaults::FALLBACK_EXTENSION`].
pub fn resolve_extension(attachment: &Attachment, payload: Option<&[u8]>) -> String {
    if let Some(ext) = extension_from_name(&attachment.name) {
        return ext;
    }
    if let Some(kind) = payload.and_then(infer::get) {
        return kind.extension().to_string();
    }
    attachment
        .mime
        .as_deref()
        .and_then(extension_from_mime)
        .unwrap_or(defaults::FALLBACK_EXTENSION)
        .to_string()
}

/// MIME type for the resource: metadata, then magic bytes, then the
/// extension, then [`defaults::FALLBACK_MIME`].
pub fn resolve_mime(attachment: &Attachment, payload: Option<&[u8]>, extension: &str) -> String {
    if let Some(mime) = attachment.mime.as_deref().filter(|m| !m.is_empty()) {
        return mime.to_string();
    }
    if let Some(kind) = payload.and_then(infer::get) {
        return kind.mime_type().to_string();
    }
    mime_from_extension(extension)
        .unwrap_or(defaults::FALLBACK_MIME)
        .to_string()
}

/// Resource record for `attachment` under the freshly allocated `id`.
pub fn build_resource(id: String, attachment: &Attachment, payload: Option<&[u8]>) -> FileResource {
    let file_extension = resolve_extension(attachment, payload);
    let mime = resolve_mime(attachment, payload, &file_extension);
    let size = attachment
        .size
        .or_else(|| payload.map(|p| p.len() as u64))
        .unwrap_or(0);
    let filename = if attachment.name.is_empty() {
        format!("{}.{}", id, file_extension)
    } else {
        attachment.name.clone()
    };

    FileResource {
        id,
        title: filename.clone(),
        filename,
        file_extension,
        mime,
        size,
    }
}

/// Markdown that embeds `resource` in a note body.
///
/// Images with known dimensions use an `<img>` tag so the size survives;
/// other images use `![..]`, everything else a plain resource link.
pub fn embed_reference(resource: &FileResource, attachment: &Attachment) -> String {
    let is_image = resource.mime.starts_with("image/");
    match (is_image, attachment.dimensions()) {
        (true, Some((w, h))) => format!(
            "<img src=\":/{}\" alt=\"{}\" width=\"{}\" height=\"{}\" />",
            resource.id,
            resource.title.replace('"', "&quot;"),
            w,
            h
        ),
        (true, None) => format!("![{}](:/{})", resource.title, resource.id),
        (false, _) => format!("[{}](:/{})", resource.title, resource.id),
    }
}

/// Put `embed` above the existing body, separated by a blank line.
pub fn prepend_embed(content: &str, embed: &str) -> String {
    if content.is_empty() {
        embed.to_string()
    } else {
        format!("{}\n\n{}", embed, content)
    }
}
