//! Centralized default constants for the converter.
//!
//! The binary and the library both read from here instead of repeating
//! literals. Values mirror what Joplin's desktop client writes into its own
//! raw exports.

// =============================================================================
// OUTPUT LAYOUT
// =============================================================================

/// Directory the raw records are written into.
pub const OUTPUT_DIR: &str = "raw";

/// Subdirectory (inside [`OUTPUT_DIR`]) holding attachment payloads.
pub const RESOURCES_DIR: &str = "resources";

/// Extension of every record file.
pub const RECORD_EXTENSION: &str = "md";

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Random bytes per identifier. Hex-encoded this yields 32 characters,
/// the length Joplin uses for its own ids.
pub const ID_BYTES: usize = 16;

// =============================================================================
// NOTE PROVENANCE
// =============================================================================

/// Value of the `source` field on every note.
pub const NOTE_SOURCE: &str = "joplin-desktop";

/// Value of the `source_application` field on every note.
pub const NOTE_SOURCE_APPLICATION: &str = "net.cozic.joplin-desktop";

/// Markdown markup language code.
pub const MARKUP_MARKDOWN: u8 = 1;

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// MIME type used when neither metadata nor magic bytes identify a payload.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Extension used when neither the filename nor the MIME type yield one.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Note kind assumed when the source omits `type`.
pub const NOTE_KIND: &str = "text";
