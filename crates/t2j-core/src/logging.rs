//! Structured logging field name constants.
//!
//! Every stage logs with these names so a JSON log of a run can be filtered
//! by entity or stage without guessing at spellings.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Run aborted |
//! | WARN  | Attachment without payload, fallback applied |
//! | INFO  | Stage start/finish with counts |
//! | DEBUG | Parent resolution, fallback decisions |
//! | TRACE | Per-record writes |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Pipeline stage emitting the event.
/// Values: "extract", "resolve", "tags", "write"
pub const STAGE: &str = "stage";

/// Identifier in the source archive.
pub const SOURCE_ID: &str = "source_id";

/// Generated identifier in the output.
pub const TARGET_ID: &str = "target_id";

/// Record kind ("notebook", "note", "resource", "tag", "tag_join").
pub const RECORD_KIND: &str = "record_kind";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of records produced by a stage.
pub const RECORD_COUNT: &str = "record_count";

/// Byte length of a written payload.
pub const BYTE_COUNT: &str = "byte_count";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

// ─── Output fields ─────────────────────────────────────────────────────────

/// Path relative to the output root.
pub const RELATIVE_PATH: &str = "path";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
