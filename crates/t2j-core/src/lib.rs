//! # t2j-core
//!
//! Conversion pipeline from a Turtl JSON export to a Joplin "raw" directory.
//!
//! The pipeline runs four stages in order, each consuming the full output
//! of the previous one:
//!
//! 1. [`extract`] projects the export's `spaces`, `boards`, `files` and
//!    `notes` arrays into normalized records and translates note markdown.
//! 2. [`resolve`] gives every space and board a fresh id and a notebook,
//!    and picks each note's parent notebook.
//! 3. [`tags`] deduplicates tag titles across notes.
//! 4. [`writer`] renders every record (see [`render`]), decodes attachment
//!    payloads and hands files to an [`OutputSink`].
//!
//! All ids come from one [`IdentifierAllocator`], so they are unique across
//! record kinds.
//!
//! ## Example
//!
//! ```
//! use t2j_core::{Converter, ConverterConfig, FixedClock, MemorySink};
//!
//! let doc = serde_json::json!({
//!     "spaces": [{ "id": "s1", "title": "Home" }],
//!     "boards": [],
//!     "files": [],
//!     "notes": [{ "id": "n1", "space_id": "s1", "title": "Hi", "text": "__bold__" }]
//! });
//!
//! let clock = FixedClock::parse("2024-01-02T03:04:05Z").unwrap();
//! let mut converter = Converter::with_clock(ConverterConfig::default(), clock).unwrap();
//! let mut sink = MemorySink::new();
//! let report = converter.convert(&doc, &mut sink).unwrap();
//!
//! assert_eq!(report.notebooks, 1);
//! assert_eq!(report.notes, 1);
//! assert_eq!(sink.len(), 2);
//! ```

pub mod attachment;
pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod ids;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod sink;
pub mod tags;
pub mod traits;
pub mod writer;

// Re-export commonly used types at crate root
pub use clock::{FixedClock, SystemClock};
pub use config::ConverterConfig;
pub use error::{ConvertError, ConvertResult};
pub use ids::IdentifierAllocator;
pub use models::*;
pub use pipeline::{Converter, PreparedArchive};
pub use sink::{DirectorySink, MemorySink};
pub use tags::TagIndex;
pub use traits::{Clock, OutputSink};
