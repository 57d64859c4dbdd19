//! End-to-end conversion: extract → resolve → deduplicate tags → write.

use std::path::Path;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use crate::clock::SystemClock;
use crate::config::ConverterConfig;
use crate::error::ConvertResult;
use crate::extract::extract_archive;
use crate::ids::IdentifierAllocator;
use crate::logging::{DURATION_MS, STAGE};
use crate::models::{ConversionReport, ResolvedArchive};
use crate::resolve::resolve_archive;
use crate::tags::TagIndex;
use crate::traits::{Clock, OutputSink};
use crate::writer::{write_archive, RecordWriter};

/// An export that passed extraction, resolution and tag deduplication and
/// is ready to be written.
#[derive(Debug)]
pub struct PreparedArchive {
    pub resolved: ResolvedArchive,
    pub tags: TagIndex,
}

/// One configured conversion. Owns the run's identifier allocator, so a
/// `Converter` is meant to convert a single archive.
pub struct Converter<C: Clock = SystemClock> {
    config: ConverterConfig,
    clock: C,
    ids: IdentifierAllocator,
}

impl Converter<SystemClock> {
    /// Converter stamping records with the system clock.
    pub fn new(config: ConverterConfig) -> ConvertResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Converter<C> {
    pub fn with_clock(config: ConverterConfig, clock: C) -> ConvertResult<Self> {
        config.validate()?;
        let ids = IdentifierAllocator::new().with_id_bytes(config.id_bytes);
        Ok(Self { config, clock, ids })
    }

    /// Replace the identifier allocator, e.g. with a seeded one.
    pub fn with_allocator(mut self, ids: IdentifierAllocator) -> Self {
        self.ids = ids.with_id_bytes(self.config.id_bytes);
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a parsed export into `sink`.
    ///
    /// Extraction, resolution and tag deduplication all finish before the
    /// first file is written, so shape and reference errors leave the sink
    /// untouched.
    pub fn convert(
        &mut self,
        doc: &Value,
        sink: &mut dyn OutputSink,
    ) -> ConvertResult<ConversionReport> {
        let prepared = self.prepare(doc)?;
        self.write(prepared, sink)
    }

    /// Run every stage that can fail on the input itself. Nothing is
    /// written; callers that create their output lazily do so only after
    /// this succeeds.
    pub fn prepare(&mut self, doc: &Value) -> ConvertResult<PreparedArchive> {
        let archive = extract_archive(doc)?;
        let resolved = resolve_archive(&archive, &mut self.ids)?;
        let tags = TagIndex::build(&resolved.notes, &mut self.ids);
        Ok(PreparedArchive { resolved, tags })
    }

    /// Write a prepared archive into `sink`.
    pub fn write(
        &mut self,
        prepared: PreparedArchive,
        sink: &mut dyn OutputSink,
    ) -> ConvertResult<ConversionReport> {
        let started = Instant::now();
        let PreparedArchive { resolved, tags } = prepared;

        let mut writer = RecordWriter::new(sink, &self.clock, &self.config);
        write_archive(resolved, &tags, &mut self.ids, &mut writer)?;
        let report = writer.into_report();

        info!(
            { STAGE } = "done",
            { DURATION_MS } = started.elapsed().as_millis() as u64,
            files = report.files_written,
            "Conversion finished"
        );
        Ok(report)
    }

    /// Read and parse a JSON export from disk, then [`convert`](Self::convert) it.
    pub fn convert_file(
        &mut self,
        path: &Path,
        sink: &mut dyn OutputSink,
    ) -> ConvertResult<ConversionReport> {
        let raw = std::fs::read_to_string(path)?;
        let doc: Value = serde_json::from_str(&raw)?;
        info!(path = %path.display(), bytes = raw.len(), "Loaded Turtl export");
        self.convert(&doc, sink)
    }
}
