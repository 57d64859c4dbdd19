//! Writer stage: renders every record and hands it to the output sink.
//!
//! Write order is notebooks (spaces, then boards), notes with attachments
//! (each preceded by its resource record and payload), notes without
//! attachments, tags, and finally tag joins.

use std::path::{Path, PathBuf};

use tracing::{info, trace, warn};

use crate::attachment;
use crate::clock::format_timestamp;
use crate::config::ConverterConfig;
use crate::error::ConvertResult;
use crate::ids::IdentifierAllocator;
use crate::logging::{BYTE_COUNT, RECORD_KIND, RELATIVE_PATH, STAGE, TARGET_ID};
use crate::models::{ConversionReport, FileResource, Note, RecordKind, ResolvedArchive};
use crate::render::{Record, RenderContext};
use crate::tags::TagIndex;
use crate::traits::{Clock, OutputSink};

/// Renders records with the current time and tallies what was written.
pub struct RecordWriter<'a> {
    sink: &'a mut dyn OutputSink,
    clock: &'a dyn Clock,
    config: &'a ConverterConfig,
    report: ConversionReport,
}

impl<'a> RecordWriter<'a> {
    pub fn new(
        sink: &'a mut dyn OutputSink,
        clock: &'a dyn Clock,
        config: &'a ConverterConfig,
    ) -> Self {
        Self {
            sink,
            clock,
            config,
            report: ConversionReport::default(),
        }
    }

    /// Render one record stamped with the clock's current time and persist it.
    pub fn write_record(&mut self, record: Record<'_>) -> ConvertResult<()> {
        let ctx = RenderContext::new(format_timestamp(&self.clock.now()), self.config);
        let path = record.path();
        self.sink.write(&path, record.render(&ctx).as_bytes())?;
        trace!(
            { RECORD_KIND } = %record.kind(),
            { TARGET_ID } = record.id(),
            { RELATIVE_PATH } = %path.display(),
            "write: record"
        );

        self.report.files_written += 1;
        match record.kind() {
            RecordKind::Notebook => self.report.notebooks += 1,
            RecordKind::Note => self.report.notes += 1,
            RecordKind::Resource => self.report.resources += 1,
            RecordKind::Tag => self.report.tags += 1,
            RecordKind::TagJoin => self.report.tag_joins += 1,
        }
        Ok(())
    }

    /// Persist a decoded attachment under the resources directory.
    pub fn write_payload(&mut self, resource: &FileResource, bytes: &[u8]) -> ConvertResult<()> {
        let path = self.payload_path(resource);
        self.sink.write(&path, bytes)?;
        trace!({ RELATIVE_PATH } = %path.display(), { BYTE_COUNT } = bytes.len(), "write: payload");
        self.report.files_written += 1;
        self.report.payload_bytes += bytes.len() as u64;
        Ok(())
    }

    fn payload_path(&self, resource: &FileResource) -> PathBuf {
        Path::new(&self.config.resources_dir).join(resource.payload_file_name())
    }

    /// Write a note that carries an attachment: resource record, payload,
    /// then the note with the embed prepended to its body.
    pub fn write_attached_note(
        &mut self,
        mut note: Note,
        ids: &mut IdentifierAllocator,
    ) -> ConvertResult<Note> {
        let Some(att) = note.attachment.clone() else {
            self.write_record(Record::Note(&note))?;
            return Ok(note);
        };

        let payload = att
            .payload
            .as_deref()
            .map(|p| attachment::decode_payload(&note.source_id, p))
            .transpose()?;
        let resource = attachment::build_resource(ids.allocate(), &att, payload.as_deref());

        self.write_record(Record::Resource(&resource))?;
        match payload {
            Some(bytes) => self.write_payload(&resource, &bytes)?,
            None => {
                warn!(
                    note_id = %note.source_id,
                    resource_id = %resource.id,
                    "write: attachment has no payload in export, writing metadata only"
                );
                self.report.missing_payloads += 1;
            }
        }

        let embed = attachment::embed_reference(&resource, &att);
        note.content = attachment::prepend_embed(&note.content, &embed);
        self.write_record(Record::Note(&note))?;
        Ok(note)
    }

    pub fn into_report(self) -> ConversionReport {
        self.report
    }
}

/// Run the whole writer stage.
pub fn write_archive(
    resolved: ResolvedArchive,
    tags: &TagIndex,
    ids: &mut IdentifierAllocator,
    writer: &mut RecordWriter<'_>,
) -> ConvertResult<()> {
    let ResolvedArchive {
        spaces,
        boards,
        notes,
    } = resolved;

    for notebook in spaces.iter().chain(boards.iter()) {
        writer.write_record(Record::Notebook(notebook))?;
    }
    info!({ STAGE } = "write", notebooks = spaces.len() + boards.len(), "Wrote notebooks");

    let (attached, plain): (Vec<Note>, Vec<Note>) =
        notes.into_iter().partition(|n| n.attachment.is_some());

    let mut written = Vec::with_capacity(attached.len() + plain.len());
    for note in attached {
        written.push(writer.write_attached_note(note, ids)?);
    }
    for note in plain {
        writer.write_record(Record::Note(&note))?;
        written.push(note);
    }
    info!({ STAGE } = "write", notes = written.len(), "Wrote notes");

    for tag in tags.tags() {
        writer.write_record(Record::Tag(tag))?;
    }

    let mut join_count = 0;
    for note in written.iter().filter(|n| !n.tags.is_empty()) {
        for join in tags.joins_for(note, ids)? {
            writer.write_record(Record::TagJoin(&join))?;
            join_count += 1;
        }
    }
    info!({ STAGE } = "write", tags = tags.len(), tag_joins = join_count, "Wrote tags");

    Ok(())
}
