//! Tag deduplication and tag-join synthesis.
//!
//! Turtl stores tags as plain strings on each note. Joplin wants one tag
//! record per distinct title plus one join record per (note, tag) pair.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::error::{ConvertError, ConvertResult};
use crate::ids::IdentifierAllocator;
use crate::logging::{RECORD_COUNT, STAGE};
use crate::models::{Note, Tag, TagJoin};

/// Distinct tags of a run, keyed by exact title.
///
/// Tags keep first-seen order so output is stable for a given input.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: Vec<Tag>,
    by_title: HashMap<String, usize>,
}

impl TagIndex {
    /// Collect every tag title across `notes` and give each distinct one an id.
    pub fn build(notes: &[Note], ids: &mut IdentifierAllocator) -> Self {
        let mut index = Self::default();
        for title in notes.iter().flat_map(|n| n.tags.iter()) {
            index.insert(title, ids);
        }
        info!({ STAGE } = "tags", { RECORD_COUNT } = index.len(), "Deduplicated tags");
        index
    }

    /// Register `title` if it is new. Returns the tag's id either way.
    pub fn insert(&mut self, title: &str, ids: &mut IdentifierAllocator) -> &str {
        let pos = match self.by_title.get(title) {
            Some(&pos) => pos,
            None => {
                self.tags.push(Tag {
                    id: ids.allocate(),
                    title: title.to_string(),
                });
                let pos = self.tags.len() - 1;
                self.by_title.insert(title.to_string(), pos);
                pos
            }
        };
        &self.tags[pos].id
    }

    /// Id of the tag titled `title`.
    pub fn id_of(&self, title: &str) -> ConvertResult<&str> {
        self.by_title
            .get(title)
            .map(|&pos| self.tags[pos].id.as_str())
            .ok_or_else(|| ConvertError::UnknownTag(title.to_string()))
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Join records for one note, one per distinct tag title it carries.
    pub fn joins_for(
        &self,
        note: &Note,
        ids: &mut IdentifierAllocator,
    ) -> ConvertResult<Vec<TagJoin>> {
        let mut seen = HashSet::new();
        note.tags
            .iter()
            .filter(|title| seen.insert(title.as_str()))
            .map(|title| {
                Ok(TagJoin {
                    id: ids.allocate(),
                    note_id: note.id.clone(),
                    tag_id: self.id_of(title)?.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, tags: &[&str]) -> Note {
        Note {
            id: id.into(),
            title: String::new(),
            content: String::new(),
            source_id: id.into(),
            parent_id: "p".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source_url: None,
            attachment: None,
        }
    }

    #[test]
    fn test_shared_title_is_one_tag() {
        let mut ids = IdentifierAllocator::seeded(9);
        let notes = vec![note("a", &["work", "urgent"]), note("b", &["work"])];
        let index = TagIndex::build(&notes, &mut ids);

        assert_eq!(index.len(), 2);
        let titles: Vec<&str> = index.tags().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["work", "urgent"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let mut ids = IdentifierAllocator::seeded(9);
        let index = TagIndex::build(&[note("a", &["Work", "work"])], &mut ids);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_tag_lists_contribute_nothing() {
        let mut ids = IdentifierAllocator::seeded(9);
        let index = TagIndex::build(&[note("a", &[]), note("b", &[])], &mut ids);
        assert!(index.is_empty());
        assert_eq!(ids.issued_count(), 0);
    }

    #[test]
    fn test_joins_reference_existing_ids() {
        let mut ids = IdentifierAllocator::seeded(9);
        let notes = vec![note("a", &["x"]), note("b", &["x"])];
        let index = TagIndex::build(&notes, &mut ids);
        let x = index.id_of("x").unwrap().to_string();

        let mut joins = index.joins_for(&notes[0], &mut ids).unwrap();
        joins.extend(index.joins_for(&notes[1], &mut ids).unwrap());

        assert_eq!(joins.len(), 2);
        assert!(joins.iter().all(|j| j.tag_id == x));
        assert_eq!(joins[0].note_id, "a");
        assert_eq!(joins[1].note_id, "b");
        assert_ne!(joins[0].id, joins[1].id);
    }

    #[test]
    fn test_repeated_title_on_one_note_is_one_join() {
        let mut ids = IdentifierAllocator::seeded(9);
        let notes = vec![note("a", &["x", "y", "x"])];
        let index = TagIndex::build(&notes, &mut ids);
        let joins = index.joins_for(&notes[0], &mut ids).unwrap();

        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0].tag_id, index.id_of("x").unwrap());
        assert_eq!(joins[1].tag_id, index.id_of("y").unwrap());
    }

    #[test]
    fn test_unknown_title_is_error() {
        let index = TagIndex::default();
        assert!(matches!(
            index.id_of("ghost"),
            Err(ConvertError::UnknownTag(_))
        ));
    }

    #[test]
    fn test_insert_returns_existing_id() {
        let mut ids = IdentifierAllocator::seeded(9);
        let mut index = TagIndex::default();
        let first = index.insert("x", &mut ids).to_string();
        let second = index.insert("x", &mut ids).to_string();
        assert_eq!(first, second);
        assert_eq!(ids.issued_count(), 1);
    }
}
