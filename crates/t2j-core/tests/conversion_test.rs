//! Integration tests for the full Turtl → Joplin conversion.
//!
//! Records are parsed back out of the sink so assertions are made on the
//! written bytes, not on in-memory state.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};
use t2j_core::{
    ConvertError, Converter, ConverterConfig, DirectorySink, FixedClock, IdentifierAllocator,
    MemorySink,
};

const STAMP: &str = "2024-01-02T03:04:05.000Z";

/// A written record: its preamble lines and its key/value block.
#[derive(Debug)]
struct Parsed {
    title: Option<String>,
    body: Option<String>,
    fields: HashMap<String, String>,
}

impl Parsed {
    fn get(&self, key: &str) -> &str {
        self.fields
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("missing field {key}"))
    }

    fn type_code(&self) -> &str {
        self.get("type_")
    }
}

fn parse_record(text: &str) -> Parsed {
    // The key/value block is the trailing run of `key:` lines.
    let lines: Vec<&str> = text.lines().collect();
    let mut start = lines.len();
    while start > 0 && is_field_line(lines[start - 1]) {
        start -= 1;
    }
    let fields = lines[start..]
        .iter()
        .map(|line| {
            let (k, v) = line.split_once(':').unwrap();
            (k.to_string(), v.trim_start().to_string())
        })
        .collect();

    let preamble = lines[..start].join("\n");
    let preamble = preamble.trim_end_matches('\n');
    let (title, body) = if preamble.is_empty() {
        (None, None)
    } else {
        match preamble.split_once("\n\n") {
            Some((t, b)) => (Some(t.to_string()), Some(b.to_string())),
            None => (Some(preamble.to_string()), None),
        }
    };
    Parsed {
        title,
        body,
        fields,
    }
}

fn is_field_line(line: &str) -> bool {
    match line.split_once(':') {
        Some((k, _)) => !k.is_empty() && k.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
        None => false,
    }
}

fn converter(seed: u64) -> Converter<FixedClock> {
    Converter::with_clock(ConverterConfig::default(), FixedClock::parse(STAMP).unwrap())
        .unwrap()
        .with_allocator(IdentifierAllocator::seeded(seed))
}

fn run(doc: &Value) -> (MemorySink, Vec<Parsed>) {
    let mut sink = MemorySink::new();
    converter(1).convert(doc, &mut sink).unwrap();
    let records = sink
        .files()
        .iter()
        .filter(|(path, _)| path.extension().is_some_and(|e| e == "md"))
        .map(|(_, bytes)| parse_record(std::str::from_utf8(bytes).unwrap()))
        .collect();
    (sink, records)
}

fn of_type<'a>(records: &'a [Parsed], code: &str) -> Vec<&'a Parsed> {
    records.iter().filter(|r| r.type_code() == code).collect()
}

fn scenario() -> Value {
    json!({
        "spaces": [{ "id": "s1", "title": "Home" }],
        "boards": [{ "id": "b1", "title": "Work", "space_id": "s1" }],
        "files": [],
        "notes": [{
            "id": "n1",
            "board_id": "b1",
            "space_id": "s1",
            "text": "hi__there__",
            "tags": ["x", "y"],
            "title": "T"
        }]
    })
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_space_board_note_scenario() {
    let (sink, records) = run(&scenario());

    let notebooks = of_type(&records, "2");
    let notes = of_type(&records, "1");
    let tags = of_type(&records, "5");
    let joins = of_type(&records, "6");

    assert_eq!(notebooks.len(), 2);
    assert_eq!(notes.len(), 1);
    assert_eq!(tags.len(), 2);
    assert_eq!(joins.len(), 2);
    assert!(!sink.files().keys().any(|p| p.starts_with("resources")));

    let home = notebooks
        .iter()
        .find(|n| n.title.as_deref() == Some("Home"))
        .unwrap();
    let work = notebooks
        .iter()
        .find(|n| n.title.as_deref() == Some("Work"))
        .unwrap();
    assert_eq!(home.get("parent_id"), "");
    assert_eq!(work.get("parent_id"), home.get("id"));

    let note = notes[0];
    assert_eq!(note.title.as_deref(), Some("T"));
    assert_eq!(note.body.as_deref(), Some("hi**there**"));
    assert_eq!(note.get("parent_id"), work.get("id"));

    let tag_titles: HashSet<&str> = tags.iter().filter_map(|t| t.title.as_deref()).collect();
    assert_eq!(tag_titles, HashSet::from(["x", "y"]));

    let tag_ids: HashSet<&str> = tags.iter().map(|t| t.get("id")).collect();
    for join in &joins {
        assert!(join.title.is_none());
        assert_eq!(join.get("note_id"), note.get("id"));
        assert!(tag_ids.contains(join.get("tag_id")));
    }
}

#[test]
fn test_every_record_is_stamped_and_named_by_id() {
    let (sink, _) = run(&scenario());
    for (path, bytes) in sink.files() {
        let record = parse_record(std::str::from_utf8(bytes).unwrap());
        let stem = path.file_stem().unwrap().to_str().unwrap();
        assert_eq!(record.get("id"), stem);
        for key in [
            "created_time",
            "updated_time",
            "user_created_time",
            "user_updated_time",
        ] {
            assert_eq!(record.get(key), STAMP);
        }
        assert_eq!(record.get("encryption_applied"), "0");
        assert_eq!(record.get("is_shared"), "0");
        assert!(!bytes.ends_with(b"\n"));
    }
}

// ============================================================================
// Global invariants
// ============================================================================

fn busy_archive() -> Value {
    json!({
        "spaces": [
            { "id": "s1", "title": "Home" },
            { "id": "s2", "title": "Archive" }
        ],
        "boards": [
            { "id": "b1", "title": "Work", "space_id": "s1" },
            { "id": "b2", "title": "Old", "space_id": "s2" }
        ],
        "files": [
            { "id": "n3", "data": "aGVsbG8=" }
        ],
        "notes": [
            { "id": "n1", "board_id": "b1", "space_id": "s1", "text": "a", "tags": ["shared", "one"], "title": "A" },
            { "id": "n2", "board_id": null, "space_id": "s2", "text": "b", "tags": ["shared"], "title": "B" },
            { "id": "n3", "board_id": "b2", "space_id": "s2", "text": "c", "tags": [], "title": "C",
              "has_file": true, "file": { "name": "hello.txt", "type": "text/plain", "size": 5 } },
            { "id": "n4", "board_id": "ghost", "space_id": "s1", "text": "d", "title": "D" }
        ]
    })
}

#[test]
fn test_ids_are_unique_across_record_kinds() {
    let (sink, records) = run(&busy_archive());

    let mut ids = HashSet::new();
    for record in &records {
        assert!(ids.insert(record.get("id").to_string()), "duplicate id");
    }
    // 4 notebooks, 4 notes, 1 resource, 2 tags, 3 joins
    assert_eq!(ids.len(), 14);
    // plus one payload file
    assert_eq!(sink.len(), 15);
}

#[test]
fn test_every_note_parent_is_a_notebook() {
    let (_, records) = run(&busy_archive());
    let notebook_ids: HashSet<&str> = of_type(&records, "2").iter().map(|n| n.get("id")).collect();

    for note in of_type(&records, "1") {
        assert!(notebook_ids.contains(note.get("parent_id")));
    }
}

#[test]
fn test_dangling_board_falls_back_to_space() {
    let (_, records) = run(&busy_archive());
    let home_id = of_type(&records, "2")
        .into_iter()
        .find(|n| n.title.as_deref() == Some("Home"))
        .unwrap()
        .get("id")
        .to_string();
    let d = of_type(&records, "1")
        .into_iter()
        .find(|n| n.title.as_deref() == Some("D"))
        .unwrap();
    assert_eq!(d.get("parent_id"), home_id);
}

#[test]
fn test_shared_tag_is_written_once_with_two_joins() {
    let (_, records) = run(&busy_archive());
    let shared: Vec<&Parsed> = of_type(&records, "5")
        .into_iter()
        .filter(|t| t.title.as_deref() == Some("shared"))
        .collect();
    assert_eq!(shared.len(), 1);

    let shared_id = shared[0].get("id");
    let joins = of_type(&records, "6")
        .into_iter()
        .filter(|j| j.get("tag_id") == shared_id)
        .count();
    assert_eq!(joins, 2);
}

#[test]
fn test_joins_reference_written_records() {
    let (_, records) = run(&busy_archive());
    let note_ids: HashSet<&str> = of_type(&records, "1").iter().map(|n| n.get("id")).collect();
    let tag_ids: HashSet<&str> = of_type(&records, "5").iter().map(|t| t.get("id")).collect();
    for join in of_type(&records, "6") {
        assert!(note_ids.contains(join.get("note_id")));
        assert!(tag_ids.contains(join.get("tag_id")));
    }
}

// ============================================================================
// Attachments
// ============================================================================

#[test]
fn test_attached_note_gets_resource_and_embed() {
    let (sink, records) = run(&busy_archive());

    let resources = of_type(&records, "4");
    assert_eq!(resources.len(), 1);
    let resource = resources[0];
    assert_eq!(resource.get("mime"), "text/plain");
    assert_eq!(resource.get("filename"), "hello.txt");
    assert_eq!(resource.get("file_extension"), "txt");
    assert_eq!(resource.get("size"), "5");

    let payload_path = format!("resources/{}.txt", resource.get("id"));
    assert_eq!(sink.get(&payload_path), Some(b"hello".as_slice()));

    let c = of_type(&records, "1")
        .into_iter()
        .find(|n| n.title.as_deref() == Some("C"))
        .unwrap();
    assert_eq!(
        c.body.as_deref(),
        Some(format!("[hello.txt](:/{})\n\nc", resource.get("id")).as_str())
    );
}

#[test]
fn test_file_name_without_flag_still_produces_resource() {
    let doc = json!({
        "spaces": [{ "id": "s1", "title": "Home" }],
        "boards": [],
        "files": [{ "id": "n1", "data": "iVBORw0KGgoAAAANSUhEUg==" }],
        "notes": [{
            "id": "n1", "space_id": "s1", "title": "Pic", "text": "",
            "file": { "name": "pic.png", "type": "image/png", "meta": { "width": 2, "height": 3 } }
        }]
    });
    let (sink, records) = run(&doc);

    let resource = of_type(&records, "4")[0];
    let note = of_type(&records, "1")[0];
    assert_eq!(
        note.body.as_deref(),
        Some(
            format!(
                "<img src=\":/{}\" alt=\"pic.png\" width=\"2\" height=\"3\" />",
                resource.get("id")
            )
            .as_str()
        )
    );
    assert!(sink
        .get(format!("resources/{}.png", resource.get("id")))
        .is_some());
}

#[test]
fn test_note_without_attachment_has_no_resource() {
    let (sink, records) = run(&scenario());
    assert!(of_type(&records, "4").is_empty());
    assert!(!sink.files().keys().any(|p| p.starts_with("resources")));
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_board_with_unknown_space_aborts_before_writing() {
    let doc = json!({
        "spaces": [{ "id": "s1", "title": "Home" }],
        "boards": [{ "id": "b1", "title": "Lost", "space_id": "nowhere" }],
        "files": [],
        "notes": []
    });
    let mut sink = MemorySink::new();
    let err = converter(1).convert(&doc, &mut sink).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownSpace { .. }));
    assert!(sink.is_empty());
}

#[test]
fn test_each_missing_array_is_fatal() {
    for missing in ["spaces", "boards", "files", "notes"] {
        let mut doc = json!({ "spaces": [], "boards": [], "files": [], "notes": [] });
        doc.as_object_mut().unwrap().remove(missing);
        let mut sink = MemorySink::new();
        match converter(1).convert(&doc, &mut sink) {
            Err(ConvertError::MissingArray(name)) => assert_eq!(name, missing),
            other => panic!("expected MissingArray, got {other:?}"),
        }
    }
}

// ============================================================================
// Filesystem output
// ============================================================================

#[test]
fn test_directory_sink_layout() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("raw");
    let mut sink = DirectorySink::create(&root, "resources").unwrap();

    let report = converter(2).convert(&busy_archive(), &mut sink).unwrap();
    assert_eq!(report.files_written, 15);
    assert_eq!(report.payload_bytes, 5);

    let md_files = std::fs::read_dir(&root)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|x| x == "md"))
        .count();
    assert_eq!(md_files, 14);

    let payloads: Vec<_> = std::fs::read_dir(root.join("resources"))
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(payloads.len(), 1);
    assert_eq!(std::fs::read(payloads[0].path()).unwrap(), b"hello");
}
