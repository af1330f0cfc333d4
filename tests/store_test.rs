//! Tests for FileStore and the record service on disk

use std::fs;
use std::io::{self, Read};

use tempfile::TempDir;

use rectree::application::services::{RecordService, TreePolicy};
use rectree::domain::{Contact, ContactQuery, Criterion};
use rectree::infrastructure::{FileStore, RecordStore, TerminalConsole};
use rectree::util::testing::{contact, init_test_setup};

type SilentConsole = TerminalConsole<&'static [u8], io::Sink>;
type DiskService = RecordService<Contact, SilentConsole, FileStore>;

fn silent() -> SilentConsole {
    TerminalConsole::new(&[][..], io::sink())
}

fn open(store: FileStore) -> DiskService {
    RecordService::open(store, silent(), TreePolicy::default()).unwrap()
}

fn read_all(store: &FileStore) -> Vec<u8> {
    let mut bytes = Vec::new();
    store
        .reader()
        .unwrap()
        .expect("file exists")
        .read_to_end(&mut bytes)
        .unwrap();
    bytes
}

#[test]
fn given_missing_file_when_reading_then_none() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("absent.data"));

    assert!(store.reader().unwrap().is_none());
}

#[test]
fn given_replaced_bytes_when_reading_then_same_bytes() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let mut store = FileStore::new(dir.path().join("contacts.data"));

    // Act
    store.replace(b"first").unwrap();
    store.replace(b"second").unwrap();

    // Assert
    assert_eq!(read_all(&store), b"second");
    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1, "temp file must be renamed into place");
}

#[test]
fn given_nested_path_when_replacing_then_parent_directories_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("contacts.data");
    let mut store = FileStore::new(&path);

    store.replace(&[0u8; 48]).unwrap();

    assert!(path.exists());
    assert_eq!(fs::metadata(&path).unwrap().len(), 48);
}

#[test]
fn given_missing_file_when_service_opened_then_empty_tree() {
    let dir = TempDir::new().unwrap();

    let service = open(FileStore::new(dir.path().join("new.data")));

    assert!(service.tree().is_empty());
}

#[test]
fn given_three_contacts_when_saved_to_disk_and_reopened_then_all_found() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contacts.data");
    let contacts = [
        contact("SMITH", "JOHN", 555, 123, 4567),
        contact("ADAMS", "AMY", 212, 555, 1),
        contact("ZHANG", "WEI", 999, 999, 9999),
    ];
    let mut service = open(FileStore::new(&path));
    for c in &contacts {
        service.add(c.clone());
    }

    // Act
    let saved = service.save().unwrap();
    let reopened = open(FileStore::new(&path));

    // Assert
    assert_eq!(saved, 3);
    assert_eq!(fs::metadata(&path).unwrap().len(), 3 * 48);
    assert_eq!(reopened.tree().len(), 3);
    for c in &contacts {
        let criterion = Criterion::Field(ContactQuery::LastName(c.last_name().to_string()));
        let found = reopened.find_first(&criterion).unwrap();
        assert_eq!(found.value(), c);
    }
}

#[test]
fn given_truncated_file_when_reopened_then_whole_records_survive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contacts.data");
    let mut service = open(FileStore::new(&path));
    service.add(contact("DOE", "JANE", 212, 555, 1234));
    service.add(contact("ROE", "RICH", 212, 555, 4321));
    service.save().unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(48 + 10);
    fs::write(&path, &bytes).unwrap();

    let reopened = open(FileStore::new(&path));

    assert_eq!(reopened.tree().len(), 1);
}
