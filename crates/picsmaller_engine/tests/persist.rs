use std::fs;

use picsmaller_engine::{ensure_output_dir, AtomicFileWriter, DirectorySink, ExportSink, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("photo.png", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "photo.png");
    assert_eq!(fs::read(&first).unwrap(), b"hello");

    let second = writer.write("photo.png", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"world");
}

#[test]
fn no_partial_file_when_target_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("photo.png", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("photo.png").exists());
}

#[test]
fn names_with_directories_are_refused() {
    let temp = TempDir::new().unwrap();
    let sink = DirectorySink::new(temp.path().to_path_buf());

    let err = sink.save("../escape.png", b"data").unwrap_err();
    assert!(matches!(err, PersistError::InvalidName(_)));
    assert!(!temp.path().join("../escape.png").exists());

    let path = sink.save("ok.png", b"data").unwrap();
    assert_eq!(fs::read(path).unwrap(), b"data");
}
