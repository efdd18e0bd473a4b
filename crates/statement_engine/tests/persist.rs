use std::fs;

use statement_engine::{ensure_output_dir, OutputLayout, PersistError};
use tempfile::TempDir;

#[test]
fn prepare_creates_root_and_images_directories() {
    let temp = TempDir::new().unwrap();
    let layout = OutputLayout::new(temp.path().join("contest").join("A"));

    layout.prepare().expect("prepare");

    assert!(layout.root().is_dir());
    assert!(layout.images_dir().is_dir());
    assert_eq!(layout.images_dir(), layout.root().join("images"));
    assert_eq!(layout.statement_path(), layout.root().join("statement.txt"));
}

#[test]
fn write_statement_replaces_previous_file() {
    let temp = TempDir::new().unwrap();
    let layout = OutputLayout::new(temp.path());
    layout.prepare().unwrap();

    layout.write_statement("old statement\n").unwrap();
    let path = layout.write_statement("new statement").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "new statement\n");
    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn file_in_place_of_output_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("out");
    fs::write(&blocker, "x").unwrap();

    let err = ensure_output_dir(&blocker).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir { .. }));

    let err = OutputLayout::new(&blocker).prepare().unwrap_err();
    assert!(matches!(err, PersistError::OutputDir { .. }));
}

#[test]
fn existing_images_directory_is_reused() {
    let temp = TempDir::new().unwrap();
    let layout = OutputLayout::new(temp.path());
    fs::create_dir_all(layout.images_dir()).unwrap();
    fs::write(layout.images_dir().join("formula_001.png"), b"old").unwrap();

    layout.prepare().unwrap();

    assert_eq!(fs::read(layout.images_dir().join("formula_001.png")).unwrap(), b"old");
}
