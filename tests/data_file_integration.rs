//! Integration tests for the data file
//!
//! - Records built from domain types
//! - Deferred creation through a scripted file chooser
//! - Folder-per-run layout

use measure_rs::file::{Clipboard, FileChooser, OpenDialog, SaveDialog};
use measure_rs::{record, DataRecord, Field, FileWriter, MeasureError};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One reading of a lock-in amplifier
struct LockInReading {
    frequency: f64,
    x: f64,
    y: f64,
}

impl DataRecord for LockInReading {
    fn fields(&self) -> Vec<Field> {
        vec![self.frequency.into(), self.x.into(), self.y.into()]
    }
}

/// Chooser that answers with a fixed path and remembers what it was asked
struct ScriptedChooser {
    answer: Option<PathBuf>,
    asked: Arc<Mutex<Vec<SaveDialog>>>,
}

impl FileChooser for ScriptedChooser {
    fn ask_save_filename(&self, dialog: &SaveDialog) -> Option<PathBuf> {
        self.asked.lock().unwrap().push(dialog.clone());
        self.answer.clone()
    }

    fn ask_open_filename(&self, _dialog: &OpenDialog) -> Option<PathBuf> {
        None
    }
}

#[derive(Clone, Default)]
struct RecordingClipboard {
    copied: Arc<Mutex<Vec<String>>>,
}

impl Clipboard for RecordingClipboard {
    fn copy_text(&mut self, text: &str) {
        self.copied.lock().unwrap().push(text.to_string());
    }
}

#[test]
fn test_domain_records_are_flattened() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lockin.txt");
    let mut writer = FileWriter::new(dir.path());
    writer.set_file(Some(&path)).unwrap();

    let reading = LockInReading {
        frequency: 1000.0,
        x: 0.5,
        y: -0.25,
    };
    writer
        .save(&[Field::from(7), Field::record(&reading), Field::from("ok")])
        .unwrap();
    writer.save(&record![]).unwrap();
    writer.close().unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "7,1000.0,0.5,-0.25,ok\n\n"
    );
}

#[test]
fn test_deferred_file_from_chooser() {
    let dir = TempDir::new().unwrap();
    let chosen = dir.path().join("picked.txt");
    let asked = Arc::new(Mutex::new(Vec::new()));
    let clipboard = RecordingClipboard::default();

    let mut writer = FileWriter::new(dir.path())
        .with_chooser(Box::new(ScriptedChooser {
            answer: Some(chosen.clone()),
            asked: Arc::clone(&asked),
        }))
        .with_clipboard(Box::new(clipboard.clone()));

    writer.set_label("f,x,y").unwrap();
    writer.save(&record![1, 2, 3]).unwrap();
    assert!(!chosen.exists());

    writer.set_file(None).unwrap();
    writer.save(&record![4, 5, 6]).unwrap();
    writer.close().unwrap();

    assert_eq!(
        std::fs::read_to_string(&chosen).unwrap(),
        "f,x,y\n1,2,3\n4,5,6\n"
    );
    assert_eq!(*clipboard.copied.lock().unwrap(), vec!["picked.txt".to_string()]);

    let asked = asked.lock().unwrap();
    assert_eq!(asked.len(), 1);
    assert_eq!(asked[0].initial_dir.as_deref(), Some(dir.path()));
    assert_eq!(asked[0].default_extension.as_deref(), Some("txt"));
}

#[test]
fn test_cancelled_chooser_keeps_pending() {
    let dir = TempDir::new().unwrap();
    let mut writer = FileWriter::new(dir.path()).with_chooser(Box::new(ScriptedChooser {
        answer: None,
        asked: Arc::default(),
    }));
    writer.write("kept\n").unwrap();

    assert!(matches!(writer.set_file(None), Err(MeasureError::File(_))));
    assert_eq!(writer.pending_len(), "kept\n".len());

    let path = dir.path().join("later.txt");
    writer.set_file(Some(&path)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept\n");
}

#[test]
fn test_run_folder_must_be_new() {
    let dir = TempDir::new().unwrap();
    let mut first = FileWriter::new(dir.path());
    let path = first.create_in_data_dir("run1", true).unwrap();
    assert_eq!(path, dir.path().join("run1").join("run1.txt"));

    let mut second = FileWriter::new(dir.path());
    assert!(matches!(
        second.create_in_data_dir("run1", true),
        Err(MeasureError::File(_))
    ));

    let mut missing = FileWriter::new(dir.path().join("nowhere"));
    assert!(missing.create_in_data_dir("run2", false).is_err());
}
