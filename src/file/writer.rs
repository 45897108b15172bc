//! Append-only data file writer
//!
//! Records can be written before the destination file exists: until a file
//! is bound they accumulate in a pending buffer, which is written in full,
//! in order, the moment the file is created. Once bound, every write is
//! flushed before it returns.

use super::dialogs::{Clipboard, FileChooser, NativeFileChooser, NoClipboard, SaveDialog};
use super::record::{format_record, Field};
use crate::config::{date_text, DATA_FILE_EXTENSION, DEFAULT_DELIMITER};
use crate::error::{MeasureError, Result, ResultExt};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// An open data file. Created exclusively; never overwrites.
#[derive(Debug)]
struct FileIo {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileIo {
    fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    MeasureError::File(format!("{} already exists", path.display()))
                } else {
                    MeasureError::File(format!("Failed to create {}: {}", path.display(), e))
                }
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.flush())
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn close(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))
    }
}

/// Where writes currently go
#[derive(Debug)]
enum Target {
    /// No file yet; writes are kept in memory
    Unbound { pending: String },
    Bound(FileIo),
    /// The file was closed; further writes are errors
    Closed { path: PathBuf },
}

/// Sequential writer for one data file
pub struct FileWriter {
    target: Target,
    delimiter: String,
    data_dir: PathBuf,
    chooser: Box<dyn FileChooser>,
    clipboard: Box<dyn Clipboard>,
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("target", &self.target)
            .field("delimiter", &self.delimiter)
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

impl FileWriter {
    /// A writer with native dialogs, no clipboard and the default delimiter
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::Unbound {
                pending: String::new(),
            },
            delimiter: DEFAULT_DELIMITER.to_string(),
            data_dir: data_dir.into(),
            chooser: Box::new(NativeFileChooser),
            clipboard: Box::new(NoClipboard),
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_chooser(mut self, chooser: Box<dyn FileChooser>) -> Self {
        self.set_chooser(chooser);
        self
    }

    pub fn set_chooser(&mut self, chooser: Box<dyn FileChooser>) {
        self.chooser = chooser;
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the bound (or last closed) file
    pub fn filepath(&self) -> Option<&Path> {
        match &self.target {
            Target::Unbound { .. } => None,
            Target::Bound(io) => Some(&io.path),
            Target::Closed { path } => Some(path),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.target, Target::Bound(_))
    }

    /// Bytes waiting for a file
    pub fn pending_len(&self) -> usize {
        match &self.target {
            Target::Unbound { pending } => pending.len(),
            _ => 0,
        }
    }

    /// Create the data file and flush pending writes into it.
    ///
    /// Without a path the operator is asked through the file chooser,
    /// starting in the data directory with a date-derived name. The file
    /// must not exist yet.
    pub fn set_file(&mut self, path: Option<&Path>) -> Result<()> {
        if let Target::Bound(io) = &self.target {
            return Err(MeasureError::File(format!(
                "{} is already open",
                io.path.display()
            )));
        }

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let dialog = SaveDialog::data_file(self.data_dir.clone(), date_text());
                self.chooser
                    .ask_save_filename(&dialog)
                    .ok_or_else(|| MeasureError::File("No data file was chosen".to_string()))?
            }
        };

        let io = FileIo::create(&path)?;
        self.bind(io)
    }

    /// Flush pending text into a freshly created file and make it the target.
    ///
    /// If the pending text cannot be written the new file is removed again,
    /// so the same path can be retried.
    fn bind(&mut self, mut io: FileIo) -> Result<()> {
        if let Target::Unbound { pending } = &self.target {
            if !pending.is_empty() {
                if let Err(e) = io.write(pending) {
                    let path = io.path.clone();
                    drop(io);
                    if let Err(remove) = std::fs::remove_file(&path) {
                        tracing::warn!("Failed to remove {}: {}", path.display(), remove);
                    }
                    return Err(e);
                }
            }
        }
        tracing::info!("Data file: {}", io.path.display());

        if let Some(name) = io.path.file_name().and_then(|n| n.to_str()) {
            self.clipboard.copy_text(name);
        }

        self.target = Target::Bound(io);
        Ok(())
    }

    /// Create `<name>.txt` inside the data directory.
    ///
    /// With `own_folder` the file goes into a new `<data_dir>/<name>/`
    /// folder instead, which must not exist yet.
    pub fn create_in_data_dir(&mut self, name: &str, own_folder: bool) -> Result<PathBuf> {
        if !self.data_dir.is_dir() {
            return Err(MeasureError::File(format!(
                "Data directory {} does not exist",
                self.data_dir.display()
            )));
        }

        let dir = if own_folder {
            let dir = self.data_dir.join(name);
            std::fs::create_dir(&dir).map_err(|e| {
                MeasureError::File(format!("Failed to create {}: {}", dir.display(), e))
            })?;
            dir
        } else {
            self.data_dir.clone()
        };

        let path = dir.join(format!("{}.{}", name, DATA_FILE_EXTENSION));
        self.set_file(Some(&path))?;
        Ok(path)
    }

    /// Write text, or keep it until a file is bound
    pub fn write(&mut self, text: &str) -> Result<()> {
        match &mut self.target {
            Target::Unbound { pending } => {
                pending.push_str(text);
                Ok(())
            }
            Target::Bound(io) => io.write(text),
            Target::Closed { path } => Err(MeasureError::File(format!(
                "{} has already been closed",
                path.display()
            ))),
        }
    }

    /// Append header text; a newline is added when missing
    pub fn set_label(&mut self, label: &str) -> Result<()> {
        if label.ends_with('\n') {
            self.write(label)
        } else {
            self.write(&format!("{}\n", label))
        }
    }

    /// Write one delimiter-joined record line
    pub fn save(&mut self, fields: &[Field]) -> Result<()> {
        let line = format_record(fields, &self.delimiter);
        self.write(&line)
    }

    /// Flush and release the file
    pub fn close(&mut self) -> Result<()> {
        let target = std::mem::replace(
            &mut self.target,
            Target::Unbound {
                pending: String::new(),
            },
        );

        match target {
            Target::Bound(io) => {
                let path = io.path.clone();
                let result = io.close();
                if result.is_ok() {
                    tracing::debug!("Closed data file {}", path.display());
                }
                self.target = Target::Closed { path };
                result
            }
            other => {
                let err = match &other {
                    Target::Closed { path } => {
                        MeasureError::File(format!("{} has already been closed", path.display()))
                    }
                    _ => MeasureError::File("No data file has been opened".to_string()),
                };
                self.target = other;
                Err(err)
            }
        }
    }
}
