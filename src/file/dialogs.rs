//! File chooser and clipboard collaborators
//!
//! The file writer asks a [`FileChooser`] for a destination when no path is
//! given, and hands the new file's name to a [`Clipboard`] so the operator
//! can paste it into a lab notebook. Both are blocking/synchronous and are
//! traits so tests and headless setups can replace them.

use std::path::PathBuf;

/// Parameters of a "save as" dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveDialog {
    /// `(description, extensions)` filters, e.g. `("TEXT", ["txt"])`
    pub file_types: Vec<(String, Vec<String>)>,
    /// Extension appended when the chosen name has none
    pub default_extension: Option<String>,
    pub initial_dir: Option<PathBuf>,
    pub initial_file: Option<String>,
    pub title: String,
}

/// Parameters of an "open" dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenDialog {
    pub file_types: Vec<(String, Vec<String>)>,
    pub initial_dir: Option<PathBuf>,
    pub initial_file: Option<String>,
    pub title: String,
}

impl SaveDialog {
    /// The dialog used to pick a new data file
    pub fn data_file(initial_dir: PathBuf, initial_file: String) -> Self {
        Self {
            file_types: vec![("TEXT".to_string(), vec!["txt".to_string()])],
            default_extension: Some("txt".to_string()),
            initial_dir: Some(initial_dir),
            initial_file: Some(initial_file),
            title: "Choose the data file to create".to_string(),
        }
    }

    /// Apply the default extension to a chosen path lacking one
    pub fn complete(&self, mut path: PathBuf) -> PathBuf {
        if path.extension().is_none() {
            if let Some(ext) = &self.default_extension {
                path.set_extension(ext);
            }
        }
        path
    }
}

/// Asks the operator for a path. `None` means nothing was chosen.
#[cfg_attr(test, mockall::automock)]
pub trait FileChooser: Send {
    fn ask_save_filename(&self, dialog: &SaveDialog) -> Option<PathBuf>;

    fn ask_open_filename(&self, dialog: &OpenDialog) -> Option<PathBuf>;
}

/// Native dialogs via rfd
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileChooser;

fn native_dialog(
    title: &str,
    file_types: &[(String, Vec<String>)],
    initial_dir: Option<&PathBuf>,
    initial_file: Option<&String>,
) -> rfd::FileDialog {
    let mut dialog = rfd::FileDialog::new().set_title(title);
    for (name, extensions) in file_types {
        dialog = dialog.add_filter(name.as_str(), extensions.as_slice());
    }
    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }
    if let Some(file) = initial_file {
        dialog = dialog.set_file_name(file.as_str());
    }
    dialog
}

impl FileChooser for NativeFileChooser {
    fn ask_save_filename(&self, dialog: &SaveDialog) -> Option<PathBuf> {
        native_dialog(
            &dialog.title,
            &dialog.file_types,
            dialog.initial_dir.as_ref(),
            dialog.initial_file.as_ref(),
        )
        .save_file()
        .map(|path| dialog.complete(path))
    }

    fn ask_open_filename(&self, dialog: &OpenDialog) -> Option<PathBuf> {
        native_dialog(
            &dialog.title,
            &dialog.file_types,
            dialog.initial_dir.as_ref(),
            dialog.initial_file.as_ref(),
        )
        .pick_file()
    }
}

/// Receives text for the operator's convenience. Failures are ignored.
#[cfg_attr(test, mockall::automock)]
pub trait Clipboard: Send {
    fn copy_text(&mut self, text: &str);
}

/// The system clipboard via arboard
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy_text(&mut self, text: &str) {
        let result = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string()));
        if let Err(e) = result {
            tracing::debug!("Clipboard unavailable: {}", e);
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy_text(&mut self, _text: &str) {}
}
