//! Data file output
//!
//! - [`FileWriter`] - deferred-creation, flush-per-write data file
//! - [`Field`] / [`DataRecord`] - values that make up one record line
//! - [`FileChooser`] / [`Clipboard`] - operator-facing collaborators

pub mod dialogs;
pub mod record;
pub mod writer;

pub use dialogs::{
    Clipboard, FileChooser, NativeFileChooser, NoClipboard, OpenDialog, SaveDialog,
    SystemClipboard,
};
pub use record::{format_fields, format_record, DataRecord, Field};
pub use writer::FileWriter;
