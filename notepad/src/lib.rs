//! notepad: a small rich-text editor
//!
//! The GUI lives in [`app`]; everything it drives (tagged document,
//! search, spell check, autosave, settings) is plain Rust that can be used
//! and tested without a window.

pub mod app;
pub mod autosave;
pub mod config;
pub mod dialogs;
pub mod document;
pub mod logging;
pub mod search;
pub mod spell;

pub use app::NotepadApp;
pub use document::Document;
