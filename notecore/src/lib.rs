//! notecore: shared library for the notepad editor

pub mod repaint;
pub mod safety;
pub mod storage;
pub mod theme;
pub mod widgets;

pub use repaint::RepaintController;
pub use theme::{NoteTheme, Palette};
