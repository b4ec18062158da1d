//! Document model: text plus per-character tags
//!
//! Every character carries a `CharStyle`: the set of tags covering it.
//! The text itself is edited directly by egui's `TextEdit`; after each
//! frame `sync_after_edit` reconciles the style vector with the new text.

use crate::search;
use std::io::{self, Write};
use std::ops::Range;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Edits closer together than this share one undo step.
const UNDO_COALESCE: Duration = Duration::from_secs(1);
const MAX_UNDO: usize = 200;

#[derive(Error, Debug, PartialEq)]
pub enum EditError {
    #[error("no text selected")]
    NoSelection,
    #[error("invalid font size: {0}")]
    InvalidSize(i64),
}

/// Boolean tags a character can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Bold,
    Italic,
    /// Find match
    Found,
    /// Spell-check hit
    Misspelled,
}

/// Result of toggling a tag over a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// The tags covering one character
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharStyle {
    pub bold: bool,
    pub italic: bool,
    /// Font size override in points
    pub size: Option<f32>,
    pub found: bool,
    pub misspelled: bool,
}

impl CharStyle {
    pub fn has(&self, tag: Tag) -> bool {
        match tag {
            Tag::Bold => self.bold,
            Tag::Italic => self.italic,
            Tag::Found => self.found,
            Tag::Misspelled => self.misspelled,
        }
    }

    pub fn set(&mut self, tag: Tag, on: bool) {
        match tag {
            Tag::Bold => self.bold = on,
            Tag::Italic => self.italic = on,
            Tag::Found => self.found = on,
            Tag::Misspelled => self.misspelled = on,
        }
    }

    /// Tags present on both `a` and `b`.
    pub fn common(a: &Self, b: &Self) -> Self {
        Self {
            bold: a.bold && b.bold,
            italic: a.italic && b.italic,
            size: if a.size == b.size { a.size } else { None },
            found: a.found && b.found,
            misspelled: a.misspelled && b.misspelled,
        }
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    text: String,
    styles: Vec<CharStyle>,
}

/// A tagged text buffer with undo history
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// The text content; edited in place by the text widget
    pub text: String,
    /// One style per character of `synced`
    styles: Vec<CharStyle>,
    /// Text as of the last sync
    synced: String,
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    last_edit: Option<Instant>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from plain text (no tags, empty history)
    pub fn from_plain_text(text: String) -> Self {
        let char_count = text.chars().count();
        Self {
            synced: text.clone(),
            text,
            styles: vec![CharStyle::default(); char_count],
            ..Self::default()
        }
    }

    pub fn styles(&self) -> &[CharStyle] {
        &self.styles
    }

    /// The editable text alongside the styles of the last sync, for the
    /// text widget and its layouter.
    pub fn parts_mut(&mut self) -> (&mut String, &[CharStyle]) {
        (&mut self.text, &self.styles)
    }

    /// Style at a character index; out-of-range indices are untagged.
    pub fn style_at(&self, index: usize) -> CharStyle {
        self.styles.get(index).copied().unwrap_or_default()
    }

    pub fn has_tag(&self, index: usize, tag: Tag) -> bool {
        self.style_at(index).has(tag)
    }

    /// Reconcile styles after `text` was edited by the widget.
    /// Returns whether the text changed since the last sync.
    pub fn sync_after_edit(&mut self) -> bool {
        self.sync_after_edit_at(Instant::now())
    }

    fn sync_after_edit_at(&mut self, now: Instant) -> bool {
        if self.text == self.synced {
            return false;
        }

        let old: Vec<char> = self.synced.chars().collect();
        let new: Vec<char> = self.text.chars().collect();
        self.styles.resize(old.len(), CharStyle::default());

        let prefix = old.iter().zip(new.iter()).take_while(|(a, b)| a == b).count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let removed_end = old.len() - suffix;
        let inserted = new.len() - suffix - prefix;

        // Inserted characters get the tags present on both neighbours.
        let inherited = if prefix > 0 && removed_end < old.len() {
            CharStyle::common(&self.styles[prefix - 1], &self.styles[removed_end])
        } else {
            CharStyle::default()
        };

        let coalesce = self
            .last_edit
            .map(|t| now.saturating_duration_since(t) < UNDO_COALESCE)
            .unwrap_or(false);
        if !coalesce {
            self.push_undo(Snapshot {
                text: self.synced.clone(),
                styles: self.styles.clone(),
            });
        }
        self.redo.clear();
        self.last_edit = Some(now);

        self.styles
            .splice(prefix..removed_end, std::iter::repeat(inherited).take(inserted));
        self.synced = self.text.clone();
        true
    }

    fn clamp(&self, range: Range<usize>) -> Result<Range<usize>, EditError> {
        let len = self.styles.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return Err(EditError::NoSelection);
        }
        Ok(start..end)
    }

    /// Toggle `tag` over `range`: removed everywhere if the first character
    /// already carries it, added everywhere otherwise.
    pub fn toggle_tag(&mut self, range: Range<usize>, tag: Tag) -> Result<Toggle, EditError> {
        self.sync_after_edit();
        let range = self.clamp(range)?;
        let on = !self.styles[range.start].has(tag);
        self.checkpoint();
        for style in &mut self.styles[range] {
            style.set(tag, on);
        }
        Ok(if on { Toggle::Added } else { Toggle::Removed })
    }

    /// Apply a font size to `range`.
    pub fn set_size(&mut self, range: Range<usize>, size: i64) -> Result<(), EditError> {
        self.sync_after_edit();
        if size <= 0 || size > 400 {
            return Err(EditError::InvalidSize(size));
        }
        let range = self.clamp(range)?;
        self.checkpoint();
        for style in &mut self.styles[range] {
            style.size = Some(size as f32);
        }
        Ok(())
    }

    /// Tag every range in `ranges`, clamped to the text.
    pub fn tag_ranges(&mut self, tag: Tag, ranges: &[Range<usize>]) {
        self.sync_after_edit();
        let len = self.styles.len();
        for r in ranges {
            let (start, end) = (r.start.min(len), r.end.min(len));
            for style in &mut self.styles[start..end.max(start)] {
                style.set(tag, true);
            }
        }
    }

    pub fn clear_tag(&mut self, tag: Tag) {
        for style in &mut self.styles {
            style.set(tag, false);
        }
    }

    /// Clear previous find matches and tag every occurrence of `pattern`.
    /// Returns the number of matches.
    pub fn highlight(&mut self, pattern: &str) -> usize {
        self.sync_after_edit();
        self.clear_tag(Tag::Found);
        if pattern.is_empty() {
            return 0;
        }
        let matches = search::find_all(&self.text, pattern);
        self.tag_ranges(Tag::Found, &matches);
        matches.len()
    }

    /// Replace every occurrence of `find` with `replace`. Text outside the
    /// matches keeps its tags; replacement text is untagged.
    pub fn replace_all(&mut self, find: &str, replace: &str) -> usize {
        self.sync_after_edit();
        if find.is_empty() || replace.is_empty() {
            return 0;
        }
        let matches = search::find_all(&self.text, find);
        if matches.is_empty() {
            return 0;
        }
        self.checkpoint();

        let chars: Vec<char> = self.text.chars().collect();
        let replace_len = replace.chars().count();
        let mut text = String::with_capacity(self.text.len());
        let mut styles = Vec::with_capacity(self.styles.len());
        let mut cursor = 0;
        for m in &matches {
            text.extend(&chars[cursor..m.start]);
            styles.extend_from_slice(&self.styles[cursor..m.start]);
            text.push_str(replace);
            styles.extend(std::iter::repeat(CharStyle::default()).take(replace_len));
            cursor = m.end;
        }
        text.extend(&chars[cursor..]);
        styles.extend_from_slice(&self.styles[cursor..]);

        self.text = text;
        self.styles = styles;
        self.synced = self.text.clone();
        matches.len()
    }

    /// Record the current state as an undo step and end edit coalescing.
    pub fn checkpoint(&mut self) {
        self.push_undo(Snapshot {
            text: self.synced.clone(),
            styles: self.styles.clone(),
        });
        self.redo.clear();
        self.last_edit = None;
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo.push(snapshot);
        if self.undo.len() > MAX_UNDO {
            self.undo.remove(0);
        }
    }

    fn current(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            styles: self.styles.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.text = snapshot.text;
        self.styles = snapshot.styles;
        self.synced = self.text.clone();
        self.last_edit = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        self.sync_after_edit();
        match self.undo.pop() {
            Some(prev) => {
                let current = self.current();
                self.redo.push(current);
                self.restore(prev);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.sync_after_edit();
        match self.redo.pop() {
            Some(next) => {
                let current = self.current();
                self.push_undo(current);
                self.restore(next);
                true
            }
            None => false,
        }
    }

    /// Runs of consecutive characters sharing one style
    pub fn runs(&self) -> Vec<(Range<usize>, CharStyle)> {
        style_runs(&self.styles, self.styles.len())
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }

    /// Plain-text printout: a header line, then the buffer.
    pub fn print_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Printing document...")?;
        writeln!(out, "{}", self.text)?;
        out.flush()
    }
}

/// Group `len` characters into runs of equal style. Characters past the
/// end of `styles` are untagged.
pub fn style_runs(styles: &[CharStyle], len: usize) -> Vec<(Range<usize>, CharStyle)> {
    let mut runs: Vec<(Range<usize>, CharStyle)> = Vec::new();
    for i in 0..len {
        let style = styles.get(i).copied().unwrap_or_default();
        match runs.last_mut() {
            Some((range, last)) if *last == style => range.end = i + 1,
            _ => runs.push((i..i + 1, style)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(doc: &mut Document, text: &str) {
        doc.text = text.to_string();
        doc.sync_after_edit();
    }

    fn bold_map(doc: &Document) -> String {
        doc.styles().iter().map(|s| if s.bold { 'B' } else { '.' }).collect()
    }

    #[test]
    fn test_from_plain_text_is_untagged() {
        let doc = Document::from_plain_text("héllo".to_string());
        assert_eq!(doc.styles().len(), 5);
        assert!(doc.styles().iter().all(|s| *s == CharStyle::default()));
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut doc = Document::from_plain_text("hello world".to_string());
        assert_eq!(doc.toggle_tag(0..5, Tag::Bold), Ok(Toggle::Added));
        assert_eq!(bold_map(&doc), "BBBBB......");
        assert_eq!(doc.toggle_tag(0..5, Tag::Bold), Ok(Toggle::Removed));
        assert_eq!(bold_map(&doc), "...........");
    }

    #[test]
    fn test_toggle_decided_by_first_char() {
        let mut doc = Document::from_plain_text("hello world".to_string());
        doc.toggle_tag(0..3, Tag::Italic).unwrap();
        // Starts on an italic char: the whole range loses italic.
        assert_eq!(doc.toggle_tag(1..8, Tag::Italic), Ok(Toggle::Removed));
        assert!(doc.has_tag(0, Tag::Italic));
        assert!(!doc.has_tag(1, Tag::Italic));
        // Starts on a plain char: the whole range gains italic.
        assert_eq!(doc.toggle_tag(4..11, Tag::Italic), Ok(Toggle::Added));
        assert!((4..11).all(|i| doc.has_tag(i, Tag::Italic)));
    }

    #[test]
    fn test_toggle_requires_selection() {
        let mut doc = Document::from_plain_text("abc".to_string());
        assert_eq!(doc.toggle_tag(1..1, Tag::Bold), Err(EditError::NoSelection));
        assert_eq!(doc.toggle_tag(5..9, Tag::Bold), Err(EditError::NoSelection));
    }

    #[test]
    fn test_set_size() {
        let mut doc = Document::from_plain_text("abcdef".to_string());
        doc.set_size(2..4, 24).unwrap();
        assert_eq!(doc.style_at(1).size, None);
        assert_eq!(doc.style_at(2).size, Some(24.0));
        assert_eq!(doc.style_at(3).size, Some(24.0));
        assert_eq!(doc.set_size(0..2, 0), Err(EditError::InvalidSize(0)));
        assert_eq!(doc.set_size(0..0, 12), Err(EditError::NoSelection));
    }

    #[test]
    fn test_insert_inside_tagged_range_inherits() {
        let mut doc = Document::from_plain_text("abcd".to_string());
        doc.toggle_tag(0..4, Tag::Bold).unwrap();
        edit(&mut doc, "abXYcd");
        assert_eq!(bold_map(&doc), "BBBBBB");
    }

    #[test]
    fn test_insert_at_range_edge_is_untagged() {
        let mut doc = Document::from_plain_text("abcd".to_string());
        doc.toggle_tag(0..2, Tag::Bold).unwrap();
        edit(&mut doc, "abXcd");
        assert_eq!(bold_map(&doc), "BB...");
        edit(&mut doc, "YabXcd");
        assert_eq!(bold_map(&doc), ".BB...");
        edit(&mut doc, "YabXcdZ");
        assert_eq!(bold_map(&doc), ".BB....");
    }

    #[test]
    fn test_delete_keeps_surrounding_tags() {
        let mut doc = Document::from_plain_text("abcdef".to_string());
        doc.toggle_tag(4..6, Tag::Bold).unwrap();
        edit(&mut doc, "abef");
        assert_eq!(bold_map(&doc), "..BB");
    }

    #[test]
    fn test_sync_with_repeated_chars() {
        let mut doc = Document::from_plain_text("aaaa".to_string());
        doc.toggle_tag(0..1, Tag::Bold).unwrap();
        edit(&mut doc, "aaaaa");
        assert_eq!(doc.styles().len(), 5);
        assert!(doc.has_tag(0, Tag::Bold));
    }

    #[test]
    fn test_highlight_replaces_previous_matches() {
        let mut doc = Document::from_plain_text("one two one two".to_string());
        assert_eq!(doc.highlight("one"), 2);
        assert!(doc.has_tag(0, Tag::Found));
        assert!(doc.has_tag(8, Tag::Found));
        assert_eq!(doc.highlight("two"), 2);
        assert!(!doc.has_tag(0, Tag::Found));
        assert!(doc.has_tag(4, Tag::Found));
        assert_eq!(doc.highlight(""), 0);
        assert!(doc.styles().iter().all(|s| !s.found));
    }

    #[test]
    fn test_replace_all_preserves_outside_tags() {
        let mut doc = Document::from_plain_text("cat and cat".to_string());
        doc.toggle_tag(4..7, Tag::Bold).unwrap();
        assert_eq!(doc.replace_all("cat", "tiger"), 2);
        assert_eq!(doc.text, "tiger and tiger");
        assert_eq!(bold_map(&doc), "......BBB......");
        assert!(!doc.sync_after_edit());
    }

    #[test]
    fn test_replace_requires_both_strings() {
        let mut doc = Document::from_plain_text("abc".to_string());
        assert_eq!(doc.replace_all("", "x"), 0);
        assert_eq!(doc.replace_all("b", ""), 0);
        assert_eq!(doc.replace_all("z", "y"), 0);
        assert_eq!(doc.text, "abc");
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_undo_redo_text_and_tags() {
        let mut doc = Document::from_plain_text("hello".to_string());
        doc.toggle_tag(0..5, Tag::Bold).unwrap();
        doc.replace_all("hello", "bye");
        assert!(doc.undo());
        assert_eq!(doc.text, "hello");
        assert_eq!(bold_map(&doc), "BBBBB");
        assert!(doc.undo());
        assert_eq!(bold_map(&doc), ".....");
        assert!(!doc.undo());
        assert!(doc.redo());
        assert!(doc.redo());
        assert_eq!(doc.text, "bye");
        assert!(!doc.redo());
    }

    #[test]
    fn test_typing_coalesces_into_one_step() {
        let t0 = Instant::now();
        let mut doc = Document::new();
        doc.text = "h".into();
        doc.sync_after_edit_at(t0);
        doc.text = "hi".into();
        doc.sync_after_edit_at(t0 + Duration::from_millis(300));
        doc.text = "hi!".into();
        doc.sync_after_edit_at(t0 + Duration::from_secs(3));

        assert!(doc.undo());
        assert_eq!(doc.text, "hi");
        assert!(doc.undo());
        assert_eq!(doc.text, "");
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut doc = Document::from_plain_text("a".to_string());
        edit(&mut doc, "ab");
        assert!(doc.undo());
        assert!(doc.can_redo());
        edit(&mut doc, "ac");
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_unsynced_edit_before_redo_drops_redo() {
        let mut doc = Document::from_plain_text("a".to_string());
        doc.toggle_tag(0..1, Tag::Bold).unwrap();
        assert!(doc.undo());
        assert!(doc.can_redo());

        doc.text = "ab".into();
        assert!(!doc.redo());
        assert_eq!(doc.text, "ab");
        assert_eq!(doc.styles().len(), 2);
        assert!(doc.undo());
        assert_eq!(doc.text, "a");
    }

    #[test]
    fn test_undo_history_is_capped() {
        let mut doc = Document::from_plain_text("x".to_string());
        for _ in 0..250 {
            doc.checkpoint();
        }
        for _ in 0..5 {
            assert!(doc.undo());
        }
        for _ in 0..5 {
            assert!(doc.redo());
        }
        assert!(!doc.redo());

        let mut steps = 0;
        while doc.undo() {
            steps += 1;
        }
        assert_eq!(steps, MAX_UNDO);
        assert_eq!(steps, 200);
    }

    #[test]
    fn test_runs() {
        let mut doc = Document::from_plain_text("aabbcc".to_string());
        doc.toggle_tag(2..4, Tag::Bold).unwrap();
        let runs = doc.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].0, 0..2);
        assert_eq!(runs[1].0, 2..4);
        assert!(runs[1].1.bold);
        assert_eq!(runs[2].0, 4..6);
    }

    #[test]
    fn test_style_runs_pads_untagged() {
        let bold = CharStyle { bold: true, ..Default::default() };
        let runs = style_runs(&[bold], 3);
        assert_eq!(runs, vec![(0..1, bold), (1..3, CharStyle::default())]);
        assert!(style_runs(&[bold, bold], 0).is_empty());
    }

    #[test]
    fn test_print_to() {
        let doc = Document::from_plain_text("line one\nline two".to_string());
        let mut out = Vec::new();
        doc.print_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Printing document...\nline one\nline two\n");
    }

    #[test]
    fn test_counts() {
        let doc = Document::from_plain_text("one two\nthree".to_string());
        assert_eq!(doc.word_count(), 3);
        assert_eq!(doc.char_count(), 13);
        assert_eq!(doc.line_count(), 2);
        assert_eq!(Document::new().line_count(), 1);
    }
}
