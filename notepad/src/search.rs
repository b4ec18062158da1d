//! Substring and whole-word search over the editor buffer.
//!
//! All ranges are character indices, matching the tag vector and egui's
//! cursor positions.

use notecore::safety::byte_to_char;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Every non-overlapping, case-sensitive occurrence of `needle`, scanning
/// left to right and resuming after the end of each match.
pub fn find_all(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    if needle.is_empty() {
        return Vec::new();
    }
    let needle_chars = needle.chars().count();
    let mut out = Vec::new();
    // Walk matches in byte order, counting chars incrementally.
    let mut last_byte = 0;
    let mut last_char = 0;
    for (byte, _) in haystack.match_indices(needle) {
        let start = last_char + haystack[last_byte..byte].chars().count();
        out.push(start..start + needle_chars);
        last_byte = byte;
        last_char = start;
    }
    out
}

/// Whole-word occurrences of `word`, ignoring case.
pub fn find_words(haystack: &str, word: &str) -> Vec<Range<usize>> {
    if word.is_empty() {
        return Vec::new();
    }
    let target = word.to_lowercase();
    haystack
        .unicode_word_indices()
        .filter(|(_, w)| w.to_lowercase() == target)
        .map(|(byte, w)| {
            let start = byte_to_char(haystack, byte);
            start..start + w.chars().count()
        })
        .collect()
}
