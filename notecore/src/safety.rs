//! Safety utilities for the editor.
//!
//! egui and the tag model address text by character index while Rust
//! strings slice by byte. These helpers convert between the two without
//! ever slicing inside a UTF-8 sequence, and isolate per-frame panics.

/// Snap a byte position to the nearest valid UTF-8 character boundary.
/// If `byte_pos` is already on a boundary, returns it unchanged.
/// Otherwise walks backward (up to 3 bytes) to find the boundary.
pub fn snap_to_char_boundary(s: &str, byte_pos: usize) -> usize {
    let len = s.len();
    if byte_pos >= len {
        return len;
    }
    if s.is_char_boundary(byte_pos) {
        return byte_pos;
    }
    for offset in 1..=3 {
        let pos = byte_pos.saturating_sub(offset);
        if s.is_char_boundary(pos) {
            return pos;
        }
    }
    0
}

/// Byte offset of the `char_idx`-th character. Indices past the end map to
/// `s.len()`.
pub fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// Number of characters before `byte_pos` (snapped to a boundary first).
pub fn byte_to_char(s: &str, byte_pos: usize) -> usize {
    let pos = snap_to_char_boundary(s, byte_pos);
    s[..pos].chars().count()
}

/// Slice by character range, clamped to the string.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let b0 = char_to_byte(s, start);
    let b1 = char_to_byte(s, end.max(start));
    &s[b0..b1]
}

/// Run a closure, catching any panic. Returns the closure result on success,
/// or `fallback` on panic. Used to isolate per-frame rendering.
pub fn catch_or<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(val) => val,
        Err(_) => {
            tracing::error!("caught panic in frame, recovered");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_cjk() {
        // '中' is 3 bytes in UTF-8
        let s = "中文";
        assert_eq!(snap_to_char_boundary(s, 0), 0);
        assert_eq!(snap_to_char_boundary(s, 1), 0);
        assert_eq!(snap_to_char_boundary(s, 3), 3);
        assert_eq!(snap_to_char_boundary(s, 4), 3);
        assert_eq!(snap_to_char_boundary(s, 100), 6);
    }

    #[test]
    fn test_char_byte_conversions() {
        let s = "a😀bé";
        assert_eq!(char_to_byte(s, 0), 0);
        assert_eq!(char_to_byte(s, 1), 1);
        assert_eq!(char_to_byte(s, 2), 5);
        assert_eq!(char_to_byte(s, 3), 6);
        assert_eq!(char_to_byte(s, 4), 8);
        assert_eq!(char_to_byte(s, 9), 8);
        assert_eq!(byte_to_char(s, 5), 2);
        assert_eq!(byte_to_char(s, 3), 1); // mid-emoji snaps back
        assert_eq!(byte_to_char(s, 8), 4);
    }

    #[test]
    fn test_char_slice() {
        let s = "café au lait";
        assert_eq!(char_slice(s, 0, 4), "café");
        assert_eq!(char_slice(s, 5, 7), "au");
        assert_eq!(char_slice(s, 8, 100), "lait");
        assert_eq!(char_slice(s, 6, 2), "");
    }

    #[test]
    fn test_catch_or() {
        assert_eq!(catch_or(0, || 7), 7);
        assert_eq!(catch_or(0, || -> i32 { panic!("boom") }), 0);
    }
}
