//! Dictionary-backed spell checking
//!
//! Words are looked up in a frequency-ranked word list of base forms;
//! regular inflections (plurals, past tenses, `-ing`, comparatives, `-ly`
//! adverbs, possessives) are accepted when their stem is listed.
//! Suggestions are the listed words one edit away, or two edits away when
//! nothing is one edit away, ordered by how common they are.

use crate::search;
use notecore::storage::{self, StorageError};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use unicode_segmentation::UnicodeSegmentation;

const BUNDLED_WORDS: &str = include_str!("../dict/en_common.txt");
const SYSTEM_WORDS: &str = "/usr/share/dict/words";
const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
/// Longest word (in chars) that gets a distance-2 search.
const MAX_EDIT2_LEN: usize = 14;
/// Words this much longer than the longest listed word get no suggestions.
const MAX_LEN_SLACK: usize = 3;

/// Suffix and the endings that may replace it to give the stem,
/// longest suffixes first.
const SUFFIXES: &[(&str, &[&str])] = &[
    ("iness", &["y"]),
    ("ness", &[""]),
    ("ment", &[""]),
    ("less", &[""]),
    ("iest", &["y"]),
    ("able", &["", "e"]),
    ("ies", &["y"]),
    ("ied", &["y"]),
    ("ier", &["y"]),
    ("ily", &["y"]),
    ("ing", &["", "e"]),
    ("est", &["", "e"]),
    ("ful", &[""]),
    ("es", &[""]),
    ("ed", &["", "e"]),
    ("er", &["", "e"]),
    ("ly", &["", "le"]),
    ("s", &[""]),
];

/// Suffixes after which a doubled final consonant is undone
/// (`stopped` -> `stop`, `bigger` -> `big`).
const DOUBLING: &[&str] = &["ing", "ed", "er", "est"];

/// A misspelled word with its suggestions and where it occurs.
#[derive(Debug, Clone, PartialEq)]
pub struct Misspelling {
    pub word: String,
    pub suggestions: Vec<String>,
    pub ranges: Vec<Range<usize>>,
}

impl Misspelling {
    /// Text of the suggestion dialog, `None` when there is nothing to suggest.
    pub fn message(&self) -> Option<String> {
        if self.suggestions.is_empty() {
            return None;
        }
        Some(format!(
            "The word '{}' is misspelled.\nSuggested corrections: {}",
            self.word,
            self.suggestions.join(", ")
        ))
    }
}

/// Word → frequency rank (0 = most common)
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashMap<String, usize>,
    /// Length in chars of the longest listed word
    longest: usize,
    user_path: Option<PathBuf>,
}

impl Dictionary {
    /// Build from a word list: one word per line, most frequent first.
    /// Blank lines and `#` comments are skipped.
    pub fn from_word_list(list: &str) -> Self {
        let mut dict = Self::default();
        dict.extend_from(list);
        dict
    }

    /// The English list shipped with the editor
    pub fn bundled() -> Self {
        Self::from_word_list(BUNDLED_WORDS)
    }

    /// Bundled list, plus the system word list and the user dictionary
    /// in `config_dir` when they exist.
    pub fn load(config_dir: &Path) -> Self {
        let mut dict = Self::bundled();
        match storage::read_text(Path::new(SYSTEM_WORDS)) {
            Ok(list) => dict.extend_from(&list),
            Err(StorageError::NotFound(_)) => {}
            Err(e) => tracing::warn!(error = %e, "could not read system word list"),
        }
        let user_path = config_dir.join("dictionary.txt");
        match storage::read_text(&user_path) {
            Ok(list) => dict.extend_from(&list),
            Err(StorageError::NotFound(_)) => {}
            Err(e) => tracing::warn!(error = %e, "could not read user dictionary"),
        }
        dict.user_path = Some(user_path);
        tracing::info!(words = dict.len(), "dictionary loaded");
        dict
    }

    fn extend_from(&mut self, list: &str) {
        for line in list.lines() {
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            self.insert(word.to_lowercase());
        }
    }

    fn insert(&mut self, word: String) {
        let rank = self.words.len();
        self.longest = self.longest.max(word.chars().count());
        self.words.entry(word).or_insert(rank);
    }

    /// Rank of a lower-case word, directly or through its stem.
    /// Typographic apostrophes match the plain ones in the list.
    fn rank_of(&self, word: &str) -> Option<usize> {
        let word = word.replace('\u{2019}', "'");
        if let Some(rank) = self.words.get(&word) {
            return Some(*rank);
        }
        stems(&word).iter().filter_map(|stem| self.words.get(stem)).min().copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.rank_of(&word.to_lowercase()).is_some()
    }

    /// Add a word and append it to the user dictionary file.
    pub fn add_to_user_dictionary(&mut self, word: &str) -> storage::Result<()> {
        let word = word.trim().to_lowercase();
        if word.is_empty() || self.words.contains_key(&word) {
            return Ok(());
        }
        if let Some(path) = &self.user_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", word)?;
        }
        self.insert(word);
        Ok(())
    }

    /// Lower-cased words from `words` that are not in the dictionary.
    pub fn unknown<'a>(&self, words: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        words
            .into_iter()
            .map(str::to_lowercase)
            .filter(|w| self.rank_of(w).is_none())
            .collect()
    }

    /// Likely corrections for `word`, most common first.
    pub fn candidates(&self, word: &str) -> Vec<String> {
        let word = word.to_lowercase();
        if self.rank_of(&word).is_some() {
            return vec![word];
        }
        let len = word.chars().count();
        if len > self.longest + MAX_LEN_SLACK {
            return Vec::new();
        }
        let first = edits1(&word);
        let mut known: HashSet<String> = first
            .iter()
            .filter(|w| self.words.contains_key(*w))
            .cloned()
            .collect();
        if known.is_empty() && len <= MAX_EDIT2_LEN {
            for e1 in &first {
                for e2 in edits1(e1) {
                    if self.words.contains_key(&e2) {
                        known.insert(e2);
                    }
                }
            }
        }
        let mut out: Vec<String> = known.into_iter().collect();
        out.sort_by(|a, b| self.words[a].cmp(&self.words[b]).then_with(|| a.cmp(b)));
        out
    }

    /// Every unknown word in `text`, once, with suggestions and the ranges
    /// of all its occurrences.
    pub fn check(&self, text: &str) -> Vec<Misspelling> {
        let unknown = self.unknown(text.unicode_words().filter(|w| is_checkable(w)));
        unknown
            .into_iter()
            .map(|word| Misspelling {
                suggestions: self.candidates(&word),
                ranges: search::find_words(text, &word),
                word,
            })
            .collect()
    }
}

/// Numbers and tokens containing digits are never checked.
fn is_checkable(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && !word.chars().any(|c| c.is_ascii_digit())
}

/// Possible stems of a lower-case word: the word without a possessive
/// `'s`, then that form with one regular suffix removed.
fn stems(word: &str) -> Vec<String> {
    let mut out = Vec::new();
    let base = word.strip_suffix("'s").unwrap_or(word);
    if base != word {
        out.push(base.to_string());
    }
    for (suffix, endings) in SUFFIXES {
        let Some(stem) = base.strip_suffix(suffix) else {
            continue;
        };
        if stem.chars().count() < 2 {
            continue;
        }
        for ending in *endings {
            out.push(format!("{}{}", stem, ending));
        }
        if DOUBLING.contains(suffix) {
            let mut chars = stem.chars().rev();
            if let (Some(a), Some(b)) = (chars.next(), chars.next()) {
                if a == b && !"aeiou".contains(a) {
                    out.push(stem[..stem.len() - a.len_utf8()].to_string());
                }
            }
        }
    }
    out
}

/// Every string one delete, transpose, replace or insert away from `word`.
fn edits1(word: &str) -> HashSet<String> {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    let mut out = HashSet::new();
    let join = |left: &[char], mid: &str, right: &[char]| -> String {
        let mut s: String = left.iter().collect();
        s.push_str(mid);
        s.extend(right.iter());
        s
    };

    for i in 0..=n {
        let (left, right) = chars.split_at(i);
        if !right.is_empty() {
            out.insert(join(left, "", &right[1..]));
        }
        if right.len() > 1 {
            let swapped: String = [right[1], right[0]].iter().collect();
            out.insert(join(left, &swapped, &right[2..]));
        }
        for c in ALPHABET.chars() {
            let mut buf = [0u8; 4];
            let c = c.encode_utf8(&mut buf);
            if !right.is_empty() {
                out.insert(join(left, c, &right[1..]));
            }
            out.insert(join(left, c, right));
        }
    }
    out.remove(word);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn dict() -> Dictionary {
        Dictionary::from_word_list("# test list\nthe\nhello\nworld\nhelp\nhell\n\nword\nspelling\n")
    }

    #[test]
    fn test_word_list_parsing() {
        let d = dict();
        assert_eq!(d.len(), 7);
        assert!(d.is_known("Hello"));
        assert!(!d.is_known("# test list"));
    }

    #[test]
    fn test_unknown_is_lowercased_and_sorted() {
        let unknown = dict().unknown(["Hello", "Wrld", "zzz", "the", "wrld"]);
        assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec!["wrld", "zzz"]);
    }

    #[test]
    fn test_candidates_distance_one() {
        let d = dict();
        assert_eq!(d.candidates("wrld"), vec!["world"]);
        assert_eq!(d.candidates("helo"), vec!["hello", "help", "hell"]);
        assert_eq!(d.candidates("teh"), vec!["the"]);
    }

    #[test]
    fn test_candidates_distance_two() {
        let d = dict();
        assert_eq!(d.candidates("spelinng"), vec!["spelling"]);
        // "wordl" -> "world"; "wodr" -> "word"
        assert_eq!(d.candidates("wodrl"), vec!["world", "word"]);
    }

    #[test]
    fn test_candidates_known_and_hopeless() {
        let d = dict();
        assert_eq!(d.candidates("World"), vec!["world"]);
        assert!(d.candidates("xqzvkj").is_empty());
    }

    #[test]
    fn test_check_reports_each_word_once() {
        let d = dict();
        let text = "Helo world, helo 42 x2 the wrld";
        let report = d.check(text);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].word, "helo");
        assert_eq!(report[0].ranges, vec![0..4, 12..16]);
        assert_eq!(report[1].word, "wrld");
        assert_eq!(report[1].suggestions, vec!["world"]);
        assert_eq!(report[1].ranges, vec![27..31]);
    }

    #[test]
    fn test_message_format() {
        let m = Misspelling {
            word: "helo".into(),
            suggestions: vec!["hello".into(), "help".into()],
            ranges: vec![],
        };
        assert_eq!(
            m.message().unwrap(),
            "The word 'helo' is misspelled.\nSuggested corrections: hello, help"
        );
        let none = Misspelling { word: "xq".into(), suggestions: vec![], ranges: vec![] };
        assert_eq!(none.message(), None);
    }

    #[test]
    fn test_user_dictionary_append() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = Dictionary::load(dir.path());
        assert!(!d.is_known("qwertyuiopz"));
        d.add_to_user_dictionary("Qwertyuiopz").unwrap();
        assert!(d.is_known("qwertyuiopz"));

        let reloaded = Dictionary::load(dir.path());
        assert!(reloaded.is_known("qwertyuiopz"));
    }

    #[test]
    fn test_inflections_of_listed_words() {
        let d = Dictionary::from_word_list("cat\nstop\ntry\nhappy\nsimple\nbig\nmake\nwatch\n");
        for word in [
            "cats", "cat's", "stopped", "stopping", "tries", "tried", "happier", "happily",
            "simply", "bigger", "biggest", "making", "watches", "watched", "Watching",
        ] {
            assert!(d.is_known(word), "{} should be known", word);
        }
        for word in ["cta", "stopx", "s", "bigs'", "cattt"] {
            assert!(!d.is_known(word), "{} should be unknown", word);
        }
    }

    #[test]
    fn test_inflected_word_is_not_a_suggestion_target() {
        let d = dict();
        assert_eq!(d.candidates("worlds"), vec!["worlds"]);
        assert_eq!(d.candidates("helpd"), vec!["help"]);
    }

    #[test]
    fn test_bundled_dictionary_accepts_ordinary_prose() {
        let d = Dictionary::bundled();
        let text = "The cats jumped over the tables while my friends watched movies \
                    and laughed at the dogs. She was happier than ever, and we \
                    stopped walking because the children's games were finished.";
        let flagged: Vec<String> = d.check(text).into_iter().map(|m| m.word).collect();
        assert!(flagged.is_empty(), "flagged {:?}", flagged);

        let text = "I don\u{2019}t think it's working. They're going to the store tomorrow \
                    morning, and my brother bought three new books yesterday.";
        let flagged: Vec<String> = d.check(text).into_iter().map(|m| m.word).collect();
        assert!(flagged.is_empty(), "flagged {:?}", flagged);
    }

    #[test]
    fn test_long_tokens_return_quickly() {
        let d = Dictionary::bundled();
        let started = Instant::now();
        assert!(d.candidates("qwrtzpsdfghjklyxcvbnmqwrtzpsdfg").is_empty());
        assert!(started.elapsed() < Duration::from_millis(200));

        // A long listed word lifts the length bound; distance 2 is still skipped.
        let long = Dictionary::from_word_list("pneumonoultramicroscopicsilicovolcanoconiosis\nthe\n");
        let started = Instant::now();
        assert!(long.candidates("qwrtzpsdfghjklyxcvbn").is_empty());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_bundled_dictionary() {
        let d = Dictionary::bundled();
        assert!(d.is_known("the"));
        assert!(d.is_known("autosave"));
        assert_eq!(d.candidates("teh")[0], "the");
    }
}
