use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::Path;

use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Set, Streamer};
use tracing::debug;
use zstd::stream::decode_all;

use crate::error::DictionaryError;
use crate::signature::check_shape;

/// Hand-picked words that stay playable even when the word list misses them.
pub const SEED_WORDS: &[&str] = &[
    "rat", "tar", "art", "rate", "tear", "tare", "earth", "heart", "hater", "rathe", "hearts",
    "haters", "earths", "threats", "hatter", "hatters", "shatter", "chatters", "ratchets",
];

/// Immutable set of playable words (lowercase, `a-z`, length 3..=8).
#[derive(Debug)]
pub struct Dictionary {
    words: Vec<String>,
    set: Set<Vec<u8>>,
}

impl Dictionary {
    /// Parses newline separated text, dropping anything that is not a playable word.
    pub fn parse_from_str(contents: &str) -> Self {
        let mut words: BTreeSet<String> = contents
            .lines()
            .filter_map(|line| {
                let word = line.trim().to_lowercase();
                check_shape(&word).ok().map(|_| word)
            })
            .collect();
        words.extend(SEED_WORDS.iter().map(|w| w.to_string()));
        Self::from_sorted(words)
    }

    /// Reads a word list from disk; `.zst` files are decompressed first.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let compressed = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zst"));
        let bytes = if compressed {
            decode_all(File::open(path)?).map_err(DictionaryError::Decompress)?
        } else {
            fs::read(path)?
        };
        let text = String::from_utf8(bytes)?;
        let dictionary = Self::parse_from_str(&text);
        debug!(
            path = %path.display(),
            compressed,
            words = dictionary.len(),
            "Loaded dictionary"
        );
        Ok(dictionary)
    }

    pub fn seed_only() -> Self {
        Self::parse_from_str("")
    }

    fn from_sorted(words: BTreeSet<String>) -> Self {
        let words: Vec<String> = words.into_iter().collect();
        let set = Set::from_iter(&words).expect("dictionary keys are sorted and unique");
        Self { words, set }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word)
    }

    /// Returns up to `limit` words that start with `prefix`, in lexicographic order.
    pub fn prefix(&self, prefix: &str, limit: usize) -> Vec<String> {
        let automaton = Str::new(prefix).starts_with();
        let mut stream = self.set.search(automaton).into_stream();
        let mut results = Vec::new();
        while let Some(key) = stream.next() {
            if results.len() >= limit {
                break;
            }
            results.push(String::from_utf8_lossy(key).into_owned());
        }
        results
    }

    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_filters_and_keeps_seeds() {
        let dict = Dictionary::parse_from_str("Stone\r\nit\nnotes\nco-op\n  onset \nabcdefghij\n");
        assert!(dict.contains("stone"));
        assert!(dict.contains("onset"));
        assert!(dict.contains("notes"));
        assert!(!dict.contains("it"));
        assert!(!dict.contains("co-op"));
        assert!(!dict.contains("abcdefghij"));
        for seed in SEED_WORDS {
            assert!(dict.contains(seed), "seed {seed} missing");
        }
        assert_eq!(dict.len(), SEED_WORDS.len() + 3);
        assert!(format!("{dict:?}").starts_with("Dictionary"));
    }

    #[test]
    fn prefix_lists_in_order() {
        let dict = Dictionary::seed_only();
        assert_eq!(dict.prefix("hat", 10), vec!["hater", "haters", "hatter", "hatters"]);
        assert_eq!(dict.prefix("hat", 2), vec!["hater", "haters"]);
        assert!(dict.prefix("zzz", 5).is_empty());
    }

    #[test]
    fn loads_plain_and_compressed_files() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("words.txt");
        fs::write(&plain, "stone\nnotes\n").unwrap();
        let dict = Dictionary::load_from_path(&plain).unwrap();
        assert!(dict.contains("stone"));

        let packed = dir.path().join("words.txt.zst");
        let encoded = zstd::stream::encode_all("tones\n".as_bytes(), 3).unwrap();
        File::create(&packed).unwrap().write_all(&encoded).unwrap();
        let dict = Dictionary::load_from_path(&packed).unwrap();
        assert!(dict.contains("tones"));
        assert!(dict.contains("ratchets"));
    }

    #[test]
    fn undecodable_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let latin1 = dir.path().join("latin1.txt");
        fs::write(&latin1, b"caf\xe9\nstone\n").unwrap();
        let err = Dictionary::load_from_path(&latin1);
        assert!(matches!(err, Err(DictionaryError::Decode(_))));

        let corrupt = dir.path().join("words.zst");
        fs::write(&corrupt, b"this is not a zstd frame").unwrap();
        let err = Dictionary::load_from_path(&corrupt);
        assert!(matches!(err, Err(DictionaryError::Decompress(_))));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Dictionary::load_from_path("/nonexistent/ladder/words.txt");
        assert!(matches!(err, Err(DictionaryError::Io(_))));
    }
}
