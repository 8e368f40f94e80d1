use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::signature::{check_shape, signature_of};
use crate::{MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// Signature -> anagram words, and length -> signatures. Frozen after construction.
#[derive(Debug, Default)]
pub struct SignatureIndex {
    words_by_signature: HashMap<String, BTreeSet<String>>,
    signatures_by_length: BTreeMap<usize, BTreeSet<String>>,
}

impl SignatureIndex {
    /// Indexes `words`, silently dropping anything that is not a playable word.
    pub fn build<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for len in MIN_WORD_LENGTH..=MAX_WORD_LENGTH {
            index.signatures_by_length.insert(len, BTreeSet::new());
        }
        for word in words {
            let word = word.as_ref();
            if check_shape(word).is_err() {
                continue;
            }
            let signature = signature_of(word);
            index
                .signatures_by_length
                .entry(word.len())
                .or_default()
                .insert(signature.clone());
            index
                .words_by_signature
                .entry(signature)
                .or_default()
                .insert(word.to_string());
        }
        index
    }

    pub fn contains_signature(&self, signature: &str) -> bool {
        self.words_by_signature.contains_key(signature)
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.words_by_signature
            .get(&signature_of(word))
            .is_some_and(|words| words.contains(word))
    }

    /// Words sharing `signature`, in lexicographic order.
    pub fn words(&self, signature: &str) -> Option<&BTreeSet<String>> {
        self.words_by_signature.get(signature)
    }

    pub fn word_count(&self, signature: &str) -> usize {
        self.words(signature).map_or(0, BTreeSet::len)
    }

    /// Signatures of exactly `len` letters, sorted.
    pub fn signatures_of_length(&self, len: usize) -> impl Iterator<Item = &str> + '_ {
        self.signatures_by_length
            .get(&len)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn all_signatures(&self) -> impl Iterator<Item = &str> + '_ {
        self.signatures_by_length
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub(crate) fn length_set(&self, len: usize) -> Option<&BTreeSet<String>> {
        self.signatures_by_length.get(&len)
    }

    pub fn signature_count(&self) -> usize {
        self.words_by_signature.len()
    }

    pub fn total_words(&self) -> usize {
        self.words_by_signature.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_anagrams_under_one_signature() {
        let index = SignatureIndex::build(["rate", "tear", "tare", "art", "rat", "tar"]);
        let words: Vec<_> = index.words("aert").unwrap().iter().cloned().collect();
        assert_eq!(words, vec!["rate", "tare", "tear"]);
        assert_eq!(index.word_count("art"), 3);
        assert_eq!(index.signature_count(), 2);
        assert_eq!(index.total_words(), 6);
        assert_eq!(index.signatures_of_length(4).collect::<Vec<_>>(), vec!["aert"]);
    }

    #[test]
    fn drops_malformed_words() {
        let index = SignatureIndex::build(["Rate", "ra", "r4te", "ratchetss", "tear"]);
        assert_eq!(index.signature_count(), 1);
        assert!(index.contains_word("tear"));
        assert!(!index.contains_word("rate"));
        assert!(!index.contains_signature("ar"));
    }
}
