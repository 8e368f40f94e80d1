use std::cmp::Ordering;
use std::collections::HashMap;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::index::SignatureIndex;

const RARE_LETTERS: &[u8] = b"jqxz";
const LESS_COMMON_LETTERS: &[u8] = b"kvwy";
const RARE_COST: f64 = 1.8;
const LESS_COMMON_COST: f64 = 0.7;
const REPEAT_COST: f64 = 0.35;
const DENSITY_NUMERATOR: f64 = 10.0;

/// Per-word cost of rare letters and repeated letters. Lower is easier.
pub fn letter_penalty(word: &str) -> f64 {
    let mut counts = [0u32; 26];
    let mut score = 0.0;
    for b in word.bytes() {
        if RARE_LETTERS.contains(&b) {
            score += RARE_COST;
        }
        if LESS_COMMON_LETTERS.contains(&b) {
            score += LESS_COMMON_COST;
        }
        if b.is_ascii_lowercase() {
            counts[(b - b'a') as usize] += 1;
        }
    }
    for count in counts {
        if count > 1 {
            score += f64::from(count - 1) * REPEAT_COST;
        }
    }
    score
}

/// Orders words by letter penalty, then lexicographically.
pub fn compare_words(a: &str, b: &str) -> Ordering {
    letter_penalty(a)
        .total_cmp(&letter_penalty(b))
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureScore {
    pub representative: String,
    pub word_count: usize,
    pub difficulty: f64,
}

/// Lazily computed, cached difficulty per indexed signature.
#[derive(Debug, Default)]
pub struct DifficultyScorer {
    cache: HashMap<String, OnceCell<SignatureScore>>,
}

impl DifficultyScorer {
    pub fn new(index: &SignatureIndex) -> Self {
        let cache = index
            .all_signatures()
            .map(|signature| (signature.to_string(), OnceCell::new()))
            .collect();
        Self { cache }
    }

    /// Score for an indexed signature; `None` when the signature is unknown.
    pub fn score(&self, index: &SignatureIndex, signature: &str) -> Option<&SignatureScore> {
        let cell = self.cache.get(signature)?;
        Some(cell.get_or_init(|| compute_score(index, signature)))
    }
}

fn compute_score(index: &SignatureIndex, signature: &str) -> SignatureScore {
    let words = index.words(signature);
    let word_count = words.map_or(0, |set| set.len());
    let representative = words
        .and_then(|set| set.iter().min_by(|a, b| compare_words(a, b)))
        .cloned()
        .unwrap_or_else(|| signature.to_string());
    let difficulty =
        DENSITY_NUMERATOR / word_count.max(1) as f64 + letter_penalty(&representative);
    SignatureScore {
        representative,
        word_count,
        difficulty,
    }
}
