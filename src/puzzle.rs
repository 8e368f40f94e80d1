use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::LadderGraph;
use crate::signature::added_letter;

pub const CHAIN_LENGTH: usize = 6;
pub const FALLBACK_SIGNATURES: [&str; CHAIN_LENGTH] =
    ["art", "aert", "aehrt", "aehrst", "aehrstt", "acehrstt"];
pub const FALLBACK_WORDS: [&str; CHAIN_LENGTH] =
    ["art", "rate", "earth", "hearts", "hatters", "chatters"];
const FALLBACK_DIFFICULTY: f64 = 999.0;

/// Where a chain came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainSource {
    Generated,
    Curated,
    Fallback,
}

impl fmt::Display for ChainSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSource::Generated => write!(f, "generated"),
            ChainSource::Curated => write!(f, "curated"),
            ChainSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Six signatures of lengths 3..=8, each one letter longer than the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleChain {
    pub signatures: Vec<String>,
    pub words: Vec<String>,
    pub anagram_counts: Vec<usize>,
    pub average_difficulty: f64,
    pub source: ChainSource,
}

impl PuzzleChain {
    /// Assembles a chain from already-checked signatures and words.
    pub(crate) fn from_path(
        graph: &LadderGraph,
        signatures: Vec<String>,
        words: Vec<String>,
        source: ChainSource,
    ) -> Self {
        let anagram_counts = signatures
            .iter()
            .map(|signature| graph.anagram_count(signature))
            .collect();
        let total: f64 = signatures
            .iter()
            .filter_map(|signature| graph.difficulty(signature))
            .sum();
        let average_difficulty = round2(total / signatures.len().max(1) as f64);
        Self {
            signatures,
            words,
            anagram_counts,
            average_difficulty,
            source,
        }
    }

    /// Static chain served when nothing else is available.
    pub fn fallback() -> Self {
        Self {
            signatures: FALLBACK_SIGNATURES.iter().map(|s| s.to_string()).collect(),
            words: FALLBACK_WORDS.iter().map(|s| s.to_string()).collect(),
            anagram_counts: vec![1; CHAIN_LENGTH],
            average_difficulty: FALLBACK_DIFFICULTY,
            source: ChainSource::Fallback,
        }
    }

    /// Identity used for duplicate detection.
    pub fn key(&self) -> String {
        chain_key(&self.signatures)
    }

    /// Letters inserted between consecutive rows.
    pub fn added_letters(&self) -> Vec<char> {
        self.signatures
            .windows(2)
            .filter_map(|pair| added_letter(&pair[0], &pair[1]))
            .collect()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ChainSource::Fallback
    }
}

pub fn chain_key<S: AsRef<str>>(signatures: &[S]) -> String {
    signatures
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_marked_and_wired() {
        let chain = PuzzleChain::fallback();
        assert!(chain.is_fallback());
        assert_eq!(chain.key(), "art|aert|aehrt|aehrst|aehrstt|acehrstt");
        assert_eq!(chain.added_letters(), vec!['e', 'h', 's', 't', 'c']);
    }

    #[test]
    fn serializes_with_camel_case() {
        let value = serde_json::to_value(PuzzleChain::fallback()).unwrap();
        assert_eq!(value["source"], "fallback");
        assert_eq!(value["averageDifficulty"], 999.0);
        assert_eq!(value["anagramCounts"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn average_is_rounded() {
        let graph = LadderGraph::build(crate::graph::tests::SCENARIO_WORDS);
        let signatures: Vec<String> = FALLBACK_SIGNATURES.iter().map(|s| s.to_string()).collect();
        let words = FALLBACK_WORDS.iter().map(|s| s.to_string()).collect();
        let chain = PuzzleChain::from_path(&graph, signatures, words, ChainSource::Generated);
        assert_eq!(chain.anagram_counts, vec![3, 3, 4, 3, 2, 2]);
        let scaled = chain.average_difficulty * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }
}
