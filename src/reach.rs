use std::collections::HashMap;

use crate::graph::AdjacencyGraph;
use crate::index::SignatureIndex;
use crate::{MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// Memoized answer to "can this signature be extended to a full-length word?".
///
/// The table is filled once at construction, working down from the longest
/// band so every child is already resolved when its parents are asked. It is
/// never written to afterwards.
#[derive(Debug, Default)]
pub struct ReachabilityOracle {
    memo: HashMap<String, bool>,
    starts: Vec<String>,
}

impl ReachabilityOracle {
    pub fn build(index: &SignatureIndex, adjacency: &AdjacencyGraph) -> Self {
        let mut memo = HashMap::with_capacity(index.signature_count());
        for len in (MIN_WORD_LENGTH..=MAX_WORD_LENGTH).rev() {
            for signature in index.signatures_of_length(len) {
                resolve(signature, adjacency, &mut memo);
            }
        }
        let starts = index
            .signatures_of_length(MIN_WORD_LENGTH)
            .filter(|signature| memo.get(*signature).copied().unwrap_or(false))
            .map(str::to_string)
            .collect();
        Self { memo, starts }
    }

    /// `reach(signature, length)`; false for unknown signatures or a mismatched length.
    pub fn reaches(&self, signature: &str, length: usize) -> bool {
        signature.len() == length && self.can_reach_max(signature)
    }

    pub fn can_reach_max(&self, signature: &str) -> bool {
        self.memo.get(signature).copied().unwrap_or(false)
    }

    /// Shortest-band signatures that reach the longest band, sorted.
    pub fn starts(&self) -> &[String] {
        &self.starts
    }
}

fn resolve(signature: &str, adjacency: &AdjacencyGraph, memo: &mut HashMap<String, bool>) -> bool {
    if let Some(&known) = memo.get(signature) {
        return known;
    }
    let reachable = signature.len() >= MAX_WORD_LENGTH
        || adjacency
            .children(signature)
            .iter()
            .any(|child| resolve(child, adjacency, memo));
    memo.insert(signature.to_string(), reachable);
    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(signature: &str, adjacency: &AdjacencyGraph) -> bool {
        if signature.len() == MAX_WORD_LENGTH {
            return true;
        }
        adjacency
            .children(signature)
            .iter()
            .any(|child| brute_force(child, adjacency))
    }

    fn synthetic_words(seed: u64, alphabet: &[u8], count: usize) -> Vec<String> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let len = rng.gen_range(MIN_WORD_LENGTH..=MAX_WORD_LENGTH);
                (0..len)
                    .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn memo_agrees_with_exhaustive_search() {
        for seed in 0..8 {
            let words = synthetic_words(seed, b"aeinrst", 400);
            let index = SignatureIndex::build(&words);
            let adjacency = AdjacencyGraph::build(&index);
            let oracle = ReachabilityOracle::build(&index, &adjacency);
            for len in MIN_WORD_LENGTH..=MAX_WORD_LENGTH {
                for signature in index.signatures_of_length(len) {
                    assert_eq!(
                        oracle.reaches(signature, len),
                        brute_force(signature, &adjacency),
                        "seed {seed}, signature {signature}"
                    );
                }
            }
        }
    }

    #[test]
    fn starts_are_exactly_reachable_short_signatures() {
        let words = synthetic_words(42, b"abcde", 600);
        let index = SignatureIndex::build(&words);
        let adjacency = AdjacencyGraph::build(&index);
        let oracle = ReachabilityOracle::build(&index, &adjacency);
        let expected: Vec<String> = index
            .signatures_of_length(MIN_WORD_LENGTH)
            .filter(|s| brute_force(s, &adjacency))
            .map(str::to_string)
            .collect();
        assert_eq!(oracle.starts(), expected.as_slice());
    }

    #[test]
    fn unknown_or_mismatched_queries_are_false() {
        let index =
            SignatureIndex::build(["art", "rate", "earth", "hearts", "hatters", "chatters"]);
        let adjacency = AdjacencyGraph::build(&index);
        let oracle = ReachabilityOracle::build(&index, &adjacency);
        assert!(oracle.reaches("art", 3));
        assert!(!oracle.reaches("art", 4));
        assert!(!oracle.reaches("xyz", 3));
        assert!(oracle.reaches("acehrstt", 8));
    }
}
