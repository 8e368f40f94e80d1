use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::OnceCell;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::difficulty::{DifficultyScorer, SignatureScore};
use crate::index::SignatureIndex;
use crate::reach::ReachabilityOracle;
use crate::signature::one_letter_removals;
use crate::{MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// Parent -> child links between signatures one letter apart.
#[derive(Debug, Default)]
pub struct AdjacencyGraph {
    children: HashMap<String, Vec<String>>,
    edge_count: usize,
}

impl AdjacencyGraph {
    pub fn build(index: &SignatureIndex) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut edge_count = 0;
        for len in MIN_WORD_LENGTH..MAX_WORD_LENGTH {
            let (Some(parents), Some(band)) = (index.length_set(len), index.length_set(len + 1))
            else {
                continue;
            };
            let edges: Vec<(String, &str)> = band
                .par_iter()
                .flat_map_iter(|child| {
                    one_letter_removals(child)
                        .into_iter()
                        .filter(|parent| parents.contains(parent))
                        .map(move |parent| (parent, child.as_str()))
                })
                .collect();
            edge_count += edges.len();
            for (parent, child) in edges {
                children.entry(parent).or_default().push(child.to_string());
            }
        }
        for list in children.values_mut() {
            list.sort_unstable();
        }
        Self {
            children,
            edge_count,
        }
    }

    /// Children of `signature`, sorted. Empty for leaves and unknown signatures.
    pub fn children(&self, signature: &str) -> &[String] {
        self.children.get(signature).map_or(&[], Vec::as_slice)
    }

    pub fn is_edge(&self, parent: &str, child: &str) -> bool {
        self.children(parent)
            .binary_search_by(|candidate| candidate.as_str().cmp(child))
            .is_ok()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.children.iter().flat_map(|(parent, kids)| {
            kids.iter()
                .map(move |child| (parent.as_str(), child.as_str()))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub words: usize,
    pub signatures: usize,
    pub signatures_by_length: BTreeMap<usize, usize>,
    pub edges: usize,
    pub start_signatures: usize,
}

/// The frozen puzzle graph: index, edges, reachability and difficulty.
///
/// Built once and only read afterwards, so a single value can be shared
/// across threads without locking. The lazily filled difficulty cache uses
/// `OnceCell`, which is safe to initialize concurrently.
#[derive(Debug)]
pub struct LadderGraph {
    index: SignatureIndex,
    adjacency: AdjacencyGraph,
    oracle: ReachabilityOracle,
    scorer: DifficultyScorer,
    ranked_starts: OnceCell<Vec<String>>,
}

impl LadderGraph {
    pub fn build<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = SignatureIndex::build(words);
        let adjacency = AdjacencyGraph::build(&index);
        let oracle = ReachabilityOracle::build(&index, &adjacency);
        let scorer = DifficultyScorer::new(&index);
        let graph = Self {
            index,
            adjacency,
            oracle,
            scorer,
            ranked_starts: OnceCell::new(),
        };
        info!(
            words = graph.index.total_words(),
            signatures = graph.index.signature_count(),
            edges = graph.adjacency.edge_count(),
            starts = graph.oracle.starts().len(),
            "Built ladder graph"
        );
        graph
    }

    pub fn index(&self) -> &SignatureIndex {
        &self.index
    }

    pub fn adjacency(&self) -> &AdjacencyGraph {
        &self.adjacency
    }

    pub fn oracle(&self) -> &ReachabilityOracle {
        &self.oracle
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.index.contains_word(word)
    }

    pub fn contains_signature(&self, signature: &str) -> bool {
        self.index.contains_signature(signature)
    }

    pub fn words_for(&self, signature: &str) -> Option<&BTreeSet<String>> {
        self.index.words(signature)
    }

    pub fn anagram_count(&self, signature: &str) -> usize {
        self.index.word_count(signature)
    }

    pub fn children(&self, signature: &str) -> &[String] {
        self.adjacency.children(signature)
    }

    pub fn is_edge(&self, parent: &str, child: &str) -> bool {
        self.adjacency.is_edge(parent, child)
    }

    pub fn can_reach_max(&self, signature: &str) -> bool {
        self.oracle.can_reach_max(signature)
    }

    pub fn start_signatures(&self) -> &[String] {
        self.oracle.starts()
    }

    pub fn score(&self, signature: &str) -> Option<&SignatureScore> {
        self.scorer.score(&self.index, signature)
    }

    pub fn difficulty(&self, signature: &str) -> Option<f64> {
        self.score(signature).map(|score| score.difficulty)
    }

    pub fn representative(&self, signature: &str) -> Option<&str> {
        self.score(signature)
            .map(|score| score.representative.as_str())
    }

    /// Every valid start signature, easiest first (ties broken by signature).
    pub fn ranked_starts(&self) -> &[String] {
        self.ranked_starts.get_or_init(|| {
            let mut scored: Vec<(f64, &String)> = self
                .oracle
                .starts()
                .par_iter()
                .map(|signature| (self.difficulty(signature).unwrap_or(f64::MAX), signature))
                .collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
            scored
                .into_iter()
                .map(|(_, signature)| signature.clone())
                .collect()
        })
    }

    pub fn stats(&self) -> GraphStats {
        let signatures_by_length = (MIN_WORD_LENGTH..=MAX_WORD_LENGTH)
            .map(|len| (len, self.index.signatures_of_length(len).count()))
            .collect();
        GraphStats {
            words: self.index.total_words(),
            signatures: self.index.signature_count(),
            signatures_by_length,
            edges: self.adjacency.edge_count(),
            start_signatures: self.oracle.starts().len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::signature::{added_letter, signature_of};

    pub(crate) const SCENARIO_WORDS: &[&str] = &[
        "rat", "tar", "art", "rate", "tear", "tare", "earth", "heart", "hater", "rathe", "hearts",
        "haters", "earths", "hatters", "threats", "chatters", "ratchets",
    ];

    /// Every multiset of `letters` with sizes 3..=8, each used as its own word.
    pub(crate) fn dense_words(letters: &[u8]) -> Vec<String> {
        fn extend(letters: &[u8], prefix: &mut Vec<u8>, out: &mut Vec<String>) {
            if prefix.len() >= MIN_WORD_LENGTH {
                out.push(String::from_utf8(prefix.clone()).unwrap());
            }
            if prefix.len() == MAX_WORD_LENGTH {
                return;
            }
            for (i, &letter) in letters.iter().enumerate() {
                prefix.push(letter);
                extend(&letters[i..], prefix, out);
                prefix.pop();
            }
        }
        let mut out = Vec::new();
        extend(letters, &mut Vec::new(), &mut out);
        out
    }

    #[test]
    fn scenario_chain_is_wired() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        let path = ["art", "aert", "aehrt", "aehrst", "aehrstt", "acehrstt"];
        for pair in path.windows(2) {
            assert!(graph.is_edge(pair[0], pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(graph.start_signatures().contains(&"art".to_string()));
        assert_eq!(graph.anagram_count("aehrst"), 3);
        assert_eq!(graph.representative("aert"), Some("rate"));
        assert!(!graph.is_edge("art", "aehrt"));
    }

    #[test]
    fn every_edge_differs_by_one_inserted_letter() {
        let graph = LadderGraph::build(dense_words(b"abcd"));
        assert!(graph.adjacency().edge_count() > 0);
        for (parent, child) in graph.adjacency().edges() {
            assert_eq!(child.len(), parent.len() + 1);
            let letter = added_letter(parent, child).expect("edge has an inserted letter");
            let position = child.find(letter).unwrap();
            let mut reduced = child.to_string();
            reduced.remove(position);
            assert_eq!(reduced, parent);
        }
    }

    #[test]
    fn repeated_letters_record_one_edge() {
        let graph = LadderGraph::build(["tat", "tatt", "attt"]);
        assert_eq!(graph.children("att"), ["attt".to_string()]);
        assert_eq!(graph.adjacency().edge_count(), 1);
    }

    #[test]
    fn build_is_deterministic() {
        let words = dense_words(b"aeirst");
        let first = LadderGraph::build(&words);
        let second = LadderGraph::build(words.iter().rev());
        assert_eq!(first.stats(), second.stats());
        assert_eq!(first.ranked_starts(), second.ranked_starts());
        for signature in first.index().all_signatures() {
            assert_eq!(first.children(signature), second.children(signature));
        }
    }

    #[test]
    fn ranked_starts_ascend_in_difficulty() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        let ranked = graph.ranked_starts();
        assert_eq!(ranked.len(), graph.start_signatures().len());
        for pair in ranked.windows(2) {
            assert!(graph.difficulty(&pair[0]) <= graph.difficulty(&pair[1]));
        }
    }

    #[test]
    fn stats_count_each_band() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        let stats = graph.stats();
        assert_eq!(stats.words, SCENARIO_WORDS.len());
        assert_eq!(stats.signatures_by_length[&3], 1);
        assert_eq!(stats.signatures_by_length[&8], 1);
        assert_eq!(stats.start_signatures, 1);
        assert_eq!(signature_of("ratchets"), "acehrstt");
    }
}
