//! Anagram word-ladder engine: six rows of lengths 3 to 8, each row's letters being
//! the previous row's letters plus one.
//!
//! The graph is built once from a word list with [`build_graph`] and is read-only
//! afterwards; generation, validation and next-step enumeration all borrow it.

mod difficulty;
mod dictionary;
mod error;
mod generator;
mod graph;
mod index;
mod options;
mod puzzle;
mod reach;
mod schedule;
mod signature;
mod validator;

pub const MIN_WORD_LENGTH: usize = 3;
pub const MAX_WORD_LENGTH: usize = 8;

pub use difficulty::{DifficultyScorer, SignatureScore, compare_words, letter_penalty};
pub use dictionary::{Dictionary, SEED_WORDS};
pub use error::{ChainError, DictionaryError, LadderError, ScheduleError, ShapeViolation};
pub use generator::{GeneratorConfig, PuzzleGenerator, pick_weighted};
pub use graph::{AdjacencyGraph, GraphStats, LadderGraph};
pub use index::SignatureIndex;
pub use options::{
    DEFAULT_OPTION_LIMIT, NextOption, NextStep, WordCheck, check_word, next_options,
};
pub use puzzle::{
    CHAIN_LENGTH, ChainSource, FALLBACK_SIGNATURES, FALLBACK_WORDS, PuzzleChain, chain_key,
};
pub use reach::ReachabilityOracle;
pub use schedule::{
    BatchDetail, BatchReport, MAX_BATCH_DAYS, ResolvedPuzzle, Schedule, ScheduledPuzzle,
    SkipReason, generate_puzzle_id,
};
pub use signature::{added_letter, check_shape, is_lowercase_alphabetic, signature_of};
pub use validator::validate_chain;

/// Builds the signature index, adjacency, reachability table and difficulty cache.
pub fn build_graph<I, S>(words: I) -> LadderGraph
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    LadderGraph::build(words)
}

/// Builds a graph over a loaded [`Dictionary`].
pub fn graph_from_dictionary(dictionary: &Dictionary) -> LadderGraph {
    LadderGraph::build(dictionary.words())
}
