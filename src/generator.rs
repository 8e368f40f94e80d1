use std::collections::HashSet;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tracing::{debug, warn};

use crate::error::LadderError;
use crate::graph::LadderGraph;
use crate::puzzle::{ChainSource, PuzzleChain};
use crate::{MAX_WORD_LENGTH, MIN_WORD_LENGTH};

const MIN_WEIGHT: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// How many of the easiest start signatures are eligible.
    pub start_pool: usize,
    /// Attempts per requested suggestion when building a list.
    pub batch_attempt_factor: usize,
    /// Attempts at finding a chain not already in use.
    pub unique_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_pool: 500,
            batch_attempt_factor: 20,
            unique_attempts: 200,
        }
    }
}

/// Weighted random walk over a [`LadderGraph`].
///
/// Each step prefers low-difficulty signatures with weight `1 / (1 + difficulty)`,
/// but every candidate keeps a nonzero chance so puzzles vary from day to day.
#[derive(Debug, Clone, Copy)]
pub struct PuzzleGenerator<'g> {
    graph: &'g LadderGraph,
    config: GeneratorConfig,
}

impl<'g> PuzzleGenerator<'g> {
    pub fn new(graph: &'g LadderGraph) -> Self {
        Self::with_config(graph, GeneratorConfig::default())
    }

    pub fn with_config(graph: &'g LadderGraph, config: GeneratorConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One random chain, or `None` when no start can reach the longest band.
    pub fn generate_chain<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleChain> {
        let ranked = self.graph.ranked_starts();
        let pool = &ranked[..ranked.len().min(self.config.start_pool)];
        let mut current: &str = self.pick(pool, rng)?;
        let mut path = Vec::with_capacity(MAX_WORD_LENGTH - MIN_WORD_LENGTH + 1);
        path.push(current.to_string());

        for len in MIN_WORD_LENGTH + 1..=MAX_WORD_LENGTH {
            let candidates: Vec<&str> = self
                .graph
                .children(current)
                .iter()
                .map(String::as_str)
                .filter(|child| self.graph.oracle().reaches(child, len))
                .collect();
            let Some(&next) = self.pick(&candidates, rng) else {
                debug!(signature = current, len, "Dead end while walking ladder");
                return None;
            };
            current = next;
            path.push(current.to_string());
        }

        let words = path
            .iter()
            .map(|signature| {
                self.graph
                    .representative(signature)
                    .unwrap_or(signature)
                    .to_string()
            })
            .collect();
        let chain = PuzzleChain::from_path(self.graph, path, words, ChainSource::Generated);
        debug!(key = %chain.key(), difficulty = chain.average_difficulty, "Generated chain");
        Some(chain)
    }

    /// A generated chain, or the static fallback when generation fails.
    pub fn chain_or_fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> PuzzleChain {
        self.generate_chain(rng).unwrap_or_else(|| {
            warn!("No reachable start signature; serving static fallback chain");
            PuzzleChain::fallback()
        })
    }

    /// Up to `count` distinct chains, easiest first.
    pub fn suggestions<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<PuzzleChain> {
        let attempts = count.saturating_mul(self.config.batch_attempt_factor);
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(count);
        for _ in 0..attempts {
            if out.len() >= count {
                break;
            }
            let Some(chain) = self.generate_chain(rng) else {
                continue;
            };
            if seen.insert(chain.key()) {
                out.push(chain);
            }
        }
        out.sort_by(|a, b| a.average_difficulty.total_cmp(&b.average_difficulty));
        out
    }

    /// A chain whose key is not in `used_keys`; the accepted key is added to the set.
    pub fn try_unique_chain<R: Rng + ?Sized>(
        &self,
        used_keys: &mut HashSet<String>,
        rng: &mut R,
    ) -> Result<PuzzleChain, LadderError> {
        for _ in 0..self.config.unique_attempts {
            let Some(chain) = self.generate_chain(rng) else {
                continue;
            };
            let key = chain.key();
            if used_keys.contains(&key) {
                continue;
            }
            used_keys.insert(key);
            return Ok(chain);
        }
        Err(LadderError::GenerationExhausted {
            attempts: self.config.unique_attempts,
        })
    }

    /// Like [`Self::try_unique_chain`], but once the budget is spent falls back to a
    /// single best-effort chain that may repeat one already used.
    pub fn unique_chain<R: Rng + ?Sized>(
        &self,
        used_keys: &mut HashSet<String>,
        rng: &mut R,
    ) -> Option<PuzzleChain> {
        match self.try_unique_chain(used_keys, rng) {
            Ok(chain) => Some(chain),
            Err(err) => {
                warn!(
                    error = %err,
                    used = used_keys.len(),
                    "Falling back to a possibly repeated chain"
                );
                self.generate_chain(rng)
            }
        }
    }

    fn pick<'a, S, R>(&self, items: &'a [S], rng: &mut R) -> Option<&'a S>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        pick_weighted(
            items,
            |signature| {
                let difficulty = self.graph.difficulty(signature.as_ref()).unwrap_or(f64::MAX);
                1.0 / (1.0 + difficulty)
            },
            rng,
        )
    }
}

/// Picks one item with probability proportional to `weight`, floored at a small positive value.
pub fn pick_weighted<'a, T, F, R>(items: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    F: Fn(&T) -> f64,
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    let weights = items.iter().map(|item| weight(item).max(MIN_WEIGHT));
    let distribution = WeightedIndex::new(weights).ok()?;
    items.get(distribution.sample(rng))
}
