use crate::error::{ChainError, ShapeViolation};
use crate::graph::LadderGraph;
use crate::puzzle::{CHAIN_LENGTH, ChainSource, PuzzleChain};
use crate::signature::is_lowercase_alphabetic;
use crate::MIN_WORD_LENGTH;

/// Re-checks a submitted chain against the graph before it can be published.
///
/// Signatures are lowercased, then each position must be `a-z` only, have
/// length `3 + index`, be indexed, and (after the first) be a child of the
/// previous signature. The first violation is returned with its index.
///
/// Supplied words are kept when they belong to their position's signature;
/// anything else (missing, misspelled, wrong anagram) is replaced by the
/// representative word. Words are ignored unless there is one per signature.
pub fn validate_chain<S, W>(
    graph: &LadderGraph,
    signatures: &[S],
    words: Option<&[W]>,
) -> Result<PuzzleChain, ChainError>
where
    S: AsRef<str>,
    W: AsRef<str>,
{
    if signatures.len() != CHAIN_LENGTH {
        return Err(ChainError::WrongCount(signatures.len()));
    }

    let mut normalized: Vec<String> = Vec::with_capacity(CHAIN_LENGTH);
    for (index, raw) in signatures.iter().enumerate() {
        let signature = raw.as_ref().trim().to_lowercase();
        let expected = MIN_WORD_LENGTH + index;
        if !is_lowercase_alphabetic(&signature) {
            return Err(ChainError::Malformed {
                index,
                reason: ShapeViolation::NotLowercaseAlphabetic,
            });
        }
        if signature.len() != expected {
            return Err(ChainError::Malformed {
                index,
                reason: ShapeViolation::WrongLength {
                    expected,
                    actual: signature.len(),
                },
            });
        }
        if !graph.contains_signature(&signature) {
            return Err(ChainError::UnknownSignature { index, signature });
        }
        if let Some(previous) = normalized.last() {
            if !graph.is_edge(previous, &signature) {
                return Err(ChainError::BrokenStep { index });
            }
        }
        normalized.push(signature);
    }

    let supplied = words.filter(|list| list.len() == normalized.len());
    let words = normalized
        .iter()
        .enumerate()
        .map(|(index, signature)| {
            let candidate = supplied.map(|list| list[index].as_ref().trim().to_lowercase());
            match candidate {
                Some(word)
                    if graph
                        .words_for(signature)
                        .is_some_and(|set| set.contains(&word)) =>
                {
                    word
                }
                _ => graph
                    .representative(signature)
                    .unwrap_or(signature)
                    .to_string(),
            }
        })
        .collect();

    Ok(PuzzleChain::from_path(
        graph,
        normalized,
        words,
        ChainSource::Curated,
    ))
}
