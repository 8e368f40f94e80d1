use serde::Serialize;

use crate::difficulty::letter_penalty;
use crate::error::{LadderError, ShapeViolation};
use crate::graph::LadderGraph;
use crate::signature::{check_shape, is_lowercase_alphabetic, signature_of};
use crate::MAX_WORD_LENGTH;

pub const DEFAULT_OPTION_LIMIT: usize = 400;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOption {
    pub word: String,
    pub signature: String,
    pub can_reach_eight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum NextStep {
    /// The word is already full length.
    Done,
    #[serde(rename_all = "camelCase")]
    Options {
        next_length: usize,
        options: Vec<NextOption>,
    },
}

/// Legal one-letter extensions of `word` for an interactive ladder builder.
///
/// Options that can still be completed come first, then the easier spellings,
/// then alphabetical order. At most `limit` options are returned.
pub fn next_options(
    graph: &LadderGraph,
    word: &str,
    limit: usize,
) -> Result<NextStep, LadderError> {
    let word = word.trim().to_lowercase();
    check_shape(&word).map_err(|reason| LadderError::MalformedInput {
        value: word.clone(),
        reason,
    })?;
    if !graph.contains_word(&word) {
        return Err(LadderError::UnknownWord(word));
    }
    let signature = signature_of(&word);
    if !graph.contains_signature(&signature) {
        return Err(LadderError::UnknownSignature(signature));
    }
    if word.len() == MAX_WORD_LENGTH {
        return Ok(NextStep::Done);
    }

    let mut scored: Vec<(f64, NextOption)> = Vec::new();
    for child in graph.children(&signature) {
        let can_reach_eight = graph.can_reach_max(child);
        let Some(words) = graph.words_for(child) else {
            continue;
        };
        scored.extend(words.iter().map(|option| {
            (
                letter_penalty(option),
                NextOption {
                    word: option.clone(),
                    signature: child.clone(),
                    can_reach_eight,
                },
            )
        }));
    }
    scored.sort_by(|(pa, a), (pb, b)| {
        b.can_reach_eight
            .cmp(&a.can_reach_eight)
            .then_with(|| pa.total_cmp(pb))
            .then_with(|| a.word.cmp(&b.word))
    });
    let options = scored
        .into_iter()
        .take(limit)
        .map(|(_, option)| option)
        .collect();

    Ok(NextStep::Options {
        next_length: word.len() + 1,
        options,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCheck {
    pub ok: bool,
    pub in_dictionary: bool,
    pub signature_matches: bool,
}

/// Checks a player's row: the word must be known and spell `expected_signature`.
pub fn check_word(
    graph: &LadderGraph,
    word: &str,
    expected_signature: &str,
) -> Result<WordCheck, LadderError> {
    let word = word.trim().to_lowercase();
    if !is_lowercase_alphabetic(&word) {
        return Err(LadderError::MalformedInput {
            value: word,
            reason: ShapeViolation::NotLowercaseAlphabetic,
        });
    }
    let in_dictionary = graph.contains_word(&word);
    let signature_matches = signature_of(&word) == expected_signature.trim().to_lowercase();
    Ok(WordCheck {
        ok: in_dictionary && signature_matches,
        in_dictionary,
        signature_matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::SCENARIO_WORDS;

    fn options_of(step: NextStep) -> (usize, Vec<NextOption>) {
        match step {
            NextStep::Options {
                next_length,
                options,
            } => (next_length, options),
            NextStep::Done => panic!("expected options"),
        }
    }

    #[test]
    fn art_offers_reachable_aert_words() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        let step = next_options(&graph, "art", DEFAULT_OPTION_LIMIT).unwrap();
        let (next_length, options) = options_of(step);
        assert_eq!(next_length, 4);
        let words: Vec<_> = options.iter().map(|o| o.word.as_str()).collect();
        assert_eq!(words, vec!["rate", "tare", "tear"]);
        assert!(options.iter().all(|o| o.signature == "aert" && o.can_reach_eight));
    }

    #[test]
    fn reachable_options_sort_first() {
        let words = SCENARIO_WORDS.iter().copied().chain(["rats", "star", "arts"]);
        let graph = LadderGraph::build(words);
        let (_, options) = options_of(next_options(&graph, "tar", DEFAULT_OPTION_LIMIT).unwrap());
        let flags: Vec<_> = options.iter().map(|o| o.can_reach_eight).collect();
        assert_eq!(flags, vec![true, true, true, false, false, false]);
        assert_eq!(options[3].word, "arts");
        assert_eq!(options[3].signature, "arst");
    }

    #[test]
    fn penalty_orders_within_reachability() {
        let graph = LadderGraph::build(["ore", "wore", "oreo", "tore", "rote"]);
        let step = next_options(&graph, "ore", DEFAULT_OPTION_LIMIT).unwrap();
        let (_, options) = options_of(step);
        let words: Vec<_> = options.iter().map(|o| o.word.as_str()).collect();
        assert_eq!(words, vec!["rote", "tore", "oreo", "wore"]);
        assert!(options.iter().all(|o| !o.can_reach_eight));
    }

    #[test]
    fn limit_caps_options() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        let (_, options) = options_of(next_options(&graph, "art", 2).unwrap());
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn full_length_word_is_done() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        assert_eq!(next_options(&graph, "Ratchets", 10).unwrap(), NextStep::Done);
    }

    #[test]
    fn bad_input_is_reported() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        assert!(matches!(
            next_options(&graph, "ar7", 10),
            Err(LadderError::MalformedInput { .. })
        ));
        assert!(matches!(
            next_options(&graph, "at", 10),
            Err(LadderError::MalformedInput {
                reason: ShapeViolation::LengthOutOfRange(2),
                ..
            })
        ));
        assert_eq!(
            next_options(&graph, "tra", 10),
            Err(LadderError::UnknownWord("tra".to_string()))
        );
    }

    #[test]
    fn word_check_flags_each_condition() {
        let graph = LadderGraph::build(SCENARIO_WORDS);
        let check = check_word(&graph, "Heart", "aehrt").unwrap();
        assert!(check.ok);
        let check = check_word(&graph, "hatre", "aehrt").unwrap();
        assert!(!check.ok && !check.in_dictionary && check.signature_matches);
        let check = check_word(&graph, "hearts", "aehrt").unwrap();
        assert!(!check.ok && check.in_dictionary && !check.signature_matches);
        assert!(check_word(&graph, "he art", "aehrt").is_err());
    }

    #[test]
    fn serializes_step_shape() {
        let value = serde_json::to_value(NextStep::Done).unwrap();
        assert_eq!(value["status"], "done");
        let graph = LadderGraph::build(SCENARIO_WORDS);
        let value = serde_json::to_value(next_options(&graph, "art", 1).unwrap()).unwrap();
        assert_eq!(value["nextLength"], 4);
        assert_eq!(value["options"][0]["canReachEight"], true);
    }
}
