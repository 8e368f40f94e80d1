use crate::error::ShapeViolation;
use crate::{MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// Canonical form of a word: its letters sorted ascending.
pub fn signature_of(word: &str) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

pub fn is_lowercase_alphabetic(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_lowercase())
}

/// Checks that `value` is a playable word or signature: `[a-z]+`, length 3..=8.
pub fn check_shape(value: &str) -> Result<(), ShapeViolation> {
    if !is_lowercase_alphabetic(value) {
        return Err(ShapeViolation::NotLowercaseAlphabetic);
    }
    let len = value.len();
    if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&len) {
        return Err(ShapeViolation::LengthOutOfRange(len));
    }
    Ok(())
}

/// Letter inserted between a parent signature and one of its children.
///
/// Only meaningful when `child` is `parent` plus exactly one letter; returns
/// `None` when no such letter is found or either side has non `a-z` bytes.
pub fn added_letter(parent: &str, child: &str) -> Option<char> {
    let mut counts = [0i32; 26];
    for b in parent.bytes() {
        if !b.is_ascii_lowercase() {
            return None;
        }
        counts[(b - b'a') as usize] += 1;
    }
    for b in child.bytes() {
        if !b.is_ascii_lowercase() {
            return None;
        }
        let slot = &mut counts[(b - b'a') as usize];
        *slot -= 1;
        if *slot < 0 {
            return Some(b as char);
        }
    }
    None
}

/// Distinct strings produced by deleting one character of a sorted signature.
pub(crate) fn one_letter_removals(signature: &str) -> Vec<String> {
    let bytes = signature.as_bytes();
    let mut out: Vec<String> = Vec::with_capacity(bytes.len());
    for i in 0..bytes.len() {
        // Runs of a repeated letter yield the same removal; skip all but the first.
        if i > 0 && bytes[i] == bytes[i - 1] {
            continue;
        }
        let mut candidate = String::with_capacity(bytes.len() - 1);
        candidate.push_str(&signature[..i]);
        candidate.push_str(&signature[i + 1..]);
        out.push(candidate);
    }
    out
}
