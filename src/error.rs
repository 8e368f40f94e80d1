use std::io;

/// Why a word or signature failed the shape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShapeViolation {
    #[error("must contain lowercase letters a-z only")]
    NotLowercaseAlphabetic,
    #[error("length {0} is outside 3..=8")]
    LengthOutOfRange(usize),
    #[error("expected length {expected}, found {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Positional failures reported while re-checking a submitted chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("expected 6 signatures, got {0}")]
    WrongCount(usize),
    #[error("invalid signature at index {index}: {reason}")]
    Malformed { index: usize, reason: ShapeViolation },
    #[error("signature {signature:?} not found in dictionary at index {index}")]
    UnknownSignature { index: usize, signature: String },
    #[error("invalid chain step from index {} to {index}", .index - 1)]
    BrokenStep { index: usize },
}

impl ChainError {
    /// Offending position in the chain, when the failure has one.
    pub fn index(&self) -> Option<usize> {
        match self {
            ChainError::WrongCount(_) => None,
            ChainError::Malformed { index, .. }
            | ChainError::UnknownSignature { index, .. }
            | ChainError::BrokenStep { index } => Some(*index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LadderError {
    #[error("malformed input {value:?}: {reason}")]
    MalformedInput {
        value: String,
        reason: ShapeViolation,
    },
    #[error("word {0:?} not found in dictionary")]
    UnknownWord(String),
    #[error("signature {0:?} not found in graph")]
    UnknownSignature(String),
    #[error("no chain could be generated after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
    #[error(transparent)]
    InvalidChain(#[from] ChainError),
}

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decompress dictionary: {0}")]
    Decompress(#[source] io::Error),
    #[error("dictionary is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("puzzle {0:?} not found")]
    NotFound(String),
    #[error("schedule has more than one puzzle on {0}")]
    DuplicateDate(chrono::NaiveDate),
    #[error("could not resolve a publish date after {0}")]
    DateOutOfRange(chrono::NaiveDate),
    #[error("schedule io error: {0}")]
    Io(#[from] io::Error),
    #[error("schedule file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidChain(#[from] ChainError),
}
