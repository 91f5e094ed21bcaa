// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Invalid character '{0}' in pattern")]
    InvalidCharacter(char),
    #[error("Incomplete hex pair in pattern")]
    IncompleteHexPair,
}
