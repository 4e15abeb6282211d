use thiserror::Error;

/// A token that does not parse as a tile, meld, or hand.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("invalid notation: {0:?}")]
pub struct NotationError(pub String);

impl NotationError {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}
