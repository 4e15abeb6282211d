use thiserror::Error;

use majiang_elements::errors::NotationError;
use majiang_elements::seat::Seat;

/// Errors raised by the core engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A malformed tile, meld, or hand token.
    #[error(transparent)]
    InvalidNotation(#[from] NotationError),

    /// An operation would corrupt state: tile counts out of range, wrong
    /// hand size, removing a tile that is not there. Indicates a bug when
    /// raised from inside the state machine.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A well-formed operation that is not permitted in the current state
    /// (draw from a closed wall, pon after riichi, ...).
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// An agent reply outside the legal-move set for the current state.
    #[error("invalid reply from seat {seat}: {reason}")]
    InvalidReply { seat: Seat, reason: String },
}

impl Error {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }
    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        Error::IllegalAction(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
