//! The round state machine: turn and claim orchestration, abortive
//! draws, payouts, and record assembly.

mod game;

pub use game::{Game, Phase};
