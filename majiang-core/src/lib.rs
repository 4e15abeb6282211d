//! Core rules engine for Japanese Riichi Mahjong.
//!
//! The crate is a pure rules library: it represents hands, discard
//! piles, and the wall; enumerates legal actions; computes shanten,
//! waits, and winning decompositions; scores wins under a configurable
//! [`rules::Ruleset`]; and drives a four-player round through the
//! deterministic [`engine::Game`] state machine, producing a complete
//! [`model::Record`].
//!
//! Randomness is an injected capability (any [`rand::Rng`]) consumed
//! only while shuffling the wall, so a seeded game replays exactly.
//! Players are opaque [`agent::Agent`]s behind a message interface.

pub mod agent;
pub mod analysis;
pub mod engine;
pub mod errors;
pub mod hand;
pub mod model;
pub mod river;
pub mod rules;
pub mod scoring;
pub mod wall;

pub use majiang_elements as elements;

pub mod prelude {
    //! Convenient re-exports of commonly imported items.
    pub use majiang_elements::prelude::*;

    pub use crate::agent::{Agent, Tsumogiri};
    pub use crate::analysis::{shanten, waits, win_forms};
    pub use crate::engine::Game;
    pub use crate::errors::{Error, Result};
    pub use crate::hand::{DiscardOption, Hand, Incoming};
    pub use crate::model::{DrawKind, Event, Record, Reply};
    pub use crate::river::{Discard, River};
    pub use crate::rules::Ruleset;
    pub use crate::scoring::{score_win, Win, WinContext, Yaku, YakuHit, YakuValue};
    pub use crate::wall::{Wall, WallInterface};
}
