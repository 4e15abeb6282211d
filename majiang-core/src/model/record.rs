//! [`Record`]: the complete log of one game.

use serde::{Deserialize, Serialize};

use majiang_elements::prelude::*;

use super::Event;

/// The full game record: a header, one unmasked event list per round
/// (`qipai` first, `hule`/`pingju` last), and the final standings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub names: [String; 4],
    /// The seat dealt east first.
    pub qijia: Seat,
    pub rounds: Vec<Vec<Event>>,
    pub points: [Points; 4],
    /// Final placement per seat, 1..=4.
    pub rank: [u8; 4],
    /// Rank-point scores per seat; they sum to zero.
    pub scores: [f64; 4],
}
