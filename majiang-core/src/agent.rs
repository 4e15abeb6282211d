//! The opaque player behind the message interface.

use crate::model::{Event, Reply};

/// A player policy. The round calls `act` once per broadcast with the
/// event already masked for this seat, and consumes at most one reply.
/// Agents receive immutable views and must not assume any inter-seat
/// ordering within a broadcast.
pub trait Agent {
    fn act(&mut self, event: &Event) -> Reply;
}

/// Baseline agent that never acts, so the round falls back to the
/// default for every state (tsumogiri on its own turn, pass otherwise).
#[derive(Default)]
pub struct Tsumogiri;

impl Agent for Tsumogiri {
    fn act(&mut self, _event: &Event) -> Reply {
        Reply::None
    }
}
