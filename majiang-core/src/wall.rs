//! The wall of tiles 山.
//!
//! The shuffled sequence is fixed at construction; drawing and revealing
//! only move cursors over it. The first 14 tiles form the dead wall:
//!
//! ```ascii_art
//!  index   0  1  2  3 |  4    5    6    7    8    9   10   11   12   13 | 14 .. 135
//!         RS RS RS RS | D0  UD0   D1  UD1   D2  UD2   D3  UD3   D4  UD4 | live wall
//! ```
//!
//! `RS` are the rinshan (kan replacement) draws, `Dk`/`UDk` the dora and
//! ura-dora indicators, revealed outward from index 4. Live draws pop
//! from the far end; every kan draw shrinks the live wall by one, which
//! models the dead wall being replenished.

use rand::Rng;

use majiang_elements::prelude::*;

use crate::errors::{Error, Result};
use crate::rules::Ruleset;

/// Shared surface of [`Wall`], so a spectator board fed from a network
/// stream can stand in for the shuffled one.
pub trait WallInterface {
    fn live_count(&self) -> usize;
    fn dora_indicators(&self) -> Vec<Tile>;
    fn ura_indicators(&self) -> Option<Vec<Tile>>;
    fn draw(&mut self) -> Result<Tile>;
    fn kan_draw(&mut self) -> Result<Tile>;
    fn reveal_kan_dora(&mut self) -> Result<Tile>;
    fn close(&mut self);
}

/// The shuffled 136-tile wall with dead-wall accounting.
#[derive(Clone, Debug)]
pub struct Wall {
    tiles: Vec<Tile>,
    live: usize,
    next_live: usize,
    next_rinshan: usize,
    /// Revealed dora indicator slots; `None` is the blank slot recorded
    /// for a kan when kan-dora is disabled.
    dora_slots: Vec<Option<Tile>>,
    ura_slots: Vec<Tile>,
    kan_pending: bool,
    closed: bool,
    ura_dora: bool,
    kan_dora: bool,
    kan_ura: bool,
}

impl Wall {
    /// Shuffle a fresh wall with the injected randomness source: the
    /// sorted 136-tile set (with the configured red fives substituted)
    /// is consumed by repeatedly picking index `floor(rand * remaining)`.
    pub fn new(rule: &Ruleset, rng: &mut impl Rng) -> Self {
        let mut pool = Vec::with_capacity(136);
        for s in 0..4u8 {
            let top = if s == 3 { 7 } else { 9 };
            for n in 1..=top {
                let tile = Tile::from_suit_num(s, n).unwrap();
                for i in 0..4 {
                    let red = n == 5 && s < 3 && i < rule.red_fives[s as usize];
                    pool.push(if red { tile.to_red() } else { tile });
                }
            }
        }
        let mut tiles = Vec::with_capacity(136);
        while !pool.is_empty() {
            let index = (rng.gen::<f64>() * pool.len() as f64).floor() as usize;
            tiles.push(pool.remove(index));
        }
        let dora_slots = vec![Some(tiles[4])];
        let ura_slots = vec![tiles[5]];
        Self {
            tiles,
            live: 122,
            next_live: 135,
            next_rinshan: 0,
            dora_slots,
            ura_slots,
            kan_pending: false,
            closed: false,
            ura_dora: rule.ura_dora,
            kan_dora: rule.kan_dora,
            kan_ura: rule.kan_ura,
        }
    }

    fn check_drawable(&self) -> Result<()> {
        if self.closed {
            return Err(Error::illegal("draw from a closed wall"));
        }
        if self.live == 0 {
            return Err(Error::illegal("draw from an exhausted wall"));
        }
        if self.kan_pending {
            return Err(Error::illegal("draw before revealing the kan dora"));
        }
        Ok(())
    }

    pub fn kan_pending(&self) -> bool {
        self.kan_pending
    }
}

impl WallInterface for Wall {
    /// Tiles left in the live wall (the dead wall excluded).
    fn live_count(&self) -> usize {
        self.live
    }

    /// Visible dora indicators, blank slots skipped.
    fn dora_indicators(&self) -> Vec<Tile> {
        self.dora_slots.iter().copied().flatten().collect()
    }

    /// Ura indicators: `None` until the wall closes, and `None` outright
    /// when ura-dora is disabled.
    fn ura_indicators(&self) -> Option<Vec<Tile>> {
        (self.closed && self.ura_dora).then(|| self.ura_slots.clone())
    }

    fn draw(&mut self) -> Result<Tile> {
        self.check_drawable()?;
        let tile = self.tiles[self.next_live];
        self.next_live -= 1;
        self.live -= 1;
        Ok(tile)
    }

    /// Rinshan draw after a kan.
    fn kan_draw(&mut self) -> Result<Tile> {
        self.check_drawable()?;
        if self.dora_slots.len() == 5 {
            return Err(Error::illegal("fifth kan draw"));
        }
        let tile = self.tiles[self.next_rinshan];
        self.next_rinshan += 1;
        self.live -= 1;
        if self.kan_dora {
            self.kan_pending = true;
        } else {
            // keep the slot accounting without revealing anything
            self.dora_slots.push(None);
        }
        Ok(tile)
    }

    /// Reveal the kan dora pending from the last kan draw.
    fn reveal_kan_dora(&mut self) -> Result<Tile> {
        if !self.kan_pending {
            return Err(Error::illegal("no kan dora is pending"));
        }
        let index = 4 + 2 * self.dora_slots.len();
        let tile = self.tiles[index];
        self.dora_slots.push(Some(tile));
        if self.kan_ura {
            self.ura_slots.push(self.tiles[index + 1]);
        }
        self.kan_pending = false;
        Ok(tile)
    }

    /// Seal the wall at hand end, exposing the ura indicators.
    fn close(&mut self) {
        self.closed = true;
    }
}
