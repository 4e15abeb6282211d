//! Hand 手牌: the concealed tile multiset, called melds, draw marker, and
//! riichi flag of one player, plus every legal-move query the state
//! machine needs.
//!
//! The text form lists the concealed tiles sorted m→p→s→z with red fives
//! (`0`) ahead of ordinary fives, then the current draw (suit letter
//! re-emitted only when it differs), `*` under riichi, then the called
//! melds in call order separated by commas. A trailing comma marks a hand
//! that has just called and must discard.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use majiang_elements::prelude::*;

use crate::errors::{Error, Result};

/// What the hand gained most recently, while it is 14-tiles-equivalent.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Incoming {
    /// A wall draw; `None` when the tile is face-down (another seat's
    /// perspective).
    Draw(Option<Tile>),
    /// The newest meld; the hand must discard before anything else.
    Claim,
}

/// One entry of [`Hand::legal_discards`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DiscardOption {
    pub tile: Tile,
    /// Discarding the draw itself (ツモ切り).
    pub tsumogiri: bool,
}

/// A player's hand.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hand {
    /// `counts[suit][n]` is the number of concealed copies of tile n
    /// (1..=9; honors 1..=7). `counts[suit][0]` is how many of the fives
    /// counted in `counts[suit][5]` are red.
    counts: [[u8; 10]; 4],
    /// Face-down tiles (`_`) standing in for unknown concealed tiles.
    hidden: u8,
    melds: Vec<Meld>,
    incoming: Option<Incoming>,
    riichi: bool,
}

impl Hand {
    /// Build a hand from dealt tiles (no draw marker).
    pub fn from_tiles(tiles: &[Tile]) -> Result<Self> {
        let mut hand = Hand::default();
        for &t in tiles {
            hand.increase(t, true)?;
        }
        Ok(hand)
    }

    pub fn counts(&self) -> &[[u8; 10]; 4] {
        &self.counts
    }
    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }
    pub fn hidden_count(&self) -> u8 {
        self.hidden
    }
    /// The current wall draw, when there is one and it is face-up.
    pub fn drawn(&self) -> Option<Tile> {
        match self.incoming {
            Some(Incoming::Draw(t)) => t,
            _ => None,
        }
    }
    /// Is the hand in its 14-tiles-equivalent state (draw or fresh call)?
    pub fn must_discard(&self) -> bool {
        self.incoming.is_some()
    }
    pub fn incoming(&self) -> Option<Incoming> {
        self.incoming
    }
    /// Menzen iff no called meld has a direction flag; an ankan does not
    /// break concealment.
    pub fn is_menzen(&self) -> bool {
        !self.melds.iter().any(|m| m.is_open())
    }
    pub fn is_riichi(&self) -> bool {
        self.riichi
    }

    /// Concealed tiles including face-down ones.
    fn concealed_total(&self) -> usize {
        let mut total = self.hidden as usize;
        for s in 0..4 {
            for n in 1..=9 {
                total += self.counts[s][n] as usize;
            }
        }
        total
    }

    fn increase(&mut self, tile: Tile, check: bool) -> Result<()> {
        let s = tile.suit() as usize;
        let n = tile.normal_num() as usize;
        if check && self.counts[s][n] >= 4 {
            return Err(Error::invariant(format!(
                "fifth copy of {}",
                tile.normalized()
            )));
        }
        self.counts[s][n] += 1;
        if tile.is_red() {
            self.counts[s][0] += 1;
        }
        Ok(())
    }

    /// Remove one copy, falling back to a face-down tile when the exact
    /// one is not held (replaying another seat's hand).
    fn decrease(&mut self, tile: Tile) -> Result<()> {
        let s = tile.suit() as usize;
        let n = tile.normal_num() as usize;
        let reds = if s < 3 { self.counts[s][0] } else { 0 };
        let available = if tile.is_red() {
            reds
        } else if s < 3 && n == 5 {
            self.counts[s][5] - reds
        } else {
            self.counts[s][n]
        };
        if available == 0 {
            if self.hidden == 0 {
                return Err(Error::invariant(format!("{tile} is not in the hand")));
            }
            self.hidden -= 1;
            return Ok(());
        }
        self.counts[s][n] -= 1;
        if tile.is_red() {
            self.counts[s][0] -= 1;
        }
        Ok(())
    }

    /// Take the turn draw (or a face-down placeholder).
    pub fn draw(&mut self, tile: Option<Tile>, check: bool) -> Result<&mut Self> {
        if self.incoming.is_some() {
            return Err(Error::illegal("draw while a discard is pending"));
        }
        if check && (self.concealed_total() + 3 * self.melds.len()) % 3 != 1 {
            return Err(Error::illegal("draw into a hand of the wrong size"));
        }
        match tile {
            Some(t) => self.increase(t, check)?,
            None => self.hidden += 1,
        }
        self.incoming = Some(Incoming::Draw(tile));
        Ok(self)
    }

    /// Discard a tile; `riichi` marks the riichi-declaring discard.
    pub fn discard(&mut self, tile: Tile, riichi: bool, check: bool) -> Result<&mut Self> {
        if self.incoming.is_none() {
            return Err(Error::illegal("discard without a pending draw or call"));
        }
        if check && self.riichi {
            match self.incoming {
                Some(Incoming::Draw(Some(d))) if d == tile => {}
                Some(Incoming::Draw(None)) => {}
                _ => return Err(Error::illegal("riichi locks every tile but the draw")),
            }
        }
        if riichi {
            if check && !self.is_menzen() {
                return Err(Error::illegal("riichi with an open hand"));
            }
            if check && self.riichi {
                return Err(Error::illegal("riichi declared twice"));
            }
            self.riichi = true;
        }
        self.decrease(tile)?;
        self.incoming = None;
        Ok(self)
    }

    /// Claim a discard with a chi, pon, or daiminkan.
    pub fn call(&mut self, meld: &Meld, check: bool) -> Result<&mut Self> {
        if matches!(meld.kind(), MeldKind::Ankan | MeldKind::Kakan) {
            return Err(Error::illegal("ankan/kakan go through kan()"));
        }
        if self.incoming.is_some() {
            return Err(Error::illegal("call while holding a draw"));
        }
        if check && self.riichi {
            return Err(Error::illegal("call after riichi"));
        }
        let claimed = meld
            .claimed_tile()
            .ok_or_else(|| Error::illegal("call without a claimed tile"))?;
        let mut skipped = false;
        for t in meld.tiles() {
            if !skipped && t == claimed {
                skipped = true;
                continue;
            }
            self.decrease(t)?;
        }
        self.melds.push(*meld);
        // a daiminkan is followed by the rinshan draw, not a discard
        self.incoming = if meld.kind() == MeldKind::Daiminkan {
            None
        } else {
            Some(Incoming::Claim)
        };
        Ok(self)
    }

    /// Declare an ankan or kakan out of the turn draw.
    pub fn kan(&mut self, meld: &Meld, check: bool) -> Result<&mut Self> {
        let drawn = match self.incoming {
            Some(Incoming::Draw(t)) => t,
            _ => return Err(Error::illegal("kan requires the turn draw")),
        };
        match meld.kind() {
            MeldKind::Ankan => {
                if check && self.riichi {
                    let matches_draw =
                        drawn.map_or(false, |d| d.normalized() == meld.tile());
                    if !matches_draw {
                        return Err(Error::illegal("riichi ankan must use the draw"));
                    }
                }
                for t in meld.tiles() {
                    self.decrease(t)?;
                }
                self.melds.push(*meld);
            }
            MeldKind::Kakan => {
                if check && self.riichi {
                    return Err(Error::illegal("kakan after riichi"));
                }
                let added = meld
                    .added_tile()
                    .ok_or_else(|| Error::illegal("kakan without an added tile"))?;
                let pos = self
                    .melds
                    .iter()
                    .position(|m| {
                        m.kind() == MeldKind::Pon
                            && m.suit() == meld.suit()
                            && m.num() == meld.num()
                            && m.dir() == meld.dir()
                    })
                    .ok_or_else(|| Error::illegal("kakan without a matching pon"))?;
                self.decrease(added)?;
                self.melds[pos] = *meld;
            }
            _ => return Err(Error::illegal("claimed melds go through call()")),
        }
        self.incoming = None;
        Ok(self)
    }

    fn deny_bit(suit: usize, num: u8) -> u64 {
        1 << (suit * 10 + num as usize)
    }

    /// Tiles forbidden as the discard right after a call (kuikae):
    /// the claimed tile itself, and for an end-claimed chi the tile
    /// completing the other end.
    fn kuikae_deny(&self) -> u64 {
        let meld = match (self.incoming, self.melds.last()) {
            (Some(Incoming::Claim), Some(m)) => m,
            _ => return 0,
        };
        let claimed = match meld.claimed_tile() {
            Some(t) => t,
            None => return 0,
        };
        let s = meld.suit() as usize;
        let n = claimed.normal_num();
        let mut deny = Self::deny_bit(s, n);
        if meld.kind() == MeldKind::Chi {
            let low = meld.num();
            if n == low && low + 3 <= 9 {
                deny |= Self::deny_bit(s, low + 3);
            }
            if n == low + 2 && low >= 2 {
                deny |= Self::deny_bit(s, low - 1);
            }
        }
        deny
    }

    /// All legal discards, or `None` when the hand is not in its discard
    /// phase. The draw itself is listed once, as the tsumogiri option;
    /// red and ordinary fives are distinct options. With
    /// `check_kuikae`, swap-call discards are removed.
    pub fn legal_discards(&self, check_kuikae: bool) -> Option<Vec<DiscardOption>> {
        let incoming = self.incoming?;
        if self.riichi {
            return Some(match incoming {
                Incoming::Draw(Some(t)) => vec![DiscardOption {
                    tile: t,
                    tsumogiri: true,
                }],
                _ => vec![],
            });
        }
        let deny = if check_kuikae { self.kuikae_deny() } else { 0 };
        let drawn = match incoming {
            Incoming::Draw(t) => t,
            Incoming::Claim => None,
        };
        let mut out = vec![];
        for s in 0..4 {
            let top = if s == 3 { 7 } else { 9 };
            for n in 1..=top {
                let c = self.counts[s][n as usize];
                if c == 0 || deny & Self::deny_bit(s, n) != 0 {
                    continue;
                }
                if s < 3 && n == 5 {
                    let reds = self.counts[s][0];
                    let normals = c - reds;
                    let normal = Tile::from_suit_num(s as u8, 5).unwrap();
                    let red = normal.to_red();
                    if normals > 0 && !(drawn == Some(normal) && normals == 1) {
                        out.push(DiscardOption {
                            tile: normal,
                            tsumogiri: false,
                        });
                    }
                    if reds > 0 && !(drawn == Some(red) && reds == 1) {
                        out.push(DiscardOption {
                            tile: red,
                            tsumogiri: false,
                        });
                    }
                } else {
                    let tile = Tile::from_suit_num(s as u8, n).unwrap();
                    if !(drawn == Some(tile) && c == 1) {
                        out.push(DiscardOption {
                            tile,
                            tsumogiri: false,
                        });
                    }
                }
            }
        }
        if let Some(t) = drawn {
            out.push(DiscardOption {
                tile: t,
                tsumogiri: true,
            });
        }
        Some(out)
    }

    /// Written digits that can fill a concealed chi slot of normalized
    /// number `n` (red and ordinary five are distinct).
    fn chi_slot_digits(&self, s: usize, n: u8) -> Vec<u8> {
        let mut out = vec![];
        if n == 5 && s < 3 {
            if self.counts[s][0] > 0 {
                out.push(0);
            }
            if self.counts[s][5] - self.counts[s][0] > 0 {
                out.push(5);
            }
        } else if self.counts[s][n as usize] > 0 {
            out.push(n);
        }
        out
    }

    /// All chi melds that could claim `tile` from the given direction, or
    /// `None` when the hand is not in its claiming phase. With
    /// `check_kuikae`, melds that would leave no legal discard are
    /// removed.
    pub fn legal_chi(&self, tile: Tile, dir: Dir, check_kuikae: bool) -> Option<Vec<Meld>> {
        if self.incoming.is_some() {
            return None;
        }
        let mut out = vec![];
        if tile.suit() == 3 || dir != Dir::Kamicha || self.riichi {
            return Some(out);
        }
        let s = tile.suit() as usize;
        let n = tile.normal_num();
        let claimed = tile.num();
        let counts = &self.counts[s];
        // concealed tiles left after the call; every denied copy must
        // leave at least one other tile to discard
        let room = 14 - 3 * (self.melds.len() as i32 + 1);
        let allowed = |suji: Option<u8>| {
            let denied = counts[n as usize] as i32
                + suji.map_or(0, |x| counts[x as usize] as i32);
            !check_kuikae || denied < room
        };

        // claimed tile at the high end
        if n >= 3 && counts[(n - 2) as usize] > 0 && counts[(n - 1) as usize] > 0 {
            let suji = (n > 3).then(|| n - 3);
            if allowed(suji) {
                for a in self.chi_slot_digits(s, n - 2) {
                    for b in self.chi_slot_digits(s, n - 1) {
                        out.push(Meld::chi(s as u8, claimed, [a, b]).unwrap());
                    }
                }
            }
        }
        // claimed tile in the middle
        if (2..=8).contains(&n) && counts[(n - 1) as usize] > 0 && counts[(n + 1) as usize] > 0 {
            if allowed(None) {
                for a in self.chi_slot_digits(s, n - 1) {
                    for b in self.chi_slot_digits(s, n + 1) {
                        out.push(Meld::chi(s as u8, claimed, [a, b]).unwrap());
                    }
                }
            }
        }
        // claimed tile at the low end
        if n <= 7 && counts[(n + 1) as usize] > 0 && counts[(n + 2) as usize] > 0 {
            let suji = (n + 3 <= 9).then(|| n + 3);
            if allowed(suji) {
                for a in self.chi_slot_digits(s, n + 1) {
                    for b in self.chi_slot_digits(s, n + 2) {
                        out.push(Meld::chi(s as u8, claimed, [a, b]).unwrap());
                    }
                }
            }
        }
        Some(out)
    }

    /// All pon melds that could claim `tile`, red-five variants
    /// enumerated, or `None` when the hand is not in its claiming phase.
    pub fn legal_pon(&self, tile: Tile, dir: Dir) -> Option<Vec<Meld>> {
        if self.incoming.is_some() {
            return None;
        }
        let mut out = vec![];
        if self.riichi {
            return Some(out);
        }
        let s = tile.suit() as usize;
        let n = tile.normal_num();
        let claimed = tile.num();
        let total = self.counts[s][n as usize];
        if s < 3 && n == 5 {
            let reds = self.counts[s][0];
            let normals = total - reds;
            if reds >= 2 {
                out.push(Meld::pon(s as u8, claimed, [0, 0], dir).unwrap());
            }
            if reds >= 1 && normals >= 1 {
                out.push(Meld::pon(s as u8, claimed, [0, 5], dir).unwrap());
            }
            if normals >= 2 {
                out.push(Meld::pon(s as u8, claimed, [5, 5], dir).unwrap());
            }
        } else if total >= 2 {
            out.push(Meld::pon(s as u8, claimed, [n, n], dir).unwrap());
        }
        Some(out)
    }

    /// The concealed digits of this suit/number, red fives written as 0.
    fn held_digits(&self, s: usize, n: u8, take: u8) -> Vec<u8> {
        let reds = if n == 5 && s < 3 { self.counts[s][0] } else { 0 };
        (0..take)
            .map(|i| if i < reds { 0 } else { n })
            .collect()
    }

    /// Kan candidates. With a claim, the daiminkan (if any); without,
    /// every ankan and kakan available from the current draw. `None`
    /// when the hand is in the wrong phase for that query.
    pub fn legal_kan(&self, claim: Option<(Tile, Dir)>) -> Option<Vec<Meld>> {
        match claim {
            Some((tile, dir)) => {
                if self.incoming.is_some() {
                    return None;
                }
                let mut out = vec![];
                if self.riichi {
                    return Some(out);
                }
                let s = tile.suit() as usize;
                let n = tile.normal_num();
                if self.counts[s][n as usize] == 3 {
                    let held = self.held_digits(s, n, 3);
                    out.push(
                        Meld::daiminkan(s as u8, tile.num(), [held[0], held[1], held[2]], dir)
                            .unwrap(),
                    );
                }
                Some(out)
            }
            None => {
                let drawn = match self.incoming {
                    None => return None,
                    Some(Incoming::Claim) => return Some(vec![]),
                    Some(Incoming::Draw(t)) => t,
                };
                let mut out = vec![];
                for s in 0..4 {
                    let top = if s == 3 { 7 } else { 9 };
                    for n in 1..=top {
                        if self.counts[s][n as usize] != 4 {
                            continue;
                        }
                        if self.riichi
                            && drawn.map_or(true, |d| {
                                d.suit() != s as u8 || d.normal_num() != n
                            })
                        {
                            continue;
                        }
                        let held = self.held_digits(s, n, 4);
                        out.push(
                            Meld::ankan(s as u8, [held[0], held[1], held[2], held[3]]).unwrap(),
                        );
                    }
                }
                if !self.riichi {
                    for meld in &self.melds {
                        if meld.kind() != MeldKind::Pon {
                            continue;
                        }
                        let s = meld.suit() as usize;
                        let n = meld.num();
                        if self.counts[s][n as usize] >= 1 {
                            let added = if n == 5 && s < 3 && self.counts[s][0] > 0 {
                                0
                            } else {
                                n
                            };
                            out.push(Meld::kakan(meld, added).unwrap());
                        }
                    }
                }
                Some(out)
            }
        }
    }
}

impl FromStr for Hand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut hand = Hand::default();
        let mut parts = s.split(',');
        let concealed = parts.next().unwrap_or("");

        let mut suit: Option<u8> = None;
        let mut last: Option<Option<Tile>> = None; // None=nothing, Some(None)=hidden
        for c in concealed.chars() {
            if c == '_' {
                hand.hidden += 1;
                last = Some(None);
            } else if c == '*' {
                hand.riichi = true;
            } else if let Some(next) = majiang_elements::tile::suit_from_char(c) {
                suit = Some(next);
            } else if let Some(num) = c.to_digit(10) {
                let suit = suit.ok_or_else(|| NotationError::new(s))?;
                let tile = Tile::from_suit_num(suit, num as u8)
                    .ok_or_else(|| NotationError::new(s))?;
                hand.increase(tile, true)?;
                last = Some(Some(tile));
            } else {
                return Err(NotationError::new(s).into());
            }
        }

        let mut claim_pending = false;
        for part in parts {
            if claim_pending {
                return Err(NotationError::new(s).into());
            }
            if part.is_empty() {
                claim_pending = true;
                continue;
            }
            hand.melds.push(part.parse::<Meld>()?);
        }

        let equivalent = hand.concealed_total() + 3 * hand.melds.len();
        if equivalent > 14 {
            return Err(Error::invariant(format!("{equivalent} tiles in {s:?}")));
        }
        if claim_pending {
            if hand.melds.is_empty() || equivalent % 3 != 2 {
                return Err(Error::invariant(format!("dangling call marker in {s:?}")));
            }
            hand.incoming = Some(Incoming::Claim);
        } else if equivalent % 3 == 2 {
            hand.incoming = Some(Incoming::Draw(last.flatten()));
        }
        Ok(hand)
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let drawn = match self.incoming {
            Some(Incoming::Draw(t)) => Some(t),
            _ => None,
        };
        let hidden_shown = self.hidden - u8::from(drawn == Some(None));
        for _ in 0..hidden_shown {
            write!(f, "_")?;
        }
        let mut last_suit: Option<char> = None;
        for s in 0..4 {
            let top = if s == 3 { 7 } else { 9 };
            let mut digits = String::new();
            for n in 1..=top {
                let mut c = self.counts[s][n as usize];
                let mut reds = if n == 5 && s < 3 { self.counts[s][0] } else { 0 };
                if let Some(Some(d)) = drawn {
                    if d.suit() == s as u8 && d.normal_num() == n {
                        c -= 1;
                        if d.is_red() {
                            reds -= 1;
                        }
                    }
                }
                for i in 0..c {
                    if i < reds {
                        digits.push('0');
                    } else {
                        digits.push(char::from(b'0' + n));
                    }
                }
            }
            if !digits.is_empty() {
                let letter = ['m', 'p', 's', 'z'][s];
                write!(f, "{letter}{digits}")?;
                last_suit = Some(letter);
            }
        }
        if let Some(d) = drawn {
            match d {
                Some(tile) => {
                    if last_suit != Some(tile.suit_char()) {
                        write!(f, "{}", tile.suit_char())?;
                    }
                    write!(f, "{}", tile.num())?;
                }
                None => write!(f, "_")?,
            }
        }
        if self.riichi {
            write!(f, "*")?;
        }
        for meld in &self.melds {
            write!(f, ",{meld}")?;
        }
        if self.incoming == Some(Incoming::Claim) {
            write!(f, ",")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hand(s: &str) -> Hand {
        s.parse().unwrap()
    }
    fn tile(s: &str) -> Tile {
        s.parse().unwrap()
    }
    fn meld(s: &str) -> Meld {
        s.parse().unwrap()
    }

    #[test]
    fn string_roundtrip() {
        for s in [
            "m123p456s789z1122",
            "m123p456s789z11223",
            "m055p44s06z777",
            "m123p456s789z11,z222=",
            "m123p456s78z112,s999=,",
            "m123p456s789z1122*",
            "_____________",
            "m055z11,s789-,m111+,z5555",
        ] {
            assert_eq!(hand(s).to_string(), s, "roundtrip of {s:?}");
        }
    }

    #[test]
    fn draw_is_the_last_token() {
        let h = hand("m123p456s789z11222");
        assert_eq!(h.drawn(), Some(tile("z2")));
        let h = hand("m123p456s789z1122m4");
        assert_eq!(h.drawn(), Some(tile("m4")));
        assert_eq!(h.to_string(), "m123p456s789z1122m4");
        assert!(hand("m123p456s789z1122").drawn().is_none()); // 13 tiles
    }

    #[test]
    fn draw_discard_roundtrip() {
        let mut h = hand("m123p456s789z11222");
        h.discard(tile("z2"), false, true).unwrap();
        assert_eq!(h.to_string(), "m123p456s789z1122");
        h.draw(Some(tile("m0")), true).unwrap();
        assert_eq!(h.to_string(), "m123p456s789z1122m0");
        assert_eq!(hand(&h.to_string()), h);
    }

    #[test]
    fn invariants_enforced() {
        assert!("m11112".parse::<Hand>().is_err()); // five copies
        assert!("m123456789p123456".parse::<Hand>().is_err()); // too many
        assert!("m123,".parse::<Hand>().is_err()); // marker without meld
        let mut h = hand("m123p456s789z11222");
        assert!(h.draw(Some(tile("z3")), true).is_err()); // already 14
        let mut h = hand("m123p456s789z1122");
        assert!(h.discard(tile("z1"), false, true).is_err()); // nothing pending
        assert!(h.draw(Some(tile("z5")), true).is_ok());
        assert!(h.discard(tile("z6"), false, true).is_err()); // not held
    }

    #[test]
    fn menzen_depends_on_direction_flags() {
        assert!(hand("m123p456s789z1122").is_menzen());
        assert!(!hand("m123p456s789z11,z222=").is_menzen());
        assert!(hand("m123p456z11,s5555").is_menzen()); // ankan stays menzen
    }

    #[test]
    fn discard_options_split_red_fives() {
        let h = hand("m055p123s456z1122m5");
        let opts = h.legal_discards(false).unwrap();
        let flat: Vec<(String, bool)> = opts
            .iter()
            .map(|o| (o.tile.to_string(), o.tsumogiri))
            .collect();
        // the drawn m5 leaves one concealed m5 and one m0 as hand options
        assert!(flat.contains(&("m5".into(), false)));
        assert!(flat.contains(&("m0".into(), false)));
        assert!(flat.contains(&("m5".into(), true)));
        // the only z1 pair stays listed once per copy-kind
        assert!(flat.contains(&("z1".into(), false)));
    }

    #[test]
    fn drawn_only_copy_is_tsumogiri_only() {
        let h = hand("m123p456s789z1122z3");
        let opts = h.legal_discards(false).unwrap();
        let z3: Vec<_> = opts.iter().filter(|o| o.tile == tile("z3")).collect();
        assert_eq!(z3.len(), 1);
        assert!(z3[0].tsumogiri);
    }

    #[test]
    fn riichi_locks_discards_to_the_draw() {
        let mut h = hand("m123p456s789z11222");
        h.discard(tile("z2"), true, true).unwrap();
        assert!(h.is_riichi());
        h.draw(Some(tile("m9")), true).unwrap();
        let opts = h.legal_discards(false).unwrap();
        assert_eq!(
            opts,
            vec![DiscardOption {
                tile: tile("m9"),
                tsumogiri: true
            }]
        );
        assert!(h.discard(tile("m1"), false, true).is_err());
        assert!(h.discard(tile("m9"), false, true).is_ok());
    }

    #[test]
    fn kuikae_denies_claimed_tile_and_swap() {
        // called m3 into m45: cannot discard another m3, nor swap to m6
        let mut h = hand("m456p123s456z1122");
        h.call(&meld("m3-45"), true).unwrap();
        let opts = h.legal_discards(true).unwrap();
        assert!(!opts.iter().any(|o| o.tile == tile("m3")));
        assert!(!opts.iter().any(|o| o.tile == tile("m6")));
        assert!(opts.iter().any(|o| o.tile == tile("p1")));
        // without the check the swap tile comes back
        let unchecked = h.legal_discards(false).unwrap();
        assert!(unchecked.iter().any(|o| o.tile == tile("m6")));
    }

    #[test]
    fn chi_positions_and_red_variants() {
        let h = hand("m34067p11s123z11");
        let tokens = |melds: Vec<Meld>| -> Vec<String> {
            melds.iter().map(|m| m.to_string()).collect()
        };
        assert_eq!(
            tokens(h.legal_chi(tile("m5"), Dir::Kamicha, false).unwrap()),
            vec!["m345-", "m45-6", "m5-67"]
        );
        // positions touching the hand's five produce red and plain variants
        assert_eq!(
            tokens(h.legal_chi(tile("m4"), Dir::Kamicha, false).unwrap()),
            vec!["m34-0", "m4-06"]
        );
        // claiming the red itself
        assert_eq!(
            tokens(h.legal_chi(tile("m0"), Dir::Kamicha, false).unwrap()),
            vec!["m340-", "m40-6", "m0-67"]
        );
        assert!(h.legal_chi(tile("m5"), Dir::Toimen, false).unwrap().is_empty());
        assert!(h.legal_chi(tile("z1"), Dir::Kamicha, false).unwrap().is_empty());
    }

    #[test]
    fn pon_red_variants() {
        let h = hand("m055p123s456z1122m7");
        assert!(h.legal_pon(tile("m5"), Dir::Toimen).is_none()); // wrong phase
        let h = hand("m055p123s456z112");
        let melds = h.legal_pon(tile("m5"), Dir::Toimen).unwrap();
        let tokens: Vec<String> = melds.iter().map(|m| m.to_string()).collect();
        assert_eq!(tokens, vec!["m055=", "m555="]);
        let h = hand("m005p123s456z112");
        let melds = h.legal_pon(tile("m5"), Dir::Shimocha).unwrap();
        let tokens: Vec<String> = melds.iter().map(|m| m.to_string()).collect();
        assert_eq!(tokens, vec!["m005+", "m055+"]);
    }

    #[test]
    fn kan_candidates() {
        // daiminkan
        let h = hand("m555p123s456z112");
        let melds = h.legal_kan(Some((tile("m5"), Dir::Kamicha))).unwrap();
        assert_eq!(melds[0].to_string(), "m5555-");
        // ankan + kakan from the draw
        let mut h = hand("m5550p123s44z1,z777+");
        assert_eq!(h.to_string(), "m0555p123s44z1,z777+");
        h.draw(Some(tile("z7")), true).unwrap();
        let melds = h.legal_kan(None).unwrap();
        let tokens: Vec<String> = melds.iter().map(|m| m.to_string()).collect();
        assert!(tokens.contains(&"m0555".to_string()));
        assert!(tokens.contains(&"z777+7".to_string()));
    }

    #[test]
    fn riichi_restricts_calls() {
        let mut h = hand("m123p456s789z11222");
        h.discard(tile("z2"), true, true).unwrap();
        assert!(h.legal_pon(tile("z1"), Dir::Toimen).unwrap().is_empty());
        assert!(h
            .legal_chi(tile("m1"), Dir::Kamicha, false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn call_and_kan_mutations() {
        let mut h = hand("m123p456s78z11223");
        h.call(&meld("s6-78"), true).unwrap();
        assert_eq!(h.to_string(), "m123p456z11223,s6-78,");
        h.discard(tile("z2"), false, true).unwrap();
        assert_eq!(h.to_string(), "m123p456z1123,s6-78");
        // daiminkan leaves the hand waiting for a rinshan draw
        let mut h = hand("m123p456s789z1112");
        h.call(&meld("z1111="), true).unwrap();
        assert!(!h.must_discard());
        h.draw(Some(tile("p7")), true).unwrap();
        assert_eq!(h.to_string(), "m123p456s789z2p7,z1111=");
    }
}
