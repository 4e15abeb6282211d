//! Discard pile 河: the ordered discards of one seat, with markers, plus
//! an O(1) membership index for furiten checks.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use majiang_elements::prelude::*;

use crate::errors::{Error, Result};

/// One discarded tile with its notation markers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Discard {
    pub tile: Tile,
    /// Discarded straight from the draw (trailing `_`).
    pub tsumogiri: bool,
    /// The riichi-declaring discard (trailing `*`).
    pub riichi: bool,
}

impl Discard {
    pub fn new(tile: Tile) -> Self {
        Self {
            tile,
            ..Self::default()
        }
    }
}

impl Display for Discard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tile)?;
        if self.tsumogiri {
            write!(f, "_")?;
        }
        if self.riichi {
            write!(f, "*")?;
        }
        Ok(())
    }
}

impl FromStr for Discard {
    type Err = NotationError;
    fn from_str(token: &str) -> std::result::Result<Self, NotationError> {
        let mut rest = token;
        let mut discard = Discard::default();
        if let Some(stripped) = rest.strip_suffix('*') {
            discard.riichi = true;
            rest = stripped;
        }
        if let Some(stripped) = rest.strip_suffix('_') {
            discard.tsumogiri = true;
            rest = stripped;
        }
        discard.tile = rest.parse().map_err(|_| NotationError::new(token))?;
        Ok(discard)
    }
}

impl serde::Serialize for Discard {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Discard {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The discard pile of one seat.
#[derive(Clone, Debug, Default)]
pub struct River {
    /// Discards in order, each with the direction of the seat that claimed
    /// it, if any.
    discards: Vec<(Discard, Option<Dir>)>,
    /// Bit per normalized tile kind ever discarded here.
    mask: u64,
}

impl River {
    pub fn push(&mut self, discard: Discard) {
        self.mask |= 1 << discard.tile.normal_encoding();
        self.discards.push((discard, None));
    }

    /// Attach the claiming seat's direction to the last discard. The
    /// meld's claimed tile must match it.
    pub fn mark_claimed(&mut self, meld: &Meld) -> Result<()> {
        let (last, claimed_by) = self
            .discards
            .last_mut()
            .ok_or_else(|| Error::illegal("claim from an empty river"))?;
        let claimed = meld
            .claimed_tile()
            .ok_or_else(|| Error::illegal("claim without a claimed tile"))?;
        if claimed.normalized() != last.tile.normalized() || claimed_by.is_some() {
            return Err(Error::illegal(format!(
                "meld {meld} does not claim the last discard {last}"
            )));
        }
        // the flag stored here is the caller as seen from the discarder
        *claimed_by = Some(match meld.dir().unwrap() {
            Dir::Shimocha => Dir::Kamicha,
            Dir::Toimen => Dir::Toimen,
            Dir::Kamicha => Dir::Shimocha,
        });
        Ok(())
    }

    /// Has a tile of this kind ever been discarded here? Red fives
    /// normalize to 5.
    pub fn contains(&self, tile: Tile) -> bool {
        self.mask & (1 << tile.normal_encoding()) != 0
    }

    pub fn len(&self) -> usize {
        self.discards.len()
    }
    pub fn is_empty(&self) -> bool {
        self.discards.is_empty()
    }
    pub fn last(&self) -> Option<Discard> {
        self.discards.last().map(|&(d, _)| d)
    }
    pub fn iter(&self) -> impl Iterator<Item = (Discard, Option<Dir>)> + '_ {
        self.discards.iter().copied()
    }

    /// Nagashi-mangan shape: every discard a terminal or honor, none
    /// claimed by anyone.
    pub fn is_nagashi(&self) -> bool {
        !self.discards.is_empty()
            && self
                .discards
                .iter()
                .all(|&(d, claimed)| d.tile.is_yaochuu() && claimed.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(s: &str) -> Tile {
        s.parse().unwrap()
    }

    #[test]
    fn discard_token_roundtrip() {
        for s in ["m1", "m0_", "z7*", "s5_*"] {
            let d: Discard = s.parse().unwrap();
            assert_eq!(d.to_string(), s);
        }
        assert!("m1-".parse::<Discard>().is_err());
        assert!("m1*_".parse::<Discard>().is_err()); // marker order is fixed
    }

    #[test]
    fn membership_normalizes_reds() {
        let mut river = River::default();
        river.push(Discard::new(tile("m0")));
        assert!(river.contains(tile("m5")));
        assert!(river.contains(tile("m0")));
        assert!(!river.contains(tile("p5")));
    }

    #[test]
    fn claim_marks_last_discard() {
        let mut river = River::default();
        river.push(Discard::new(tile("z2")));
        let meld: Meld = "z222=".parse().unwrap();
        river.mark_claimed(&meld).unwrap();
        assert_eq!(river.iter().next().unwrap().1, Some(Dir::Toimen));
        // a second claim of the same tile is rejected
        assert!(river.mark_claimed(&meld).is_err());
        // mismatched tile rejected
        river.push(Discard::new(tile("p1")));
        assert!(river.mark_claimed(&meld).is_err());
    }

    #[test]
    fn nagashi_shape() {
        let mut river = River::default();
        river.push(Discard::new(tile("m1")));
        river.push(Discard::new(tile("z5")));
        assert!(river.is_nagashi());
        river.push(Discard::new(tile("m2")));
        assert!(!river.is_nagashi());
        assert!(!River::default().is_nagashi());
    }
}
