//! Tile 牌
//!
//! See [`Tile`].

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::NotationError;

/// One tile, encoded as a 6-bit integer.
///
/// | Encoding   | Token      | Category      |
/// |------------|------------|---------------|
/// | 0  ..= 8   | m1 ..= m9  | characters 萬子 |
/// | 9  ..= 17  | p1 ..= p9  | dots 筒子       |
/// | 18 ..= 26  | s1 ..= s9  | bamboos 索子    |
/// | 27 ..= 30  | z1 ..= z4  | winds 風牌      |
/// | 31, 32, 33 | z5, z6, z7 | dragons 三元牌  |
/// | 34, 35, 36 | m0, p0, s0 | red fives 赤牌  |
///
/// The text form is a suit letter in `{m, p, s, z}` followed by one digit;
/// digit `0` is the red five of that numbered suit (semantically a 5).
/// Only red 5's can be represented (not other numbers or honors).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile(u8);

impl Tile {
    pub const MIN_ENCODING: u8 = 0;
    pub const MAX_ENCODING: u8 = 36;

    pub const fn from_encoding(encoding: u8) -> Option<Self> {
        if encoding <= Self::MAX_ENCODING {
            Some(Self(encoding))
        } else {
            None
        }
    }

    /// Suit 0..=3 for m/p/s/z, number 0..=9 (0 = red five; z only 1..=7).
    pub const fn from_suit_num(suit: u8, num: u8) -> Option<Self> {
        if !(num <= 9 && suit <= 3) {
            return None;
        }
        if suit == 3 && !(1 <= num && num <= 7) {
            return None;
        }
        if num == 0 {
            Some(Self(34 + suit))
        } else {
            Some(Self(suit * 9 + num - 1))
        }
    }

    /// Not a red 5.
    pub const fn is_normal(self) -> bool {
        self.0 <= 33
    }
    /// Red 5 赤牌.
    pub const fn is_red(self) -> bool {
        34 <= self.0 && self.0 <= 36
    }

    /// Numerals := characters + dots + bamboos (数牌).
    pub const fn is_numeral(self) -> bool {
        self.0 <= 26 || self.is_red()
    }
    /// {1,9} of a numbered suit (老頭牌).
    pub const fn is_pure_terminal(self) -> bool {
        self.0 <= 26 && (self.0 % 9 == 0 || self.0 % 9 == 8)
    }
    /// Winds 風牌.
    pub const fn is_wind(self) -> bool {
        27 <= self.0 && self.0 <= 30
    }
    /// Dragons 三元牌.
    pub const fn is_dragon(self) -> bool {
        31 <= self.0 && self.0 <= 33
    }
    /// Honors := winds + dragons (字牌).
    pub const fn is_honor(self) -> bool {
        27 <= self.0 && self.0 <= 33
    }
    /// Terminals and honors (幺九牌).
    pub const fn is_yaochuu(self) -> bool {
        self.is_pure_terminal() || self.is_honor()
    }

    pub const fn encoding(self) -> u8 {
        self.0
    }

    /// Encoding with red 5 folded into normal 5.
    pub const fn normal_encoding(self) -> u8 {
        match self.0 {
            34 => 4,
            35 => 13,
            36 => 22,
            x => x,
        }
    }

    /// Red 5 folded into normal 5; otherwise a no-op.
    pub const fn normalized(self) -> Self {
        Self(self.normal_encoding())
    }

    /// Normal 5 promoted to red 5; otherwise a no-op.
    pub const fn to_red(self) -> Self {
        Self(match self.0 {
            4 => 34,
            13 => 35,
            22 => 36,
            x => x,
        })
    }

    /// The "number" part of the token (0 for red fives).
    pub const fn num(self) -> u8 {
        if self.0 <= 33 {
            self.0 % 9 + 1
        } else {
            0
        }
    }
    /// The number with red fives reported as 5.
    pub const fn normal_num(self) -> u8 {
        if self.0 <= 33 {
            self.0 % 9 + 1
        } else {
            5
        }
    }
    /// The suit index (0, 1, 2, 3 for m, p, s, z).
    pub const fn suit(self) -> u8 {
        if self.0 <= 33 {
            self.0 / 9
        } else {
            self.0 - 34
        }
    }
    pub fn suit_char(self) -> char {
        char_from_suit(self.suit()).unwrap()
    }

    /// Ordering key placing each red five between the 4 and the 5 of its
    /// suit: m1 < .. < m4 < m0 < m5 < .. < m9 < p1 < .. < z7.
    const fn ordering_key(self) -> u8 {
        if self.0 <= 33 {
            self.0 * 2
        } else {
            7 + (self.0 - 34) * 18
        }
    }

    /// Given this tile as a dora indicator (ドラ表示牌), the tile it
    /// indicates: the cyclic successor within the suit, winds cycling
    /// E→S→W→N→E, dragons White→Green→Red→White, reds indicating 6.
    pub const fn indicated_dora(self) -> Self {
        Self(
            [
                1, 2, 3, 4, 5, 6, 7, 8, 0, // m
                10, 11, 12, 13, 14, 15, 16, 17, 9, // p
                19, 20, 21, 22, 23, 24, 25, 26, 18, // s
                28, 29, 30, 27, // winds
                32, 33, 31, // dragons
                5, 14, 23u8, // reds indicate 6
            ][self.0 as usize],
        )
    }

    /// The standard token of this tile.
    pub const fn as_str(self) -> &'static str {
        [
            "m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8", "m9", //
            "p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8", "p9", //
            "s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", //
            "z1", "z2", "z3", "z4", "z5", "z6", "z7", //
            "m0", "p0", "s0", //
        ][self.0 as usize]
    }
}

impl PartialOrd<Self> for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordering_key().cmp(&other.ordering_key())
    }
}

/// The tile suit index for a suit letter.
pub const fn suit_from_char(c: char) -> Option<u8> {
    match c {
        'm' => Some(0),
        'p' => Some(1),
        's' => Some(2),
        'z' => Some(3),
        _ => None,
    }
}

/// The suit letter for a tile suit index.
pub const fn char_from_suit(suit: u8) -> Option<char> {
    match suit {
        0 => Some('m'),
        1 => Some('p'),
        2 => Some('s'),
        3 => Some('z'),
        _ => None,
    }
}

impl FromStr for Tile {
    type Err = NotationError;
    fn from_str(token: &str) -> Result<Self, NotationError> {
        let mut chars = token.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(suit_char), Some(num_char), None) => {
                let suit = suit_from_char(suit_char);
                let num = num_char.to_digit(10);
                match (suit, num) {
                    (Some(suit), Some(num)) => Tile::from_suit_num(suit, num as u8)
                        .ok_or_else(|| NotationError::new(token)),
                    _ => Err(NotationError::new(token)),
                }
            }
            _ => Err(NotationError::new(token)),
        }
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for Tile {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Tile {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a run of suit letters and digits as a list of tiles.
/// Example: `"m123p55z7"` => six tiles.
pub fn tiles_from_str(s: &str) -> Result<Vec<Tile>, NotationError> {
    let mut tiles = vec![];
    let mut suit: Option<u8> = None;
    for c in s.chars() {
        if let Some(next_suit) = suit_from_char(c) {
            suit = Some(next_suit);
        } else if let Some(num) = c.to_digit(10) {
            let suit = suit.ok_or_else(|| NotationError::new(s))?;
            tiles.push(
                Tile::from_suit_num(suit, num as u8).ok_or_else(|| NotationError::new(s))?,
            );
        } else {
            return Err(NotationError::new(s));
        }
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_str_roundtrip() {
        for encoding in Tile::MIN_ENCODING..=Tile::MAX_ENCODING {
            let tile = Tile::from_encoding(encoding).unwrap();
            let roundtrip: Tile = tile.as_str().parse().unwrap();
            assert_eq!(tile, roundtrip);
        }
    }

    #[test]
    fn invalid_tokens_rejected() {
        for token in ["z0", "z8", "z9", "m", "5m", "mm", "m55", "x3", ""] {
            assert!(token.parse::<Tile>().is_err(), "{token:?} should not parse");
        }
    }

    #[test]
    fn tile_has_total_order() {
        let correct_order = [
            "m1", "m2", "m3", "m4", "m0", "m5", "m6", "m7", "m8", "m9", //
            "p1", "p2", "p3", "p4", "p0", "p5", "p6", "p7", "p8", "p9", //
            "s1", "s2", "s3", "s4", "s0", "s5", "s6", "s7", "s8", "s9", //
            "z1", "z2", "z3", "z4", "z5", "z6", "z7", //
        ];
        for window in correct_order.windows(2) {
            let a: Tile = window[0].parse().unwrap();
            let b: Tile = window[1].parse().unwrap();
            assert!(a < b, "{a} should sort before {b}");
        }
    }

    #[test]
    fn indicated_dora_examples() {
        let dora = |s: &str| s.parse::<Tile>().unwrap().indicated_dora();
        assert_eq!(dora("m9"), "m1".parse().unwrap());
        assert_eq!(dora("z4"), "z1".parse().unwrap());
        assert_eq!(dora("z7"), "z5".parse().unwrap());
        assert_eq!(dora("m0"), "m6".parse().unwrap());
    }

    #[test]
    fn indicated_dora_cycles() {
        for num in 1..=9u8 {
            for suit in 0..=2 {
                let indicator = Tile::from_suit_num(suit, num).unwrap();
                let expect = Tile::from_suit_num(suit, num % 9 + 1).unwrap();
                assert_eq!(indicator.indicated_dora(), expect);
            }
        }
        for num in 1..=4u8 {
            let indicator = Tile::from_suit_num(3, num).unwrap();
            let expect = Tile::from_suit_num(3, num % 4 + 1).unwrap();
            assert_eq!(indicator.indicated_dora(), expect);
        }
        for num in 5..=7u8 {
            let indicator = Tile::from_suit_num(3, num).unwrap();
            let expect = Tile::from_suit_num(3, (num - 4) % 3 + 5).unwrap();
            assert_eq!(indicator.indicated_dora(), expect);
        }
    }

    #[test]
    fn red_five_is_a_five() {
        let red: Tile = "p0".parse().unwrap();
        assert!(red.is_red());
        assert!(red.is_numeral());
        assert!(!red.is_yaochuu());
        assert_eq!(red.normal_num(), 5);
        assert_eq!(red.normalized(), "p5".parse().unwrap());
        assert_eq!(red.normalized().to_red(), red);
    }

    #[test]
    fn tiles_from_str_examples() {
        let tiles = tiles_from_str("m123p05z7").unwrap();
        let expect: Vec<Tile> = ["m1", "m2", "m3", "p0", "p5", "z7"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(tiles, expect);
        assert!(tiles_from_str("123m").is_err());
        assert!(tiles_from_str("z09").is_err());
    }

    #[test]
    fn serde_as_token() {
        let tile: Tile = "s0".parse().unwrap();
        let json = serde_json::to_string(&tile).unwrap();
        assert_eq!(json, "\"s0\"");
        assert_eq!(serde_json::from_str::<Tile>(&json).unwrap(), tile);
    }
}
