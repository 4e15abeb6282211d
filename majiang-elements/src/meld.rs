//! Meld 副露 notation.
//!
//! A meld is a single token: a suit letter, the digits of its tiles, and
//! for claimed tiles a direction flag marking who discarded it.
//!
//! | Shape     | Example  | Notes                                        |
//! |-----------|----------|----------------------------------------------|
//! | chi       | `m1-23`  | flag on the claimed digit, always `-`        |
//! | pon       | `z222=`  | claimed digit in the flagged (last) position |
//! | daiminkan | `m5550+` | as pon, four digits                          |
//! | ankan     | `m0555`  | no flag                                      |
//! | kakan     | `m555+0` | pon plus the added digit after the flag      |
//!
//! Canonical form sorts digits ascending by value with a red five (`0`)
//! ahead of its ordinary siblings, keeps the claimed digit in the flagged
//! position, and is idempotent under re-parsing.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::NotationError;
use crate::seat::Dir;
use crate::tile::{char_from_suit, suit_from_char, Tile};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MeldKind {
    Chi,
    Pon,
    Ankan,
    Daiminkan,
    Kakan,
}

/// A called or concealed-quad meld in canonical form.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Meld {
    kind: MeldKind,
    suit: u8,
    /// Digits in display order; `0` is the red five. `nums[3]` is unused
    /// for three-tile melds.
    nums: [u8; 4],
    len: u8,
    /// `None` iff ankan.
    dir: Option<Dir>,
    /// Index into `nums` of the direction-flagged digit.
    claimed_pos: u8,
}

const fn norm(digit: u8) -> u8 {
    if digit == 0 {
        5
    } else {
        digit
    }
}

/// Sort key putting a red five just ahead of the plain fives.
const fn digit_key(digit: u8) -> u8 {
    if digit == 0 {
        9
    } else {
        digit * 2
    }
}

fn digit_ok(suit: u8, digit: u8) -> bool {
    match suit {
        0..=2 => digit <= 9,
        3 => (1..=7).contains(&digit),
        _ => false,
    }
}

impl Meld {
    /// Chi of a claimed tile (always from kamicha) with two concealed
    /// digits.
    pub fn chi(suit: u8, claimed: u8, concealed: [u8; 2]) -> Result<Self, NotationError> {
        let fail = || NotationError::new(format!("chi {suit} {claimed} {concealed:?}"));
        if suit > 2 {
            return Err(fail());
        }
        let mut groups = [(claimed, true), (concealed[0], false), (concealed[1], false)];
        for &(d, _) in &groups {
            if !digit_ok(suit, d) {
                return Err(fail());
            }
        }
        groups.sort_by_key(|&(d, _)| digit_key(d));
        let [a, b, c] = groups.map(|(d, _)| norm(d));
        if a + 1 != b || b + 1 != c {
            return Err(fail());
        }
        let claimed_pos = groups.iter().position(|&(_, f)| f).unwrap() as u8;
        Ok(Self {
            kind: MeldKind::Chi,
            suit,
            nums: [groups[0].0, groups[1].0, groups[2].0, 0],
            len: 3,
            dir: Some(Dir::Kamicha),
            claimed_pos,
        })
    }

    fn same_kind(
        kind: MeldKind,
        suit: u8,
        claimed: u8,
        concealed: &[u8],
        dir: Option<Dir>,
    ) -> Result<Self, NotationError> {
        let fail = || NotationError::new(format!("{kind:?} {suit} {claimed} {concealed:?}"));
        if !digit_ok(suit, claimed) || !concealed.iter().all(|&d| digit_ok(suit, d)) {
            return Err(fail());
        }
        if concealed.iter().any(|&d| norm(d) != norm(claimed)) {
            return Err(fail());
        }
        let mut nums = [0u8; 4];
        nums[..concealed.len()].copy_from_slice(concealed);
        nums[..concealed.len()].sort_by_key(|&d| digit_key(d));
        nums[concealed.len()] = claimed;
        let len = concealed.len() as u8 + 1;
        Ok(Self {
            kind,
            suit,
            nums,
            len,
            dir,
            claimed_pos: len - 1,
        })
    }

    pub fn pon(suit: u8, claimed: u8, concealed: [u8; 2], dir: Dir) -> Result<Self, NotationError> {
        Self::same_kind(MeldKind::Pon, suit, claimed, &concealed, Some(dir))
    }

    pub fn daiminkan(
        suit: u8,
        claimed: u8,
        concealed: [u8; 3],
        dir: Dir,
    ) -> Result<Self, NotationError> {
        Self::same_kind(MeldKind::Daiminkan, suit, claimed, &concealed, Some(dir))
    }

    pub fn ankan(suit: u8, digits: [u8; 4]) -> Result<Self, NotationError> {
        let fail = || NotationError::new(format!("ankan {suit} {digits:?}"));
        if !digits.iter().all(|&d| digit_ok(suit, d)) {
            return Err(fail());
        }
        if digits.iter().any(|&d| norm(d) != norm(digits[0])) {
            return Err(fail());
        }
        let mut nums = digits;
        nums.sort_by_key(|&d| digit_key(d));
        Ok(Self {
            kind: MeldKind::Ankan,
            suit,
            nums,
            len: 4,
            dir: None,
            claimed_pos: 0,
        })
    }

    /// Kakan built from an existing pon plus the added digit.
    pub fn kakan(pon: &Meld, added: u8) -> Result<Self, NotationError> {
        if pon.kind != MeldKind::Pon || !digit_ok(pon.suit, added) || norm(added) != pon.num() {
            return Err(NotationError::new(format!("kakan {pon} +{added}")));
        }
        let mut nums = pon.nums;
        nums[3] = added;
        Ok(Self {
            kind: MeldKind::Kakan,
            nums,
            len: 4,
            ..*pon
        })
    }

    pub const fn kind(self) -> MeldKind {
        self.kind
    }
    pub const fn suit(self) -> u8 {
        self.suit
    }
    /// `None` iff ankan. An ankan keeps the hand menzen.
    pub const fn dir(self) -> Option<Dir> {
        self.dir
    }
    pub const fn is_open(self) -> bool {
        self.dir.is_some()
    }
    pub const fn is_kan(self) -> bool {
        matches!(
            self.kind,
            MeldKind::Ankan | MeldKind::Daiminkan | MeldKind::Kakan
        )
    }

    /// Normalized number of the meld's lowest tile (the meld's number for
    /// same-tile melds).
    pub fn num(&self) -> u8 {
        self.nums[..self.len as usize]
            .iter()
            .map(|&d| norm(d))
            .min()
            .unwrap()
    }

    /// Normalized representative tile (lowest for chi).
    pub fn tile(&self) -> Tile {
        Tile::from_suit_num(self.suit, self.num()).unwrap()
    }

    /// The actual tiles of the meld, red fives preserved.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.nums[..self.len as usize]
            .iter()
            .map(move |&d| Tile::from_suit_num(self.suit, d).unwrap())
    }

    /// The claimed tile as written (red five preserved); `None` for ankan.
    pub fn claimed_tile(&self) -> Option<Tile> {
        self.dir?;
        Tile::from_suit_num(self.suit, self.nums[self.claimed_pos as usize])
    }

    /// The digit added onto the pon; `None` unless kakan.
    pub fn added_tile(&self) -> Option<Tile> {
        match self.kind {
            MeldKind::Kakan => Tile::from_suit_num(self.suit, self.nums[3]),
            _ => None,
        }
    }

    /// Count of red fives inside the meld.
    pub fn red_count(&self) -> u8 {
        self.nums[..self.len as usize]
            .iter()
            .filter(|&&d| d == 0)
            .count() as u8
    }

    /// Does the meld contain a terminal or honor tile?
    pub fn has_yaochuu(&self) -> bool {
        self.tiles().any(|t| t.is_yaochuu())
    }
}

impl FromStr for Meld {
    type Err = NotationError;

    fn from_str(token: &str) -> Result<Self, NotationError> {
        let fail = || NotationError::new(token);
        let mut chars = token.chars();
        let suit = chars.next().and_then(suit_from_char).ok_or_else(fail)?;

        let mut digits: Vec<u8> = vec![];
        let mut flag: Option<(usize, Dir)> = None;
        for c in chars {
            if let Some(d) = c.to_digit(10) {
                digits.push(d as u8);
            } else if let Some(dir) = Dir::from_char(c) {
                if flag.is_some() || digits.is_empty() {
                    return Err(fail());
                }
                flag = Some((digits.len() - 1, dir));
            } else {
                return Err(fail());
            }
        }
        if !digits.iter().all(|&d| digit_ok(suit, d)) {
            return Err(fail());
        }

        let same = digits.iter().all(|&d| norm(d) == norm(digits[0]));
        match (digits.len(), flag) {
            (3, Some((pos, dir))) => {
                let claimed = digits[pos];
                let concealed: Vec<u8> = digits
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != pos)
                    .map(|(_, &d)| d)
                    .collect();
                if same {
                    Self::pon(suit, claimed, [concealed[0], concealed[1]], dir)
                } else {
                    if dir != Dir::Kamicha {
                        return Err(fail());
                    }
                    Self::chi(suit, claimed, [concealed[0], concealed[1]])
                }
            }
            (4, None) if same => Self::ankan(suit, [digits[0], digits[1], digits[2], digits[3]]),
            (4, Some((3, dir))) if same => {
                Self::daiminkan(suit, digits[3], [digits[0], digits[1], digits[2]], dir)
            }
            (4, Some((2, dir))) if same => {
                let pon = Self::pon(suit, digits[2], [digits[0], digits[1]], dir)?;
                Self::kakan(&pon, digits[3])
            }
            _ => Err(fail()),
        }
    }
}

impl Display for Meld {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char_from_suit(self.suit).unwrap())?;
        for (i, &d) in self.nums[..self.len as usize].iter().enumerate() {
            write!(f, "{d}")?;
            if i == self.claimed_pos as usize {
                if let Some(dir) = self.dir {
                    write!(f, "{dir}")?;
                }
            }
        }
        Ok(())
    }
}

impl serde::Serialize for Meld {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Meld {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
