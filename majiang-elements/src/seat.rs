//! [`Seat`] newtype (mod-4 arithmetic) and the relative claim direction
//! [`Dir`].

use std::fmt::{Debug, Display, Formatter};

use crate::errors::NotationError;

/// Points / point differences. Usually increments of 100.
pub type Points = i64;

/// Seat index --- 0, 1, 2, 3 => the players assigned east, south, west,
/// north at the start of the match.
///
/// Forced to mod-4 arithmetic, so it can represent both an absolute seat
/// and the difference between seats.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Seat(u8);

pub const ALL_SEATS: [Seat; 4] = [Seat(0), Seat(1), Seat(2), Seat(3)];

impl Seat {
    pub const fn new(x: u8) -> Self {
        Seat(x & 3)
    }

    pub const fn to_u8(self) -> u8 {
        self.0
    }
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }

    pub const fn add(self, other: u8) -> Seat {
        Seat(self.0.wrapping_add(other) & 3)
    }
    pub const fn sub(self, other: Seat) -> Seat {
        Seat(self.0.wrapping_sub(other.0) & 3)
    }

    /// The seat one turn after me (下家).
    pub const fn succ(self) -> Self {
        self.add(1)
    }
    /// The seat across the table (対面).
    pub const fn oppo(self) -> Self {
        self.add(2)
    }
    /// The seat one turn before me (上家).
    pub const fn pred(self) -> Self {
        self.add(3)
    }
}

impl From<usize> for Seat {
    fn from(x: usize) -> Self {
        Self::new(x as u8)
    }
}

impl Debug for Seat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat({})", self.0)
    }
}

impl Display for Seat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// All four seats starting from the given one, in turn order.
pub const fn seats_from(seat: Seat) -> [Seat; 4] {
    [seat, seat.add(1), seat.add(2), seat.add(3)]
}

/// The three seats after the given one, in turn order.
pub const fn others_after(seat: Seat) -> [Seat; 3] {
    [seat.add(1), seat.add(2), seat.add(3)]
}

mod seat_serde {
    use serde::de::{Error, Visitor};
    use serde::*;
    use std::fmt::Formatter;

    use super::Seat;

    impl Serialize for Seat {
        fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            s.serialize_u8(self.to_u8())
        }
    }

    impl<'de> Deserialize<'de> for Seat {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct SeatVisitor;
            impl<'a> Visitor<'a> for SeatVisitor {
                type Value = Seat;

                fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
                    write!(f, "0..=3")
                }

                fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
                where
                    E: Error,
                {
                    if (0..=3).contains(&v) {
                        Ok(Seat::new(v as u8))
                    } else {
                        Err(E::custom("out of range"))
                    }
                }
            }
            deserializer.deserialize_u8(SeatVisitor)
        }
    }
}

/// Relative seat a called tile came from, as written in meld and discard
/// notation.
///
/// - `+` 下家 (shimocha): the next player.
/// - `=` 対面 (toimen): the player across.
/// - `-` 上家 (kamicha): the previous player.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Dir {
    Shimocha,
    Toimen,
    Kamicha,
}

impl Dir {
    pub const fn as_char(self) -> char {
        match self {
            Dir::Shimocha => '+',
            Dir::Toimen => '=',
            Dir::Kamicha => '-',
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Dir::Shimocha),
            '=' => Some(Dir::Toimen),
            '-' => Some(Dir::Kamicha),
            _ => None,
        }
    }

    /// Turn-order offset from the caller: shimocha = 1, toimen = 2,
    /// kamicha = 3.
    pub const fn offset(self) -> u8 {
        match self {
            Dir::Shimocha => 1,
            Dir::Toimen => 2,
            Dir::Kamicha => 3,
        }
    }

    /// The direction of `other` as seen from `me`.
    pub fn between(me: Seat, other: Seat) -> Result<Self, NotationError> {
        match other.sub(me).to_u8() {
            1 => Ok(Dir::Shimocha),
            2 => Ok(Dir::Toimen),
            3 => Ok(Dir::Kamicha),
            _ => Err(NotationError::new("direction to self")),
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl serde::Serialize for Dir {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_char(self.as_char())
    }
}

impl<'de> serde::Deserialize<'de> for Dir {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let c = char::deserialize(d)?;
        Dir::from_char(c).ok_or_else(|| serde::de::Error::custom("expected one of + = -"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_arithmetic_wraps() {
        let s = Seat::new(3);
        assert_eq!(s.succ(), Seat::new(0));
        assert_eq!(s.pred(), Seat::new(2));
        assert_eq!(seats_from(Seat::new(2)), [2, 3, 0, 1].map(Seat::new));
        assert_eq!(others_after(Seat::new(1)), [2, 3, 0].map(Seat::new));
    }

    #[test]
    fn dir_offsets_match_turn_order() {
        let me = Seat::new(1);
        for dir in [Dir::Shimocha, Dir::Toimen, Dir::Kamicha] {
            let other = me.add(dir.offset());
            assert_eq!(Dir::between(me, other).unwrap(), dir);
        }
        assert!(Dir::between(me, me).is_err());
    }
}
