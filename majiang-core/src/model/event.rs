//! [`Event`]: one broadcast per state entry, maskable per seat.

use serde::{Deserialize, Serialize};

use majiang_elements::prelude::*;

use crate::river::Discard;
use crate::rules::Ruleset;
use crate::scoring::Win;

/// Serde helper masking a hidden tile as `"_"`.
mod masked_tile {
    use majiang_elements::tile::Tile;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<Tile>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => t.serialize(s),
            None => s.serialize_str("_"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Tile>, D::Error> {
        let s = String::deserialize(d)?;
        if s == "_" {
            Ok(None)
        } else {
            s.parse().map(Some).map_err(serde::de::Error::custom)
        }
    }
}

/// Why a hand ended without a winner.
#[derive(Copy, Clone, Debug, Eq, PartialEq, strum::Display, Serialize, Deserialize)]
pub enum DrawKind {
    /// 荒牌平局
    #[strum(to_string = "荒牌平局")]
    Exhausted,
    /// 九種九牌
    #[strum(to_string = "九種九牌")]
    NineTerminals,
    /// 四風連打
    #[strum(to_string = "四風連打")]
    FourWinds,
    /// 四家立直
    #[strum(to_string = "四家立直")]
    FourRiichi,
    /// 四開槓
    #[strum(to_string = "四開槓")]
    FourKans,
    /// 三家和
    #[strum(to_string = "三家和")]
    ThreeRon,
    /// 流し満貫
    #[strum(to_string = "流し満貫")]
    NagashiMangan,
}

/// One broadcast from the round. The same value is stored (unmasked) in
/// the record; agents receive the [`Event::masked_for`] view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    /// Game start, addressed to one seat.
    Kaiju {
        id: Seat,
        rule: Box<Ruleset>,
        names: [String; 4],
        qijia: Seat,
    },
    /// Deal: winds and counters, stakes, the initial dora indicator,
    /// starting points, and the four starting hands.
    Qipai {
        round_wind: u8,
        hand: u8,
        honba: u8,
        sticks: u32,
        dora: Tile,
        points: [Points; 4],
        hands: [String; 4],
    },
    /// A turn draw.
    Zimo {
        seat: Seat,
        #[serde(with = "masked_tile")]
        tile: Option<Tile>,
    },
    /// A discard, markers included.
    Dapai { seat: Seat, discard: Discard },
    /// A claim (chi / pon / daiminkan).
    Fulou { seat: Seat, meld: Meld },
    /// An ankan or kakan declaration.
    Gang { seat: Seat, meld: Meld },
    /// The replacement draw after a kan.
    Gangzimo {
        seat: Seat,
        #[serde(with = "masked_tile")]
        tile: Option<Tile>,
    },
    /// A new kan-dora indicator.
    Kaigang { dora: Tile },
    /// A win with its full scoring.
    Hule {
        seat: Seat,
        hand: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ron: Option<Tile>,
        ura: Option<Vec<Tile>>,
        win: Win,
        /// Absolute-seat deltas, stakes included.
        deltas: [Points; 4],
    },
    /// A drawn hand: revealed tenpai hands and penalty deltas.
    Pingju {
        name: DrawKind,
        hands: [Option<String>; 4],
        deltas: [Points; 4],
    },
    /// Game over: final points, ranks, and rank-point scores.
    Jieju {
        points: [Points; 4],
        rank: [u8; 4],
        scores: [f64; 4],
    },
}

impl Event {
    /// The view of this event for one seat: other seats' hands and draws
    /// are transmitted as `_`.
    pub fn masked_for(&self, viewer: Seat) -> Event {
        let mut ev = self.clone();
        match &mut ev {
            Event::Qipai { hands, .. } => {
                for (i, h) in hands.iter_mut().enumerate() {
                    if i != viewer.to_usize() {
                        *h = "_".repeat(13);
                    }
                }
            }
            Event::Zimo { seat, tile } | Event::Gangzimo { seat, tile } => {
                if *seat != viewer {
                    *tile = None;
                }
            }
            _ => {}
        }
        ev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_as_tagged_tokens() {
        let ev = Event::Zimo {
            seat: Seat::new(2),
            tile: Some("m0".parse().unwrap()),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json, serde_json::json!({"zimo": {"seat": 2, "tile": "m0"}}));

        let ev = Event::Dapai {
            seat: Seat::new(0),
            discard: "z7_*".parse().unwrap(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json, serde_json::json!({"dapai": {"seat": 0, "discard": "z7_*"}}));

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn masking_hides_other_seats() {
        let ev = Event::Zimo {
            seat: Seat::new(1),
            tile: Some("p3".parse().unwrap()),
        };
        assert_eq!(ev.masked_for(Seat::new(1)), ev);
        let masked = ev.masked_for(Seat::new(0));
        assert_eq!(
            serde_json::to_value(&masked).unwrap(),
            serde_json::json!({"zimo": {"seat": 1, "tile": "_"}})
        );

        let ev = Event::Qipai {
            round_wind: 0,
            hand: 0,
            honba: 0,
            sticks: 0,
            dora: "m1".parse().unwrap(),
            points: [25000; 4],
            hands: [
                "m123p456s789z1122".into(),
                "m111p111s111z1112".into(),
                "m999p999s999z7772".into(),
                "m147p147s147z1234".into(),
            ],
        };
        let masked = ev.masked_for(Seat::new(2));
        if let Event::Qipai { hands, .. } = &masked {
            assert_eq!(hands[0], "_____________");
            assert_eq!(hands[2], "m999p999s999z7772");
        } else {
            panic!();
        }
    }
}
