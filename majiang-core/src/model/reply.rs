//! [`Reply`]: an agent's answer to the current event.

use serde::{Deserialize, Serialize};

use majiang_elements::prelude::*;

/// At most one action per event. The round only consumes the replies
/// relevant to the current state; everything else is ignored, and an
/// invalid reply falls back to the state's default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    /// Pass.
    #[default]
    None,
    /// Declare the nine-terminals abortive draw on the first draw, or
    /// declare tenpai at the exhaustive draw.
    Daopai,
    /// Declare a win: tsumo on one's own draw, ron on a discard or a
    /// kakan.
    Hule,
    /// Declare an ankan/kakan on one's own turn, or claim a daiminkan.
    Gang(Meld),
    /// Claim the last discard with a chi or pon.
    Fulou(Meld),
    /// Discard a tile; `riichi` marks the declaring discard.
    Dapai { tile: Tile, riichi: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_serialize_tagged() {
        let r = Reply::Dapai {
            tile: "m5".parse().unwrap(),
            riichi: true,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"dapai": {"tile": "m5", "riichi": true}})
        );
        let r = Reply::Fulou("m1-23".parse().unwrap());
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            serde_json::json!({"fulou": "m1-23"})
        );
        assert_eq!(serde_json::to_value(Reply::None).unwrap(), serde_json::json!("none"));
    }
}
