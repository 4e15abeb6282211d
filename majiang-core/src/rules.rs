//! Configurable rule options for a game, bundled as [`Ruleset`].

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use majiang_elements::seat::Points;

/// Bundle of configurable rules.
///
/// The defaults follow common East-South arcade rules: one red five per
/// numbered suit, open tanyao allowed, double ron allowed, ura and
/// kan-dora on.
#[derive(Derivative, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default)]
pub struct Ruleset {
    /// Starting points per seat (配給原点).
    #[derivative(Default(value = "25000"))]
    pub origin_points: Points,

    /// Rank bonus in thousands for places 1..=4 (順位点).
    #[derivative(Default(value = "[20.0, 10.0, -10.0, -20.0]"))]
    pub rank_points: [f64; 4],

    /// Red fives per numbered suit, m/p/s (赤牌).
    #[derivative(Default(value = "[1, 1, 1]"))]
    pub red_fives: [u8; 3],

    /// Open tanyao (喰い断).
    #[derivative(Default(value = "true"))]
    pub kuitan: bool,

    /// Swap-call tolerance (喰い替え): 0 = forbidden, 1 = the sequence
    /// swap is allowed, 2 = even the identical tile is allowed.
    #[derivative(Default(value = "0"))]
    pub kuikae_level: u8,

    /// Wind rounds played: 0 = a single hand, 1 = east only,
    /// 2 = east-south, 4 = a full four-wind game (場数).
    #[derivative(Default(value = "2"))]
    pub game_count: u8,

    /// Abortive draws (途中流局): four winds, four kans, four riichi,
    /// nine terminals.
    #[derivative(Default(value = "true"))]
    pub interrupted_draws: bool,

    /// 流し満貫 at the exhaustive draw.
    #[derivative(Default(value = "true"))]
    pub nagashi_mangan: bool,

    /// Tenpai at the exhaustive draw counts only when declared.
    #[derivative(Default(value = "false"))]
    pub noten_declaration: bool,

    /// Noten seats pay the tenpai seats 3000 at the exhaustive draw.
    #[derivative(Default(value = "true"))]
    pub noten_penalty: bool,

    /// How many seats may ron the same discard; more aborts the hand
    /// (最大同時和了数).
    #[derivative(Default(value = "2"))]
    pub max_simultaneous_win: u8,

    /// Dealer continuation (連荘方式): 0 = never, 1 = on a dealer win,
    /// 2 = also on dealer tenpai at the exhaustive draw, 3 = on every
    /// exhaustive draw.
    #[derivative(Default(value = "2"))]
    pub consecutive_mode: u8,

    /// The game ends as soon as a seat goes below zero (トビ).
    #[derivative(Default(value = "true"))]
    pub bust_ends_game: bool,

    /// The leading dealer may end the game at all-last (オーラス止め).
    #[derivative(Default(value = "true"))]
    pub oralas_stop: bool,

    /// Overtime when nobody qualifies at all-last (延長戦方式):
    /// 0 = none, 1 = sudden death each hand, 2 = sudden death checked at
    /// dealer rotation, 3 = one fixed extra wind round.
    #[derivative(Default(value = "1"))]
    pub extension_mode: u8,

    /// 一発.
    #[derivative(Default(value = "true"))]
    pub ippatsu: bool,

    /// 裏ドラ.
    #[derivative(Default(value = "true"))]
    pub ura_dora: bool,

    /// カンドラ.
    #[derivative(Default(value = "true"))]
    pub kan_dora: bool,

    /// カン裏.
    #[derivative(Default(value = "true"))]
    pub kan_ura: bool,

    /// Kan-dora for an open kan is revealed only after the following
    /// discard or kan declaration (後乗せ). An ankan always reveals at
    /// once.
    #[derivative(Default(value = "true"))]
    pub kan_dora_delayed: bool,

    /// Riichi is allowed even when no draw is left for the declarer
    /// (ツモ番なしリーチ).
    #[derivative(Default(value = "false"))]
    pub riichi_without_tsumo: bool,

    /// Ankan while under riichi (リーチ後暗槓): 0 = forbidden,
    /// 1 = allowed unless the hand's winning decompositions change,
    /// 2 = allowed unless the waiting tiles change.
    #[derivative(Default(value = "2"))]
    pub ankan_after_riichi_level: u8,

    /// Multiple yakuman stack (役満の複合).
    #[derivative(Default(value = "true"))]
    pub yakuman_composition: bool,

    /// 13-wait kokushi, tanki suuankou, pure chuuren, and daisuushii pay
    /// double (ダブル役満).
    #[derivative(Default(value = "true"))]
    pub double_yakuman: bool,

    /// 13+ han counts as a yakuman (数え役満); otherwise capped at
    /// sanbaiman.
    #[derivative(Default(value = "true"))]
    pub counted_yakuman: bool,

    /// Liability for feeding the final dragon/wind of a yakuman
    /// (役満パオ). Disabling keeps the yaku and drops the liability.
    #[derivative(Default(value = "true"))]
    pub yakuman_pao: bool,

    /// 1920-point bases promote to mangan (切り上げ満貫).
    #[derivative(Default(value = "false"))]
    pub round_up_mangan: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_rules() {
        let rule = Ruleset::default();
        assert_eq!(rule.origin_points, 25000);
        assert_eq!(rule.red_fives, [1, 1, 1]);
        assert_eq!(rule.game_count, 2);
        assert_eq!(rule.max_simultaneous_win, 2);
        assert!(rule.kuitan);
        assert!(!rule.riichi_without_tsumo);
        assert_eq!(rule.ankan_after_riichi_level, 2);
        assert!(!rule.round_up_mangan);
    }

    #[test]
    fn serde_roundtrip_with_partial_input() {
        let rule = Ruleset {
            game_count: 1,
            red_fives: [0, 0, 0],
            ..Ruleset::default()
        };
        let json = serde_json::to_string(&rule).unwrap();
        let back: Ruleset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);

        // unspecified fields take their defaults
        let partial: Ruleset = serde_json::from_str(r#"{"kuitan": false}"#).unwrap();
        assert!(!partial.kuitan);
        assert_eq!(partial.origin_points, 25000);
    }
}
