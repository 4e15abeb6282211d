//! The [`Yaku`] identifiers this engine awards.
//!
//! <https://riichi.wiki/Yaku>

use serde::{Deserialize, Serialize};

/// Canonical yaku identifiers, displayed with their Japanese names.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    strum::Display,
    strum::IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum Yaku {
    /// 立直
    #[strum(to_string = "立直")]
    Riichi,
    /// 両立直
    #[strum(to_string = "両立直")]
    DoubleRiichi,
    /// 一発
    #[strum(to_string = "一発")]
    Ippatsu,
    /// 海底摸月
    #[strum(to_string = "海底摸月")]
    Haitei,
    /// 河底撈魚
    #[strum(to_string = "河底撈魚")]
    Houtei,
    /// 嶺上開花
    #[strum(to_string = "嶺上開花")]
    Rinshan,
    /// 槍槓
    #[strum(to_string = "槍槓")]
    Chankan,
    /// 門前清自摸和
    #[strum(to_string = "門前清自摸和")]
    MenzenTsumo,

    /// 場風 東/南/西/北
    #[strum(to_string = "場風 東")]
    RoundWindE,
    #[strum(to_string = "場風 南")]
    RoundWindS,
    #[strum(to_string = "場風 西")]
    RoundWindW,
    #[strum(to_string = "場風 北")]
    RoundWindN,
    /// 自風 東/南/西/北
    #[strum(to_string = "自風 東")]
    SeatWindE,
    #[strum(to_string = "自風 南")]
    SeatWindS,
    #[strum(to_string = "自風 西")]
    SeatWindW,
    #[strum(to_string = "自風 北")]
    SeatWindN,
    /// 役牌 白/發/中
    #[strum(to_string = "役牌 白")]
    Haku,
    #[strum(to_string = "役牌 發")]
    Hatsu,
    #[strum(to_string = "役牌 中")]
    Chun,

    /// 平和
    #[strum(to_string = "平和")]
    Pinfu,
    /// 断幺九
    #[strum(to_string = "断幺九")]
    Tanyao,
    /// 一盃口
    #[strum(to_string = "一盃口")]
    Iipeiko,
    /// 三色同順
    #[strum(to_string = "三色同順")]
    SanshokuDoujun,
    /// 一気通貫
    #[strum(to_string = "一気通貫")]
    Ittsu,
    /// 混全帯幺九
    #[strum(to_string = "混全帯幺九")]
    Chanta,
    /// 七対子
    #[strum(to_string = "七対子")]
    Chiitoi,
    /// 対々和
    #[strum(to_string = "対々和")]
    Toitoi,
    /// 三暗刻
    #[strum(to_string = "三暗刻")]
    Sanankou,
    /// 三槓子
    #[strum(to_string = "三槓子")]
    Sankantsu,
    /// 三色同刻
    #[strum(to_string = "三色同刻")]
    SanshokuDoukou,
    /// 混老頭
    #[strum(to_string = "混老頭")]
    Honroutou,
    /// 小三元
    #[strum(to_string = "小三元")]
    Shousangen,
    /// 混一色
    #[strum(to_string = "混一色")]
    Honitsu,
    /// 純全帯幺九
    #[strum(to_string = "純全帯幺九")]
    Junchan,
    /// 二盃口
    #[strum(to_string = "二盃口")]
    Ryanpeiko,
    /// 清一色
    #[strum(to_string = "清一色")]
    Chinitsu,

    /// ドラ
    #[strum(to_string = "ドラ")]
    Dora,
    /// 赤ドラ
    #[strum(to_string = "赤ドラ")]
    AkaDora,
    /// 裏ドラ
    #[strum(to_string = "裏ドラ")]
    UraDora,

    /// 天和
    #[strum(to_string = "天和")]
    Tenho,
    /// 地和
    #[strum(to_string = "地和")]
    Chiho,
    /// 国士無双
    #[strum(to_string = "国士無双")]
    Kokushi,
    /// 国士無双十三面
    #[strum(to_string = "国士無双十三面")]
    Kokushi13,
    /// 四暗刻
    #[strum(to_string = "四暗刻")]
    Suuankou,
    /// 四暗刻単騎
    #[strum(to_string = "四暗刻単騎")]
    SuuankouTanki,
    /// 大三元
    #[strum(to_string = "大三元")]
    Daisangen,
    /// 小四喜
    #[strum(to_string = "小四喜")]
    Shousuushii,
    /// 大四喜
    #[strum(to_string = "大四喜")]
    Daisuushii,
    /// 字一色
    #[strum(to_string = "字一色")]
    Tsuuiisou,
    /// 緑一色
    #[strum(to_string = "緑一色")]
    Ryuuiisou,
    /// 清老頭
    #[strum(to_string = "清老頭")]
    Chinroutou,
    /// 四槓子
    #[strum(to_string = "四槓子")]
    Suukantsu,
    /// 九蓮宝燈
    #[strum(to_string = "九蓮宝燈")]
    Chuuren,
    /// 純正九蓮宝燈
    #[strum(to_string = "純正九蓮宝燈")]
    Chuuren9,
}

impl Yaku {
    /// The round-wind yaku for wind index 0..=3.
    pub fn round_wind(wind: u8) -> Self {
        [
            Yaku::RoundWindE,
            Yaku::RoundWindS,
            Yaku::RoundWindW,
            Yaku::RoundWindN,
        ][wind as usize & 3]
    }

    /// The seat-wind yaku for wind index 0..=3.
    pub fn seat_wind(wind: u8) -> Self {
        [
            Yaku::SeatWindE,
            Yaku::SeatWindS,
            Yaku::SeatWindW,
            Yaku::SeatWindN,
        ][wind as usize & 3]
    }
}
