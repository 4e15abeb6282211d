//! Fu, yaku, and payment calculation for a winning hand 和了計算.
//!
//! [`score_win`] walks every decomposition of the completed hand, scores
//! each, and keeps the one maximizing (points, han, fu). A hand with no
//! yaku is not a win.

mod yaku;

pub use yaku::Yaku;

use serde::{Deserialize, Serialize};

use majiang_elements::prelude::*;

use crate::analysis::{win_forms, GroupKind, RegularWin, WinForm};
use crate::hand::Hand;
use crate::rules::Ruleset;

/// Everything the scorer needs beyond the hand itself.
#[derive(Clone, Debug)]
pub struct WinContext<'a> {
    pub rule: &'a Ruleset,
    /// Round wind index, 0..=3.
    pub round_wind: u8,
    /// Seat wind index; 0 is the dealer.
    pub seat_wind: u8,
    /// 0 = none, 1 = riichi, 2 = double riichi.
    pub riichi: u8,
    pub ippatsu: bool,
    pub chankan: bool,
    pub rinshan: bool,
    /// 0 = none, 1 = last-draw tsumo (haitei), 2 = last-discard ron
    /// (houtei).
    pub last_tile: u8,
    /// 0 = none, 1 = tenho, 2 = chiho. Replaces every other situational
    /// yaku.
    pub blessing: u8,
    pub dora_indicators: Vec<Tile>,
    pub ura_indicators: Option<Vec<Tile>>,
    pub honba: u8,
    pub riichi_sticks: u32,
}

impl<'a> WinContext<'a> {
    /// A bare context: east round, dealer seat, nothing special.
    pub fn plain(rule: &'a Ruleset) -> Self {
        Self {
            rule,
            round_wind: 0,
            seat_wind: 0,
            riichi: 0,
            ippatsu: false,
            chankan: false,
            rinshan: false,
            last_tile: 0,
            blessing: 0,
            dora_indicators: vec![],
            ura_indicators: None,
            honba: 0,
            riichi_sticks: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum YakuValue {
    Han(u8),
    Yakuman(u8),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct YakuHit {
    pub yaku: Yaku,
    pub value: YakuValue,
}

fn han(yaku: Yaku, n: u8) -> YakuHit {
    YakuHit {
        yaku,
        value: YakuValue::Han(n),
    }
}

fn yakuman(yaku: Yaku, n: u8) -> YakuHit {
    YakuHit {
        yaku,
        value: YakuValue::Yakuman(n),
    }
}

/// A scored win.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    pub yaku: Vec<YakuHit>,
    /// `None` for yakuman hands.
    pub fu: Option<u8>,
    pub han: Option<u8>,
    /// Total yakuman multiplier; 0 for ordinary hands.
    pub yakuman: u8,
    /// Direction (winner-relative) of the seat liable for a pao'd
    /// yakuman.
    pub pao: Option<Dir>,
    /// Nominal table value, honba and riichi sticks excluded.
    pub points: Points,
    /// Point deltas indexed by seat wind (0 = dealer), honba and riichi
    /// sticks included.
    pub deltas: [Points; 4],
}

/// Block statistics of one regular decomposition.
#[derive(Default)]
struct Tally {
    n_blocks: u8,
    runs: [[u8; 10]; 3],
    sets: [[u8; 10]; 4],
    n_runs: u8,
    n_sets: u8,
    n_concealed_sets: u8,
    n_kans: u8,
    /// Blocks containing a terminal or honor, the pair included.
    n_yaochuu: u8,
    /// Honor blocks, the pair included.
    n_honor_blocks: u8,
    /// 20 + group fu + pair fu + wait fu, before the tsumo/menzen-ron
    /// adjustments.
    base_fu: u8,
    pinfu: bool,
}

fn round_wind_tile(ctx: &WinContext) -> Tile {
    Tile::from_suit_num(3, ctx.round_wind + 1).unwrap()
}
fn seat_wind_tile(ctx: &WinContext) -> Tile {
    Tile::from_suit_num(3, ctx.seat_wind + 1).unwrap()
}

fn tally_regular(win: &RegularWin, ctx: &WinContext, menzen: bool) -> Tally {
    let mut t = Tally {
        n_blocks: 5,
        ..Tally::default()
    };
    let pair = win.pair;
    if pair.is_yaochuu() {
        t.n_yaochuu += 1;
    }
    if pair.is_honor() {
        t.n_honor_blocks += 1;
    }
    let mut fu = 20u8;
    if pair.is_dragon() {
        fu += 2;
    }
    if pair == round_wind_tile(ctx) {
        fu += 2;
    }
    if pair == seat_wind_tile(ctx) {
        fu += 2;
    }
    for g in &win.groups {
        let s = g.tile.suit() as usize;
        let n = g.tile.normal_num() as usize;
        match g.kind {
            GroupKind::Run => {
                t.runs[s][n] += 1;
                t.n_runs += 1;
                if n == 1 || n == 7 {
                    t.n_yaochuu += 1;
                }
            }
            GroupKind::Triplet | GroupKind::Quad => {
                t.sets[s][n] += 1;
                t.n_sets += 1;
                if g.concealed {
                    t.n_concealed_sets += 1;
                }
                if g.kind == GroupKind::Quad {
                    t.n_kans += 1;
                }
                if g.tile.is_yaochuu() {
                    t.n_yaochuu += 1;
                }
                if g.tile.is_honor() {
                    t.n_honor_blocks += 1;
                }
                let mut set_fu = 2;
                if g.tile.is_yaochuu() {
                    set_fu *= 2;
                }
                if g.concealed {
                    set_fu *= 2;
                }
                if g.kind == GroupKind::Quad {
                    set_fu *= 4;
                }
                fu += set_fu;
            }
        }
    }
    fu += win.wait_fu();
    t.pinfu = menzen && fu == 20;
    t.base_fu = fu;
    t
}

/// Base 20 plus extras, tsumo +2 except pinfu, menzen ron +10, open
/// floor 30, rounded up to the next 10.
fn final_fu(t: &Tally, menzen: bool, tsumo: bool) -> u8 {
    let mut fu = t.base_fu;
    if tsumo {
        if !t.pinfu {
            fu += 2;
        }
    } else if menzen {
        fu += 10;
    }
    if !menzen && fu < 30 {
        fu = 30;
    }
    (fu + 9) / 10 * 10
}

fn suit_usage(tiles: impl Iterator<Item = Tile>) -> ([bool; 3], bool) {
    let mut suits = [false; 3];
    let mut honors = false;
    for tile in tiles {
        if tile.is_honor() {
            honors = true;
        } else {
            suits[tile.suit() as usize] = true;
        }
    }
    (suits, honors)
}

fn flush_yaku(suits: [bool; 3], honors: bool, menzen: bool, out: &mut Vec<YakuHit>) {
    if suits.iter().filter(|&&x| x).count() != 1 {
        return;
    }
    if honors {
        out.push(han(Yaku::Honitsu, if menzen { 3 } else { 2 }));
    } else {
        out.push(han(Yaku::Chinitsu, if menzen { 6 } else { 5 }));
    }
}

fn regular_yaku(
    win: &RegularWin,
    t: &Tally,
    ctx: &WinContext,
    menzen: bool,
    tsumo: bool,
) -> Vec<YakuHit> {
    let mut out = vec![];
    if menzen && tsumo {
        out.push(han(Yaku::MenzenTsumo, 1));
    }
    let rw = ctx.round_wind as usize;
    let sw = ctx.seat_wind as usize;
    if t.sets[3][rw + 1] > 0 {
        out.push(han(Yaku::round_wind(ctx.round_wind), 1));
    }
    if t.sets[3][sw + 1] > 0 {
        out.push(han(Yaku::seat_wind(ctx.seat_wind), 1));
    }
    if t.sets[3][5] > 0 {
        out.push(han(Yaku::Haku, 1));
    }
    if t.sets[3][6] > 0 {
        out.push(han(Yaku::Hatsu, 1));
    }
    if t.sets[3][7] > 0 {
        out.push(han(Yaku::Chun, 1));
    }
    if t.pinfu {
        out.push(han(Yaku::Pinfu, 1));
    }
    if t.n_yaochuu == 0 && (menzen || ctx.rule.kuitan) {
        out.push(han(Yaku::Tanyao, 1));
    }
    if menzen {
        let beikou: u8 = t.runs.iter().flatten().map(|&c| c / 2).sum();
        if beikou == 1 {
            out.push(han(Yaku::Iipeiko, 1));
        } else if beikou == 2 {
            out.push(han(Yaku::Ryanpeiko, 3));
        }
    }
    if (1..=7).any(|n| t.runs[0][n] > 0 && t.runs[1][n] > 0 && t.runs[2][n] > 0) {
        out.push(han(Yaku::SanshokuDoujun, if menzen { 2 } else { 1 }));
    }
    if (0..3).any(|s| t.runs[s][1] > 0 && t.runs[s][4] > 0 && t.runs[s][7] > 0) {
        out.push(han(Yaku::Ittsu, if menzen { 2 } else { 1 }));
    }
    if t.n_yaochuu == t.n_blocks && t.n_runs > 0 {
        if t.n_honor_blocks > 0 {
            out.push(han(Yaku::Chanta, if menzen { 2 } else { 1 }));
        } else {
            out.push(han(Yaku::Junchan, if menzen { 3 } else { 2 }));
        }
    }
    if t.n_yaochuu == t.n_blocks && t.n_runs == 0 && t.n_honor_blocks > 0 {
        out.push(han(Yaku::Honroutou, 2));
    }
    if t.n_sets == 4 {
        out.push(han(Yaku::Toitoi, 2));
    }
    if t.n_concealed_sets == 3 {
        out.push(han(Yaku::Sanankou, 2));
    }
    if t.n_kans == 3 {
        out.push(han(Yaku::Sankantsu, 2));
    }
    if (1..=9).any(|n| t.sets[0][n] > 0 && t.sets[1][n] > 0 && t.sets[2][n] > 0) {
        out.push(han(Yaku::SanshokuDoukou, 2));
    }
    let dragon_sets = t.sets[3][5] + t.sets[3][6] + t.sets[3][7];
    if dragon_sets == 2 && win.pair.is_dragon() {
        out.push(han(Yaku::Shousangen, 2));
    }
    let (suits, honors) = suit_usage(
        std::iter::once(win.pair).chain(win.groups.iter().map(|g| g.tile)),
    );
    flush_yaku(suits, honors, menzen, &mut out);
    out
}

fn is_all_green(win: &RegularWin) -> bool {
    let green = |t: Tile| matches!(t.as_str(), "s2" | "s3" | "s4" | "s6" | "s8" | "z6");
    green(win.pair)
        && win.groups.iter().all(|g| match g.kind {
            GroupKind::Run => g.tile.suit() == 2 && g.tile.normal_num() == 2,
            _ => green(g.tile),
        })
}

fn regular_yakuman(win: &RegularWin, t: &Tally, rule: &Ruleset) -> Vec<YakuHit> {
    let double = |n: u8| if rule.double_yakuman { n } else { 1 };
    let mut out = vec![];
    if t.n_concealed_sets == 4 {
        if win.pair_is_win {
            out.push(yakuman(Yaku::SuuankouTanki, double(2)));
        } else {
            out.push(yakuman(Yaku::Suuankou, 1));
        }
    }
    if t.sets[3][5] + t.sets[3][6] + t.sets[3][7] == 3 {
        out.push(yakuman(Yaku::Daisangen, 1));
    }
    let wind_sets = t.sets[3][1] + t.sets[3][2] + t.sets[3][3] + t.sets[3][4];
    if wind_sets == 4 {
        out.push(yakuman(Yaku::Daisuushii, double(2)));
    } else if wind_sets == 3 && win.pair.is_wind() {
        out.push(yakuman(Yaku::Shousuushii, 1));
    }
    if t.n_honor_blocks == t.n_blocks {
        out.push(yakuman(Yaku::Tsuuiisou, 1));
    }
    if is_all_green(win) {
        out.push(yakuman(Yaku::Ryuuiisou, 1));
    }
    if t.n_yaochuu == t.n_blocks && t.n_runs == 0 && t.n_honor_blocks == 0 {
        out.push(yakuman(Yaku::Chinroutou, 1));
    }
    if t.n_kans == 4 {
        out.push(yakuman(Yaku::Suukantsu, 1));
    }
    out
}

fn seven_pairs_yaku(pairs: &[Tile], ctx: &WinContext, tsumo: bool) -> Vec<YakuHit> {
    let mut out = vec![];
    if tsumo {
        out.push(han(Yaku::MenzenTsumo, 1));
    }
    out.push(han(Yaku::Chiitoi, 2));
    if pairs.iter().all(|t| !t.is_yaochuu()) {
        out.push(han(Yaku::Tanyao, 1));
    }
    if pairs.iter().all(|t| t.is_yaochuu()) && pairs.iter().any(|t| t.is_honor()) {
        out.push(han(Yaku::Honroutou, 2));
    }
    let (suits, honors) = suit_usage(pairs.iter().copied());
    flush_yaku(suits, honors, true, &mut out);
    out
}

/// Situational yaku known before looking at the decomposition. Tenho and
/// chiho replace everything else.
fn pre_yaku(ctx: &WinContext) -> Vec<YakuHit> {
    match ctx.blessing {
        1 => return vec![yakuman(Yaku::Tenho, 1)],
        2 => return vec![yakuman(Yaku::Chiho, 1)],
        _ => {}
    }
    let mut out = vec![];
    match ctx.riichi {
        1 => out.push(han(Yaku::Riichi, 1)),
        2 => out.push(han(Yaku::DoubleRiichi, 2)),
        _ => {}
    }
    if ctx.ippatsu {
        out.push(han(Yaku::Ippatsu, 1));
    }
    if ctx.chankan {
        out.push(han(Yaku::Chankan, 1));
    }
    if ctx.rinshan {
        out.push(han(Yaku::Rinshan, 1));
    }
    match ctx.last_tile {
        1 => out.push(han(Yaku::Haitei, 1)),
        2 => out.push(han(Yaku::Houtei, 1)),
        _ => {}
    }
    out
}

/// Every tile of the completed configuration, melds included, reds
/// preserved.
fn all_tiles(completed: &Hand) -> Vec<Tile> {
    let mut tiles = vec![];
    let counts = completed.counts();
    for s in 0..4usize {
        let top = if s == 3 { 7 } else { 9 };
        for n in 1..=top {
            let c = counts[s][n];
            let reds = if n == 5 && s < 3 { counts[s][0] } else { 0 };
            let tile = Tile::from_suit_num(s as u8, n as u8).unwrap();
            for i in 0..c {
                tiles.push(if i < reds { tile.to_red() } else { tile });
            }
        }
    }
    for meld in completed.melds() {
        tiles.extend(meld.tiles());
    }
    tiles
}

fn dora_hits(completed: &Hand, ctx: &WinContext) -> Vec<YakuHit> {
    let tiles = all_tiles(completed);
    let count_indicated = |indicators: &[Tile]| -> u8 {
        indicators
            .iter()
            .map(|ind| {
                let dora = ind.indicated_dora();
                tiles.iter().filter(|t| t.normalized() == dora).count() as u8
            })
            .sum()
    };
    let mut out = vec![];
    let n = count_indicated(&ctx.dora_indicators);
    if n > 0 {
        out.push(han(Yaku::Dora, n));
    }
    let reds = tiles.iter().filter(|t| t.is_red()).count() as u8;
    if reds > 0 {
        out.push(han(Yaku::AkaDora, reds));
    }
    if ctx.riichi > 0 {
        if let Some(ura) = &ctx.ura_indicators {
            let n = count_indicated(ura);
            if n > 0 {
                out.push(han(Yaku::UraDora, n));
            }
        }
    }
    out
}

/// Liability: pao attaches when the group completing the dragon (resp.
/// wind) count was claimed from someone, even if the other groups are
/// concealed triplets. Concealed completions cannot be ordered from the
/// final hand, so the latest dragon/wind call is taken as the completing
/// group and its feeder is liable.
fn attach_pao(hits: &[YakuHit], melds: &[Meld], rule: &Ruleset) -> Option<(Dir, u8)> {
    if !rule.yakuman_pao {
        return None;
    }
    for hit in hits {
        let range = match hit.yaku {
            Yaku::Daisangen => 5..=7,
            Yaku::Daisuushii => 1..=4,
            _ => continue,
        };
        let value = match hit.value {
            YakuValue::Yakuman(n) => n,
            YakuValue::Han(_) => continue,
        };
        let completing = melds
            .iter()
            .filter(|m| m.suit() == 3 && range.contains(&m.num()) && m.is_open())
            .last();
        if let Some(meld) = completing {
            return Some((meld.dir()?, value));
        }
    }
    None
}

fn ceil100(x: Points) -> Points {
    (x + 99) / 100 * 100
}

/// Base points of an ordinary hand.
fn base_points(han: u8, fu: u8, rule: &Ruleset) -> Points {
    match han {
        0 => 0,
        1..=5 => {
            let b = (fu as Points) << (2 + han as u32);
            if b >= 2000 {
                2000
            } else if rule.round_up_mangan && b >= 1920 {
                2000
            } else {
                b
            }
        }
        6..=7 => 3000,
        8..=10 => 4000,
        11..=12 => 6000,
        _ => {
            if rule.counted_yakuman {
                8000
            } else {
                6000
            }
        }
    }
}

/// Payments: ron collects base x6 (dealer) or x4 from the discarder;
/// tsumo collects base x2 from each (dealer) or x2/x1/x1; every
/// transaction rounds up to 100. Honba adds 300 per ron, 100 per payer
/// per tsumo; the riichi pot goes to the winner. For ron the pao seat
/// pays the liable portion in the discarder's stead; for tsumo it takes
/// over the non-dealer halves of that portion while a non-liable dealer
/// keeps paying normally.
fn distribute(
    ctx: &WinContext,
    ron_dir: Option<Dir>,
    base: Points,
    pao: Option<(Dir, Points)>,
) -> (Points, [Points; 4]) {
    let wi = ctx.seat_wind as usize;
    let honba = ctx.honba as Points;
    let sticks = ctx.riichi_sticks as Points;
    let mut deltas = [0 as Points; 4];
    let nominal;
    match ron_dir {
        Some(dir) => {
            let k = if wi == 0 { 6 } else { 4 };
            let total = ceil100(k * base);
            let di = (ctx.seat_wind + dir.offset()) as usize % 4;
            let mut discarder_pays = total + 300 * honba;
            if let Some((pdir, pao_base)) = pao {
                let li = (ctx.seat_wind + pdir.offset()) as usize % 4;
                let pao_pays = ceil100(k * pao_base);
                deltas[li] -= pao_pays;
                discarder_pays -= pao_pays;
            }
            deltas[di] -= discarder_pays;
            deltas[wi] += total + 300 * honba + 1000 * sticks;
            nominal = total;
        }
        None => {
            let li = pao.map(|(pdir, _)| (ctx.seat_wind + pdir.offset()) as usize % 4);
            let mut total = 0;
            for wind in 0..4usize {
                if wind == wi {
                    continue;
                }
                let k = if wi == 0 || wind == 0 { 2 } else { 1 };
                let share = ceil100(k * base);
                let mut pays = share + 100 * honba;
                if let (Some((_, pao_base)), Some(li)) = (pao, li) {
                    // only the non-dealer halves shift to the liable
                    // seat; a non-liable dealer keeps paying in full
                    if wind != 0 || li == 0 {
                        let pao_share = ceil100(k * pao_base);
                        deltas[li] -= pao_share;
                        pays -= pao_share;
                    }
                }
                deltas[wind] -= pays;
                total += share;
            }
            deltas[wi] += total + 300 * honba + 1000 * sticks;
            nominal = total;
        }
    }
    (nominal, deltas)
}

fn han_total(hits: &[YakuHit]) -> u8 {
    hits.iter()
        .map(|h| match h.value {
            YakuValue::Han(n) => n,
            YakuValue::Yakuman(_) => 0,
        })
        .sum()
}

fn score_form(
    form: &WinForm,
    completed: &Hand,
    ron_dir: Option<Dir>,
    ctx: &WinContext,
    menzen: bool,
    pre: &[YakuHit],
    dora: &[YakuHit],
) -> Option<Win> {
    let tsumo = ron_dir.is_none();
    let double = |n: u8| if ctx.rule.double_yakuman { n } else { 1 };
    let (structural, yakuman_hits, fu) = match form {
        WinForm::Regular(win) => {
            let t = tally_regular(win, ctx, menzen);
            let ym = regular_yakuman(win, &t, ctx.rule);
            let fu = final_fu(&t, menzen, tsumo);
            (regular_yaku(win, &t, ctx, menzen, tsumo), ym, fu)
        }
        WinForm::SevenPairs { pairs, .. } => {
            let mut ym = vec![];
            if pairs.iter().all(|t| t.is_honor()) {
                ym.push(yakuman(Yaku::Tsuuiisou, 1));
            }
            (seven_pairs_yaku(pairs, ctx, tsumo), ym, 25)
        }
        WinForm::ThirteenOrphans { thirteen_wait } => {
            let hit = if *thirteen_wait {
                yakuman(Yaku::Kokushi13, double(2))
            } else {
                yakuman(Yaku::Kokushi, 1)
            };
            (vec![], vec![hit], 0)
        }
        WinForm::NineGates { nine_wait } => {
            let hit = if *nine_wait {
                yakuman(Yaku::Chuuren9, double(2))
            } else {
                yakuman(Yaku::Chuuren, 1)
            };
            (vec![], vec![hit], 0)
        }
    };

    let pre_is_yakuman = pre
        .iter()
        .any(|h| matches!(h.value, YakuValue::Yakuman(_)));
    if !yakuman_hits.is_empty() || pre_is_yakuman {
        let mut hits = vec![];
        if pre_is_yakuman {
            hits.extend_from_slice(pre);
        }
        hits.extend(yakuman_hits);
        let multipliers = hits.iter().filter_map(|h| match h.value {
            YakuValue::Yakuman(n) => Some(n),
            YakuValue::Han(_) => None,
        });
        let total = if ctx.rule.yakuman_composition {
            multipliers.sum::<u8>()
        } else {
            multipliers.max().unwrap_or(0)
        };
        let pao = attach_pao(&hits, completed.melds(), ctx.rule);
        let base = 8000 * total as Points;
        let pao_base = pao.map(|(d, m)| (d, 8000 * m.min(total) as Points));
        let (points, deltas) = distribute(ctx, ron_dir, base, pao_base);
        return Some(Win {
            yaku: hits,
            fu: None,
            han: None,
            yakuman: total,
            pao: pao.map(|p| p.0),
            points,
            deltas,
        });
    }

    let mut hits = pre.to_vec();
    hits.extend(structural);
    if hits.is_empty() {
        return None;
    }
    hits.extend_from_slice(dora);
    let total_han = han_total(&hits);
    let base = base_points(total_han, fu, ctx.rule);
    let (points, deltas) = distribute(ctx, ron_dir, base, None);
    Some(Win {
        yaku: hits,
        fu: Some(fu),
        han: Some(total_han),
        yakuman: 0,
        pao: None,
        points,
        deltas,
    })
}

/// Score the hand completed by its draw (tsumo) or by the given claimed
/// tile (ron, with the discarder's direction). `None` when the
/// configuration is not a win or carries no yaku.
pub fn score_win(hand: &Hand, ron: Option<(Tile, Dir)>, ctx: &WinContext) -> Option<Win> {
    let mut completed = hand.clone();
    if let Some((tile, _)) = ron {
        completed.draw(Some(tile), false).ok()?;
    }
    let forms = win_forms(hand, ron.map(|r| r.0));
    if forms.is_empty() {
        return None;
    }
    let menzen = completed.is_menzen();
    let pre = pre_yaku(ctx);
    let dora = dora_hits(&completed, ctx);
    let mut best: Option<Win> = None;
    for form in &forms {
        if let Some(cand) = score_form(
            form,
            &completed,
            ron.map(|r| r.1),
            ctx,
            menzen,
            &pre,
            &dora,
        ) {
            let key = |w: &Win| (w.points, w.han.unwrap_or(0), w.fu.unwrap_or(0));
            if best.as_ref().map_or(true, |b| key(&cand) > key(b)) {
                best = Some(cand);
            }
        }
    }
    best
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
    fn names(win: &Win) -> Vec<&'static str> {
        win.yaku.iter().map(|h| h.yaku.into()).collect()
    }

    #[test]
    fn open_yakuhai_hand() {
        // pon of south, south seat, east round; tsumo on the pair
        let rule = Ruleset::default();
        let ctx = WinContext {
            seat_wind: 1,
            ..WinContext::plain(&rule)
        };
        let win = score_win(&hand("m123p456s789z11,z222="), None, &ctx).unwrap();
        assert_eq!(names(&win), vec!["自風 南"]);
        assert_eq!(win.han, Some(1));
        // 20 base + 4 open honor triplet + 2 round-wind pair + 2 tanki
        // + 2 tsumo = 30
        assert_eq!(win.fu, Some(30));
        assert!(win.deltas[1] > 0);
        assert_eq!(win.deltas.iter().sum::<Points>(), 0);
    }

    #[test]
    fn pinfu_tsumo_is_twenty_fu() {
        let rule = Ruleset::default();
        let ctx = WinContext {
            seat_wind: 2,
            ..WinContext::plain(&rule)
        };
        let win = score_win(&hand("m23567p22456s789m4"), None, &ctx).unwrap();
        assert_eq!(win.fu, Some(20));
        assert_eq!(win.han, Some(2));
        assert!(names(&win).contains(&"平和"));
        assert!(names(&win).contains(&"門前清自摸和"));
        // non-dealer tsumo 20fu 2han: 700 from the dealer, 400 from each
        assert_eq!(win.deltas, [-700, -400, 1500, -400]);
        assert_eq!(win.points, 1500);
    }

    #[test]
    fn menzen_ron_gets_ten_fu() {
        let rule = Ruleset::default();
        let ctx = WinContext::plain(&rule);
        // same shape by ron: 30 fu, pinfu only
        let win = score_win(
            &hand("m23567p22456s789"),
            Some((tile("m4"), Dir::Kamicha)),
            &ctx,
        )
        .unwrap();
        assert_eq!(win.fu, Some(30));
        assert_eq!(win.han, Some(1));
        // dealer ron 30fu 1han = 1500
        assert_eq!(win.points, 1500);
    }

    #[test]
    fn chiitoi_is_fixed_25_fu() {
        let rule = Ruleset::default();
        let ctx = WinContext::plain(&rule);
        let win = score_win(
            &hand("m1122p3344s556z77"),
            Some((tile("s6"), Dir::Toimen)),
            &ctx,
        )
        .unwrap();
        assert_eq!(win.fu, Some(25));
        assert!(names(&win).contains(&"七対子"));
    }

    #[test]
    fn no_yaku_is_not_a_win() {
        let rule = Ruleset::default();
        let ctx = WinContext::plain(&rule);
        // open hand, no yakuhai, not tanyao: nothing
        let win = score_win(
            &hand("m23p456s789z33,m567-"),
            Some((tile("m1"), Dir::Kamicha)),
            &ctx,
        );
        assert!(win.is_none());
        // a closed shape with no structural yaku wins only under riichi
        let closed = hand("m23p22456s789z333");
        let ron = Some((tile("m1"), Dir::Kamicha));
        assert!(score_win(&closed, ron, &WinContext::plain(&rule)).is_none());
        let ctx = WinContext {
            riichi: 1,
            ..WinContext::plain(&rule)
        };
        assert!(score_win(&closed, ron, &ctx).is_some());
    }

    #[test]
    fn kuitan_gate() {
        let open_tanyao = hand("m234p45688s33,m567-");
        let ron = Some((tile("s3"), Dir::Kamicha));
        let rule = Ruleset::default();
        let win = score_win(&open_tanyao, ron, &WinContext::plain(&rule)).unwrap();
        assert!(names(&win).contains(&"断幺九"));
        let rule = Ruleset {
            kuitan: false,
            ..Ruleset::default()
        };
        assert!(score_win(&open_tanyao, ron, &WinContext::plain(&rule)).is_none());
    }

    #[test]
    fn dora_counts_all_copies() {
        let rule = Ruleset::default();
        let ctx = WinContext {
            seat_wind: 1,
            dora_indicators: vec![tile("m1")], // dora is m2
            ..WinContext::plain(&rule)
        };
        let win = score_win(&hand("m22334455p67s678p8"), None, &ctx).unwrap();
        let dora = win
            .yaku
            .iter()
            .find(|h| h.yaku == Yaku::Dora)
            .expect("dora counted");
        assert_eq!(dora.value, YakuValue::Han(2));
    }

    #[test]
    fn riichi_enables_ura() {
        let rule = Ruleset::default();
        let ctx = WinContext {
            riichi: 1,
            ippatsu: true,
            ura_indicators: Some(vec![tile("z1")]), // ura dora is z2
            ..WinContext::plain(&rule)
        };
        let win = score_win(&hand("m123p456s789z22233"), None, &ctx).unwrap();
        assert!(names(&win).contains(&"裏ドラ"));
        assert!(names(&win).contains(&"立直"));
        assert!(names(&win).contains(&"一発"));
    }

    #[test]
    fn daisangen_with_pao() {
        let rule = Ruleset::default();
        let ctx = WinContext {
            seat_wind: 1,
            ..WinContext::plain(&rule)
        };
        let win = score_win(&hand("m123s22,z555+,z666=,z777-"), None, &ctx).unwrap();
        assert_eq!(win.yakuman, 1);
        assert_eq!(win.pao, Some(Dir::Kamicha));
        // the liable seat (kamicha of south = dealer) pays everything
        assert_eq!(win.deltas, [-32000, 32000, 0, 0]);
        // liability also attaches when the completing call joins two
        // concealed dragon triplets; the feeder here is a non-dealer,
        // so the dealer keeps paying the full dealer half
        let win = score_win(&hand("m123s2z555666s2,z777+"), None, &ctx).unwrap();
        assert_eq!(win.yakuman, 1);
        assert_eq!(win.pao, Some(Dir::Shimocha));
        assert_eq!(win.deltas, [-16000, 32000, -16000, 0]);
        // without pao the cost spreads
        let rule = Ruleset {
            yakuman_pao: false,
            ..Ruleset::default()
        };
        let ctx = WinContext {
            seat_wind: 1,
            ..WinContext::plain(&rule)
        };
        let win = score_win(&hand("m123s22,z555+,z666=,z777-"), None, &ctx).unwrap();
        assert_eq!(win.pao, None);
        assert_eq!(win.deltas, [-16000, 32000, -8000, -8000]);
    }

    #[test]
    fn double_yakuman_and_composition() {
        let rule = Ruleset::default();
        let ctx = WinContext::plain(&rule);
        // kokushi 13-wait doubles
        let win = score_win(
            &hand("m19p19s19z1234567"),
            Some((tile("z7"), Dir::Toimen)),
            &ctx,
        )
        .unwrap();
        assert_eq!(win.yakuman, 2);
        let rule = Ruleset {
            double_yakuman: false,
            ..Ruleset::default()
        };
        let win = score_win(
            &hand("m19p19s19z1234567"),
            Some((tile("z7"), Dir::Toimen)),
            &WinContext::plain(&rule),
        )
        .unwrap();
        assert_eq!(win.yakuman, 1);
    }

    #[test]
    fn nine_gates_classification() {
        let rule = Ruleset::default();
        let ctx = WinContext::plain(&rule);
        let win = score_win(
            &hand("m1112345678999"),
            Some((tile("m9"), Dir::Shimocha)),
            &ctx,
        )
        .unwrap();
        assert_eq!(win.yakuman, 2);
        assert!(names(&win).contains(&"純正九蓮宝燈"));
        let rule = Ruleset {
            double_yakuman: false,
            ..Ruleset::default()
        };
        let win = score_win(
            &hand("m1112345678999"),
            Some((tile("m9"), Dir::Shimocha)),
            &WinContext::plain(&rule),
        )
        .unwrap();
        assert_eq!(win.yakuman, 1);
    }

    #[test]
    fn counted_yakuman_and_caps() {
        let rule = Ruleset::default();
        assert_eq!(base_points(13, 30, &rule), 8000);
        assert_eq!(base_points(12, 30, &rule), 6000);
        assert_eq!(base_points(8, 30, &rule), 4000);
        assert_eq!(base_points(6, 30, &rule), 3000);
        assert_eq!(base_points(5, 30, &rule), 2000);
        assert_eq!(base_points(4, 30, &rule), 1920);
        assert_eq!(base_points(3, 60, &rule), 1920);
        let rule = Ruleset {
            counted_yakuman: false,
            round_up_mangan: true,
            ..Ruleset::default()
        };
        assert_eq!(base_points(13, 30, &rule), 6000);
        assert_eq!(base_points(4, 30, &rule), 2000);
        assert_eq!(base_points(3, 60, &rule), 2000);
    }

    #[test]
    fn honba_and_sticks() {
        let rule = Ruleset::default();
        let ctx = WinContext {
            honba: 2,
            riichi_sticks: 1,
            riichi: 1,
            ..WinContext::plain(&rule)
        };
        let win = score_win(&hand("m123p456s789z22233"), None, &ctx).unwrap();
        let sum: Points = win.deltas.iter().sum();
        // the riichi stick came from outside this hand's deltas
        assert_eq!(sum, 1000);
        // every payer paid 100 per honba
        assert!(win.deltas[1] < 0 && win.deltas[2] < 0 && win.deltas[3] < 0);
    }

    #[test]
    fn best_decomposition_wins() {
        // 22334455 reads as two iipeikou pairs or as shanpon-ish sets;
        // the scorer must pick the higher value
        let rule = Ruleset::default();
        let ctx = WinContext::plain(&rule);
        let win = score_win(
            &hand("m223344p567s567z3"),
            Some((tile("z3"), Dir::Toimen)),
            &ctx,
        )
        .unwrap();
        assert!(names(&win).contains(&"一盃口"));
    }
}
