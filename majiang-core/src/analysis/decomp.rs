//! Winning-hand decomposition 和了形.
//!
//! Every legal reading of a completed 14-tile configuration, with the
//! winning tile placed into each group it can complete. The scorer walks
//! these and keeps the most valuable one.

use itertools::Itertools;

use majiang_elements::prelude::*;

use crate::hand::Hand;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GroupKind {
    Run,
    Triplet,
    Quad,
}

/// One completed group of a regular win.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Group {
    pub kind: GroupKind,
    /// Normalized representative tile (the lowest for a run).
    pub tile: Tile,
    /// Feeder direction of a claimed meld.
    pub claimed: Option<Dir>,
    /// Counts as concealed for fu and suuankou/sanankou. A triplet
    /// completed by ron does not.
    pub concealed: bool,
    /// Offset of the winning tile inside the group (0..=2 for runs).
    pub win: Option<u8>,
}

/// A four-groups-one-pair win.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegularWin {
    pub pair: Tile,
    /// The winning tile completes the pair (tanki).
    pub pair_is_win: bool,
    /// Exactly four groups, concealed ones first, then the called melds
    /// in call order.
    pub groups: Vec<Group>,
}

impl RegularWin {
    /// Wait-shape fu: tanki, kanchan, and penchan waits score 2.
    pub fn wait_fu(&self) -> u8 {
        if self.pair_is_win {
            return 2;
        }
        for g in &self.groups {
            if g.kind != GroupKind::Run {
                continue;
            }
            match g.win {
                Some(1) => return 2,                                      // kanchan
                Some(2) if g.tile.normal_num() == 1 => return 2,          // penchan 12_3
                Some(0) if g.tile.normal_num() == 7 => return 2,          // penchan 7_89
                _ => {}
            }
        }
        0
    }
}

/// One reading of a completed hand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WinForm {
    Regular(RegularWin),
    SevenPairs { pairs: Vec<Tile>, win: Tile },
    ThirteenOrphans { thirteen_wait: bool },
    NineGates { nine_wait: bool },
}

/// Enumerate every decomposition of the hand completed by its draw (or by
/// the given ron tile). Empty when the configuration is not a win.
pub fn win_forms(hand: &Hand, ron: Option<Tile>) -> Vec<WinForm> {
    let mut completed = hand.clone();
    let win_tile = match ron {
        Some(t) => {
            if completed.draw(Some(t), false).is_err() {
                return vec![];
            }
            t
        }
        None => match completed.drawn() {
            Some(t) => t,
            None => return vec![],
        },
    };
    let counts = *completed.counts();
    let w = win_tile.normalized();
    let mut out = vec![];
    regular_forms(&counts, completed.melds(), w, ron.is_some(), &mut out);
    if completed.melds().is_empty() {
        seven_pairs_form(&counts, w, &mut out);
        thirteen_orphans_form(&counts, w, &mut out);
        nine_gates_form(&counts, w, &mut out);
    }
    out
}

fn group_from_meld(meld: &Meld) -> Group {
    Group {
        kind: match meld.kind() {
            MeldKind::Chi => GroupKind::Run,
            MeldKind::Pon => GroupKind::Triplet,
            _ => GroupKind::Quad,
        },
        tile: meld.tile(),
        claimed: meld.dir(),
        concealed: meld.kind() == MeldKind::Ankan,
        win: None,
    }
}

/// All run/triplet splits of one suit's counts; an empty list means the
/// suit cannot be fully decomposed.
fn suit_splits(counts: &mut [u8; 10], honors: bool, n: usize) -> Vec<Vec<(GroupKind, u8)>> {
    let top = if honors { 7 } else { 9 };
    if n > top {
        return vec![vec![]];
    }
    if counts[n] == 0 {
        return suit_splits(counts, honors, n + 1);
    }
    let mut out = vec![];
    if !honors && n + 2 <= 9 && counts[n + 1] > 0 && counts[n + 2] > 0 {
        counts[n] -= 1;
        counts[n + 1] -= 1;
        counts[n + 2] -= 1;
        for mut rest in suit_splits(counts, honors, n) {
            rest.insert(0, (GroupKind::Run, n as u8));
            out.push(rest);
        }
        counts[n] += 1;
        counts[n + 1] += 1;
        counts[n + 2] += 1;
    }
    if counts[n] == 3 {
        counts[n] = 0;
        for mut rest in suit_splits(counts, honors, n + 1) {
            rest.insert(0, (GroupKind::Triplet, n as u8));
            out.push(rest);
        }
        counts[n] = 3;
    }
    out
}

fn regular_forms(
    counts: &[[u8; 10]; 4],
    melds: &[Meld],
    w: Tile,
    ron: bool,
    out: &mut Vec<WinForm>,
) {
    let meld_groups: Vec<Group> = melds.iter().map(group_from_meld).collect();
    for ps in 0..4usize {
        let top = if ps == 3 { 7 } else { 9 };
        for pn in 1..=top {
            if counts[ps][pn] < 2 {
                continue;
            }
            let mut rest = *counts;
            rest[ps][pn] -= 2;
            let pair = Tile::from_suit_num(ps as u8, pn as u8).unwrap();

            let suit_lists: Vec<Vec<Vec<(GroupKind, u8)>>> = (0..4)
                .map(|s| suit_splits(&mut rest[s], s == 3, 1))
                .collect();
            for combo in suit_lists
                .iter()
                .enumerate()
                .map(|(s, list)| list.iter().map(move |split| (s, split)))
                .multi_cartesian_product()
            {
                let concealed: Vec<Group> = combo
                    .iter()
                    .flat_map(|&(s, split)| {
                        split.iter().map(move |&(kind, low)| Group {
                            kind,
                            tile: Tile::from_suit_num(s as u8, low).unwrap(),
                            claimed: None,
                            concealed: true,
                            win: None,
                        })
                    })
                    .collect();
                if concealed.len() + meld_groups.len() != 4 {
                    continue;
                }
                push_placements(&concealed, &meld_groups, pair, w, ron, out);
            }
        }
    }
}

/// Emit one form per distinct spot the winning tile can occupy.
fn push_placements(
    concealed: &[Group],
    meld_groups: &[Group],
    pair: Tile,
    w: Tile,
    ron: bool,
    out: &mut Vec<WinForm>,
) {
    let assemble = |pair_is_win: bool, win_spot: Option<usize>| {
        let mut groups = concealed.to_vec();
        if let Some(i) = win_spot {
            let off = w.normal_num() - groups[i].tile.normal_num();
            groups[i].win = Some(off);
            if groups[i].kind == GroupKind::Triplet && ron {
                groups[i].concealed = false;
            }
        }
        groups.extend_from_slice(meld_groups);
        WinForm::Regular(RegularWin {
            pair,
            pair_is_win,
            groups,
        })
    };

    if pair == w {
        out.push(assemble(true, None));
    }
    let mut seen: Vec<(GroupKind, Tile)> = vec![];
    for (i, g) in concealed.iter().enumerate() {
        let contains = match g.kind {
            GroupKind::Run => {
                g.tile.suit() == w.suit()
                    && (g.tile.normal_num()..=g.tile.normal_num() + 2)
                        .contains(&w.normal_num())
            }
            _ => g.tile == w,
        };
        if contains && !seen.contains(&(g.kind, g.tile)) {
            seen.push((g.kind, g.tile));
            out.push(assemble(false, Some(i)));
        }
    }
}

fn seven_pairs_form(counts: &[[u8; 10]; 4], w: Tile, out: &mut Vec<WinForm>) {
    let mut pairs = vec![];
    for s in 0..4usize {
        let top = if s == 3 { 7 } else { 9 };
        for n in 1..=top {
            match counts[s][n] {
                0 => {}
                2 => pairs.push(Tile::from_suit_num(s as u8, n as u8).unwrap()),
                _ => return,
            }
        }
    }
    if pairs.len() == 7 {
        out.push(WinForm::SevenPairs { pairs, win: w });
    }
}

fn thirteen_orphans_form(counts: &[[u8; 10]; 4], w: Tile, out: &mut Vec<WinForm>) {
    let mut pair_kinds = 0;
    for s in 0..4usize {
        let top = if s == 3 { 7 } else { 9 };
        for n in 1..=top {
            let c = counts[s][n];
            let orphan = s == 3 || n == 1 || n == 9;
            match (orphan, c) {
                (_, 0) => {
                    if orphan {
                        return;
                    }
                }
                (false, _) => return,
                (true, 1) => {}
                (true, 2) => pair_kinds += 1,
                (true, _) => return,
            }
        }
    }
    if pair_kinds == 1 {
        let thirteen_wait = counts[w.suit() as usize][w.normal_num() as usize] == 2;
        out.push(WinForm::ThirteenOrphans { thirteen_wait });
    }
}

fn nine_gates_form(counts: &[[u8; 10]; 4], w: Tile, out: &mut Vec<WinForm>) {
    let ws = w.suit() as usize;
    if ws == 3 {
        return;
    }
    for s in 0..4usize {
        if s == ws {
            continue;
        }
        let top = if s == 3 { 7 } else { 9 };
        if (1..=top).any(|n| counts[s][n] > 0) {
            return;
        }
    }
    let mut extra = None;
    for n in 1..=9usize {
        let base = if n == 1 || n == 9 { 3 } else { 1 };
        match counts[ws][n] {
            c if c == base => {}
            c if c == base + 1 && extra.is_none() => extra = Some(n as u8),
            _ => return,
        }
    }
    if extra.is_some() {
        out.push(WinForm::NineGates {
            nine_wait: extra == Some(w.normal_num()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(s: &str) -> Hand {
        s.parse().unwrap()
    }
    fn tile(s: &str) -> Tile {
        s.parse().unwrap()
    }

    #[test]
    fn simple_tsumo_decomposition() {
        let forms = win_forms(&hand("m123p456s789z11222"), None);
        assert_eq!(forms.len(), 1);
        match &forms[0] {
            WinForm::Regular(win) => {
                assert_eq!(win.pair, tile("z1"));
                assert!(!win.pair_is_win);
                let z2 = win.groups.iter().find(|g| g.tile == tile("z2")).unwrap();
                assert_eq!(z2.kind, GroupKind::Triplet);
                assert!(z2.concealed); // tsumo keeps it an ankou
                assert_eq!(z2.win, Some(0));
            }
            other => panic!("unexpected form {other:?}"),
        }
    }

    #[test]
    fn ron_opens_the_completed_triplet() {
        let forms = win_forms(&hand("m123p456s789z1122"), Some(tile("z2")));
        assert_eq!(forms.len(), 1);
        match &forms[0] {
            WinForm::Regular(win) => {
                let z2 = win.groups.iter().find(|g| g.tile == tile("z2")).unwrap();
                assert!(!z2.concealed);
            }
            other => panic!("unexpected form {other:?}"),
        }
    }

    #[test]
    fn non_winning_hands_have_no_forms() {
        assert!(win_forms(&hand("m123p456s789z1122"), Some(tile("z3"))).is_empty());
        assert!(win_forms(&hand("m123p456s789z1122"), None).is_empty()); // no draw
    }

    #[test]
    fn multiple_readings_of_one_hand() {
        // 111 222 333 can read as triplets or as three identical runs
        let forms = win_forms(&hand("m111222333p99s789"), None);
        assert!(forms.len() >= 2);
        let has_triplet_reading = forms.iter().any(|f| match f {
            WinForm::Regular(win) => win
                .groups
                .iter()
                .filter(|g| g.kind == GroupKind::Triplet)
                .count() == 3,
            _ => false,
        });
        let has_run_reading = forms.iter().any(|f| match f {
            WinForm::Regular(win) => win
                .groups
                .iter()
                .filter(|g| g.kind == GroupKind::Run)
                .count() == 4,
            _ => false,
        });
        assert!(has_triplet_reading && has_run_reading);
    }

    #[test]
    fn wait_shapes_carry_fu() {
        // kanchan: 1_3
        let forms = win_forms(&hand("m13p456s789z11777"), Some(tile("m2")));
        let WinForm::Regular(win) = &forms[0] else { panic!() };
        assert_eq!(win.wait_fu(), 2);
        // penchan: 12 waiting 3
        let forms = win_forms(&hand("m12p456s789z11777"), Some(tile("m3")));
        assert!(forms.iter().any(|f| match f {
            WinForm::Regular(w) => w.wait_fu() == 2,
            _ => false,
        }));
        // ryanmen: 45 waiting 3/6
        let forms = win_forms(&hand("m45p456s789z11777"), Some(tile("m3")));
        let WinForm::Regular(win) = &forms[0] else { panic!() };
        assert_eq!(win.wait_fu(), 0);
        // tanki
        let forms = win_forms(&hand("m123p456s789z2777"), Some(tile("z2")));
        let WinForm::Regular(win) = &forms[0] else { panic!() };
        assert!(win.pair_is_win);
        assert_eq!(win.wait_fu(), 2);
    }

    #[test]
    fn called_melds_join_the_groups() {
        let forms = win_forms(&hand("m123z11222,p555+,s789-"), None);
        assert!(!forms.is_empty());
        let WinForm::Regular(win) = &forms[0] else { panic!() };
        assert_eq!(win.groups.len(), 4);
        let called: Vec<_> = win.groups.iter().filter(|g| g.claimed.is_some()).collect();
        assert_eq!(called.len(), 2);
    }

    #[test]
    fn seven_pairs_and_orphans() {
        let forms = win_forms(&hand("m1122p3344s5566z77"), None);
        assert!(forms
            .iter()
            .any(|f| matches!(f, WinForm::SevenPairs { .. })));
        // four of a kind never reads as two pairs
        assert!(win_forms(&hand("m1111p3344s5566z77"), None).is_empty());

        let forms = win_forms(&hand("m19p19s19z1234567"), Some(tile("m1")));
        assert_eq!(forms, vec![WinForm::ThirteenOrphans { thirteen_wait: true }]);
        let forms = win_forms(&hand("m119p19s19z123456"), Some(tile("z7")));
        assert_eq!(
            forms,
            vec![WinForm::ThirteenOrphans { thirteen_wait: false }]
        );
    }

    #[test]
    fn nine_gates_detection() {
        let forms = win_forms(&hand("m1112345678999"), Some(tile("m9")));
        assert!(forms
            .iter()
            .any(|f| matches!(f, WinForm::NineGates { nine_wait: true })));
        assert!(forms
            .iter()
            .any(|f| matches!(f, WinForm::Regular(_))));
        // impure: the 13 tiles were not the exact nine-gates shape
        let forms = win_forms(&hand("m1112345678899"), Some(tile("m9")));
        assert!(forms
            .iter()
            .any(|f| matches!(f, WinForm::NineGates { nine_wait: false })));
    }
}
