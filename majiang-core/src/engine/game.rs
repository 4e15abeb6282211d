//! [`Game`]: the deterministic four-player round driver.
//!
//! ```text
//! Kaiju ── deal ──▶ Qipai ── auto ──▶ Zimo
//! Zimo  ── reply ─▶ { Dapai, Gang, Hule(tsumo), Pingju(nine terminals) }
//! Dapai ── claims ▶ { Hule(ron), Pingju(abortive), Zimo, Fulou }
//! Fulou ── reply ─▶ Dapai | Gangzimo (daiminkan)
//! Gang  ── claims ▶ Hule(chankan) | Gangzimo
//! Hule / Pingju ──▶ Last ──▶ Qipai | Jieju
//! ```
//!
//! Every state entry broadcasts one event to the four agents (masked per
//! seat) and consumes only the replies relevant to that state; an
//! invalid or missing reply falls back to the state's default. One
//! `step()` performs exactly one state, so a driver may pace, pause, and
//! resume the machine without touching its logic.

use log::{debug, error, trace};
use rand::{Rng, RngCore};

use majiang_elements::prelude::*;

use crate::agent::Agent;
use crate::analysis::{shanten, waits, win_forms};
use crate::errors::{Error, Result};
use crate::hand::{DiscardOption, Hand, Incoming};
use crate::model::{DrawKind, Event, Record, Reply};
use crate::river::{Discard, River};
use crate::rules::Ruleset;
use crate::scoring::{score_win, WinContext};
use crate::wall::{Wall, WallInterface};

/// The state machine's current state. `Kaiju` is initial, `Done` means
/// the `jieju` event has been emitted.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Kaiju,
    Qipai,
    Zimo,
    Gangzimo,
    Dapai { discard: Discard },
    Fulou { seat: Seat, meld: Meld },
    Gang { meld: Meld },
    Hule,
    Pingju(DrawKind),
    Last,
    Jieju,
    Done,
}

pub struct Game {
    rule: Ruleset,
    agents: [Box<dyn Agent>; 4],
    rng: Box<dyn RngCore>,

    // match state
    names: [String; 4],
    qijia: Seat,
    round_wind: u8,
    hand_no: u8,
    honba: u8,
    sticks: u32,
    points: [Points; 4],
    /// Index (round_wind * 4 + hand_no) of the scheduled all-last hand.
    max_hand_index: u8,
    extended: bool,

    // round state
    wall: Option<Wall>,
    hands: [Hand; 4],
    rivers: [River; 4],
    riichi: [u8; 4],
    ippatsu: [bool; 4],
    can_ron: [bool; 4],
    kans: [u8; 4],
    turn: Seat,
    turn_count: u32,
    first_round: bool,
    all_winds: bool,
    first_wind: Option<Tile>,
    ron_tile: Option<Tile>,
    /// A kan whose dora reveal is deferred to the next discard or kan.
    deferred_reveal: bool,
    /// The kan just declared, consumed by the rinshan draw.
    current_kan: Option<Meld>,
    chankan: bool,
    rinshan: bool,
    winners: Vec<Seat>,
    stakes_paid: bool,
    dealer_keeps: bool,
    round_was_draw: bool,
    daopai: [bool; 4],

    phase: Phase,
    paused: bool,
    record: Record,
    round_events: Vec<Event>,
}

impl Game {
    pub fn new(agents: [Box<dyn Agent>; 4], rule: Ruleset, rng: impl RngCore + 'static) -> Self {
        let origin = rule.origin_points;
        Self {
            rule,
            agents,
            rng: Box::new(rng),
            names: std::array::from_fn(|i| format!("player{i}")),
            qijia: Seat::new(0),
            round_wind: 0,
            hand_no: 0,
            honba: 0,
            sticks: 0,
            points: [origin; 4],
            max_hand_index: 0,
            extended: false,
            wall: None,
            hands: Default::default(),
            rivers: Default::default(),
            riichi: [0; 4],
            ippatsu: [false; 4],
            can_ron: [true; 4],
            kans: [0; 4],
            turn: Seat::new(0),
            turn_count: 0,
            first_round: true,
            all_winds: true,
            first_wind: None,
            ron_tile: None,
            deferred_reveal: false,
            current_kan: None,
            chankan: false,
            rinshan: false,
            winners: vec![],
            stakes_paid: false,
            dealer_keeps: false,
            round_was_draw: false,
            daopai: [false; 4],
            phase: Phase::Kaiju,
            paused: false,
            record: Record::default(),
            round_events: vec![],
        }
    }

    pub fn set_names(&mut self, names: [String; 4]) {
        self.names = names;
    }
    pub fn phase(&self) -> &Phase {
        &self.phase
    }
    pub fn points(&self) -> [Points; 4] {
        self.points
    }
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Skip the next scheduled advance until [`Self::resume`].
    pub fn stop(&mut self) {
        self.paused = true;
    }
    pub fn resume(&mut self) {
        self.paused = false;
    }
    pub fn is_stopped(&self) -> bool {
        self.paused
    }

    /// Advance exactly one state. Returns `false` once the game is over.
    pub fn step(&mut self) -> bool {
        if matches!(self.phase, Phase::Done) {
            return false;
        }
        if self.paused {
            return true;
        }
        let phase = std::mem::replace(&mut self.phase, Phase::Done);
        trace!("phase {phase:?}");
        let result = match phase {
            Phase::Kaiju => self.kaiju(),
            Phase::Qipai => self.qipai(),
            Phase::Zimo => self.zimo(),
            Phase::Gangzimo => self.gangzimo(),
            Phase::Dapai { discard } => self.dapai(discard),
            Phase::Fulou { seat, meld } => self.fulou(seat, meld),
            Phase::Gang { meld } => self.gang(meld),
            Phase::Hule => self.hule(),
            Phase::Pingju(kind) => self.pingju(kind),
            Phase::Last => self.last(),
            Phase::Jieju => self.jieju(),
            Phase::Done => Ok(()),
        };
        if let Err(e) = result {
            // an internal invariant broke; the round cannot continue
            error!("fatal: {e}");
            self.phase = Phase::Done;
        }
        !matches!(self.phase, Phase::Done)
    }

    /// Drive the game to completion.
    pub fn run(&mut self) {
        while self.step() {}
    }

    // ---- helpers ----------------------------------------------------

    fn dealer(&self) -> Seat {
        self.qijia.add(self.hand_no)
    }
    fn seat_wind(&self, seat: Seat) -> u8 {
        seat.sub(self.dealer()).to_u8()
    }
    fn wall_ref(&self) -> Result<&Wall> {
        self.wall
            .as_ref()
            .ok_or_else(|| Error::invariant("no wall in play"))
    }
    fn wall_mut(&mut self) -> Result<&mut Wall> {
        self.wall
            .as_mut()
            .ok_or_else(|| Error::invariant("no wall in play"))
    }
    fn total_kans(&self) -> u8 {
        self.kans.iter().sum()
    }

    /// Broadcast a round event: record it, send the per-seat masked view
    /// to every agent, and collect the replies.
    fn broadcast(&mut self, event: Event) -> [Reply; 4] {
        self.round_events.push(event.clone());
        std::array::from_fn(|i| self.agents[i].act(&event.masked_for(Seat::new(i as u8))))
    }

    fn win_context(&self, seat: Seat, ron: bool) -> Result<WinContext<'_>> {
        let wall = self.wall_ref()?;
        let blessing = if !ron && self.first_round && self.rivers[seat.to_usize()].is_empty() {
            if seat == self.dealer() {
                1
            } else {
                2
            }
        } else {
            0
        };
        Ok(WinContext {
            rule: &self.rule,
            round_wind: self.round_wind,
            seat_wind: self.seat_wind(seat),
            riichi: self.riichi[seat.to_usize()],
            ippatsu: self.ippatsu[seat.to_usize()],
            chankan: ron && self.chankan,
            rinshan: !ron && self.rinshan,
            last_tile: if wall.live_count() == 0 {
                if ron {
                    2
                } else {
                    1
                }
            } else {
                0
            },
            blessing,
            dora_indicators: wall.dora_indicators(),
            ura_indicators: wall.ura_indicators(),
            honba: if self.stakes_paid { 0 } else { self.honba },
            riichi_sticks: if self.stakes_paid { 0 } else { self.sticks },
        })
    }

    fn allow_tsumo(&self, seat: Seat) -> bool {
        match self.win_context(seat, false) {
            Ok(ctx) => score_win(&self.hands[seat.to_usize()], None, &ctx).is_some(),
            Err(_) => false,
        }
    }

    fn allow_ron(&self, seat: Seat, tile: Tile) -> bool {
        if !self.can_ron[seat.to_usize()] {
            return false;
        }
        let Ok(dir) = Dir::between(seat, self.turn) else {
            return false;
        };
        match self.win_context(seat, true) {
            Ok(ctx) => score_win(&self.hands[seat.to_usize()], Some((tile, dir)), &ctx).is_some(),
            Err(_) => false,
        }
    }

    /// Would this tile complete the seat's hand, yaku aside? Used for
    /// the missed-ron furiten.
    fn completes_shape(&self, seat: Seat, tile: Tile) -> bool {
        let mut probe = self.hands[seat.to_usize()].clone();
        probe.draw(Some(tile), false).is_ok() && shanten(&probe) == -1
    }

    fn allow_kyuushu(&self, seat: Seat) -> bool {
        if !self.rule.interrupted_draws || !self.first_round {
            return false;
        }
        let counts = self.hands[seat.to_usize()].counts();
        let mut kinds = 0;
        for s in 0..4usize {
            let nums: &[usize] = if s == 3 { &[1, 2, 3, 4, 5, 6, 7] } else { &[1, 9] };
            kinds += nums.iter().filter(|&&n| counts[s][n] > 0).count();
        }
        kinds >= 9
    }

    fn allow_riichi(&self, seat: Seat, tile: Tile) -> bool {
        let hand = &self.hands[seat.to_usize()];
        if !hand.is_menzen() || hand.is_riichi() {
            return false;
        }
        if !self.rule.riichi_without_tsumo
            && self.wall_ref().map_or(0, |w| w.live_count()) < 4
        {
            return false;
        }
        if self.rule.bust_ends_game && self.points[seat.to_usize()] < 1000 {
            return false;
        }
        let mut probe = hand.clone();
        if probe.discard(tile, false, false).is_err() {
            return false;
        }
        shanten(&probe) == 0 && waits(&probe).map_or(false, |w| !w.is_empty())
    }

    /// Legal discards with the configured swap-call tolerance applied.
    fn legal_discards_for(&self, seat: Seat) -> Vec<DiscardOption> {
        let hand = &self.hands[seat.to_usize()];
        let opts = match self.rule.kuikae_level {
            0 => hand.legal_discards(true),
            _ => hand.legal_discards(false),
        };
        let mut opts = opts.unwrap_or_default();
        if self.rule.kuikae_level == 1 {
            if let (Some(Incoming::Claim), Some(meld)) = (hand.incoming(), hand.melds().last()) {
                if let Some(claimed) = meld.claimed_tile() {
                    opts.retain(|o| o.tile.normalized() != claimed.normalized());
                }
            }
        }
        opts
    }

    fn legal_chi_for(&self, seat: Seat, tile: Tile) -> Vec<Meld> {
        let strict = self.rule.kuikae_level == 0;
        let mut melds = self.hands[seat.to_usize()]
            .legal_chi(tile, Dir::Kamicha, strict)
            .unwrap_or_default();
        if self.rule.kuikae_level == 1 {
            // the call must leave something besides the claimed tile
            melds.retain(|m| {
                let mut probe = self.hands[seat.to_usize()].clone();
                probe.call(m, false).is_ok()
                    && probe
                        .legal_discards(false)
                        .unwrap_or_default()
                        .iter()
                        .any(|o| o.tile.normalized() != tile.normalized())
            });
        }
        melds
    }

    /// Total number of winning decompositions over all waits; the
    /// post-riichi ankan checks compare this before and after the kan.
    fn win_form_count(hand: &Hand) -> usize {
        waits(hand).map_or(0, |ws| {
            ws.iter().map(|&w| win_forms(hand, Some(w)).len()).sum()
        })
    }

    /// Ankan/kakan candidates on the seat's own turn, wall capacity and
    /// the post-riichi restriction level applied.
    fn legal_own_kans(&self, seat: Seat) -> Vec<Meld> {
        let wall_ok = self
            .wall_ref()
            .map_or(false, |w| w.live_count() > 0);
        if !wall_ok || self.total_kans() >= 4 {
            return vec![];
        }
        let hand = &self.hands[seat.to_usize()];
        let melds = hand.legal_kan(None).unwrap_or_default();
        if melds.is_empty() || !hand.is_riichi() {
            return melds;
        }
        match self.rule.ankan_after_riichi_level {
            0 => vec![],
            1 => {
                // the winning decompositions must survive unchanged
                let mut flat = hand.clone();
                let Some(drawn) = hand.drawn() else { return vec![] };
                if flat.discard(drawn, false, false).is_err() {
                    return vec![];
                }
                let before = Self::win_form_count(&flat);
                let mut kanned = hand.clone();
                if kanned.kan(&melds[0], false).is_err() {
                    return vec![];
                }
                if before > Self::win_form_count(&kanned) {
                    vec![]
                } else {
                    melds
                }
            }
            _ => {
                // must stay tenpai on the same waiting set
                let mut flat = hand.clone();
                let Some(drawn) = hand.drawn() else { return vec![] };
                if flat.discard(drawn, false, false).is_err() {
                    return vec![];
                }
                let before = waits(&flat).unwrap_or_default().len();
                let mut kanned = hand.clone();
                if kanned.kan(&melds[0], false).is_err() {
                    return vec![];
                }
                if shanten(&kanned) != 0 || waits(&kanned).unwrap_or_default().len() < before {
                    vec![]
                } else {
                    melds
                }
            }
        }
    }

    fn reveal_kan_dora(&mut self) -> Result<()> {
        if !self.wall_ref()?.kan_pending() {
            return Ok(());
        }
        let dora = self.wall_mut()?.reveal_kan_dora()?;
        self.broadcast(Event::Kaigang { dora });
        Ok(())
    }

    // ---- states -----------------------------------------------------

    fn kaiju(&mut self) -> Result<()> {
        self.qijia = Seat::new((self.rng.gen::<f64>() * 4.0) as u8);
        self.max_hand_index = match self.rule.game_count {
            0 => 0,
            n => n * 4 - 1,
        };
        self.record.names = self.names.clone();
        self.record.qijia = self.qijia;
        for seat in ALL_SEATS {
            let event = Event::Kaiju {
                id: seat,
                rule: Box::new(self.rule.clone()),
                names: self.names.clone(),
                qijia: self.qijia,
            };
            let _ = self.agents[seat.to_usize()].act(&event);
        }
        debug!("kaiju: qijia = {}", self.qijia);
        self.phase = Phase::Qipai;
        Ok(())
    }

    fn qipai(&mut self) -> Result<()> {
        let mut wall = Wall::new(&self.rule, &mut self.rng);
        let dealer = self.dealer();
        for seat in seats_from(dealer) {
            let mut tiles = Vec::with_capacity(13);
            for _ in 0..13 {
                tiles.push(wall.draw()?);
            }
            self.hands[seat.to_usize()] = Hand::from_tiles(&tiles)?;
        }
        self.rivers = Default::default();
        self.riichi = [0; 4];
        self.ippatsu = [false; 4];
        self.can_ron = [true; 4];
        self.kans = [0; 4];
        self.turn = dealer.pred();
        self.turn_count = 0;
        self.first_round = true;
        self.all_winds = self.rule.interrupted_draws;
        self.first_wind = None;
        self.ron_tile = None;
        self.deferred_reveal = false;
        self.current_kan = None;
        self.chankan = false;
        self.rinshan = false;
        self.winners.clear();
        self.stakes_paid = false;
        self.dealer_keeps = false;
        self.round_was_draw = false;
        self.daopai = [false; 4];

        let event = Event::Qipai {
            round_wind: self.round_wind,
            hand: self.hand_no,
            honba: self.honba,
            sticks: self.sticks,
            dora: wall.dora_indicators()[0],
            points: self.points,
            hands: std::array::from_fn(|i| self.hands[i].to_string()),
        };
        self.wall = Some(wall);
        debug!(
            "qipai: wind {} hand {} honba {}",
            self.round_wind, self.hand_no, self.honba
        );
        self.round_events = vec![];
        self.broadcast(event);
        self.phase = Phase::Zimo;
        Ok(())
    }

    fn zimo(&mut self) -> Result<()> {
        self.turn = self.turn.succ();
        self.turn_count += 1;
        if self.turn_count > 4 {
            self.first_round = false;
        }
        self.rinshan = false;
        let seat = self.turn;
        let tile = self.wall_mut()?.draw()?;
        self.hands[seat.to_usize()].draw(Some(tile), true)?;
        let replies = self.broadcast(Event::Zimo {
            seat,
            tile: Some(tile),
        });
        self.resolve_turn(replies[seat.to_usize()].clone(), false)
    }

    fn gangzimo(&mut self) -> Result<()> {
        let seat = self.turn;
        self.first_round = false;
        self.all_winds = false;
        self.ippatsu = [false; 4];
        self.kans[seat.to_usize()] += 1;
        let tile = self.wall_mut()?.kan_draw()?;
        self.hands[seat.to_usize()].draw(Some(tile), true)?;
        self.rinshan = true;
        let replies = self.broadcast(Event::Gangzimo {
            seat,
            tile: Some(tile),
        });
        let kan = self
            .current_kan
            .take()
            .ok_or_else(|| Error::invariant("rinshan draw without a kan"))?;
        if !self.rule.kan_dora_delayed || kan.kind() == MeldKind::Ankan {
            self.reveal_kan_dora()?;
        } else if self.wall_ref()?.kan_pending() {
            self.deferred_reveal = true;
        }
        self.resolve_turn(replies[seat.to_usize()].clone(), true)
    }

    /// Interpret the in-turn player's reply after a draw.
    fn resolve_turn(&mut self, reply: Reply, after_kan: bool) -> Result<()> {
        let seat = self.turn;
        let acted = !matches!(reply, Reply::None);
        match reply {
            Reply::Daopai if !after_kan && self.allow_kyuushu(seat) => {
                self.phase = Phase::Pingju(DrawKind::NineTerminals);
                return Ok(());
            }
            Reply::Hule if self.allow_tsumo(seat) => {
                self.winners.push(seat);
                self.phase = Phase::Hule;
                return Ok(());
            }
            Reply::Gang(meld) if self.legal_own_kans(seat).contains(&meld) => {
                self.phase = Phase::Gang { meld };
                return Ok(());
            }
            Reply::Dapai { tile, riichi } => {
                let legal = self
                    .legal_discards_for(seat)
                    .into_iter()
                    .find(|o| o.tile == tile);
                if let Some(option) = legal {
                    if !riichi || self.allow_riichi(seat, tile) {
                        self.phase = Phase::Dapai {
                            discard: Discard {
                                tile,
                                tsumogiri: option.tsumogiri
                                    && self.hands[seat.to_usize()].drawn() == Some(tile),
                                riichi,
                            },
                        };
                        return Ok(());
                    }
                }
            }
            _ => {}
        }
        if acted {
            // treated as "no reply"; the default below takes over
            debug!(
                "{}",
                Error::InvalidReply {
                    seat,
                    reason: "reply outside the legal-move set".into(),
                }
            );
        }
        // default: discard the draw face-up
        let fallback = match self.hands[seat.to_usize()].drawn() {
            Some(t) => Discard {
                tile: t,
                tsumogiri: true,
                riichi: false,
            },
            None => {
                let option = self
                    .legal_discards_for(seat)
                    .pop()
                    .ok_or_else(|| Error::invariant("no legal discard"))?;
                Discard {
                    tile: option.tile,
                    tsumogiri: false,
                    riichi: false,
                }
            }
        };
        self.phase = Phase::Dapai { discard: fallback };
        Ok(())
    }

    fn dapai(&mut self, discard: Discard) -> Result<()> {
        let seat = self.turn;
        self.ippatsu[seat.to_usize()] = false;
        if !self.hands[seat.to_usize()].is_riichi() {
            // a fresh discard clears the temporary furiten
            self.can_ron[seat.to_usize()] = true;
        }
        self.hands[seat.to_usize()].discard(discard.tile, discard.riichi, true)?;
        self.rivers[seat.to_usize()].push(discard);
        self.rinshan = false;
        self.chankan = false;
        if self.first_round {
            match self.first_wind {
                _ if !discard.tile.is_wind() => self.all_winds = false,
                None => self.first_wind = Some(discard.tile),
                Some(w) if w != discard.tile => self.all_winds = false,
                _ => {}
            }
        } else {
            self.all_winds = false;
        }
        // own-river furiten
        if let Some(w) = waits(&self.hands[seat.to_usize()]) {
            if w.iter().any(|&t| self.rivers[seat.to_usize()].contains(t)) {
                self.can_ron[seat.to_usize()] = false;
            }
        }
        self.ron_tile = Some(discard.tile);
        if self.deferred_reveal {
            self.deferred_reveal = false;
            self.reveal_kan_dora()?;
        }
        let replies = self.broadcast(Event::Dapai { seat, discard });

        // 1. ron claims, in turn order from the discarder
        self.daopai = [false; 4];
        let mut rons = vec![];
        for other in others_after(seat) {
            if matches!(replies[other.to_usize()], Reply::Hule)
                && self.allow_ron(other, discard.tile)
            {
                rons.push(other);
            } else if self.completes_shape(other, discard.tile) {
                self.can_ron[other.to_usize()] = false;
            }
            if matches!(replies[other.to_usize()], Reply::Daopai) {
                self.daopai[other.to_usize()] = true;
            }
        }
        if matches!(replies[seat.to_usize()], Reply::Daopai) {
            self.daopai[seat.to_usize()] = true;
        }
        if rons.len() == 3 && self.rule.max_simultaneous_win == 2 {
            self.phase = Phase::Pingju(DrawKind::ThreeRon);
            return Ok(());
        }
        if !rons.is_empty() {
            rons.truncate(self.rule.max_simultaneous_win as usize);
            self.winners = rons;
            self.phase = Phase::Hule;
            return Ok(());
        }

        // 2. the riichi declaration stands
        if discard.riichi {
            self.riichi[seat.to_usize()] = if self.first_round { 2 } else { 1 };
            self.ippatsu[seat.to_usize()] = self.rule.ippatsu;
            self.points[seat.to_usize()] -= 1000;
            self.sticks += 1;
            debug!("riichi: seat {seat}");
        }

        // 3. abortive draws
        if self.rule.interrupted_draws {
            if self.first_round && self.turn_count == 4 && self.all_winds {
                self.phase = Phase::Pingju(DrawKind::FourWinds);
                return Ok(());
            }
            if self.riichi.iter().all(|&r| r > 0) {
                self.phase = Phase::Pingju(DrawKind::FourRiichi);
                return Ok(());
            }
            if self.total_kans() == 4 && self.kans.iter().copied().max() != Some(4) {
                self.phase = Phase::Pingju(DrawKind::FourKans);
                return Ok(());
            }
        }

        // 4. meld claims: kan/pon over chi, chi only from the shimocha.
        // Nothing can be claimed off the final discard.
        if self.wall_ref()?.live_count() == 0 {
            self.phase = Phase::Pingju(DrawKind::Exhausted);
            return Ok(());
        }
        for other in others_after(seat) {
            let reply = replies[other.to_usize()].clone();
            let dir = Dir::between(other, seat)
                .map_err(|e| Error::invariant(e.to_string()))?;
            match reply {
                Reply::Gang(meld) => {
                    let legal = self.hands[other.to_usize()]
                        .legal_kan(Some((discard.tile, dir)))
                        .unwrap_or_default();
                    let wall_ok = self.wall_ref()?.live_count() > 0 && self.total_kans() < 4;
                    if wall_ok && legal.contains(&meld) {
                        self.phase = Phase::Fulou { seat: other, meld };
                        return Ok(());
                    }
                }
                Reply::Fulou(meld) if meld.kind() == MeldKind::Pon => {
                    let legal = self.hands[other.to_usize()]
                        .legal_pon(discard.tile, dir)
                        .unwrap_or_default();
                    if legal.contains(&meld) {
                        self.phase = Phase::Fulou { seat: other, meld };
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        let shimocha = seat.succ();
        if let Reply::Fulou(meld) = replies[shimocha.to_usize()].clone() {
            if meld.kind() == MeldKind::Chi
                && self.legal_chi_for(shimocha, discard.tile).contains(&meld)
            {
                self.phase = Phase::Fulou {
                    seat: shimocha,
                    meld,
                };
                return Ok(());
            }
        }

        // 5. the next turn
        self.phase = Phase::Zimo;
        Ok(())
    }

    fn fulou(&mut self, caller: Seat, meld: Meld) -> Result<()> {
        self.first_round = false;
        self.all_winds = false;
        self.ippatsu = [false; 4];
        self.rivers[self.turn.to_usize()].mark_claimed(&meld)?;
        self.turn = caller;
        self.hands[caller.to_usize()].call(&meld, true)?;
        debug!("fulou: seat {caller} {meld}");
        let replies = self.broadcast(Event::Fulou { seat: caller, meld });
        if meld.kind() == MeldKind::Daiminkan {
            self.current_kan = Some(meld);
            self.phase = Phase::Gangzimo;
            return Ok(());
        }
        // the caller discards next
        if let Reply::Dapai {
            tile,
            riichi: false,
        } = replies[caller.to_usize()]
        {
            if self
                .legal_discards_for(caller)
                .iter()
                .any(|o| o.tile == tile)
            {
                self.phase = Phase::Dapai {
                    discard: Discard {
                        tile,
                        tsumogiri: false,
                        riichi: false,
                    },
                };
                return Ok(());
            }
        }
        let fallback = self
            .legal_discards_for(caller)
            .pop()
            .ok_or_else(|| Error::invariant("no legal discard after the call"))?;
        self.phase = Phase::Dapai {
            discard: Discard {
                tile: fallback.tile,
                tsumogiri: false,
                riichi: false,
            },
        };
        Ok(())
    }

    fn gang(&mut self, meld: Meld) -> Result<()> {
        let seat = self.turn;
        if self.deferred_reveal {
            self.deferred_reveal = false;
            self.reveal_kan_dora()?;
        }
        self.hands[seat.to_usize()].kan(&meld, true)?;
        debug!("gang: seat {seat} {meld}");
        let replies = self.broadcast(Event::Gang { seat, meld });
        if meld.kind() == MeldKind::Kakan {
            let added = meld
                .added_tile()
                .ok_or_else(|| Error::invariant("kakan without an added tile"))?;
            self.chankan = true;
            self.ron_tile = Some(added);
            let mut rons = vec![];
            for other in others_after(seat) {
                if matches!(replies[other.to_usize()], Reply::Hule)
                    && self.allow_ron(other, added)
                {
                    rons.push(other);
                } else if self.completes_shape(other, added) {
                    self.can_ron[other.to_usize()] = false;
                }
            }
            if !rons.is_empty() {
                rons.truncate(self.rule.max_simultaneous_win as usize);
                self.winners = rons;
                self.phase = Phase::Hule;
                return Ok(());
            }
            self.chankan = false;
        }
        self.current_kan = Some(meld);
        self.phase = Phase::Gangzimo;
        Ok(())
    }

    fn hule(&mut self) -> Result<()> {
        let seat = self.winners.remove(0);
        self.wall_mut()?.close();
        let tsumo = seat == self.turn && !self.chankan;
        let ctx = self.win_context(seat, !tsumo)?;
        let ron = if tsumo {
            None
        } else {
            let tile = self
                .ron_tile
                .ok_or_else(|| Error::invariant("ron without a tile"))?;
            let dir = Dir::between(seat, self.turn)
                .map_err(|e| Error::invariant(e.to_string()))?;
            Some((tile, dir))
        };
        let win = score_win(&self.hands[seat.to_usize()], ron, &ctx)
            .ok_or_else(|| Error::invariant("accepted win does not score"))?;
        let dealer = self.dealer();
        let mut deltas = [0 as Points; 4];
        for wind in 0..4u8 {
            deltas[dealer.add(wind).to_usize()] = win.deltas[wind as usize];
        }
        for (p, d) in self.points.iter_mut().zip(deltas) {
            *p += d;
        }
        if !self.stakes_paid {
            self.stakes_paid = true;
            self.sticks = 0;
        }
        if seat == dealer && self.rule.consecutive_mode != 0 {
            self.dealer_keeps = true;
        }
        let ura = if self.hands[seat.to_usize()].is_riichi() {
            self.wall_ref()?.ura_indicators()
        } else {
            None
        };
        debug!("hule: seat {seat} {:?}", win.yaku);
        let mut hand_text = self.hands[seat.to_usize()].to_string();
        if let Some((tile, dir)) = ron {
            hand_text = format!("{hand_text}{tile}{dir}");
        }
        self.broadcast(Event::Hule {
            seat,
            hand: hand_text,
            ron: ron.map(|r| r.0),
            ura,
            win,
            deltas,
        });
        self.phase = if self.winners.is_empty() {
            Phase::Last
        } else {
            Phase::Hule
        };
        Ok(())
    }

    fn pingju(&mut self, kind: DrawKind) -> Result<()> {
        let mut name = kind;
        let mut deltas = [0 as Points; 4];
        let mut hands_out: [Option<String>; 4] = Default::default();
        self.round_was_draw = true;
        if kind == DrawKind::Exhausted {
            let dealer = self.dealer();
            let mut tenpai = [false; 4];
            for seat in ALL_SEATS {
                let i = seat.to_usize();
                let declared = !self.rule.noten_declaration
                    || self.hands[i].is_riichi()
                    || self.daopai[i];
                tenpai[i] = declared && shanten(&self.hands[i]) == 0;
                if tenpai[i] {
                    hands_out[i] = Some(self.hands[i].to_string());
                }
            }
            if self.rule.nagashi_mangan {
                for seat in seats_from(dealer) {
                    if !self.rivers[seat.to_usize()].is_nagashi() {
                        continue;
                    }
                    name = DrawKind::NagashiMangan;
                    for other in ALL_SEATS {
                        if other == seat {
                            continue;
                        }
                        let payment = if seat == dealer || other == dealer {
                            4000
                        } else {
                            2000
                        };
                        deltas[other.to_usize()] -= payment;
                        deltas[seat.to_usize()] += payment;
                    }
                }
            }
            if name == DrawKind::Exhausted && self.rule.noten_penalty {
                let n = tenpai.iter().filter(|&&t| t).count() as Points;
                if n > 0 && n < 4 {
                    for seat in ALL_SEATS {
                        let i = seat.to_usize();
                        deltas[i] += if tenpai[i] { 3000 / n } else { -3000 / (4 - n) };
                    }
                }
            }
            self.dealer_keeps = match self.rule.consecutive_mode {
                2 => tenpai[dealer.to_usize()],
                3 => true,
                _ => false,
            };
        } else {
            // abortive draws keep the dealership
            self.dealer_keeps = true;
            if kind == DrawKind::NineTerminals {
                let i = self.turn.to_usize();
                hands_out[i] = Some(self.hands[i].to_string());
            }
        }
        for (p, d) in self.points.iter_mut().zip(deltas) {
            *p += d;
        }
        debug!("pingju: {name}");
        self.broadcast(Event::Pingju {
            name,
            hands: hands_out,
            deltas,
        });
        self.phase = Phase::Last;
        Ok(())
    }

    fn leader(&self) -> Seat {
        let mut best = self.qijia;
        for seat in seats_from(self.qijia) {
            if self.points[seat.to_usize()] > self.points[best.to_usize()] {
                best = seat;
            }
        }
        best
    }

    fn last(&mut self) -> Result<()> {
        self.wall = None;
        let finished_index = self.round_wind * 4 + self.hand_no;
        self.record
            .rounds
            .push(std::mem::take(&mut self.round_events));
        self.honba = if self.round_was_draw || self.dealer_keeps {
            self.honba.saturating_add(1)
        } else {
            0
        };
        if !self.dealer_keeps {
            self.hand_no += 1;
            if self.hand_no == 4 {
                self.hand_no = 0;
                self.round_wind += 1;
            }
        }
        if self.rule.game_count == 0 {
            self.phase = Phase::Jieju;
            return Ok(());
        }
        if self.rule.bust_ends_game && self.points.iter().any(|&p| p < 0) {
            self.phase = Phase::Jieju;
            return Ok(());
        }
        let next_index = self.round_wind * 4 + self.hand_no;
        if next_index > self.max_hand_index {
            let leader_points = self.points[self.leader().to_usize()];
            let end = match self.rule.extension_mode {
                0 => true,
                3 => {
                    if self.extended {
                        true
                    } else {
                        self.extended = true;
                        self.max_hand_index += 4;
                        false
                    }
                }
                2 if self.dealer_keeps => false,
                _ => leader_points >= 30000,
            };
            if end || next_index > 15 {
                self.phase = Phase::Jieju;
                return Ok(());
            }
        } else if self.rule.oralas_stop
            && self.dealer_keeps
            && finished_index == self.max_hand_index
            && self.leader() == self.dealer()
        {
            self.phase = Phase::Jieju;
            return Ok(());
        }
        self.phase = Phase::Qipai;
        Ok(())
    }

    fn jieju(&mut self) -> Result<()> {
        if self.sticks > 0 {
            self.points[self.leader().to_usize()] += 1000 * self.sticks as Points;
            self.sticks = 0;
        }
        let mut order: Vec<Seat> = seats_from(self.qijia).to_vec();
        order.sort_by_key(|s| -self.points[s.to_usize()]);
        let mut rank = [0u8; 4];
        for (place, seat) in order.iter().enumerate() {
            rank[seat.to_usize()] = place as u8 + 1;
        }
        let mut scores = [0f64; 4];
        let mut others = 0f64;
        for seat in ALL_SEATS {
            let i = seat.to_usize();
            if rank[i] == 1 {
                continue;
            }
            let base =
                (self.points[i] - self.rule.origin_points) as f64 / 1000.0;
            scores[i] = (base * 10.0).round() / 10.0 + self.rule.rank_points[rank[i] as usize - 1];
            others += scores[i];
        }
        let top = order[0].to_usize();
        scores[top] = -others;
        self.record.points = self.points;
        self.record.rank = rank;
        self.record.scores = scores;
        let event = Event::Jieju {
            points: self.points,
            rank,
            scores,
        };
        for seat in ALL_SEATS {
            let _ = self.agents[seat.to_usize()].act(&event);
        }
        debug!("jieju: {:?}", self.points);
        self.phase = Phase::Done;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Tsumogiri;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Accepts any win it is offered; otherwise passes.
    struct Ronbot;
    impl Agent for Ronbot {
        fn act(&mut self, _event: &Event) -> Reply {
            Reply::Hule
        }
    }

    fn passive_game(rule: Ruleset, seed: u64) -> Game {
        let agents: [Box<dyn Agent>; 4] = [
            Box::new(Tsumogiri),
            Box::new(Tsumogiri),
            Box::new(Tsumogiri),
            Box::new(Tsumogiri),
        ];
        Game::new(agents, rule, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn seeded_game_runs_to_completion() {
        let rule = Ruleset {
            game_count: 1,
            ..Ruleset::default()
        };
        let mut game = passive_game(rule, 2024);
        game.run();
        let record = game.record();
        assert!(!record.rounds.is_empty());
        for round in &record.rounds {
            assert!(matches!(round.first(), Some(Event::Qipai { .. })));
            assert!(matches!(
                round.last(),
                Some(Event::Hule { .. } | Event::Pingju { .. })
            ));
        }
        // no riichi sticks with passive agents: the pool conserves points
        assert_eq!(game.points().iter().sum::<Points>(), 100000);
        assert!(record.scores.iter().sum::<f64>().abs() < 1e-6);
        let mut ranks = record.rank.to_vec();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn determinism_given_the_same_seed() {
        let rule = Ruleset {
            game_count: 1,
            ..Ruleset::default()
        };
        let mut a = passive_game(rule.clone(), 7);
        let mut b = passive_game(rule, 7);
        a.run();
        b.run();
        assert_eq!(a.record(), b.record());
    }

    #[test]
    fn stop_gates_the_next_advance() {
        let mut game = passive_game(Ruleset::default(), 1);
        game.stop();
        assert!(game.step());
        assert_eq!(game.phase(), &Phase::Kaiju);
        game.resume();
        assert!(game.step());
        assert_eq!(game.phase(), &Phase::Qipai);
    }

    #[test]
    fn three_ron_aborts_as_sanchahou() {
        let agents: [Box<dyn Agent>; 4] = [
            Box::new(Ronbot),
            Box::new(Ronbot),
            Box::new(Ronbot),
            Box::new(Ronbot),
        ];
        let mut game = Game::new(agents, Ruleset::default(), StdRng::seed_from_u64(3));
        game.step(); // kaiju
        game.step(); // qipai
        let dealer = game.dealer();
        // the dealer holds a discardable m1; the others all wait on it
        game.turn = dealer;
        game.hands[dealer.to_usize()] = "m11234p456s789z112".parse().unwrap();
        for other in others_after(dealer) {
            game.hands[other.to_usize()] = "m23p234567s23455".parse().unwrap();
        }
        let honba_before = game.honba;
        let points_before = game.points();
        game.phase = Phase::Dapai {
            discard: Discard {
                tile: "m1".parse().unwrap(),
                tsumogiri: false,
                riichi: false,
            },
        };
        game.step(); // the discard; three rons collide
        assert_eq!(game.phase, Phase::Pingju(DrawKind::ThreeRon));
        game.step(); // pingju
        assert_eq!(game.points(), points_before);
        game.step(); // last
        assert_eq!(game.honba, honba_before + 1);
        assert_eq!(game.phase, Phase::Qipai);
    }

    #[test]
    fn double_ron_is_honored_in_turn_order() {
        let agents: [Box<dyn Agent>; 4] = [
            Box::new(Ronbot),
            Box::new(Ronbot),
            Box::new(Tsumogiri),
            Box::new(Ronbot),
        ];
        let mut game = Game::new(agents, Ruleset::default(), StdRng::seed_from_u64(3));
        game.step();
        game.step();
        // pin the dealership so the passive agent sits among the claimers
        game.qijia = Seat::new(3);
        let dealer = game.dealer();
        game.turn = dealer;
        game.hands[dealer.to_usize()] = "m11234p456s789z112".parse().unwrap();
        for other in others_after(dealer) {
            game.hands[other.to_usize()] = "m23p234567s23455".parse().unwrap();
        }
        game.phase = Phase::Dapai {
            discard: Discard {
                tile: "m1".parse().unwrap(),
                tsumogiri: false,
                riichi: false,
            },
        };
        game.step();
        assert_eq!(game.phase, Phase::Hule);
        // the passive seat never declared, so exactly two winners remain
        assert_eq!(game.winners.len(), 2);
        let sum_before: Points = game.points().iter().sum();
        game.step();
        game.step();
        assert!(game.winners.is_empty());
        assert_eq!(game.points().iter().sum::<Points>(), sum_before);
    }
}
