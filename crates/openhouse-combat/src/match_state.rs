//! Round flow for a two-fighter match.
//!
//! This module provides the `Match` struct, which owns both fighters, steps
//! them in snapshot-then-advance order at a fixed timestep, applies hits and
//! tracks the round phase (fighter select, fighting, paused, over).

use std::sync::Arc;

use openhouse_common::{ArchetypeError, ArchetypeId, PlayerSlot};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::archetype::ArchetypeTable;
use crate::events::{CombatEvent, EventBus, Outcome};
use crate::fighter::Fighter;
use crate::hit::{check_hit, Hit, Strike};
use crate::input::FrameInput;

/// Default simulation rate in ticks per second.
pub const DEFAULT_TICK_RATE: f64 = 60.0;

/// Most ticks a single `update` call will run before dropping backlog.
pub const MAX_TICKS_PER_UPDATE: u32 = 8;

/// Errors from match flow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Fighters can only change between rounds.
    #[error("fighters can only be selected between rounds")]
    RoundInProgress,

    /// Archetype lookup failed
    #[error(transparent)]
    Archetype(#[from] ArchetypeError),
}

/// Round phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Choosing archetypes; nothing simulates.
    FighterSelect,
    /// Round in progress.
    Fighting,
    /// Round frozen.
    Paused,
    /// A fighter is down; waiting for restart or fighter select.
    Over,
}

/// Result of one match tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundTick {
    /// Tick number that just ran, starting at 0.
    pub tick: u64,
    /// Hits applied this tick, in resolution order.
    pub hits: Vec<Hit>,
}

/// A match between two fighters.
#[derive(Debug)]
pub struct Match {
    table: Arc<ArchetypeTable>,
    fighters: [Fighter; 2],
    phase: MatchPhase,
    tick: u64,
    timestep: f64,
    accumulator: f64,
    events: EventBus,
    outcome: Option<Outcome>,
    hits_landed: [u32; 2],
}

impl Match {
    /// Creates a match in fighter select with the given initial picks.
    pub fn new(
        table: Arc<ArchetypeTable>,
        left: ArchetypeId,
        right: ArchetypeId,
    ) -> Result<Self, ArchetypeError> {
        let fighters = [
            Fighter::new(PlayerSlot::Left, left, &table)?,
            Fighter::new(PlayerSlot::Right, right, &table)?,
        ];
        Ok(Self {
            table,
            fighters,
            phase: MatchPhase::FighterSelect,
            tick: 0,
            timestep: 1.0 / DEFAULT_TICK_RATE,
            accumulator: 0.0,
            events: EventBus::default(),
            outcome: None,
            hits_landed: [0; 2],
        })
    }

    /// Sets the simulation rate. Non-positive rates are ignored.
    #[must_use]
    pub fn with_tick_rate(mut self, ticks_per_second: f64) -> Self {
        if ticks_per_second > 0.0 {
            self.timestep = 1.0 / ticks_per_second;
        }
        self
    }

    /// Replaces the event bus, e.g. with a larger one.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    // ========================================================================
    // Round Flow
    // ========================================================================

    /// Picks archetypes and starts a round.
    ///
    /// Only allowed in fighter select or after a round is over. Both ids are
    /// checked before either fighter changes.
    pub fn select_fighters(&mut self, left: ArchetypeId, right: ArchetypeId) -> Result<(), MatchError> {
        if !matches!(self.phase, MatchPhase::FighterSelect | MatchPhase::Over) {
            return Err(MatchError::RoundInProgress);
        }
        self.table.get(left)?;
        self.table.get(right)?;

        let [l, r] = &mut self.fighters;
        l.set_archetype(&self.table, left)?;
        r.set_archetype(&self.table, right)?;
        info!(
            "Fighters selected: {} vs {}",
            l.archetype().name,
            r.archetype().name
        );
        self.restart();
        Ok(())
    }

    /// Resets both fighters and starts a new round.
    pub fn restart(&mut self) {
        for fighter in &mut self.fighters {
            fighter.restart();
        }
        self.tick = 0;
        self.accumulator = 0.0;
        self.outcome = None;
        self.hits_landed = [0; 2];
        self.phase = MatchPhase::Fighting;
        self.events.publish(CombatEvent::RoundStarted);
        info!("Round started");
    }

    /// Flips between fighting and paused. No effect in other phases.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            MatchPhase::Fighting => {
                self.phase = MatchPhase::Paused;
                self.events.publish(CombatEvent::Paused);
                info!("Match paused");
            }
            MatchPhase::Paused => {
                self.phase = MatchPhase::Fighting;
                self.events.publish(CombatEvent::Resumed);
                info!("Match resumed");
            }
            MatchPhase::FighterSelect | MatchPhase::Over => {}
        }
    }

    /// Abandons the round and goes back to fighter select.
    pub fn return_to_menu(&mut self) {
        self.phase = MatchPhase::FighterSelect;
        self.accumulator = 0.0;
        info!("Returned to fighter select");
    }

    /// Routes a frame of input. Fighter commands only apply while fighting,
    /// the menu request only while paused, and restart never from fighter
    /// select.
    pub fn apply_input(&mut self, frame: &FrameInput) {
        if frame.restart && self.phase != MatchPhase::FighterSelect {
            self.restart();
        }
        if frame.pause {
            self.toggle_pause();
        }
        if frame.menu && self.phase == MatchPhase::Paused {
            self.return_to_menu();
        }
        if self.phase == MatchPhase::Fighting {
            for (fighter, input) in self.fighters.iter_mut().zip(&frame.players) {
                input.apply(fighter);
            }
        }
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Accumulates wall-clock time and runs whole ticks.
    ///
    /// Returns the number of ticks run. At most [`MAX_TICKS_PER_UPDATE`] run
    /// per call; any further backlog is dropped. Negative or non-finite `dt`
    /// is ignored.
    pub fn update(&mut self, dt: f32) -> u32 {
        if self.phase != MatchPhase::Fighting {
            return 0;
        }
        if !dt.is_finite() || dt < 0.0 {
            debug!("Ignoring frame time {dt}");
            return 0;
        }

        self.accumulator += f64::from(dt);
        let mut ran = 0;
        while self.accumulator >= self.timestep && ran < MAX_TICKS_PER_UPDATE {
            self.accumulator -= self.timestep;
            ran += 1;
            if self.tick().is_none() || self.phase != MatchPhase::Fighting {
                self.accumulator = 0.0;
                break;
            }
        }
        if ran == MAX_TICKS_PER_UPDATE && self.accumulator >= self.timestep {
            debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        ran
    }

    /// Runs exactly one tick. Returns `None` unless the round is in progress.
    ///
    /// Both snapshots are taken before either fighter advances, and hits are
    /// applied only after both have advanced.
    pub fn tick(&mut self) -> Option<RoundTick> {
        if self.phase != MatchPhase::Fighting {
            return None;
        }

        let snapshots = [self.fighters[0].snapshot(), self.fighters[1].snapshot()];
        let [left, right] = &mut self.fighters;
        let left_strikes = left.advance(&snapshots[1]).strikes;
        let right_strikes = right.advance(&snapshots[0]).strikes;

        let mut hits = Vec::new();
        apply_strikes(&left_strikes, right, &self.events, &mut hits);
        apply_strikes(&right_strikes, left, &self.events, &mut hits);
        for hit in &hits {
            self.hits_landed[hit.attacker.index()] += 1;
        }

        let report = RoundTick {
            tick: self.tick,
            hits,
        };
        trace!("Tick {} resolved {} hits", report.tick, report.hits.len());
        self.tick += 1;
        self.check_round_over();
        Some(report)
    }

    fn check_round_over(&mut self) {
        let outcome = match (self.fighters[0].is_defeated(), self.fighters[1].is_defeated()) {
            (false, false) => return,
            (true, true) => Outcome::Draw,
            (true, false) => Outcome::Winner(PlayerSlot::Right),
            (false, true) => Outcome::Winner(PlayerSlot::Left),
        };
        self.outcome = Some(outcome);
        self.phase = MatchPhase::Over;
        self.events.publish(CombatEvent::RoundOver { outcome });
        info!("Round over after {} ticks: {:?}", self.tick, outcome);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Fighter in a slot.
    #[must_use]
    pub const fn fighter(&self, slot: PlayerSlot) -> &Fighter {
        &self.fighters[slot.index()]
    }

    /// Both fighters, by slot index.
    #[must_use]
    pub const fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    /// Ticks run this round.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// How the last round ended, once it has.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Hits landed by a slot this round.
    #[must_use]
    pub const fn hits_landed(&self, slot: PlayerSlot) -> u32 {
        self.hits_landed[slot.index()]
    }

    /// Combat event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Archetype table in use.
    #[must_use]
    pub fn table(&self) -> &ArchetypeTable {
        &self.table
    }

    /// Seconds per tick.
    #[must_use]
    pub const fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Fraction of a tick accumulated, for render interpolation.
    #[must_use]
    pub fn interpolation_alpha(&self) -> f32 {
        (self.accumulator / self.timestep) as f32
    }
}

/// Applies one fighter's strikes to the other and publishes the results.
fn apply_strikes(strikes: &[Strike], defender: &mut Fighter, events: &EventBus, hits: &mut Vec<Hit>) {
    for strike in strikes {
        let was_down = defender.is_down();
        let Some(hit) = check_hit(strike, defender) else {
            continue;
        };

        events.publish(CombatEvent::HitLanded {
            attacker: hit.attacker,
            defender: defender.slot(),
            kind: hit.kind,
            damage: hit.damage,
            cue: hit.kind.cue(),
        });
        events.publish(CombatEvent::Stunned {
            slot: defender.slot(),
        });
        if defender.is_down() && !was_down {
            events.publish(CombatEvent::KnockedOut {
                slot: defender.slot(),
            });
        }
        hits.push(hit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::HitKind;
    use crate::input::FighterInput;

    fn fighting(left: ArchetypeId, right: ArchetypeId) -> Match {
        let mut m = Match::new(Arc::new(ArchetypeTable::builtin()), left, right).unwrap();
        m.select_fighters(left, right).unwrap();
        m.events.drain();
        m
    }

    fn place(m: &mut Match, left_x: f32, right_x: f32) {
        m.fighters[0].position_x = left_x;
        m.fighters[1].position_x = right_x;
    }

    fn run_until_over(m: &mut Match, limit: usize) {
        for _ in 0..limit {
            if m.tick().is_none() {
                return;
            }
        }
    }

    #[test]
    fn test_new_match_waits_in_select() {
        let mut m = Match::new(
            Arc::new(ArchetypeTable::builtin()),
            ArchetypeId::HAND_FIGHTER,
            ArchetypeId::MONDAY_MEMO,
        )
        .unwrap();
        assert_eq!(m.phase(), MatchPhase::FighterSelect);
        assert!(m.tick().is_none());
        assert_eq!(m.update(1.0), 0);
    }

    #[test]
    fn test_select_starts_round() {
        let m = fighting(ArchetypeId::OG_LEFT, ArchetypeId::OG_RIGHT);
        assert_eq!(m.phase(), MatchPhase::Fighting);
        assert_eq!(m.fighter(PlayerSlot::Right).archetype_id(), ArchetypeId::OG_RIGHT);
        assert_eq!(m.fighter(PlayerSlot::Left).position_x(), -18.0);
    }

    #[test]
    fn test_select_rejected_mid_round() {
        let mut m = fighting(ArchetypeId::OG_LEFT, ArchetypeId::OG_RIGHT);
        assert_eq!(
            m.select_fighters(ArchetypeId::HAND_FIGHTER, ArchetypeId::HAND_FIGHTER),
            Err(MatchError::RoundInProgress)
        );
        m.toggle_pause();
        assert_eq!(
            m.select_fighters(ArchetypeId::HAND_FIGHTER, ArchetypeId::HAND_FIGHTER),
            Err(MatchError::RoundInProgress)
        );
    }

    #[test]
    fn test_select_unknown_id_changes_nothing() {
        let mut m = Match::new(
            Arc::new(ArchetypeTable::builtin()),
            ArchetypeId::HAND_FIGHTER,
            ArchetypeId::HAND_FIGHTER,
        )
        .unwrap();
        let err = m
            .select_fighters(ArchetypeId::MONDAY_MEMO, ArchetypeId::new(9))
            .unwrap_err();
        assert!(matches!(err, MatchError::Archetype(_)));
        assert_eq!(m.fighter(PlayerSlot::Left).archetype_id(), ArchetypeId::HAND_FIGHTER);
        assert_eq!(m.phase(), MatchPhase::FighterSelect);
    }

    #[test]
    fn test_simultaneous_punches_both_land() {
        let mut m = fighting(ArchetypeId::OG_LEFT, ArchetypeId::OG_RIGHT);
        place(&mut m, -6.0, 6.0);
        let punch = FighterInput {
            punch: true,
            ..Default::default()
        };
        m.apply_input(&FrameInput {
            players: [punch, punch],
            ..Default::default()
        });

        let mut hits = Vec::new();
        for _ in 0..10 {
            hits.extend(m.tick().unwrap().hits);
        }
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.kind == HitKind::Punch));
        assert_eq!(m.fighter(PlayerSlot::Left).health(), 74.0);
        assert_eq!(m.fighter(PlayerSlot::Right).health(), 74.0);
        assert!(m.fighter(PlayerSlot::Left).is_stunned());

        let events = m.events().drain();
        let landed = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::HitLanded { .. }))
            .count();
        assert_eq!(landed, 2);
        assert_eq!(m.hits_landed(PlayerSlot::Left), 1);
    }

    #[test]
    fn test_knockout_ends_round() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::HAND_FIGHTER);
        place(&mut m, -6.0, 6.0);
        m.fighters[1].apply_damage(74.0);
        m.fighters[0].request_punch();

        run_until_over(&mut m, 100);
        assert_eq!(m.phase(), MatchPhase::Over);
        assert_eq!(m.outcome(), Some(Outcome::Winner(PlayerSlot::Left)));
        assert!(m.fighter(PlayerSlot::Right).is_down());
        assert_eq!(m.fighter(PlayerSlot::Right).health(), -1.0);
        assert!(m.tick().is_none());

        let events = m.events().drain();
        assert!(events.contains(&CombatEvent::KnockedOut {
            slot: PlayerSlot::Right
        }));
        assert_eq!(
            events.last(),
            Some(&CombatEvent::RoundOver {
                outcome: Outcome::Winner(PlayerSlot::Left)
            })
        );

        assert!(m
            .select_fighters(ArchetypeId::MONDAY_MEMO, ArchetypeId::OG_LEFT)
            .is_ok());
        assert_eq!(m.fighter(PlayerSlot::Right).health(), 75.0);
    }

    #[test]
    fn test_double_knockout_is_draw() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::HAND_FIGHTER);
        place(&mut m, -6.0, 6.0);
        for fighter in &mut m.fighters {
            fighter.apply_damage(74.0);
            fighter.request_punch();
        }
        run_until_over(&mut m, 100);
        assert_eq!(m.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_LEFT);
        m.apply_input(&FrameInput {
            pause: true,
            ..Default::default()
        });
        assert_eq!(m.phase(), MatchPhase::Paused);
        assert_eq!(m.update(0.5), 0);
        assert!(m.tick().is_none());

        m.toggle_pause();
        assert_eq!(m.phase(), MatchPhase::Fighting);
        assert_eq!(
            m.events().drain(),
            vec![CombatEvent::Paused, CombatEvent::Resumed]
        );
    }

    #[test]
    fn test_commands_ignored_while_paused() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_LEFT);
        m.toggle_pause();
        let kick = FighterInput {
            kick: true,
            ..Default::default()
        };
        m.apply_input(&FrameInput {
            players: [kick, kick],
            ..Default::default()
        });
        assert!(!m.fighter(PlayerSlot::Left).is_attacking());
    }

    #[test]
    fn test_menu_only_from_pause() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_LEFT);
        let menu = FrameInput {
            menu: true,
            ..Default::default()
        };
        m.apply_input(&menu);
        assert_eq!(m.phase(), MatchPhase::Fighting);
        m.toggle_pause();
        m.apply_input(&menu);
        assert_eq!(m.phase(), MatchPhase::FighterSelect);
    }

    #[test]
    fn test_restart_resets_round() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_LEFT);
        for _ in 0..5 {
            m.tick();
        }
        m.fighters[0].apply_damage(10.0);
        m.apply_input(&FrameInput {
            restart: true,
            ..Default::default()
        });
        assert_eq!(m.tick_count(), 0);
        assert_eq!(m.fighter(PlayerSlot::Left).health(), 75.0);
        assert_eq!(m.fighter(PlayerSlot::Left).ticks(), 0);
        assert_eq!(m.events().drain(), vec![CombatEvent::RoundStarted]);
    }

    #[test]
    fn test_update_runs_whole_ticks() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_LEFT);
        assert_eq!(m.update(0.051), 3);
        assert_eq!(m.tick_count(), 3);
        assert!(m.interpolation_alpha() < 1.0);

        assert_eq!(m.update(10.0), MAX_TICKS_PER_UPDATE);
        assert!(m.interpolation_alpha() < 1.0);
    }

    #[test]
    fn test_restart_ignored_in_select() {
        let mut m = Match::new(
            Arc::new(ArchetypeTable::builtin()),
            ArchetypeId::HAND_FIGHTER,
            ArchetypeId::OG_RIGHT,
        )
        .unwrap();
        m.apply_input(&FrameInput {
            restart: true,
            ..Default::default()
        });
        assert_eq!(m.phase(), MatchPhase::FighterSelect);
        assert!(m.events().drain().is_empty());

        m.select_fighters(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_RIGHT)
            .unwrap();
        m.toggle_pause();
        m.apply_input(&FrameInput {
            restart: true,
            ..Default::default()
        });
        assert_eq!(m.phase(), MatchPhase::Fighting);
    }

    #[test]
    fn test_update_ignores_bad_frame_time() {
        let mut m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_LEFT);
        assert_eq!(m.update(f32::NAN), 0);
        assert_eq!(m.update(f32::INFINITY), 0);
        assert_eq!(m.update(-1.0), 0);
        assert_eq!(m.update(0.051), 3);
        assert!(m.interpolation_alpha().is_finite());
    }

    #[test]
    fn test_custom_tick_rate() {
        let m = fighting(ArchetypeId::HAND_FIGHTER, ArchetypeId::OG_LEFT).with_tick_rate(120.0);
        assert!((m.timestep() - 1.0 / 120.0).abs() < 1e-12);
    }
}
