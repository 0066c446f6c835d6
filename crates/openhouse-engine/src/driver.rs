//! Headless bout driver.
//!
//! Feeds a bout script through the input manager one frame at a time, ticks
//! the match and tallies the combat events into a summary.

use std::sync::Arc;

use anyhow::{Context, Result};
use openhouse_combat::{ArchetypeTable, CombatEvent, InputManager, Match, MatchPhase, Outcome};
use openhouse_common::PlayerSlot;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::OpenHouseConfig;
use crate::script::BoutScript;

/// End-of-bout state for one fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSummary {
    /// Slot
    pub slot: PlayerSlot,
    /// Archetype display name
    pub archetype: String,
    /// Remaining health (may be negative)
    pub health: f32,
    /// Hits landed in the final round
    pub hits_landed: u32,
    /// Knocked down
    pub down: bool,
}

/// Event counts over the whole bout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTally {
    /// Rounds started, including restarts
    pub rounds_started: u32,
    /// Hits landed by either fighter
    pub hits: u32,
    /// Knock-outs
    pub knockouts: u32,
    /// Pauses
    pub pauses: u32,
}

impl EventTally {
    fn record(&mut self, events: &[CombatEvent]) {
        for event in events {
            match event {
                CombatEvent::RoundStarted => self.rounds_started += 1,
                CombatEvent::HitLanded { .. } => self.hits += 1,
                CombatEvent::KnockedOut { .. } => self.knockouts += 1,
                CombatEvent::Paused => self.pauses += 1,
                CombatEvent::Stunned { .. } | CombatEvent::Resumed | CombatEvent::RoundOver { .. } => {},
            }
        }
    }
}

/// Result of a headless bout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutSummary {
    /// Player one
    pub left: FighterSummary,
    /// Player two
    pub right: FighterSummary,
    /// How the last round ended, if it did
    pub outcome: Option<Outcome>,
    /// Phase when the bout stopped
    pub final_phase: MatchPhase,
    /// Ticks simulated in the final round
    pub ticks: u64,
    /// Frames of input processed
    pub frames: u64,
    /// Event counts
    pub events: EventTally,
}

impl BoutSummary {
    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize bout summary")
    }
}

/// Runs a scripted bout to completion.
///
/// The bout stops at `max_ticks` frames, or once the script is exhausted and
/// the round is no longer in progress.
pub fn run_bout(table: Arc<ArchetypeTable>, config: &OpenHouseConfig, script: &BoutScript) -> Result<BoutSummary> {
    config.validate()?;
    let (left, right) = config.archetypes();
    let mut bout = Match::new(table, left, right)
        .context("invalid fighter pick")?
        .with_tick_rate(config.tick_rate);
    bout.select_fighters(left, right)?;

    let mut input = InputManager::new();
    let mut tally = EventTally::default();
    let mut frames = 0;
    let script_end = script.last_frame();

    while frames < config.max_ticks {
        for event in script.events_at(frames) {
            event.input.apply(&mut input);
        }
        bout.apply_input(&input.process());
        input.end_frame();
        bout.tick();
        tally.record(&bout.events().drain());
        frames += 1;

        let script_done = script_end.map_or(true, |last| frames > last);
        if script_done && bout.phase() != MatchPhase::Fighting {
            debug!("Script exhausted in phase {:?}", bout.phase());
            break;
        }
    }

    let summary = BoutSummary {
        left: fighter_summary(&bout, PlayerSlot::Left),
        right: fighter_summary(&bout, PlayerSlot::Right),
        outcome: bout.outcome(),
        final_phase: bout.phase(),
        ticks: bout.tick_count(),
        frames,
        events: tally,
    };
    info!(
        "Bout finished after {} frames: {:?} ({} hits)",
        summary.frames, summary.outcome, summary.events.hits
    );
    Ok(summary)
}

fn fighter_summary(bout: &Match, slot: PlayerSlot) -> FighterSummary {
    let fighter = bout.fighter(slot);
    FighterSummary {
        slot,
        archetype: fighter.archetype().name.clone(),
        health: fighter.health(),
        hits_landed: bout.hits_landed(slot),
        down: fighter.is_down(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ScriptEvent, ScriptInput};
    use openhouse_combat::KeyCode;

    fn key(frame: u64, key: KeyCode, pressed: bool) -> ScriptEvent {
        ScriptEvent {
            frame,
            input: ScriptInput::Key { key, pressed },
        }
    }

    fn config(max_ticks: u64) -> OpenHouseConfig {
        OpenHouseConfig {
            max_ticks,
            ..Default::default()
        }
    }

    #[test]
    fn test_idle_bout_runs_to_limit() {
        let summary = run_bout(
            Arc::new(ArchetypeTable::builtin()),
            &config(90),
            &BoutScript::default(),
        )
        .unwrap();
        assert_eq!(summary.frames, 90);
        assert_eq!(summary.ticks, 90);
        assert_eq!(summary.outcome, None);
        assert_eq!(summary.left.health, 75.0);
        assert_eq!(summary.events.rounds_started, 1);
    }

    #[test]
    fn test_pause_stops_exhausted_script() {
        let script = BoutScript {
            events: vec![key(10, KeyCode::P, true)],
            ..Default::default()
        };
        let summary = run_bout(Arc::new(ArchetypeTable::builtin()), &config(1000), &script).unwrap();
        assert_eq!(summary.final_phase, MatchPhase::Paused);
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.frames, 11);
        assert_eq!(summary.events.pauses, 1);
    }

    #[test]
    fn test_bad_pick_is_error() {
        let cfg = OpenHouseConfig {
            right_archetype: 42,
            ..config(10)
        };
        assert!(run_bout(Arc::new(ArchetypeTable::builtin()), &cfg, &BoutScript::default()).is_err());
    }

    #[test]
    fn test_invalid_config_is_error() {
        let cfg = OpenHouseConfig {
            tick_rate: 0.0,
            ..config(10)
        };
        let err = run_bout(Arc::new(ArchetypeTable::builtin()), &cfg, &BoutScript::default()).unwrap_err();
        assert!(err.to_string().contains("tick_rate"));
    }
}
