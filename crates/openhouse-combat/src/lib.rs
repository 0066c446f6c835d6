//! # OpenHouse Combat
//!
//! Two-fighter combat simulation for OpenHouse.
//!
//! This crate provides the deterministic, renderer-free fight core:
//! - Archetype tuning table (built-in or loaded from RON)
//! - Per-fighter state machine with procedural attack poses
//! - Opponent snapshots for order-independent ticking
//! - Hit resolution with knee, kick, punch, double punch and special reach
//! - Round flow (fighter select, pause, knock-out, restart)
//! - Keyboard and pad bindings
//! - Event bus for HUD and audio cues

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod archetype;
pub mod attacks;
pub mod events;
pub mod fighter;
pub mod hit;
pub mod input;
pub mod match_state;
pub mod pose;
pub mod snapshot;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::archetype::*;
    pub use crate::attacks::*;
    pub use crate::events::*;
    pub use crate::fighter::*;
    pub use crate::hit::*;
    pub use crate::input::*;
    pub use crate::match_state::*;
    pub use crate::pose::*;
    pub use crate::snapshot::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use openhouse_common::{ArchetypeId, PlayerSlot};
    use std::sync::Arc;

    #[test]
    fn test_every_pairing_starts_cleanly() {
        let table = Arc::new(ArchetypeTable::builtin());
        for left in 0..4 {
            for right in 0..4 {
                let (l, r) = (ArchetypeId::new(left), ArchetypeId::new(right));
                let mut m = Match::new(Arc::clone(&table), l, r).unwrap();
                m.select_fighters(l, r).unwrap();
                for _ in 0..120 {
                    m.tick();
                }
                assert_eq!(m.phase(), MatchPhase::Fighting);
                for slot in PlayerSlot::ALL {
                    let fighter = m.fighter(slot);
                    assert_eq!(fighter.health(), MAX_HEALTH);
                    assert_eq!(*fighter.pose(), Pose::ready(slot.facing()));
                }
            }
        }
    }

    #[test]
    fn test_keyboard_to_hit() {
        let table = Arc::new(ArchetypeTable::builtin());
        let mut m = Match::new(table, ArchetypeId::OG_LEFT, ArchetypeId::OG_RIGHT).unwrap();
        m.select_fighters(ArchetypeId::OG_LEFT, ArchetypeId::OG_RIGHT)
            .unwrap();
        let mut input = InputManager::new();

        // Walk player one in until in punching range.
        input.update_key(KeyCode::D, true);
        while m.fighter(PlayerSlot::Left).position_x() < 6.0 {
            m.apply_input(&input.process());
            input.end_frame();
            m.tick();
        }
        input.update_key(KeyCode::D, false);
        input.update_key(KeyCode::C, true);
        m.apply_input(&input.process());
        input.end_frame();

        let mut hits = 0;
        for _ in 0..10 {
            hits += m.tick().map_or(0, |t| t.hits.len());
        }
        assert_eq!(hits, 1);
        assert_eq!(m.fighter(PlayerSlot::Right).health(), MAX_HEALTH - 1.0);
    }
}
