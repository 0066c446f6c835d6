//! Hit resolution.
//!
//! A fighter emits a [`Strike`] at each active frame of an attack. Resolving
//! a strike is a pure function of the strike; applying the resulting [`Hit`]
//! is left to the defender so that a second hit in the same pass can be
//! refused.

use openhouse_common::PlayerSlot;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::archetype::{AttackDamage, AttackRange};
use crate::events::HitCue;
use crate::fighter::Fighter;

/// Extra reach of the knee strike beyond the spacing.
pub const KNEE_REACH: f32 = 4.0;

/// Extra reach of the double punch beyond the spacing.
pub const DOUBLE_PUNCH_REACH: f32 = 2.0;

/// Attack flags of the attacker at the moment of the strike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Knee sub-move of a two-hit kick.
    pub knee: bool,
    /// Kick active phase.
    pub kicking: bool,
    /// Punch active phase.
    pub punching: bool,
    /// Double punch queued or active.
    pub double_punching: bool,
    /// Special move active phase.
    pub special: bool,
}

/// An attack reaching its active frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    /// Slot of the attacking fighter.
    pub attacker: PlayerSlot,
    /// Attacker position at the active frame.
    pub attacker_x: f32,
    /// Defender position from the tick's snapshot.
    pub defender_x: f32,
    /// Spacing factor in effect for this pair.
    pub spacing: f32,
    /// Attacker archetype reach.
    pub range: AttackRange,
    /// Attacker archetype damage.
    pub damage: AttackDamage,
    /// Which attack flags were set.
    pub profile: AttackProfile,
}

/// Kind of attack that connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    /// Knee of a two-hit kick.
    Knee,
    /// Kick.
    Kick,
    /// Single punch.
    Punch,
    /// Second punch of a chain.
    DoublePunch,
    /// Special move.
    Special,
}

impl HitKind {
    /// Audio category for this hit.
    #[must_use]
    pub const fn cue(self) -> HitCue {
        match self {
            Self::Knee | Self::Kick => HitCue::Heavy,
            Self::Special => HitCue::Medium,
            Self::Punch | Self::DoublePunch => HitCue::Light,
        }
    }
}

/// A strike that connected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Slot of the attacking fighter.
    pub attacker: PlayerSlot,
    /// What connected.
    pub kind: HitKind,
    /// Damage to subtract from the defender.
    pub damage: f32,
    /// Horizontal distance between the fighters.
    pub distance: f32,
}

/// Resolves a strike against its defender position.
///
/// Branches are tried in priority order (knee, kick, punch, double punch,
/// special) and the first whose flag is set and whose reach covers the
/// distance wins. Exactly-equal distance is a hit.
#[must_use]
pub fn resolve(strike: &Strike) -> Option<Hit> {
    let distance = (strike.attacker_x - strike.defender_x).abs();
    let profile = strike.profile;
    let range = strike.range;
    let damage = strike.damage;

    let branches = [
        (profile.knee, KNEE_REACH, HitKind::Knee, damage.bonus),
        (profile.kicking && !profile.knee, range.kick, HitKind::Kick, damage.kick),
        (profile.punching, range.punch, HitKind::Punch, damage.punch),
        (profile.double_punching, DOUBLE_PUNCH_REACH, HitKind::DoublePunch, damage.bonus),
        (profile.special, range.special, HitKind::Special, damage.special),
    ];

    branches
        .into_iter()
        .find(|&(active, reach, _, _)| active && distance <= strike.spacing + reach)
        .map(|(_, _, kind, damage)| Hit {
            attacker: strike.attacker,
            kind,
            damage,
            distance,
        })
}

/// Resolves a strike and applies it to the defender.
///
/// Returns the hit only if it was applied. A defender with an unprocessed
/// stun refuses further hits, so the first hit of a pass wins.
pub fn check_hit(strike: &Strike, defender: &mut Fighter) -> Option<Hit> {
    let hit = resolve(strike)?;
    if defender.take_hit(&hit) {
        Some(hit)
    } else {
        debug!(
            "{:?} from {} ignored: {} already stunned this pass",
            hit.kind,
            strike.attacker,
            defender.slot()
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeTable;
    use openhouse_common::ArchetypeId;
    use proptest::prelude::*;

    fn strike(profile: AttackProfile, distance: f32) -> Strike {
        Strike {
            attacker: PlayerSlot::Left,
            attacker_x: 0.0,
            defender_x: distance,
            spacing: 12.0,
            range: AttackRange {
                punch: 8.0,
                kick: 7.0,
                special: 6.0,
            },
            damage: AttackDamage {
                punch: 1.0,
                kick: 2.5,
                special: 0.5,
                bonus: 1.5,
            },
            profile,
        }
    }

    fn defender() -> Fighter {
        Fighter::new(
            PlayerSlot::Right,
            ArchetypeId::HAND_FIGHTER,
            &ArchetypeTable::builtin(),
        )
        .unwrap()
    }

    #[test]
    fn test_boundary_distance_hits() {
        let kick = AttackProfile {
            kicking: true,
            ..Default::default()
        };
        let hit = resolve(&strike(kick, 19.0)).unwrap();
        assert_eq!(hit.kind, HitKind::Kick);
        assert_eq!(hit.damage, 2.5);
        assert!(resolve(&strike(kick, 19.5)).is_none());
    }

    #[test]
    fn test_distance_is_absolute() {
        let punch = AttackProfile {
            punching: true,
            ..Default::default()
        };
        assert!(resolve(&strike(punch, -20.0)).is_some());
        assert!(resolve(&strike(punch, -20.1)).is_none());
    }

    #[test]
    fn test_knee_outranks_kick_and_uses_bonus() {
        let knee = AttackProfile {
            knee: true,
            kicking: true,
            ..Default::default()
        };
        let hit = resolve(&strike(knee, 16.0)).unwrap();
        assert_eq!(hit.kind, HitKind::Knee);
        assert_eq!(hit.damage, 1.5);
        // A knee out of its own reach never falls back to the kick branch.
        assert!(resolve(&strike(knee, 17.0)).is_none());
    }

    #[test]
    fn test_punch_outranks_queued_double_punch() {
        let profile = AttackProfile {
            punching: true,
            double_punching: true,
            ..Default::default()
        };
        assert_eq!(resolve(&strike(profile, 10.0)).unwrap().kind, HitKind::Punch);
    }

    #[test]
    fn test_double_punch_uses_bonus_slot() {
        let profile = AttackProfile {
            double_punching: true,
            ..Default::default()
        };
        let hit = resolve(&strike(profile, 14.0)).unwrap();
        assert_eq!(hit.kind, HitKind::DoublePunch);
        assert_eq!(hit.damage, 1.5);
        assert!(resolve(&strike(profile, 14.5)).is_none());
    }

    #[test]
    fn test_no_active_attack_never_hits() {
        assert!(resolve(&strike(AttackProfile::default(), 0.0)).is_none());
    }

    #[test]
    fn test_cues() {
        assert_eq!(HitKind::Kick.cue(), HitCue::Heavy);
        assert_eq!(HitKind::Knee.cue(), HitCue::Heavy);
        assert_eq!(HitKind::Special.cue(), HitCue::Medium);
        assert_eq!(HitKind::DoublePunch.cue(), HitCue::Light);
    }

    #[test]
    fn test_first_hit_wins() {
        let mut target = defender();
        let punch = AttackProfile {
            punching: true,
            ..Default::default()
        };
        let kick = AttackProfile {
            kicking: true,
            ..Default::default()
        };

        let first = check_hit(&strike(punch, 5.0), &mut target);
        let second = check_hit(&strike(kick, 5.0), &mut target);

        assert!(first.is_some());
        assert!(second.is_none());
        assert!(target.is_stunned());
        assert_eq!(target.health(), 75.0 - 1.0);
    }

    #[test]
    fn test_miss_leaves_defender_untouched() {
        let mut target = defender();
        let special = AttackProfile {
            special: true,
            ..Default::default()
        };
        assert!(check_hit(&strike(special, 40.0), &mut target).is_none());
        assert!(!target.is_stunned());
        assert_eq!(target.health(), 75.0);
    }

    fn any_profile() -> impl Strategy<Value = AttackProfile> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(knee, kicking, punching, double_punching, special)| AttackProfile {
                knee,
                kicking,
                punching,
                double_punching,
                special,
            },
        )
    }

    proptest! {
        #[test]
        fn test_out_of_reach_never_damages(
            attacker in 0usize..4,
            defender_id in 0usize..4,
            profile in any_profile(),
            excess in 0.001f32..50.0,
            leftward in any::<bool>(),
        ) {
            let table = ArchetypeTable::builtin();
            let a = table.get(ArchetypeId::new(attacker as u8)).unwrap();
            let d = table.get(ArchetypeId::new(defender_id as u8)).unwrap();
            let spacing = a.closeness.max(d.closeness);
            let reach = a.range.punch
                .max(a.range.kick)
                .max(a.range.special)
                .max(KNEE_REACH)
                .max(DOUBLE_PUNCH_REACH);
            let gap = spacing + reach + excess;

            let s = Strike {
                attacker: PlayerSlot::Left,
                attacker_x: 0.0,
                defender_x: if leftward { -gap } else { gap },
                spacing,
                range: a.range,
                damage: a.damage,
                profile,
            };

            let mut target = Fighter::new(PlayerSlot::Right, ArchetypeId::new(defender_id as u8), &table).unwrap();
            prop_assert!(check_hit(&s, &mut target).is_none());
            prop_assert_eq!(target.health(), 75.0);
        }
    }
}
