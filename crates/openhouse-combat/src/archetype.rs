//! Fighter archetype tuning.
//!
//! This module provides:
//! - Per-archetype timing bounds, ranges and damage values
//! - Kick and special move styles
//! - Animation clip mapping for the renderer
//! - The immutable archetype table, built in or loaded from RON

use std::path::Path;
use std::sync::Arc;

use openhouse_common::{ArchetypeError, ArchetypeId, OpenHouseResult, SchemaVersion, TuningError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::attacks::{KICK_END, SPIN_STEP, SPIN_STRIKES, STUN_KICK_RESET, STUN_SPECIAL_RESET};

/// Number of entries in an archetype's clip table.
pub const CLIP_SLOTS: usize = 10;

/// Number of limb-chain offsets carried per archetype.
pub const LIMB_SCALE_COUNT: usize = 6;

/// Limb-chain offsets shared by every built-in archetype.
pub const DEFAULT_LIMB_SCALES: [f32; LIMB_SCALE_COUNT] = [0.4, 0.235, 0.21, 0.265, 0.232, 0.1];

// ============================================================================
// Clip Slots
// ============================================================================

/// Abstract action ids that map onto renderer clip indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipSlot {
    /// Idle stance.
    Stance,
    /// Walking either direction.
    Walk,
    /// Hit reaction.
    Stun,
    /// Punch.
    Punch,
    /// Kick.
    Kick,
    /// Special move.
    Special,
    /// Block (mapped but never selected).
    Block,
    /// Jump (mapped but never selected).
    Jump,
}

impl ClipSlot {
    /// Index into the archetype clip table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Stance => 0,
            Self::Walk => 1,
            Self::Stun => 2,
            Self::Punch => 3,
            Self::Kick => 4,
            Self::Special => 5,
            Self::Block => 6,
            Self::Jump => 7,
        }
    }
}

// ============================================================================
// Move Styles
// ============================================================================

/// Maximum hit distance per attack, added to the current spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackRange {
    /// Punch reach.
    pub punch: f32,
    /// Kick reach.
    pub kick: f32,
    /// Special move reach.
    pub special: f32,
}

/// Damage dealt per attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackDamage {
    /// Punch damage.
    pub punch: f32,
    /// Kick damage.
    pub kick: f32,
    /// Special move damage.
    pub special: f32,
    /// Bonus damage, used by both the knee strike and the double punch.
    pub bonus: f32,
}

/// Counter values at which a two-hit kick strikes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KneeStrike {
    /// Counter value of the knee hit.
    pub knee_at: f32,
    /// Counter value of the follow-up kick hit.
    pub kick_at: f32,
}

/// How an archetype's kick counter advances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KickStyle {
    /// Counter increment per tick while the kick is active.
    pub step: f32,
    /// Two-hit kick thresholds. Without one, the kick strikes once at its end.
    pub knee: Option<KneeStrike>,
}

/// Special move variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpecialStyle {
    /// Full-body spin striking at 180, 360 and 540 degrees.
    Spin,
    /// Fixed-length animation striking at each listed counter value.
    /// The last value ends the active phase.
    Strikes {
        /// Strike thresholds, strictly increasing.
        at: Vec<f32>,
    },
}

// ============================================================================
// Archetype
// ============================================================================

/// Immutable tuning data for one fighter archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Display name.
    pub name: String,
    /// Punch counter start value, and its resting value after recovery.
    pub punch_counter_max: f32,
    /// Special counter resting value.
    pub special_counter_bound: f32,
    /// Kick counter resting value.
    pub kick_counter_base: f32,
    /// Minimum gap kept while walking toward the rival.
    pub closeness: f32,
    /// Hit reach per attack.
    pub range: AttackRange,
    /// Damage per attack.
    pub damage: AttackDamage,
    /// Renderer clip index per [`ClipSlot`]; `None` where no clip exists.
    pub clips: [Option<u32>; CLIP_SLOTS],
    /// Limb-chain offsets for the renderer.
    pub limb_scales: [f32; LIMB_SCALE_COUNT],
    /// Kick timing.
    pub kick: KickStyle,
    /// Special move timing.
    pub special: SpecialStyle,
    /// Whether a punch can chain into a double punch.
    pub double_punch: bool,
}

impl Archetype {
    /// Clip index for an action, if the archetype has one.
    #[must_use]
    pub fn clip(&self, slot: ClipSlot) -> Option<u32> {
        self.clips[slot.index()]
    }

    /// Checks that every counter threshold is reachable and every value is in domain.
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |reason: String| TuningError::Invalid {
            archetype: self.name.clone(),
            reason,
        };

        let scalars = [
            ("punch_counter_max", self.punch_counter_max),
            ("closeness", self.closeness),
            ("range.punch", self.range.punch),
            ("range.kick", self.range.kick),
            ("range.special", self.range.special),
            ("damage.punch", self.damage.punch),
            ("damage.kick", self.damage.kick),
            ("damage.special", self.damage.special),
            ("damage.bonus", self.damage.bonus),
        ];
        for (field, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{field} must be finite and non-negative, got {value}")));
            }
        }
        if self.punch_counter_max <= 0.0 {
            return Err(invalid("punch_counter_max must be positive".to_string()));
        }
        if self.limb_scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(invalid("limb scales must be positive".to_string()));
        }

        if !self.kick.step.is_finite() || self.kick.step <= 0.0 {
            return Err(invalid(format!("kick step must be positive, got {}", self.kick.step)));
        }
        if self.kick_counter_base >= KICK_END {
            return Err(invalid(format!(
                "kick base {} must be below {KICK_END}",
                self.kick_counter_base
            )));
        }
        if let Some(knee) = self.kick.knee {
            // Kicks start from the base, or from the stun reset value.
            for at in [knee.knee_at, knee.kick_at] {
                let reachable = reached_from(self.kick_counter_base, at, self.kick.step)
                    && reached_from(STUN_KICK_RESET, at, self.kick.step);
                if !reachable || at >= KICK_END {
                    return Err(invalid(format!("kick threshold {at} is never reached")));
                }
            }
            if knee.knee_at >= knee.kick_at {
                return Err(invalid("knee strike must come before the kick strike".to_string()));
            }
        }

        match &self.special {
            SpecialStyle::Spin => {
                let bound = self.special_counter_bound;
                if bound % SPIN_STEP != 0.0 || bound.abs() >= SPIN_STRIKES[0] {
                    return Err(invalid(format!(
                        "spin rest value {bound} must be a multiple of {SPIN_STEP} below {}",
                        SPIN_STRIKES[0]
                    )));
                }
            }
            SpecialStyle::Strikes { at } => {
                if at.is_empty() {
                    return Err(invalid("special needs at least one strike".to_string()));
                }
                // Specials start from the bound, or from either stun reset value.
                let starts = [self.special_counter_bound, STUN_SPECIAL_RESET, -STUN_SPECIAL_RESET];
                let mut previous = self.special_counter_bound;
                for &threshold in at {
                    let reachable = starts.iter().all(|&start| reached_from(start, threshold, 1.0));
                    if threshold <= previous || !reachable {
                        return Err(invalid(format!(
                            "special strike {threshold} is never reached"
                        )));
                    }
                    previous = threshold;
                }
            }
        }

        Ok(())
    }

    /// The hand fighter: long punch wind-up, slow kick, two-hit special.
    #[must_use]
    pub fn hand_fighter() -> Self {
        Self {
            name: "Hand Fighter".to_string(),
            punch_counter_max: 200.0,
            special_counter_bound: 0.0,
            kick_counter_base: -50.0,
            closeness: 12.0,
            range: AttackRange {
                punch: 6.0,
                kick: 6.0,
                special: 6.0,
            },
            damage: AttackDamage {
                punch: 2.0,
                kick: 2.5,
                special: 1.0,
                bonus: 0.5,
            },
            clips: clip_table([Some(3), Some(5), Some(1), Some(2), Some(0), Some(4)]),
            limb_scales: DEFAULT_LIMB_SCALES,
            kick: KickStyle {
                step: 2.5,
                knee: None,
            },
            special: SpecialStyle::Strikes {
                at: vec![65.0, 85.0],
            },
            double_punch: false,
        }
    }

    /// The OG fighter. Left and right models differ only in the
    /// spin rest value and clip mapping.
    #[must_use]
    pub fn og_fighter(slot_model: ArchetypeId) -> Self {
        let (name, bound, clips) = if slot_model == ArchetypeId::OG_RIGHT {
            (
                "Original Fighter (Right)",
                30.0,
                clip_table([None, None, Some(7), Some(4), Some(3), Some(6)]),
            )
        } else {
            (
                "Original Fighter (Left)",
                -30.0,
                clip_table([Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)]),
            )
        };
        Self {
            name: name.to_string(),
            punch_counter_max: 50.0,
            special_counter_bound: bound,
            kick_counter_base: 22.0,
            closeness: 5.5,
            range: AttackRange {
                punch: 8.0,
                kick: 7.0,
                special: 8.0,
            },
            damage: AttackDamage {
                punch: 1.0,
                kick: 2.5,
                special: 0.5,
                bonus: 0.5,
            },
            clips,
            limb_scales: DEFAULT_LIMB_SCALES,
            kick: KickStyle {
                step: 12.0,
                knee: None,
            },
            special: SpecialStyle::Spin,
            double_punch: true,
        }
    }

    /// Monday Memo: heavy punch, knee-then-kick combo, single-hit special.
    #[must_use]
    pub fn monday_memo() -> Self {
        Self {
            name: "Monday Memo".to_string(),
            punch_counter_max: 225.0,
            special_counter_bound: 0.0,
            kick_counter_base: 0.0,
            closeness: 6.0,
            range: AttackRange {
                punch: 3.0,
                kick: 7.0,
                special: 4.0,
            },
            damage: AttackDamage {
                punch: 5.0,
                kick: 2.5,
                special: 3.5,
                bonus: 1.5,
            },
            clips: clip_table([Some(5), Some(8), Some(7), Some(4), Some(3), Some(6)]),
            limb_scales: DEFAULT_LIMB_SCALES,
            kick: KickStyle {
                step: 1.0,
                knee: Some(KneeStrike {
                    knee_at: 30.0,
                    kick_at: 50.0,
                }),
            },
            special: SpecialStyle::Strikes { at: vec![75.0] },
            double_punch: false,
        }
    }
}

/// Whether counting up from `start` by `step` lands exactly on `at`.
fn reached_from(start: f32, at: f32, step: f32) -> bool {
    let ticks = (at - start) / step;
    ticks > 0.0 && ticks.fract() == 0.0
}

/// Expands the six mapped clips (stance through special) into a full table.
fn clip_table(mapped: [Option<u32>; 6]) -> [Option<u32>; CLIP_SLOTS] {
    let mut clips = [None; CLIP_SLOTS];
    clips[..mapped.len()].copy_from_slice(&mapped);
    clips
}

// ============================================================================
// Archetype Table
// ============================================================================

/// On-disk form of an archetype table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableFile {
    version: SchemaVersion,
    archetypes: Vec<Archetype>,
}

/// Read-only archetype lookup keyed by [`ArchetypeId`].
///
/// Tables are validated on construction and never mutated afterwards.
/// Fighters hold shared handles to individual entries.
#[derive(Debug, Clone)]
pub struct ArchetypeTable {
    version: SchemaVersion,
    archetypes: Vec<Arc<Archetype>>,
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ArchetypeTable {
    /// The four built-in archetypes, in id order.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            version: SchemaVersion::TUNING_TABLE,
            archetypes: vec![
                Arc::new(Archetype::hand_fighter()),
                Arc::new(Archetype::og_fighter(ArchetypeId::OG_LEFT)),
                Arc::new(Archetype::og_fighter(ArchetypeId::OG_RIGHT)),
                Arc::new(Archetype::monday_memo()),
            ],
        }
    }

    /// Builds a validated table from archetypes in id order.
    pub fn from_archetypes(archetypes: Vec<Archetype>) -> Result<Self, TuningError> {
        if archetypes.is_empty() {
            return Err(TuningError::Empty);
        }
        if archetypes.len() > usize::from(u8::MAX) + 1 {
            return Err(TuningError::Invalid {
                archetype: "<table>".to_string(),
                reason: format!("{} archetypes exceed the id space", archetypes.len()),
            });
        }
        for archetype in &archetypes {
            archetype.validate()?;
        }
        Ok(Self {
            version: SchemaVersion::TUNING_TABLE,
            archetypes: archetypes.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parses and validates a RON tuning table.
    pub fn from_ron_str(source: &str) -> Result<Self, TuningError> {
        let file: TableFile =
            ron::from_str(source).map_err(|e| TuningError::Parse(e.to_string()))?;
        if !SchemaVersion::TUNING_TABLE.can_read(&file.version) {
            return Err(TuningError::VersionMismatch {
                expected: SchemaVersion::TUNING_TABLE,
                actual: file.version,
            });
        }
        let mut table = Self::from_archetypes(file.archetypes)?;
        table.version = file.version;
        debug!(
            "Parsed tuning table v{} with {} archetypes",
            table.version,
            table.len()
        );
        Ok(table)
    }

    /// Loads a RON tuning table from disk.
    pub fn load(path: impl AsRef<Path>) -> OpenHouseResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let table = Self::from_ron_str(&contents)?;
        info!("Loaded {} archetypes from {}", table.len(), path.display());
        Ok(table)
    }

    /// Serializes the table as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, TuningError> {
        let file = TableFile {
            version: self.version,
            archetypes: self.archetypes.iter().map(|a| Archetype::clone(a)).collect(),
        };
        ron::ser::to_string_pretty(&file, ron::ser::PrettyConfig::default())
            .map_err(|e| TuningError::Parse(e.to_string()))
    }

    /// Looks up an archetype, failing on ids outside the table.
    pub fn get(&self, id: ArchetypeId) -> Result<&Arc<Archetype>, ArchetypeError> {
        self.archetypes
            .get(id.index())
            .ok_or(ArchetypeError::Unknown {
                id: id.raw(),
                available: self.archetypes.len(),
            })
    }

    /// Whether the id names an archetype in this table.
    #[must_use]
    pub fn contains(&self, id: ArchetypeId) -> bool {
        id.index() < self.archetypes.len()
    }

    /// Schema version the table was built or loaded with.
    #[must_use]
    pub const fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Number of archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Whether the table is empty. Validated tables never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Iterates over `(id, archetype)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ArchetypeId, &Arc<Archetype>)> {
        self.archetypes
            .iter()
            .enumerate()
            .map(|(i, a)| (ArchetypeId::new(i as u8), a))
    }
}
