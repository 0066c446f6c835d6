//! Per-fighter combat state.
//!
//! This module provides:
//! - Explicit state families (movement, vertical, attack)
//! - Command entry points that only schedule eligible actions
//! - Accessors for the renderer, HUD and camera
//! - The per-tick `advance` step (sub-steps live in `attacks`)

use std::sync::Arc;

use openhouse_common::{ArchetypeError, ArchetypeId, Facing, PlayerSlot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::archetype::{Archetype, ArchetypeTable, ClipSlot, LIMB_SCALE_COUNT};
use crate::hit::{Hit, Strike};
use crate::pose::Pose;
use crate::snapshot::OpponentSnapshot;

/// Health at the start of a round.
pub const MAX_HEALTH: f32 = 75.0;

/// Stun counter value meaning "not stunned".
pub const STUN_FRAMES: i32 = 15;

/// Distance of each spawn point from the arena center.
pub const SPAWN_DISTANCE: f32 = 18.0;

/// Backward walking and stun nudges stop past this distance from center.
pub const ARENA_EDGE: f32 = 28.0;

/// Horizontal distance walked per tick, either direction.
pub const WALK_STEP: f32 = 0.3;

/// Jump height at which rising turns into falling.
pub const JUMP_CEILING: f32 = 14.0;

/// Jump ramp rate of a fighter's first jump.
pub const FIRST_JUMP_RATE: f32 = 10.0;

/// Jump ramp rate after landing.
pub const JUMP_RATE: f32 = 5.0;

// ============================================================================
// State Families
// ============================================================================

/// Horizontal intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    /// Standing still.
    #[default]
    Idle,
    /// Walking toward the rival.
    Forward,
    /// Walking away from the rival.
    Backward,
}

/// Jump phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vertical {
    /// On the ground.
    #[default]
    Grounded,
    /// Going up.
    Rising,
    /// Coming down.
    Falling,
}

/// Attack phase. At most one attack family is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackState {
    /// Free to act.
    #[default]
    Ready,
    /// Punch extending; `follow_up` queues a double punch.
    Punch {
        /// Double punch queued.
        follow_up: bool,
    },
    /// Punch retracting.
    PunchRecovery {
        /// Double punch queued.
        follow_up: bool,
    },
    /// Second punch with the rear arm.
    DoublePunch,
    /// Second punch retracting.
    DoublePunchRecovery,
    /// Kick extending.
    Kick,
    /// Kick retracting.
    KickRecovery,
    /// Special move active.
    Special,
    /// Special move decaying back to rest.
    SpecialRecovery,
}

impl AttackState {
    /// Any attack or recovery in progress.
    #[must_use]
    pub const fn is_attacking(self) -> bool {
        !matches!(self, Self::Ready)
    }

    /// Double punch queued or active.
    #[must_use]
    pub const fn double_punch_pending(self) -> bool {
        matches!(
            self,
            Self::Punch { follow_up: true }
                | Self::PunchRecovery { follow_up: true }
                | Self::DoublePunch
        )
    }
}

/// Output of one [`Fighter::advance`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Strikes that reached an active frame this tick, in order.
    pub strikes: Vec<Strike>,
}

// ============================================================================
// Fighter
// ============================================================================

/// One combatant: position, health, timers, state families and pose.
#[derive(Debug, Clone)]
pub struct Fighter {
    slot: PlayerSlot,
    facing: Facing,
    archetype_id: ArchetypeId,
    pub(crate) archetype: Arc<Archetype>,
    pub(crate) position_x: f32,
    pub(crate) height: f32,
    pub(crate) jump_rate: f32,
    health: f32,
    pub(crate) movement: Movement,
    pub(crate) vertical: Vertical,
    pub(crate) attack: AttackState,
    pub(crate) stun_pending: bool,
    pub(crate) stun_frames: i32,
    down: bool,
    pub(crate) kick_counter: f32,
    pub(crate) punch_counter: f32,
    pub(crate) special_counter: f32,
    pub(crate) spacing: f32,
    pub(crate) pose: Pose,
    clip: Option<u32>,
    ticks: u64,
}

impl Fighter {
    /// Creates a fighter at its slot's spawn point in the ready stance.
    pub fn new(
        slot: PlayerSlot,
        archetype_id: ArchetypeId,
        table: &ArchetypeTable,
    ) -> Result<Self, ArchetypeError> {
        let archetype = Arc::clone(table.get(archetype_id)?);
        let facing = slot.facing();
        let mut fighter = Self {
            slot,
            facing,
            archetype_id,
            spacing: archetype.closeness,
            kick_counter: archetype.kick_counter_base,
            punch_counter: archetype.punch_counter_max,
            special_counter: archetype.special_counter_bound,
            archetype,
            position_x: -facing.sign() * SPAWN_DISTANCE,
            height: 0.0,
            jump_rate: FIRST_JUMP_RATE,
            health: MAX_HEALTH,
            movement: Movement::Idle,
            vertical: Vertical::Grounded,
            attack: AttackState::Ready,
            stun_pending: false,
            stun_frames: STUN_FRAMES,
            down: false,
            pose: Pose::zeroed(),
            clip: None,
            ticks: 0,
        };
        fighter.force_idle();
        fighter.set_clip(ClipSlot::Stance);
        debug!("{} enters as {}", slot, fighter.archetype.name);
        Ok(fighter)
    }

    /// Swaps the archetype. Only meant for use between rounds.
    ///
    /// Counters are rebased on the new archetype; an unknown id leaves the
    /// fighter unchanged.
    pub fn set_archetype(
        &mut self,
        table: &ArchetypeTable,
        archetype_id: ArchetypeId,
    ) -> Result<(), ArchetypeError> {
        self.archetype = Arc::clone(table.get(archetype_id)?);
        self.archetype_id = archetype_id;
        self.reset_counters();
        debug!("{} switched to {}", self.slot, self.archetype.name);
        Ok(())
    }

    /// Resets health, position, flags, counters and pose for a new round.
    pub fn restart(&mut self) {
        self.health = MAX_HEALTH;
        self.position_x = -self.facing.sign() * SPAWN_DISTANCE;
        self.height = 0.0;
        self.vertical = Vertical::Grounded;
        self.jump_rate = FIRST_JUMP_RATE;
        self.down = false;
        self.spacing = self.archetype.closeness;
        self.ticks = 0;
        self.reset_counters();
        self.force_idle();
        self.set_clip(ClipSlot::Stance);
    }

    fn reset_counters(&mut self) {
        self.kick_counter = self.archetype.kick_counter_base;
        self.punch_counter = self.archetype.punch_counter_max;
        self.special_counter = self.archetype.special_counter_bound;
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Sets walking intent. Forward wins if both are set; neither stops.
    pub fn set_horizontal_intent(&mut self, forward: bool, backward: bool) {
        self.movement = if forward {
            Movement::Forward
        } else if backward {
            Movement::Backward
        } else {
            Movement::Idle
        };
    }

    /// Starts a jump unless one is in progress.
    pub fn request_jump(&mut self) {
        if self.vertical == Vertical::Grounded {
            self.vertical = Vertical::Rising;
        }
    }

    /// Whether a new attack may start.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        !(self.attack.is_attacking() || self.stun_busy() || self.down)
    }

    /// Stun landed or still recovering.
    fn stun_busy(&self) -> bool {
        self.stun_pending || self.stun_frames < STUN_FRAMES
    }

    /// Starts a punch, or queues a double punch during one.
    pub fn request_punch(&mut self) {
        if self.can_attack() {
            self.attack = AttackState::Punch { follow_up: false };
            debug!("{} punch", self.slot);
            return;
        }
        if !self.archetype.double_punch || self.stun_busy() || self.down {
            return;
        }
        match self.attack {
            AttackState::Punch { follow_up: false } => {
                self.attack = AttackState::Punch { follow_up: true };
                debug!("{} double punch queued", self.slot);
            }
            AttackState::PunchRecovery { follow_up: false } => {
                self.attack = AttackState::PunchRecovery { follow_up: true };
                debug!("{} double punch queued", self.slot);
            }
            _ => {}
        }
    }

    /// Starts a kick if free to act.
    pub fn request_kick(&mut self) {
        if self.can_attack() {
            self.attack = AttackState::Kick;
            debug!("{} kick", self.slot);
        }
    }

    /// Starts the special move from the spread pose if free to act.
    pub fn request_special(&mut self) {
        if self.can_attack() {
            self.attack = AttackState::Special;
            self.pose = Pose::zeroed();
            debug!("{} special", self.slot);
        }
    }

    /// Subtracts health. Not clamped; below zero means defeated.
    pub fn apply_damage(&mut self, amount: f32) {
        self.health -= amount;
    }

    /// Applies a resolved hit unless a stun is already pending.
    ///
    /// Returns whether the hit was applied.
    pub fn take_hit(&mut self, hit: &Hit) -> bool {
        if self.stun_pending {
            return false;
        }
        self.apply_damage(hit.damage);
        self.stun_pending = true;
        debug!(
            "{} hit by {:?} for {} ({} left)",
            self.slot, hit.kind, hit.damage, self.health
        );
        if self.health <= 0.0 && !self.down {
            self.down = true;
            info!("{} knocked down", self.slot);
        }
        true
    }

    /// Cancels every action, clears stun and writes the ready stance.
    pub fn force_idle(&mut self) {
        self.ready_stance();
        self.stun_pending = false;
        self.stun_frames = STUN_FRAMES;
    }

    /// Cancels movement and attacks and writes the canonical idle pose.
    pub(crate) fn ready_stance(&mut self) {
        self.movement = Movement::Idle;
        self.attack = AttackState::Ready;
        self.pose = Pose::ready(self.facing);
    }

    pub(crate) fn set_clip(&mut self, slot: ClipSlot) {
        self.clip = self.archetype.clip(slot);
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Builds the read-only view the rival consumes this tick.
    #[must_use]
    pub fn snapshot(&self) -> OpponentSnapshot {
        OpponentSnapshot {
            slot: self.slot,
            archetype: self.archetype_id,
            closeness: self.archetype.closeness,
            position_x: self.position_x,
            height: self.height,
            attacking: self.attack.is_attacking(),
            kicking: self.attack == AttackState::Kick,
            punching: matches!(self.attack, AttackState::Punch { .. }),
            double_punching: self.attack.double_punch_pending(),
            special: self.attack == AttackState::Special,
            is_stunned: self.stun_pending,
            stun_frames_remaining: self.stun_frames,
            tick: self.ticks,
        }
    }

    /// Runs one simulation tick against the rival's pre-tick snapshot.
    ///
    /// Sub-steps run in fixed order: stun, walk, jump, kick, punch, special.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot is of this fighter or was taken on a different
    /// tick; both mean the caller broke snapshot-before-advance ordering.
    pub fn advance(&mut self, rival: &OpponentSnapshot) -> TickReport {
        assert_ne!(rival.slot, self.slot, "fighter advanced against its own snapshot");
        assert_eq!(
            rival.tick, self.ticks,
            "snapshot from tick {} used on tick {}",
            rival.tick, self.ticks
        );

        self.spacing = self.archetype.closeness.max(rival.closeness);

        let mut report = TickReport::default();
        self.step_stun();
        self.step_walk(rival);
        self.step_jump();
        self.step_kick(rival, &mut report.strikes);
        self.step_punch(rival, &mut report.strikes);
        self.step_special(rival, &mut report.strikes);
        self.ticks += 1;
        report
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Player slot.
    #[must_use]
    pub const fn slot(&self) -> PlayerSlot {
        self.slot
    }

    /// Facing direction.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Archetype id.
    #[must_use]
    pub const fn archetype_id(&self) -> ArchetypeId {
        self.archetype_id
    }

    /// Archetype tuning.
    #[must_use]
    pub fn archetype(&self) -> &Archetype {
        &self.archetype
    }

    /// Horizontal position.
    #[must_use]
    pub const fn position_x(&self) -> f32 {
        self.position_x
    }

    /// Jump height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Current health, possibly negative.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health at or below zero.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Knocked down this round.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        self.down
    }

    /// A stun landed and has not been processed yet.
    #[must_use]
    pub const fn is_stunned(&self) -> bool {
        self.stun_pending
    }

    /// Stun recovery frames left; [`STUN_FRAMES`] when not stunned.
    #[must_use]
    pub const fn stun_frames_remaining(&self) -> i32 {
        self.stun_frames
    }

    /// Horizontal intent.
    #[must_use]
    pub const fn movement(&self) -> Movement {
        self.movement
    }

    /// Jump phase.
    #[must_use]
    pub const fn vertical(&self) -> Vertical {
        self.vertical
    }

    /// Attack phase.
    #[must_use]
    pub const fn attack_state(&self) -> AttackState {
        self.attack
    }

    /// Any attack or recovery in progress.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attack.is_attacking()
    }

    /// Joint rotations.
    #[must_use]
    pub const fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Renderer clip currently playing, if the archetype maps one.
    #[must_use]
    pub const fn clip(&self) -> Option<u32> {
        self.clip
    }

    /// Limb-chain offsets for the renderer.
    #[must_use]
    pub fn limb_scales(&self) -> &[f32; LIMB_SCALE_COUNT] {
        &self.archetype.limb_scales
    }

    /// Spacing factor in effect since the last tick.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Ticks advanced since the round started.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Kick counter.
    #[must_use]
    pub const fn kick_counter(&self) -> f32 {
        self.kick_counter
    }

    /// Punch counter.
    #[must_use]
    pub const fn punch_counter(&self) -> f32 {
        self.punch_counter
    }

    /// Special move counter.
    #[must_use]
    pub const fn special_counter(&self) -> f32 {
        self.special_counter
    }
}
