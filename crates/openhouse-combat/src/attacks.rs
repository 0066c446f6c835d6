//! Per-tick sub-steps of the fighter state machine.
//!
//! Every threshold here is an animation-timing contract: hit frames land on
//! exact counter values, so the constants must not be rescaled.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::archetype::{ClipSlot, SpecialStyle};
use crate::fighter::{
    AttackState, Fighter, Movement, Vertical, ARENA_EDGE, JUMP_CEILING, JUMP_RATE, STUN_FRAMES,
    WALK_STEP,
};
use crate::hit::{AttackProfile, Strike};
use crate::pose::{Arm, Leg, Limb};
use crate::snapshot::OpponentSnapshot;

/// Kick counter value ending the active phase.
pub const KICK_END: f32 = 100.0;
/// Kick counter decrement per recovery tick.
pub const KICK_DECAY: f32 = 4.0;
/// Punch counter change per tick.
pub const PUNCH_STEP: f32 = 5.0;
/// Constant upper-arm `z` rotation while punching.
pub const PUNCH_ARM_TWIST: f32 = 33.0;
/// Torso `z` rotation per double-punch tick.
pub const DOUBLE_PUNCH_TURN: f32 = 10.0;
/// Spin counter change per tick.
pub const SPIN_STEP: f32 = 15.0;
/// Spin angles that strike; the last ends the spin.
pub const SPIN_STRIKES: [f32; 3] = [180.0, 360.0, 540.0];
/// Spin counter decrement per recovery tick.
pub const SPIN_DECAY: f32 = 5.0;
/// Spin recovery ends at this angle.
pub const SPIN_REST_EXIT: f32 = 390.0;
/// Spin counter magnitude after recovery.
pub const SPIN_RESET: f32 = 30.0;
/// Counter decrement per recovery tick of a strike-style special.
pub const STRIKES_DECAY: f32 = 10.0;
/// Kick counter after being stunned.
pub const STUN_KICK_RESET: f32 = 22.0;
/// Punch counter after being stunned.
pub const STUN_PUNCH_RESET: f32 = 50.0;
/// Special counter magnitude after being stunned.
pub const STUN_SPECIAL_RESET: f32 = 30.0;
/// Horizontal nudge per stun recovery tick.
pub const STUN_NUDGE: f32 = 0.1;
/// Torso sway per remaining stun frame.
pub const STUN_SWAY: f32 = 0.3;

impl Fighter {
    fn strike(&self, rival: &OpponentSnapshot, knee: bool) -> Strike {
        Strike {
            attacker: self.slot(),
            attacker_x: self.position_x,
            defender_x: rival.position_x,
            spacing: self.spacing,
            range: self.archetype.range,
            damage: self.archetype.damage,
            profile: AttackProfile {
                knee,
                kicking: self.attack == AttackState::Kick,
                punching: matches!(self.attack, AttackState::Punch { .. }),
                double_punching: self.attack.double_punch_pending(),
                special: self.attack == AttackState::Special,
            },
        }
    }

    pub(crate) fn step_stun(&mut self) {
        let f = self.facing().sign();

        if self.stun_pending {
            self.ready_stance();
            self.set_clip(ClipSlot::Stun);
            self.kick_counter = STUN_KICK_RESET;
            self.punch_counter = STUN_PUNCH_RESET;
            self.special_counter = f * STUN_SPECIAL_RESET;
            self.stun_frames -= 1;
            self.stun_pending = false;
            debug!("{} stunned", self.slot());
        } else if self.stun_frames < STUN_FRAMES {
            if self.position_x * f >= -ARENA_EDGE {
                self.position_x -= f * STUN_NUDGE;
            }
            self.pose[Limb::Torso].x -= f * STUN_SWAY * self.stun_frames as f32;
            self.stun_frames -= 1;

            if self.stun_frames <= 0 {
                self.stun_frames = STUN_FRAMES;
                self.pose[Limb::Torso].x = 0.0;
                self.set_clip(ClipSlot::Stance);
                debug!("{} recovered from stun", self.slot());
            }
        }
    }

    pub(crate) fn step_walk(&mut self, rival: &OpponentSnapshot) {
        let f = self.facing().sign();
        let blocked = matches!(
            self.attack,
            AttackState::Kick | AttackState::KickRecovery | AttackState::DoublePunchRecovery
        ) || self.stun_pending
            || self.stun_frames < STUN_FRAMES
            || self.is_down();

        match self.movement {
            Movement::Forward if !blocked => {
                if (rival.position_x - self.position_x) * f >= self.spacing {
                    self.position_x += f * WALK_STEP;
                    self.set_clip(ClipSlot::Walk);
                }
            }
            Movement::Backward if !blocked => {
                if self.position_x * f >= -ARENA_EDGE {
                    self.position_x -= f * WALK_STEP;
                    self.set_clip(ClipSlot::Walk);
                }
            }
            Movement::Idle if !self.attack.is_attacking() && self.stun_frames >= STUN_FRAMES => {
                self.set_clip(ClipSlot::Stance);
            }
            _ => {}
        }
    }

    pub(crate) fn step_jump(&mut self) {
        if self.vertical == Vertical::Rising {
            self.height += 0.5 * self.jump_rate;
            if self.height >= JUMP_CEILING {
                self.vertical = Vertical::Falling;
            }
        }

        if self.vertical == Vertical::Falling {
            self.height -= 0.5 * self.jump_rate;
            if self.height <= 0.0 {
                self.height = 0.0;
                self.vertical = Vertical::Grounded;
                self.jump_rate = JUMP_RATE;
                trace!("{} landed", self.slot());
            }
        }
    }

    pub(crate) fn step_kick(&mut self, rival: &OpponentSnapshot, strikes: &mut Vec<Strike>) {
        let thigh = Leg::lead(self.facing()).thigh;
        let base = self.archetype.kick_counter_base;
        let style = self.archetype.kick;

        match self.attack {
            AttackState::Kick => {
                self.kick_counter += style.step;
                self.set_clip(ClipSlot::Kick);

                if let Some(knee) = style.knee {
                    if self.kick_counter == knee.knee_at {
                        strikes.push(self.strike(rival, true));
                    } else if self.kick_counter == knee.kick_at {
                        strikes.push(self.strike(rival, false));
                    }
                }

                if self.kick_counter >= KICK_END {
                    if style.knee.is_none() {
                        strikes.push(self.strike(rival, false));
                    }
                    self.attack = AttackState::KickRecovery;
                    debug!("{} kick recovering", self.slot());
                }
                self.pose[thigh].x = self.kick_counter;
            }
            AttackState::KickRecovery => {
                self.kick_counter -= KICK_DECAY;
                self.set_clip(ClipSlot::Kick);
                self.pose[thigh].x = self.kick_counter;

                if self.kick_counter <= base {
                    self.kick_counter = base;
                    self.ready_stance();
                    self.set_clip(ClipSlot::Stance);
                    debug!("{} kick finished", self.slot());
                }
            }
            _ => {}
        }
    }

    pub(crate) fn step_punch(&mut self, rival: &OpponentSnapshot, strikes: &mut Vec<Strike>) {
        let facing = self.facing();
        let f = facing.sign();
        let lead = Arm::lead(facing);
        let max = self.archetype.punch_counter_max;

        match self.attack {
            AttackState::Punch { follow_up } => {
                self.punch_counter -= PUNCH_STEP;
                self.set_clip(ClipSlot::Punch);

                if self.punch_counter <= 0.0 {
                    strikes.push(self.strike(rival, false));
                    self.attack = AttackState::PunchRecovery { follow_up };
                    self.set_clip(ClipSlot::Stance);
                }

                let pc = self.punch_counter;
                self.pose[lead.upper].z = f * PUNCH_ARM_TWIST;
                self.pose[lead.upper].y = f * pc;
                self.pose[lead.fore].y = -2.0 * f * pc;
                self.pose[lead.fore].z = 0.0;
            }
            AttackState::PunchRecovery { follow_up } => {
                self.punch_counter += PUNCH_STEP;
                let pc = self.punch_counter;
                self.pose[lead.upper].y = f * pc;
                self.pose[lead.fore].y = -2.0 * f * pc;

                if self.punch_counter >= max {
                    self.punch_counter = max;
                    self.attack = if follow_up {
                        AttackState::DoublePunch
                    } else {
                        AttackState::Ready
                    };
                    self.pose[lead.upper].y = lead.ready_upper_y;
                    self.pose[lead.fore].y = 0.0;
                    self.pose[lead.upper].z = 0.0;
                    self.pose[lead.fore].z = lead.ready_fore_z;
                    debug!("{} punch finished", self.slot());
                }
            }
            AttackState::DoublePunch => {
                self.punch_counter -= PUNCH_STEP;
                self.pose[Limb::Torso].z -= f * DOUBLE_PUNCH_TURN;
                self.write_rear_punch();

                if self.punch_counter <= 0.0 {
                    strikes.push(self.strike(rival, false));
                    self.attack = AttackState::DoublePunchRecovery;
                    self.punch_counter = 0.0;
                }
            }
            AttackState::DoublePunchRecovery => {
                self.punch_counter += PUNCH_STEP;
                self.pose[Limb::Torso].z += f * DOUBLE_PUNCH_TURN;
                self.write_rear_punch();

                if self.punch_counter >= max {
                    self.punch_counter = max;
                    self.ready_stance();
                    debug!("{} double punch finished", self.slot());
                }
            }
            _ => {}
        }
    }

    /// Head turn and rear-arm extension shared by both double-punch phases.
    fn write_rear_punch(&mut self) {
        let facing = self.facing();
        let f = facing.sign();
        let rear = Arm::rear(facing);
        let pc = self.punch_counter;

        self.pose[Limb::Head].z = -f * pc;
        self.pose[rear.upper].z = PUNCH_ARM_TWIST;
        self.pose[rear.upper].y = f * pc;
        self.pose[rear.fore].y = -2.0 * f * pc;
        self.pose[rear.fore].z = 0.0;
    }

    pub(crate) fn step_special(&mut self, rival: &OpponentSnapshot, strikes: &mut Vec<Strike>) {
        let f = self.facing().sign();
        let archetype = Arc::clone(&self.archetype);

        match (self.attack, &archetype.special) {
            (AttackState::Special, SpecialStyle::Spin) => {
                self.special_counter += f * SPIN_STEP;
                self.pose[Limb::Torso].z = self.special_counter;

                if let Some(i) = SPIN_STRIKES
                    .iter()
                    .position(|angle| self.special_counter == f * angle)
                {
                    strikes.push(self.strike(rival, false));
                    if i == SPIN_STRIKES.len() - 1 {
                        self.attack = AttackState::SpecialRecovery;
                        debug!("{} spin unwinding", self.slot());
                    }
                }
            }
            (AttackState::Special, SpecialStyle::Strikes { at }) => {
                self.special_counter += 1.0;
                self.set_clip(ClipSlot::Special);

                if let Some(i) = at.iter().position(|t| self.special_counter == *t) {
                    strikes.push(self.strike(rival, false));
                    if i == at.len() - 1 {
                        self.attack = AttackState::SpecialRecovery;
                        debug!("{} special recovering", self.slot());
                    }
                }
            }
            (AttackState::SpecialRecovery, SpecialStyle::Spin) => {
                self.special_counter -= f * SPIN_DECAY;
                self.pose[Limb::Torso].z = self.special_counter;

                if self.special_counter == f * SPIN_REST_EXIT {
                    self.special_counter = f * SPIN_RESET;
                    self.ready_stance();
                    debug!("{} spin finished", self.slot());
                }
            }
            (AttackState::SpecialRecovery, SpecialStyle::Strikes { .. }) => {
                self.special_counter -= STRIKES_DECAY;

                if self.special_counter <= archetype.special_counter_bound {
                    self.special_counter = archetype.special_counter_bound;
                    self.ready_stance();
                    self.set_clip(ClipSlot::Stance);
                    debug!("{} special finished", self.slot());
                }
            }
            _ => {}
        }
    }
}
