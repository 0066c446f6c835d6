//! Joint rotations exposed to the renderer.
//!
//! A pose is twelve limb slots of Euler-style rotations in degrees.
//! Rotation axes 0/1/2 map to `x`/`y`/`z`.

use std::ops::{Index, IndexMut};

use glam::Vec3;
use openhouse_common::Facing;
use serde::{Deserialize, Serialize};

/// Number of limb slots in a pose.
pub const LIMB_COUNT: usize = 12;

/// Named limb slots, in renderer bone order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Limb {
    /// Torso (root of every chain).
    Torso,
    /// Head.
    Head,
    /// Right upper arm.
    RightUpperArm,
    /// Right forearm.
    RightForearm,
    /// Right hand.
    RightHand,
    /// Left upper arm.
    LeftUpperArm,
    /// Left forearm.
    LeftForearm,
    /// Left hand.
    LeftHand,
    /// Right thigh.
    RightThigh,
    /// Right shin.
    RightShin,
    /// Left thigh.
    LeftThigh,
    /// Left shin.
    LeftShin,
}

impl Limb {
    /// All limbs in slot order.
    pub const ALL: [Self; LIMB_COUNT] = [
        Self::Torso,
        Self::Head,
        Self::RightUpperArm,
        Self::RightForearm,
        Self::RightHand,
        Self::LeftUpperArm,
        Self::LeftForearm,
        Self::LeftHand,
        Self::RightThigh,
        Self::RightShin,
        Self::LeftThigh,
        Self::LeftShin,
    ];

    /// Slot index of this limb.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Upper arm and forearm of one side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arm {
    /// Upper arm slot.
    pub upper: Limb,
    /// Forearm slot.
    pub fore: Limb,
    /// Ready-stance upper arm `y` rotation.
    pub ready_upper_y: f32,
    /// Ready-stance forearm `z` rotation.
    pub ready_fore_z: f32,
}

impl Arm {
    const RIGHT: Self = Self {
        upper: Limb::RightUpperArm,
        fore: Limb::RightForearm,
        ready_upper_y: 60.0,
        ready_fore_z: 120.0,
    };
    const LEFT: Self = Self {
        upper: Limb::LeftUpperArm,
        fore: Limb::LeftForearm,
        ready_upper_y: -60.0,
        ready_fore_z: -120.0,
    };

    /// The arm nearest the rival.
    #[must_use]
    pub const fn lead(facing: Facing) -> Self {
        match facing {
            Facing::PositiveX => Self::RIGHT,
            Facing::NegativeX => Self::LEFT,
        }
    }

    /// The arm away from the rival.
    #[must_use]
    pub const fn rear(facing: Facing) -> Self {
        Self::lead(facing.flipped())
    }
}

/// Thigh and shin of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    /// Thigh slot.
    pub thigh: Limb,
    /// Shin slot.
    pub shin: Limb,
}

impl Leg {
    /// The leg nearest the rival, which also does the kicking.
    #[must_use]
    pub const fn lead(facing: Facing) -> Self {
        match facing {
            Facing::PositiveX => Self {
                thigh: Limb::RightThigh,
                shin: Limb::RightShin,
            },
            Facing::NegativeX => Self {
                thigh: Limb::LeftThigh,
                shin: Limb::LeftShin,
            },
        }
    }

    /// The leg away from the rival.
    #[must_use]
    pub const fn rear(facing: Facing) -> Self {
        Self::lead(facing.flipped())
    }
}

/// Full-body joint rotations for one fighter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose([Vec3; LIMB_COUNT]);

impl Default for Pose {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Pose {
    /// All rotations zero (the spread pose).
    #[must_use]
    pub const fn zeroed() -> Self {
        Self([Vec3::ZERO; LIMB_COUNT])
    }

    /// Canonical idle pose. Depends only on facing.
    #[must_use]
    pub fn ready(facing: Facing) -> Self {
        let f = facing.sign();
        let mut pose = Self::zeroed();

        pose[Limb::Torso].z = -f * 33.0;
        pose[Limb::Head].z = -f * 50.0;

        for arm in [Arm::RIGHT, Arm::LEFT] {
            pose[arm.upper].y = arm.ready_upper_y;
            pose[arm.fore].z = arm.ready_fore_z;
        }

        let lead = Leg::lead(facing);
        pose[lead.thigh].z = -f * 64.0;
        pose[lead.thigh].x = 22.0;
        pose[lead.shin].x = -22.0;

        pose
    }

    /// Rotations in slot order.
    #[must_use]
    pub const fn as_array(&self) -> &[Vec3; LIMB_COUNT] {
        &self.0
    }

    /// Rotations flattened to `[limb][axis]` degrees.
    #[must_use]
    pub fn to_degrees_table(&self) -> [[f32; 3]; LIMB_COUNT] {
        self.0.map(|v| v.to_array())
    }
}

impl Index<Limb> for Pose {
    type Output = Vec3;

    fn index(&self, limb: Limb) -> &Self::Output {
        &self.0[limb.index()]
    }
}

impl IndexMut<Limb> for Pose {
    fn index_mut(&mut self, limb: Limb) -> &mut Self::Output {
        &mut self.0[limb.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limb_slots() {
        assert_eq!(Limb::Torso.index(), 0);
        assert_eq!(Limb::LeftUpperArm.index(), 5);
        assert_eq!(Limb::LeftShin.index(), 11);
        for (i, limb) in Limb::ALL.iter().enumerate() {
            assert_eq!(limb.index(), i);
        }
    }

    #[test]
    fn test_ready_pose_facing_right() {
        let pose = Pose::ready(Facing::PositiveX);
        assert_eq!(pose[Limb::Torso], Vec3::new(0.0, 0.0, -33.0));
        assert_eq!(pose[Limb::Head], Vec3::new(0.0, 0.0, -50.0));
        assert_eq!(pose[Limb::RightUpperArm].y, 60.0);
        assert_eq!(pose[Limb::RightForearm].z, 120.0);
        assert_eq!(pose[Limb::LeftUpperArm].y, -60.0);
        assert_eq!(pose[Limb::LeftForearm].z, -120.0);
        assert_eq!(pose[Limb::RightThigh], Vec3::new(22.0, 0.0, -64.0));
        assert_eq!(pose[Limb::RightShin].x, -22.0);
        assert_eq!(pose[Limb::LeftThigh], Vec3::ZERO);
        assert_eq!(pose[Limb::LeftShin], Vec3::ZERO);
    }

    #[test]
    fn test_ready_pose_is_mirrored() {
        let right = Pose::ready(Facing::PositiveX);
        let left = Pose::ready(Facing::NegativeX);

        assert_eq!(left[Limb::Torso].z, -right[Limb::Torso].z);
        assert_eq!(left[Limb::Head].z, -right[Limb::Head].z);
        // Arms are identical; only the lead leg swaps sides.
        assert_eq!(left[Limb::RightUpperArm], right[Limb::RightUpperArm]);
        assert_eq!(left[Limb::LeftForearm], right[Limb::LeftForearm]);
        assert_eq!(left[Limb::LeftThigh].x, right[Limb::RightThigh].x);
        assert_eq!(left[Limb::LeftThigh].z, -right[Limb::RightThigh].z);
        assert_eq!(left[Limb::RightThigh], Vec3::ZERO);
    }

    #[test]
    fn test_lead_and_rear_sides() {
        assert_eq!(Arm::lead(Facing::PositiveX).upper, Limb::RightUpperArm);
        assert_eq!(Arm::rear(Facing::PositiveX).upper, Limb::LeftUpperArm);
        assert_eq!(Leg::lead(Facing::NegativeX).thigh, Limb::LeftThigh);
        assert_eq!(Leg::rear(Facing::NegativeX).thigh, Limb::RightThigh);
        assert_eq!(Arm::rear(Facing::NegativeX), Arm::lead(Facing::PositiveX));
        assert_eq!(Arm::RIGHT.ready_upper_y, -Arm::LEFT.ready_upper_y);
    }

    #[test]
    fn test_degrees_table() {
        let table = Pose::ready(Facing::PositiveX).to_degrees_table();
        assert_eq!(table[0], [0.0, 0.0, -33.0]);
        assert_eq!(Pose::zeroed().to_degrees_table(), [[0.0; 3]; LIMB_COUNT]);
    }
}
