//! Read-only view of the rival taken before either fighter advances.

use openhouse_common::{ArchetypeId, PlayerSlot};
use serde::{Deserialize, Serialize};

/// Public state of one fighter as seen by the other during a tick.
///
/// Both snapshots of a tick are taken before either fighter advances, so
/// spacing and hit checks never observe a half-updated rival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentSnapshot {
    /// Slot of the fighter this snapshot describes.
    pub slot: PlayerSlot,
    /// Archetype of the fighter.
    pub archetype: ArchetypeId,
    /// Closeness factor of the fighter's archetype.
    pub closeness: f32,
    /// Horizontal position.
    pub position_x: f32,
    /// Jump height.
    pub height: f32,
    /// Any attack or recovery in progress.
    pub attacking: bool,
    /// Kick active phase.
    pub kicking: bool,
    /// Punch active phase.
    pub punching: bool,
    /// Double punch queued or active.
    pub double_punching: bool,
    /// Special move active phase.
    pub special: bool,
    /// A stun landed and has not been processed yet.
    pub is_stunned: bool,
    /// Stun recovery frames left; equals the maximum when not stunned.
    pub stun_frames_remaining: i32,
    /// Tick counter at capture time.
    pub tick: u64,
}
