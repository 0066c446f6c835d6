//! Event bus for combat notifications (HUD, audio, logging).

use crossbeam_channel::{bounded, Receiver, Sender};
use openhouse_common::PlayerSlot;
use serde::{Deserialize, Serialize};

use crate::hit::HitKind;

/// Audio category of a landed hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitCue {
    /// Punches.
    Light,
    /// Special moves.
    Medium,
    /// Kicks and knees.
    Heavy,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// One fighter is still standing.
    Winner(PlayerSlot),
    /// Both fighters went down on the same tick.
    Draw,
}

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A round began (restart or fighter select).
    RoundStarted,
    /// A strike connected.
    HitLanded {
        /// Attacking slot
        attacker: PlayerSlot,
        /// Defending slot
        defender: PlayerSlot,
        /// What connected
        kind: HitKind,
        /// Damage dealt
        damage: f32,
        /// Audio category
        cue: HitCue,
    },
    /// A fighter entered stun.
    Stunned {
        /// Stunned slot
        slot: PlayerSlot,
    },
    /// A fighter's health reached zero.
    KnockedOut {
        /// Fallen slot
        slot: PlayerSlot,
    },
    /// Simulation paused.
    Paused,
    /// Simulation resumed.
    Resumed,
    /// The round ended.
    RoundOver {
        /// Result
        outcome: Outcome,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CombatEvent) {
        // Non-blocking; a full bus drops the event
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }

    /// Creates a receiver handle, e.g. for an audio thread.
    ///
    /// Receivers compete for events; each event is delivered once.
    #[must_use]
    pub fn receiver(&self) -> Receiver<CombatEvent> {
        self.receiver.clone()
    }
}
