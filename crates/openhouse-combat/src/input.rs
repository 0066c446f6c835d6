//! Input handling for both players.
//!
//! This module provides keyboard and gamepad state tracking, per-player
//! rebindable controls, and the translation from screen-relative
//! left/right into fighter-relative forward/backward.

use std::collections::HashMap;

use openhouse_common::{Facing, PlayerSlot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fighter::Fighter;

/// Number of tracked buttons per gamepad.
pub const PAD_BUTTONS: usize = 8;

/// POV hat deflection that counts as a direction.
pub const POV_THRESHOLD: f32 = 100.0;

/// Errors that can occur in the input system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Key already bound to another action
    #[error("key {key:?} already bound to {action}")]
    KeyAlreadyBound {
        /// The key that's already bound
        key: KeyCode,
        /// The action it's bound to
        action: String,
    },
}

/// Keyboard keys used by the default controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// Z key
    Z,
    /// Space bar
    Space,
    /// Escape
    Escape,
}

/// State of a button (pressed, just pressed, released).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the button is currently held down
    pub pressed: bool,
    /// Whether the button was just pressed this frame
    pub just_pressed: bool,
    /// Whether the button was just released this frame
    pub just_released: bool,
}

impl ButtonState {
    /// Update the button state based on whether it's currently pressed.
    pub fn update(&mut self, is_pressed: bool) {
        self.just_pressed = is_pressed && !self.pressed;
        self.just_released = !is_pressed && self.pressed;
        self.pressed = is_pressed;
    }

    /// Clear the frame-specific state (just_pressed, just_released).
    pub fn clear_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Per-player actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterAction {
    /// Walk toward screen left.
    MoveLeft,
    /// Walk toward screen right.
    MoveRight,
    /// Jump.
    Jump,
    /// Punch, or chain a double punch.
    Punch,
    /// Kick.
    Kick,
    /// Special move.
    Special,
}

/// Match-wide actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalAction {
    /// Restart the round.
    Restart,
    /// Toggle pause.
    Pause,
    /// Leave a paused round for fighter select.
    Menu,
}

/// Key binding configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Primary key for this action
    pub primary: KeyCode,
    /// Optional secondary key
    pub secondary: Option<KeyCode>,
}

impl KeyBinding {
    /// Create a new key binding with only a primary key.
    #[must_use]
    pub const fn new(primary: KeyCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Create a new key binding with primary and secondary keys.
    #[must_use]
    pub const fn with_secondary(primary: KeyCode, secondary: KeyCode) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Check if a key matches this binding.
    #[must_use]
    pub fn matches(&self, key: KeyCode) -> bool {
        self.primary == key || self.secondary == Some(key)
    }

    fn keys(self) -> impl Iterator<Item = KeyCode> {
        std::iter::once(self.primary).chain(self.secondary)
    }
}

/// Gamepad state: POV hat X axis and face buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PadState {
    /// POV hat X position, -100 to 100.
    pub pov_x: f32,
    /// Button states by index.
    pub buttons: [ButtonState; PAD_BUTTONS],
}

impl PadState {
    /// Pad button that punches.
    pub const PUNCH: usize = 2;
    /// Pad button that kicks.
    pub const KICK: usize = 3;
    /// Pad button for the special move.
    pub const SPECIAL: usize = 1;
    /// Pad button that restarts the round.
    pub const RESTART: usize = 6;
    /// Pad button that toggles pause.
    pub const PAUSE: usize = 7;

    fn just_pressed(&self, button: usize) -> bool {
        self.buttons.get(button).is_some_and(|b| b.just_pressed)
    }
}

/// One player's commands for a frame, in screen terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterInput {
    /// Screen-left held.
    pub left: bool,
    /// Screen-right held.
    pub right: bool,
    /// Jump pressed this frame.
    pub jump: bool,
    /// Punch pressed this frame.
    pub punch: bool,
    /// Kick pressed this frame.
    pub kick: bool,
    /// Special pressed this frame.
    pub special: bool,
}

impl FighterInput {
    /// Translates screen directions into `(forward, backward)`.
    /// Screen-right wins when both are held.
    #[must_use]
    pub fn intent(&self, facing: Facing) -> (bool, bool) {
        let toward_right = facing == Facing::PositiveX;
        if self.right {
            (toward_right, !toward_right)
        } else if self.left {
            (!toward_right, toward_right)
        } else {
            (false, false)
        }
    }

    /// Feeds the frame's commands into a fighter.
    pub fn apply(&self, fighter: &mut Fighter) {
        let (forward, backward) = self.intent(fighter.facing());
        fighter.set_horizontal_intent(forward, backward);
        if self.jump {
            fighter.request_jump();
        }
        if self.punch {
            fighter.request_punch();
        }
        if self.kick {
            fighter.request_kick();
        }
        if self.special {
            fighter.request_special();
        }
    }
}

/// Both players' commands plus match-wide requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Commands per slot index.
    pub players: [FighterInput; 2],
    /// Restart requested.
    pub restart: bool,
    /// Pause toggle requested.
    pub pause: bool,
    /// Return to fighter select requested.
    pub menu: bool,
}

impl FrameInput {
    /// Commands for one slot.
    #[must_use]
    pub const fn player(&self, slot: PlayerSlot) -> &FighterInput {
        &self.players[slot.index()]
    }
}

/// Input manager that turns raw key and pad state into frame commands.
#[derive(Debug)]
pub struct InputManager {
    /// Current key states
    key_states: HashMap<KeyCode, ButtonState>,
    /// Per-player action bindings, by slot index
    player_bindings: [HashMap<FighterAction, KeyBinding>; 2],
    /// Match-wide bindings
    global_bindings: HashMap<GlobalAction, KeyBinding>,
    /// Gamepads, by slot index
    pads: [PadState; 2],
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Create a new input manager with default bindings.
    #[must_use]
    pub fn new() -> Self {
        let mut manager = Self {
            key_states: HashMap::new(),
            player_bindings: [HashMap::new(), HashMap::new()],
            global_bindings: HashMap::new(),
            pads: [PadState::default(); 2],
        };
        manager.set_default_bindings();
        manager
    }

    /// Set default key bindings.
    pub fn set_default_bindings(&mut self) {
        let defaults = [
            [
                (FighterAction::MoveLeft, KeyCode::A),
                (FighterAction::MoveRight, KeyCode::D),
                (FighterAction::Punch, KeyCode::C),
                (FighterAction::Kick, KeyCode::S),
                (FighterAction::Special, KeyCode::Q),
                (FighterAction::Jump, KeyCode::Space),
            ],
            [
                (FighterAction::MoveLeft, KeyCode::J),
                (FighterAction::MoveRight, KeyCode::L),
                (FighterAction::Punch, KeyCode::B),
                (FighterAction::Kick, KeyCode::K),
                (FighterAction::Special, KeyCode::O),
                (FighterAction::Jump, KeyCode::I),
            ],
        ];
        for (bindings, keys) in self.player_bindings.iter_mut().zip(defaults) {
            bindings.clear();
            bindings.extend(keys.map(|(action, key)| (action, KeyBinding::new(key))));
        }

        self.global_bindings.clear();
        self.global_bindings
            .insert(GlobalAction::Restart, KeyBinding::new(KeyCode::R));
        self.global_bindings
            .insert(GlobalAction::Pause, KeyBinding::new(KeyCode::P));
        self.global_bindings
            .insert(GlobalAction::Menu, KeyBinding::new(KeyCode::Z));
    }

    /// Name of the action a key is bound to, other than `except`.
    fn bound_elsewhere(&self, key: KeyCode, except: (Option<PlayerSlot>, String)) -> Option<String> {
        let players = PlayerSlot::ALL.iter().flat_map(|slot| {
            self.player_bindings[slot.index()]
                .iter()
                .map(move |(action, binding)| ((Some(*slot), format!("{slot} {action:?}")), binding))
        });
        let globals = self
            .global_bindings
            .iter()
            .map(|(action, binding)| ((None, format!("{action:?}")), binding));

        players
            .chain(globals)
            .find(|(owner, binding)| *owner != except && binding.matches(key))
            .map(|((_, name), _)| name)
    }

    /// Rebind a player action, rejecting keys bound to anything else.
    pub fn rebind(
        &mut self,
        slot: PlayerSlot,
        action: FighterAction,
        binding: KeyBinding,
    ) -> Result<(), InputError> {
        let owner = (Some(slot), format!("{slot} {action:?}"));
        for key in binding.keys() {
            if let Some(action) = self.bound_elsewhere(key, owner.clone()) {
                return Err(InputError::KeyAlreadyBound { key, action });
            }
        }
        self.player_bindings[slot.index()].insert(action, binding);
        Ok(())
    }

    /// Rebind a match-wide action, rejecting keys bound to anything else.
    pub fn rebind_global(
        &mut self,
        action: GlobalAction,
        binding: KeyBinding,
    ) -> Result<(), InputError> {
        let owner = (None, format!("{action:?}"));
        for key in binding.keys() {
            if let Some(action) = self.bound_elsewhere(key, owner.clone()) {
                return Err(InputError::KeyAlreadyBound { key, action });
            }
        }
        self.global_bindings.insert(action, binding);
        Ok(())
    }

    /// Get the current binding for a player action.
    #[must_use]
    pub fn binding(&self, slot: PlayerSlot, action: FighterAction) -> Option<&KeyBinding> {
        self.player_bindings[slot.index()].get(&action)
    }

    /// Update a key state.
    pub fn update_key(&mut self, key: KeyCode, is_pressed: bool) {
        self.key_states.entry(key).or_default().update(is_pressed);
    }

    /// Update a gamepad's POV hat X position.
    pub fn update_pad_pov(&mut self, slot: PlayerSlot, pov_x: f32) {
        self.pads[slot.index()].pov_x = pov_x;
    }

    /// Update a gamepad button. Unknown button indices are ignored.
    pub fn update_pad_button(&mut self, slot: PlayerSlot, button: usize, is_pressed: bool) {
        if let Some(state) = self.pads[slot.index()].buttons.get_mut(button) {
            state.update(is_pressed);
        }
    }

    /// Clear frame-specific state. Call at the end of each frame.
    pub fn end_frame(&mut self) {
        for state in self.key_states.values_mut() {
            state.clear_frame();
        }
        for pad in &mut self.pads {
            for button in &mut pad.buttons {
                button.clear_frame();
            }
        }
    }

    /// Check if a key is currently pressed.
    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.key_states.get(&key).is_some_and(|state| state.pressed)
    }

    /// Check if a key was just pressed this frame.
    #[must_use]
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.key_states
            .get(&key)
            .is_some_and(|state| state.just_pressed)
    }

    fn binding_held(&self, binding: Option<&KeyBinding>) -> bool {
        binding.is_some_and(|b| b.keys().any(|key| self.is_key_pressed(key)))
    }

    fn binding_just_pressed(&self, binding: Option<&KeyBinding>) -> bool {
        binding.is_some_and(|b| b.keys().any(|key| self.is_key_just_pressed(key)))
    }

    fn player_input(&self, slot: PlayerSlot) -> FighterInput {
        let bindings = &self.player_bindings[slot.index()];
        let pad = &self.pads[slot.index()];
        let held = |action| self.binding_held(bindings.get(&action));
        let pressed = |action| self.binding_just_pressed(bindings.get(&action));

        FighterInput {
            left: held(FighterAction::MoveLeft) || pad.pov_x <= -POV_THRESHOLD,
            right: held(FighterAction::MoveRight) || pad.pov_x >= POV_THRESHOLD,
            jump: pressed(FighterAction::Jump),
            punch: pressed(FighterAction::Punch) || pad.just_pressed(PadState::PUNCH),
            kick: pressed(FighterAction::Kick) || pad.just_pressed(PadState::KICK),
            special: pressed(FighterAction::Special) || pad.just_pressed(PadState::SPECIAL),
        }
    }

    /// Process raw input into this frame's commands.
    #[must_use]
    pub fn process(&self) -> FrameInput {
        let global = |action| self.binding_just_pressed(self.global_bindings.get(&action));
        let any_pad = |button| self.pads.iter().any(|pad| pad.just_pressed(button));

        FrameInput {
            players: PlayerSlot::ALL.map(|slot| self.player_input(slot)),
            restart: global(GlobalAction::Restart) || any_pad(PadState::RESTART),
            pause: global(GlobalAction::Pause) || any_pad(PadState::PAUSE),
            menu: global(GlobalAction::Menu),
        }
    }
}
