//! Scripted input for headless bouts.
//!
//! A bout script is a RON file listing raw key and pad changes, each stamped
//! with the frame it happens on:
//!
//! ```ron
//! (
//!     version: (major: 1, minor: 0, patch: 0),
//!     events: [
//!         (frame: 0, input: Key(key: D, pressed: true)),
//!         (frame: 40, input: Key(key: D, pressed: false)),
//!         (frame: 41, input: Key(key: C, pressed: true)),
//!     ],
//! )
//! ```

use std::path::Path;

use openhouse_combat::{InputManager, KeyCode};
use openhouse_common::{PlayerSlot, SchemaVersion};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Bout script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// RON parse failure
    #[error("failed to parse bout script: {0}")]
    Parse(String),

    /// Incompatible script version
    #[error("bout script version {actual} is not readable (expected {expected})")]
    VersionMismatch {
        /// Version this build reads
        expected: SchemaVersion,
        /// Version in the file
        actual: SchemaVersion,
    },

    /// Events are not sorted by frame
    #[error("script event {index} at frame {frame} comes before an earlier frame")]
    OutOfOrder {
        /// Event position in the list
        index: usize,
        /// Its frame
        frame: u64,
    },

    /// File read failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A raw input change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScriptInput {
    /// Keyboard key went down or up.
    Key {
        /// Key
        key: KeyCode,
        /// Down when true
        pressed: bool,
    },
    /// Pad hat X axis moved.
    PadPov {
        /// Pad owner
        slot: PlayerSlot,
        /// Axis value (-100, 0 or 100 on a hat switch)
        x: f32,
    },
    /// Pad button went down or up.
    PadButton {
        /// Pad owner
        slot: PlayerSlot,
        /// Button index
        button: usize,
        /// Down when true
        pressed: bool,
    },
}

impl ScriptInput {
    /// Feeds this change to an input manager.
    pub fn apply(&self, input: &mut InputManager) {
        match *self {
            Self::Key { key, pressed } => input.update_key(key, pressed),
            Self::PadPov { slot, x } => input.update_pad_pov(slot, x),
            Self::PadButton {
                slot,
                button,
                pressed,
            } => input.update_pad_button(slot, button, pressed),
        }
    }
}

/// One timed input change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    /// Frame the change happens on
    pub frame: u64,
    /// The change
    pub input: ScriptInput,
}

/// A sorted list of timed input changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutScript {
    /// Script format version
    #[serde(default = "script_version")]
    pub version: SchemaVersion,
    /// Events sorted by frame
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

fn script_version() -> SchemaVersion {
    SchemaVersion::BOUT_SCRIPT
}

impl Default for BoutScript {
    fn default() -> Self {
        Self {
            version: script_version(),
            events: Vec::new(),
        }
    }
}

impl BoutScript {
    /// Parses and checks a script.
    pub fn from_ron_str(source: &str) -> Result<Self, ScriptError> {
        let script: Self = ron::from_str(source).map_err(|e| ScriptError::Parse(e.to_string()))?;

        if !SchemaVersion::BOUT_SCRIPT.can_read(&script.version) {
            return Err(ScriptError::VersionMismatch {
                expected: SchemaVersion::BOUT_SCRIPT,
                actual: script.version,
            });
        }
        if let Some(index) = script
            .events
            .windows(2)
            .position(|pair| pair[1].frame < pair[0].frame)
        {
            return Err(ScriptError::OutOfOrder {
                index: index + 1,
                frame: script.events[index + 1].frame,
            });
        }
        Ok(script)
    }

    /// Loads a script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let script = Self::from_ron_str(&std::fs::read_to_string(path)?)?;
        info!(
            "Loaded bout script from {} ({} events)",
            path.display(),
            script.events.len()
        );
        Ok(script)
    }

    /// Events scheduled for a frame. Relies on the sort order checked at load.
    pub fn events_at(&self, frame: u64) -> impl Iterator<Item = &ScriptEvent> {
        let start = self.events.partition_point(|e| e.frame < frame);
        self.events[start..].iter().take_while(move |e| e.frame == frame)
    }

    /// Frame of the last event, if any.
    pub fn last_frame(&self) -> Option<u64> {
        self.events.last().map(|e| e.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"(
        version: (major: 1, minor: 0, patch: 0),
        events: [
            (frame: 0, input: Key(key: D, pressed: true)),
            (frame: 3, input: PadPov(slot: Right, x: -100.0)),
            (frame: 3, input: PadButton(slot: Right, button: 2, pressed: true)),
            (frame: 9, input: Key(key: D, pressed: false)),
        ],
    )";

    #[test]
    fn test_parse_sample() {
        let script = BoutScript::from_ron_str(SAMPLE).unwrap();
        assert_eq!(script.events.len(), 4);
        assert_eq!(script.last_frame(), Some(9));
        assert_eq!(script.events_at(3).count(), 2);
        assert_eq!(script.events_at(4).count(), 0);
    }

    #[test]
    fn test_missing_version_defaults() {
        let script = BoutScript::from_ron_str("(events: [])").unwrap();
        assert_eq!(script.version, SchemaVersion::BOUT_SCRIPT);
        assert_eq!(BoutScript::default().version, SchemaVersion::BOUT_SCRIPT);
        assert!(BoutScript::default().events.is_empty());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let source = r"(events: [
            (frame: 5, input: Key(key: C, pressed: true)),
            (frame: 2, input: Key(key: C, pressed: false)),
        ])";
        let err = BoutScript::from_ron_str(source).unwrap_err();
        assert!(matches!(err, ScriptError::OutOfOrder { index: 1, frame: 2 }));
    }

    #[test]
    fn test_future_major_rejected() {
        let source = "(version: (major: 2, minor: 0, patch: 0), events: [])";
        assert!(matches!(
            BoutScript::from_ron_str(source),
            Err(ScriptError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_pad_input() {
        let script = BoutScript::from_ron_str(SAMPLE).unwrap();
        let mut input = InputManager::new();
        for event in script.events_at(3) {
            event.input.apply(&mut input);
        }
        let frame = input.process();
        assert!(frame.player(PlayerSlot::Right).left);
        assert!(frame.player(PlayerSlot::Right).punch);
    }
}
