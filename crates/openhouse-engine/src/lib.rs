//! OpenHouse Engine - headless runner for OpenHouse bouts.
//!
//! This crate wires configuration, archetype tuning, scripted input and the
//! combat match together so bouts can be replayed without a renderer.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod driver;
pub mod script;


/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::driver::*;
    pub use crate::script::*;
}

pub use prelude::*;
