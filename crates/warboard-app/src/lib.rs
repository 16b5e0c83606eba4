//! Warboard Application
//!
//! The host-facing whiteboard controller, the battle session around it,
//! the keyboard shortcut registry and the scenario driver used by the
//! `warboard` binary.

mod battle;
mod script;
mod shortcuts;
mod whiteboard;

pub use battle::Battle;
pub use script::{Action, Script, ScriptError, ScriptReport};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use whiteboard::{NO_LAYOUT, Whiteboard, WhiteboardError, WhiteboardResult};
