//! Warboard Core Library
//!
//! Platform-agnostic state and logic for the battle whiteboard: shapes and
//! hit-testing, the pointer interaction state machine, background and overlay
//! placement, and the turn/phase session that surrounds it.

pub mod board;
pub mod config;
pub mod geometry;
pub mod input;
pub mod overlay;
pub mod session;
pub mod shapes;
pub mod storage;
pub mod tools;
pub mod whiteboard;

pub use board::{BoardPreset, BoardSize};
pub use config::{ConfigError, WhiteboardConfig};
pub use input::{DisplayTransform, Key, PointerEvent, TouchAdapter, TouchEvent};
pub use overlay::{Axis, BackgroundState, ImageParams, OverlayState};
pub use session::{BattleSession, HistoryEntry, Phase, WhiteboardPanel};
pub use shapes::{ColorParseError, Shape, ShapeId, ShapeKind, ShapeList, StrokeColor};
pub use storage::{AutoSave, FileStorage, MemoryStorage, SessionStore, Storage, StorageError};
pub use tools::{Interaction, ToolKind};
pub use whiteboard::{Control, Effect, InkOp, StrokeDefaults, WhiteboardState};
