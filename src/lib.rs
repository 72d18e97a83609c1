//! Arcade Core - a small 2D game object engine
//!
//! Core modules:
//! - `engine`: Fixed-step object lifecycle, collision detection and impulse physics
//! - `geom`: Rectangles and shapes consumed by colliders and renderers
//! - `settings`: Data-driven timing configuration
//! - `error`: Error types surfaced to game code

pub mod engine;
pub mod error;
pub mod geom;
pub mod settings;

pub use engine::{Behavior, Entity, GameContext, GameEvent, GameManager, GameObject, ObjectId};
pub use error::{QueueError, SettingsError};
pub use geom::{Rect, Shape};
pub use settings::Settings;

/// Engine configuration constants
pub mod consts {
    /// Default simulated time per tick (seconds), as seen by objects
    pub const DEFAULT_GAME_DT: f32 = 1.0 / 60.0;
    /// Default wall-clock time between ticks (seconds)
    pub const DEFAULT_REAL_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks run by a single `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Layer value meaning "never collides" / "never rendered"
    pub const NO_LAYER: i32 = -1;
}
