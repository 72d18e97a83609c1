//! Game object engine
//!
//! Everything that runs inside a tick lives here:
//! - Objects hold data; behaviours hold the per-type hooks
//! - Structural changes are queued through `GameContext` and applied between phases
//! - Physics only reacts to collisions the manager has already detected

pub mod bullet;
pub mod collider;
pub mod context;
pub mod manager;
pub mod object;
pub mod physics;
pub mod renderer;

pub use bullet::{Bullet, HomingBullet};
pub use collider::{BoxCollider, Collider, ShapedCollider};
pub use context::{EventCallback, GameContext, Others};
pub use manager::{GameEvent, GameManager, GameManagerParams};
pub use object::{
    Behavior, Energy, Entity, GameObject, Health, ObjectClass, ObjectId, Plain, Tags,
};
pub use physics::{
    AmbientFriction, BreakerControllerForce, ConstantForce, Force, Gravity, Impulse, Material,
    PhysicWorld, RigidBody, SpaceGravity, SpatialControllerForce, UniDirectionalControllerForce,
};
pub use renderer::{Renderer, ShapeRenderer, Viewer};
