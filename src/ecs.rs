//! bevy_ecs scene world: components, resources, the fixed tick schedule and its profiler.

pub mod profiler;
pub mod systems;
pub mod types;
pub mod world;

pub use profiler::{SystemTimingSummary, TickProfiler};
pub use types::*;
pub use world::SceneWorld;
