pub mod camera;
pub mod cli;
pub mod config;
pub mod easing;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod events;
pub mod input;
pub mod interpolation;
pub mod particles;
pub mod progress;
pub mod render;
pub mod reveal;
pub mod sequencer;
pub mod starfield;
pub mod surface;
pub mod time;
pub mod tween;
pub mod visibility;

pub use config::{EngineConfig, EngineConfigOverrides};
pub use engine::{Engine, TickReport};
pub use error::{EngineFault, FaultKind, FaultLog};
pub use input::InputEvent;
pub use render::{Frame, RecordingSurface, RenderSurface};
pub use sequencer::{IntroPhase, PhaseSequencer};
pub use visibility::TopicDescriptor;
