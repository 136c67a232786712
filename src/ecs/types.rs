use crate::config::SceneConfig;
use crate::interpolation::{Lerp, ParallaxLayers, PointerFollower};
use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use std::sync::Arc;

// ---------- Components ----------

/// Identity of a scroll-driven scene entity. `order` is the spawn index used for stable output.
#[derive(Component, Debug, Clone)]
pub struct SceneEntity {
    pub id: Arc<str>,
    pub order: u32,
}

/// Interpolated part of an entity pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTransform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for EntityTransform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Vec3::ZERO, scale: 1.0, opacity: 1.0 }
    }
}

impl EntityTransform {
    pub const HIDDEN: EntityTransform =
        EntityTransform { position: Vec3::ZERO, rotation: Vec3::ZERO, scale: 0.0, opacity: 0.0 };
}

impl Lerp for EntityTransform {
    fn lerp_toward(self, target: Self, rate: f32) -> Self {
        Self {
            position: self.position.lerp_toward(target.position, rate),
            rotation: self.rotation.lerp_toward(target.rotation, rate),
            scale: self.scale.lerp_toward(target.scale, rate),
            opacity: self.opacity.lerp_toward(target.opacity, rate),
        }
    }

    fn max_delta(self, other: Self) -> f32 {
        self.position
            .max_delta(other.position)
            .max(self.rotation.max_delta(other.rotation))
            .max(self.scale.max_delta(other.scale))
            .max(self.opacity.max_delta(other.opacity))
    }
}

/// Pose the entity shows when fully active.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BaseTransform(pub EntityTransform);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TargetTransform(pub EntityTransform);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CurrentTransform(pub EntityTransform);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceRate(pub f32);

/// Activation level written by the window pass, in [0, 1].
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Activation(pub f32);

/// Breathing scale applied while the entity is active: `scale * (1 + sin(t * frequency) * amplitude)`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ScalePulse {
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for ScalePulse {
    fn default() -> Self {
        Self { frequency: 5.0, amplitude: 0.1 }
    }
}

/// Idle float of a scene entity at time `t`:
/// `y += sin(t * bob_frequency + phase) * bob_amplitude`, `roll = sin(t * wobble_frequency + phase) * wobble_amplitude`
/// and `yaw = t * spin`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct IdleMotion {
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    pub wobble_amplitude: f32,
    pub wobble_frequency: f32,
    pub spin: f32,
    pub phase: f32,
}

impl IdleMotion {
    pub fn from_config(config: &SceneConfig, phase: f32) -> Self {
        Self {
            bob_amplitude: config.idle_bob[0],
            bob_frequency: config.idle_bob[1],
            wobble_amplitude: config.idle_wobble[0],
            wobble_frequency: config.idle_wobble[1],
            spin: config.idle_spin,
            phase,
        }
    }

    /// Position offset and rotation at `t` seconds.
    pub fn sample(&self, t: f32) -> (Vec3, Vec3) {
        let bob = (t * self.bob_frequency + self.phase).sin() * self.bob_amplitude;
        let roll = (t * self.wobble_frequency + self.phase).sin() * self.wobble_amplitude;
        (Vec3::new(0.0, bob, 0.0), Vec3::new(0.0, t * self.spin, roll))
    }
}

// ---------- Resources ----------

/// Global multiplier applied to every entity scale.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SceneScale(pub f32);

impl Default for SceneScale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Damped cursor ring driven by the latest pointer sample.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CursorState {
    pub follower: PointerFollower,
    pub visible: bool,
}

impl CursorState {
    pub fn new(origin: Vec2, outer_rate: f32, inner_rate: f32) -> Self {
        Self { follower: PointerFollower::new(origin, outer_rate, inner_rate), visible: false }
    }

    /// Feeds the latest pointer sample and steps the follower once.
    pub fn track(&mut self, pointer: Option<Vec2>) {
        self.visible = pointer.is_some();
        if let Some(point) = pointer {
            self.follower.set_pointer(point);
        }
        self.follower.step();
    }
}

/// Damped parallax offsets of the hero layers, driven by the pointer.
#[derive(Resource, Debug, Clone, Default)]
pub struct PointerParallax(pub ParallaxLayers);

impl PointerParallax {
    /// Retargets on a pointer sample and eases every layer one step. Without a pointer the layers
    /// keep easing toward their last target.
    pub fn track(&mut self, pointer: Option<Vec2>, viewport: Vec2) {
        if let Some(point) = pointer {
            self.0.set_pointer(point, viewport);
        }
        self.0.step();
    }
}
