use crate::camera::CameraPose;
use crate::ecs::EntityTransform;
use crate::interpolation::ParallaxLayer;
use crate::particles::{Connection, ParticleInstance};
use crate::reveal::ContentStage;
use crate::sequencer::{IntroPhase, IntroStage};
use crate::starfield::FieldInstance;
use glam::{Mat4, Vec2};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UniformValue {
    Float(f32),
    Vec3([f32; 3]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityRender {
    pub id: Arc<str>,
    pub order: u32,
    /// Window target in [0, 1]; the transform converges toward it over several ticks.
    pub activation: f32,
    pub transform: EntityTransform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPose {
    pub outer: Vec2,
    pub inner: Vec2,
    pub scale: f32,
}

/// Everything a render surface receives for one tick. All slices borrow engine-owned buffers that
/// are reused between ticks. While the intro is live only `intro` and the camera are filled; the
/// scene slices are empty and `cursor` and `content` are `None`.
pub struct Frame<'a> {
    pub tick: u64,
    pub elapsed: f32,
    pub progress: f32,
    pub entities: &'a [EntityRender],
    pub particles: &'a [ParticleInstance],
    pub connections: &'a [Connection],
    pub streaks: &'a [FieldInstance],
    pub drift: &'a [FieldInstance],
    pub uniforms: &'a [(&'static str, UniformValue)],
    pub camera: CameraPose,
    /// Projection times view for the current viewport aspect.
    pub view_projection: Mat4,
    pub cursor: Option<CursorPose>,
    /// Pointer parallax offsets in pixels, one per configured layer.
    pub parallax: &'a [ParallaxLayer],
    pub intro: Option<&'a IntroStage>,
    pub content: Option<&'a ContentStage>,
}

impl Frame<'_> {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.iter().find(|(key, _)| *key == name).map(|(_, value)| *value)
    }
}

/// Backend that consumes transforms, instance batches and named uniforms.
pub trait RenderSurface {
    /// A surface that is not ready (lost context, hidden canvas) makes the engine skip the push.
    fn is_available(&self) -> bool {
        true
    }

    fn submit(&mut self, frame: &Frame<'_>);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub tick: u64,
    pub progress: f32,
    pub camera_z: f32,
    pub particles: usize,
    pub links: usize,
    /// Ids of entities whose opacity is above one half.
    pub visible: Vec<String>,
    pub intro_phase: Option<IntroPhase>,
    pub overlay_opacity: Option<f32>,
    pub time: Option<f32>,
    /// Hero items fully revealed; `None` while the intro is live or without hero content.
    pub revealed: Option<usize>,
}

/// In-memory surface that keeps a summary of every submitted frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub available: bool,
    frames: Vec<FrameSummary>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self { available: true, frames: Vec::new() }
    }

    pub fn frames(&self) -> &[FrameSummary] {
        &self.frames
    }

    pub fn last(&self) -> Option<&FrameSummary> {
        self.frames.last()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn is_available(&self) -> bool {
        self.available
    }

    fn submit(&mut self, frame: &Frame<'_>) {
        let visible = frame
            .entities
            .iter()
            .filter(|entity| entity.transform.opacity > 0.5)
            .map(|entity| entity.id.to_string())
            .collect();
        let time = match frame.uniform(crate::surface::U_TIME) {
            Some(UniformValue::Float(value)) => Some(value),
            _ => None,
        };
        self.frames.push(FrameSummary {
            tick: frame.tick,
            progress: frame.progress,
            camera_z: frame.camera.position.z,
            particles: frame.particles.len(),
            links: frame.connections.len(),
            visible,
            intro_phase: frame.intro.map(|stage| stage.phase),
            overlay_opacity: frame.intro.map(|stage| stage.overlay.opacity),
            time,
            revealed: frame.content.map(ContentStage::revealed_count),
        });
    }
}
