use crate::error::EngineFault;
use crate::progress::clamp_unit;
use bevy_ecs::prelude::Resource;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Normalized scroll progress; anything outside [0, 1] is clamped.
    Scroll { progress: f32 },
    /// Pointer position in viewport pixels.
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    Resize { width: f32, height: f32 },
}

/// The most recent external samples, read once at the start of a tick.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    pub scroll: f32,
    pub pointer: Option<Vec2>,
    pub pointer_moving: bool,
    /// Latest pointer-move position not yet consumed by the particle trail.
    pub injection: Option<Vec2>,
    pub viewport: Vec2,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self { scroll: 0.0, pointer: None, pointer_moving: false, injection: None, viewport: Vec2::ONE }
    }
}

/// Event sink written by host handlers. Last write wins; nothing is queued.
pub struct Input {
    latest: InputSnapshot,
    faults: Vec<EngineFault>,
}

impl Input {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            latest: InputSnapshot { viewport: viewport.max(Vec2::ONE), ..InputSnapshot::default() },
            faults: Vec::new(),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::Scroll { progress } => {
                let (clamped, adjusted) = clamp_unit(progress);
                if adjusted {
                    self.faults.push(EngineFault::InputOutOfRange { field: "scroll", value: progress });
                }
                self.latest.scroll = clamped;
            }
            InputEvent::PointerMove { x, y } => {
                let viewport = self.latest.viewport;
                let x = self.clamp_axis("pointer.x", x, viewport.x);
                let y = self.clamp_axis("pointer.y", y, viewport.y);
                let point = Vec2::new(x, y);
                self.latest.pointer = Some(point);
                self.latest.pointer_moving = true;
                self.latest.injection = Some(point);
            }
            InputEvent::PointerLeave => {
                self.latest.pointer = None;
                self.latest.pointer_moving = false;
                self.latest.injection = None;
            }
            InputEvent::Resize { width, height } => {
                if width.is_finite() && height.is_finite() {
                    self.latest.viewport = Vec2::new(width, height).max(Vec2::ONE);
                } else {
                    self.faults.push(EngineFault::InputOutOfRange { field: "viewport", value: width });
                }
            }
        }
    }

    fn clamp_axis(&mut self, field: &'static str, value: f32, extent: f32) -> f32 {
        let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, extent) };
        if clamped != value {
            self.faults.push(EngineFault::InputOutOfRange { field, value });
        }
        clamped
    }

    /// Returns the current snapshot and consumes the one-shot injection point.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = self.latest;
        self.latest.injection = None;
        snapshot
    }

    pub fn peek(&self) -> &InputSnapshot {
        &self.latest
    }

    pub fn drain_faults(&mut self) -> Vec<EngineFault> {
        std::mem::take(&mut self.faults)
    }
}
