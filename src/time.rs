use bevy_ecs::prelude::Resource;
use std::time::{Duration, Instant};

/// Virtual frame clock. The engine never reads wall time; callers feed `dt` per tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameClock {
    pub delta: f32,
    pub elapsed: f32,
    pub ticks: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.delta = dt;
        self.elapsed += dt;
        self.ticks += 1;
    }
}

/// Wall clock used by hosts that drive the engine from a real frame loop.
pub struct WallClock {
    start: Instant,
    last: Instant,
    pub delta: Duration,
}

impl WallClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now, delta: Duration::from_secs_f32(0.0) }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.last.duration_since(self.start).as_secs_f32()
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}
