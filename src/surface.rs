use crate::config::SurfaceConfig;
use crate::easing::smoothstep;
use crate::render::UniformValue;
use crate::starfield::{DriftField, StreakField};
use bevy_ecs::prelude::Resource;
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

pub const U_TIME: &str = "u_time";
pub const U_PALETTE: &str = "u_palette";
pub const U_GRID: &str = "u_grid";

/// Cosine palette `a + b * cos(2π(c·t + d))`, evaluated per component.
pub fn palette(t: f32, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Vec3 {
    let phase = (c * t + d) * TAU;
    a + b * Vec3::new(phase.x.cos(), phase.y.cos(), phase.z.cos())
}

/// Shading-language `fract`: always in [0, 1), also for negative input.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub color: Vec3,
    pub grid: f32,
    pub alpha: f32,
}

/// Scrolling rainbow grid painted on the inside of a tunnel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelSurface {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub d: Vec3,
    pub threshold: f32,
    pub columns: f32,
    pub rows: f32,
    pub scroll_speed: f32,
    pub wobble: f32,
    pub color_speed: f32,
    pub intensity: f32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl TunnelSurface {
    pub fn from_config(config: &SurfaceConfig) -> Self {
        Self {
            a: Vec3::from_array(config.palette_a),
            b: Vec3::from_array(config.palette_b),
            c: Vec3::from_array(config.palette_c),
            d: Vec3::from_array(config.palette_d),
            threshold: config.grid_threshold,
            columns: config.grid_columns,
            rows: config.grid_rows,
            scroll_speed: config.scroll_speed,
            wobble: config.wobble,
            color_speed: config.color_speed,
            intensity: config.intensity,
            fog_near: config.fog[0],
            fog_far: config.fog[1],
        }
    }

    /// Grid lines: 1 on a line, 0 between lines. Rows scroll with time and columns sway.
    pub fn grid(&self, t: f32, uv: Vec2) -> f32 {
        let sway = (t + uv.y * 5.0).sin() * self.wobble;
        let column = step(self.threshold, fract(uv.x * self.columns + sway));
        let row = step(self.threshold, fract(uv.y * self.rows + t * self.scroll_speed));
        column.max(row)
    }

    pub fn color(&self, t: f32, uv: Vec2) -> Vec3 {
        let factor = uv.x + uv.y * 0.2 + t * self.color_speed;
        palette(factor, self.a, self.b, self.c, self.d) * self.intensity
    }

    pub fn sample(&self, t: f32, uv: Vec2) -> SurfaceSample {
        let grid = self.grid(t, uv);
        SurfaceSample { color: self.color(t, uv), grid, alpha: grid }
    }

    /// Sample with depth fog applied to alpha.
    pub fn sample_at_depth(&self, t: f32, uv: Vec2, depth: f32) -> SurfaceSample {
        let mut sample = self.sample(t, uv);
        sample.alpha *= self.fog(depth);
        sample
    }

    pub fn fog(&self, depth: f32) -> f32 {
        smoothstep(self.fog_far, self.fog_near, depth)
    }
}

impl Default for TunnelSurface {
    fn default() -> Self {
        Self::from_config(&SurfaceConfig::default())
    }
}

/// Slow breathing wobble applied to tunnel vertices.
pub fn warp_vertex(position: Vec3, t: f32) -> Vec3 {
    Vec3::new(
        position.x + (position.z * 0.1 + t).sin() * 0.5,
        position.y + (position.z * 0.15 + t).cos() * 0.5,
        position.z,
    )
}

/// Per-tick surface outputs: named uniforms plus the time-keyed decorative fields.
#[derive(Resource)]
pub struct SurfaceState {
    pub tunnel: TunnelSurface,
    pub streaks: StreakField,
    pub drift: DriftField,
    elapsed: f32,
    uniforms: Vec<(&'static str, UniformValue)>,
}

impl SurfaceState {
    pub fn new(config: &SurfaceConfig, seed: u64) -> Self {
        Self {
            tunnel: TunnelSurface::from_config(config),
            streaks: StreakField::new(config.star_count as usize, seed ^ 0x57a2),
            drift: DriftField::new(config.drift_count as usize, seed ^ 0xd21f),
            elapsed: 0.0,
            uniforms: Vec::with_capacity(3),
        }
    }

    pub fn update(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
        let center = Vec2::splat(0.5);
        let sample = self.tunnel.sample(elapsed, center);
        self.uniforms.clear();
        self.uniforms.push((U_TIME, UniformValue::Float(elapsed)));
        self.uniforms.push((U_PALETTE, UniformValue::Vec3(sample.color.to_array())));
        self.uniforms.push((U_GRID, UniformValue::Float(sample.grid)));
        self.streaks.write(elapsed);
        self.drift.write(elapsed);
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn uniforms(&self) -> &[(&'static str, UniformValue)] {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.iter().find(|(key, _)| *key == name).map(|(_, value)| *value)
    }
}
