//! Decorative instanced fields that are pure functions of elapsed time: streaking stars flying
//! toward the camera and slowly drifting motes.

use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Streaks wrap once they pass this depth.
const STREAK_NEAR_Z: f32 = 20.0;
/// Length of the depth loop.
const STREAK_LOOP: f32 = 120.0;
const STREAK_SPEED: f32 = 20.0;
/// Nominal tick rate used to turn seconds into drift phase steps.
const DRIFT_TICKS_PER_SECOND: f32 = 60.0;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FieldInstance {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy)]
struct Star {
    origin: Vec3,
    speed: f32,
    color: Vec4,
}

pub struct StreakField {
    stars: Vec<Star>,
    instances: Vec<FieldInstance>,
}

impl StreakField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| Star {
                origin: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 50.0,
                    (rng.gen::<f32>() - 0.5) * 50.0,
                    rng.gen::<f32>() * 100.0 - 50.0,
                ),
                speed: rng.gen::<f32>() * 0.8 + 0.2,
                color: hsl_to_rgb(rng.gen::<f32>(), 0.8, 0.6).extend(0.8),
            })
            .collect();
        Self { stars, instances: Vec::with_capacity(count) }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn write(&mut self, elapsed: f32) -> &[FieldInstance] {
        self.instances.clear();
        self.instances.extend(self.stars.iter().map(|star| {
            let z = streak_depth(star.origin.z, star.speed, elapsed);
            let scale = streak_scale(z);
            FieldInstance {
                position: [star.origin.x, star.origin.y, z],
                scale: [scale, scale, scale * 8.0],
                color: star.color.to_array(),
            }
        }));
        &self.instances
    }

    pub fn instances(&self) -> &[FieldInstance] {
        &self.instances
    }
}

/// Depth of a star at `elapsed` seconds, looping back by the loop length once past the near plane.
pub fn streak_depth(origin_z: f32, speed: f32, elapsed: f32) -> f32 {
    let z = origin_z + elapsed * STREAK_SPEED * speed;
    if z > STREAK_NEAR_Z {
        STREAK_NEAR_Z - STREAK_LOOP + (z - STREAK_NEAR_Z).rem_euclid(STREAK_LOOP)
    } else {
        z
    }
}

pub fn streak_scale(z: f32) -> f32 {
    ((z + 80.0) / 100.0).clamp(0.1, 1.5)
}

#[derive(Debug, Clone, Copy)]
struct Mote {
    phase: f32,
    factor: f32,
    speed: f32,
    anchor: Vec3,
}

pub struct DriftField {
    motes: Vec<Mote>,
    color: Vec4,
    instances: Vec<FieldInstance>,
}

impl DriftField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let motes = (0..count)
            .map(|_| Mote {
                phase: rng.gen::<f32>() * 100.0,
                factor: 20.0 + rng.gen::<f32>() * 100.0,
                speed: 0.01 + rng.gen::<f32>() / 200.0,
                anchor: Vec3::new(
                    -5.0 + rng.gen::<f32>() * 10.0,
                    -5.0 + rng.gen::<f32>() * 10.0,
                    -5.0 + rng.gen::<f32>() * 10.0,
                ),
            })
            .collect();
        Self { motes, color: Vec4::new(0.376, 0.647, 0.980, 0.4), instances: Vec::with_capacity(count) }
    }

    pub fn len(&self) -> usize {
        self.motes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motes.is_empty()
    }

    pub fn write(&mut self, elapsed: f32) -> &[FieldInstance] {
        let color = self.color.to_array();
        self.instances.clear();
        self.instances.extend(self.motes.iter().map(|mote| {
            let t = mote.phase + mote.speed * 0.5 * elapsed * DRIFT_TICKS_PER_SECOND;
            let f = mote.factor;
            let position = Vec3::new(
                mote.anchor.x + (t / 10.0 * f).cos() + (t.sin() * f) / 10.0,
                mote.anchor.y + (t / 10.0 * f).sin() + ((t * 2.0).cos() * f) / 10.0,
                mote.anchor.z + (t / 10.0 * f).cos() + ((t * 3.0).sin() * f) / 10.0,
            );
            let scale = t.cos().abs();
            FieldInstance { position: position.to_array(), scale: [scale; 3], color }
        }));
        &self.instances
    }

    pub fn instances(&self) -> &[FieldInstance] {
        &self.instances
    }
}

pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    if saturation <= 0.0 {
        return Vec3::splat(lightness);
    }
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    let channel = |mut t: f32| {
        t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    Vec3::new(channel(hue + 1.0 / 3.0), channel(hue), channel(hue - 1.0 / 3.0))
}
