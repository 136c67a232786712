use crate::config::{ParticleConfig, ViewportConfig};
use bevy_ecs::prelude::Resource;
use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Hero palette: blue, purple, pink, amber, green, cyan, red, white.
pub const PARTICLE_PALETTE: [Vec4; 8] = [
    Vec4::new(0.231, 0.510, 0.965, 1.0),
    Vec4::new(0.545, 0.361, 0.965, 1.0),
    Vec4::new(0.925, 0.282, 0.600, 1.0),
    Vec4::new(0.961, 0.620, 0.043, 1.0),
    Vec4::new(0.133, 0.773, 0.369, 1.0),
    Vec4::new(0.024, 0.714, 0.831, 1.0),
    Vec4::new(0.937, 0.267, 0.267, 1.0),
    Vec4::new(1.0, 1.0, 1.0, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    #[default]
    Attract,
    Repel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Fixed population; respawns in the spawn volume on expiry.
    Ambient,
    /// Injected trail particles; removed on expiry.
    Transient,
}

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    pub color: Vec4,
    pub alpha: f32,
    pub age: u32,
    pub max_age: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn expired(&self) -> bool {
        self.age as f32 >= self.max_age
    }
}

/// One instanced draw record per particle, uploaded as a single batch.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: u32,
    pub b: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionStats {
    pub particles: usize,
    pub pairs_tested: usize,
    pub links: usize,
    /// The pairwise pass is quadratic; set when the pool is beyond the configured limit.
    pub over_limit: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub respawned: usize,
    pub expired: usize,
}

/// Runtime copy of the particle configuration with the spawn volume resolved.
#[derive(Debug, Clone)]
pub struct ParticleSettings {
    pub focal_radius: f32,
    pub force_strength: f32,
    pub force_mode: ForceMode,
    pub damping: f32,
    pub ambient_speed: [f32; 2],
    pub ambient_size: [f32; 2],
    pub ambient_life: [f32; 2],
    pub transient_speed: [f32; 2],
    pub transient_size: [f32; 2],
    pub transient_life: [f32; 2],
    pub trail_burst: u32,
    pub connection_distance: f32,
    pub connection_opacity: f32,
    pub connection_pool_limit: usize,
    pub spawn_min: Vec3,
    pub spawn_max: Vec3,
}

impl ParticleSettings {
    /// Non-finite ranges fall back to the default ones, so sampling never sees an unbounded span.
    pub fn from_config(config: &ParticleConfig, viewport: &ViewportConfig) -> Self {
        let defaults = ParticleConfig::default();
        let viewport_max = Vec3::new(viewport.width, viewport.height, 0.0);
        let spawn_min =
            config.spawn_min.map(Vec3::from_array).filter(|min| min.is_finite()).unwrap_or(Vec3::ZERO);
        let spawn_max = config
            .spawn_max
            .map(Vec3::from_array)
            .filter(|max| max.is_finite())
            .unwrap_or(if viewport_max.is_finite() { viewport_max } else { Vec3::ZERO });
        Self {
            focal_radius: config.focal_radius.max(0.0),
            force_strength: config.force_strength,
            force_mode: config.force_mode,
            damping: config.damping.clamp(0.0, 1.0),
            ambient_speed: finite_range(config.ambient_speed, defaults.ambient_speed),
            ambient_size: finite_range(config.ambient_size, defaults.ambient_size),
            ambient_life: life_range(finite_range(config.ambient_life, defaults.ambient_life)),
            transient_speed: finite_range(config.transient_speed, defaults.transient_speed),
            transient_size: finite_range(config.transient_size, defaults.transient_size),
            transient_life: life_range(finite_range(config.transient_life, defaults.transient_life)),
            trail_burst: config.trail_burst,
            connection_distance: config.connection_distance.max(0.0),
            connection_opacity: config.connection_opacity,
            connection_pool_limit: config.connection_pool_limit as usize,
            spawn_min: spawn_min.min(spawn_max),
            spawn_max: spawn_max.max(spawn_min),
        }
    }
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self::from_config(&ParticleConfig::default(), &ViewportConfig::default())
    }
}

fn finite_range(range: [f32; 2], fallback: [f32; 2]) -> [f32; 2] {
    if range.iter().all(|bound| bound.is_finite()) && (range[1] - range[0]).is_finite() {
        range
    } else {
        log::warn!(target: "aurora::particles", "non-finite range {range:?} replaced by {fallback:?}");
        fallback
    }
}

fn life_range(range: [f32; 2]) -> [f32; 2] {
    let lo = range[0].max(1.0);
    [lo, range[1].max(lo)]
}

fn sample(rng: &mut StdRng, range: [f32; 2]) -> f32 {
    if range[1] > range[0] && (range[1] - range[0]).is_finite() {
        rng.gen_range(range[0]..range[1])
    } else {
        range[0]
    }
}

fn sample_volume(rng: &mut StdRng, min: Vec3, max: Vec3) -> Vec3 {
    Vec3::new(sample(rng, [min.x, max.x]), sample(rng, [min.y, max.y]), sample(rng, [min.z, max.z]))
}

fn planar_velocity(rng: &mut StdRng, speed: [f32; 2]) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    let magnitude = sample(rng, speed);
    Vec3::new(angle.cos(), angle.sin(), 0.0) * magnitude
}

fn palette_color(rng: &mut StdRng) -> Vec4 {
    PARTICLE_PALETTE[rng.gen_range(0..PARTICLE_PALETTE.len())]
}

/// Pool of ambient and transient point agents, advanced once per tick.
#[derive(Resource)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    settings: ParticleSettings,
    rng: StdRng,
    instances: Vec<ParticleInstance>,
    connections: Vec<Connection>,
    connection_stats: ConnectionStats,
    warned_over_limit: bool,
}

impl ParticlePool {
    pub fn new(settings: ParticleSettings, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            settings,
            rng: StdRng::seed_from_u64(seed),
            instances: Vec::new(),
            connections: Vec::new(),
            connection_stats: ConnectionStats::default(),
            warned_over_limit: false,
        }
    }

    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn ambient_count(&self) -> usize {
        self.particles.iter().filter(|p| p.kind == ParticleKind::Ambient).count()
    }

    pub fn transient_count(&self) -> usize {
        self.particles.iter().filter(|p| p.kind == ParticleKind::Transient).count()
    }

    pub fn seed_ambient(&mut self, count: usize) {
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = Particle {
                position: sample_volume(&mut self.rng, self.settings.spawn_min, self.settings.spawn_max),
                velocity: planar_velocity(&mut self.rng, self.settings.ambient_speed),
                size: sample(&mut self.rng, self.settings.ambient_size),
                color: palette_color(&mut self.rng),
                alpha: 1.0,
                age: 0,
                max_age: sample(&mut self.rng, self.settings.ambient_life),
                kind: ParticleKind::Ambient,
            };
            self.particles.push(particle);
        }
    }

    /// Appends `count` transient particles at `point`, flying outward in random directions.
    pub fn inject(&mut self, point: Vec3, count: usize) {
        for _ in 0..count {
            let particle = Particle {
                position: point,
                velocity: planar_velocity(&mut self.rng, self.settings.transient_speed),
                size: sample(&mut self.rng, self.settings.transient_size),
                color: palette_color(&mut self.rng),
                alpha: 1.0,
                age: 0,
                max_age: sample(&mut self.rng, self.settings.transient_life),
                kind: ParticleKind::Transient,
            };
            self.particles.push(particle);
        }
    }

    /// Injects the configured trail burst.
    pub fn inject_trail(&mut self, point: Vec3) {
        let burst = self.settings.trail_burst as usize;
        self.inject(point, burst);
    }

    /// Ages, steers, damps and integrates every particle, then respawns or removes the expired.
    pub fn step(&mut self, focal: Option<Vec3>) -> StepReport {
        let Self { particles, settings, rng, .. } = self;
        let mut report = StepReport::default();
        particles.retain_mut(|particle| {
            particle.age = particle.age.saturating_add(1);
            particle.alpha = (1.0 - particle.age as f32 / particle.max_age).clamp(0.0, 1.0);

            if let Some(focal) = focal {
                let offset = focal - particle.position;
                let distance = offset.length();
                if distance < settings.focal_radius && distance > f32::EPSILON {
                    let falloff = (settings.focal_radius - distance) / settings.focal_radius;
                    let mut direction = offset / distance;
                    if settings.force_mode == ForceMode::Repel {
                        direction = -direction;
                    }
                    particle.velocity += direction * falloff * settings.force_strength;
                }
            }

            particle.velocity *= settings.damping;
            particle.position += particle.velocity;

            if !particle.expired() {
                return true;
            }
            match particle.kind {
                ParticleKind::Ambient => {
                    particle.age = 0;
                    particle.alpha = 1.0;
                    particle.position = sample_volume(rng, settings.spawn_min, settings.spawn_max);
                    report.respawned += 1;
                    true
                }
                ParticleKind::Transient => {
                    report.expired += 1;
                    false
                }
            }
        });
        report
    }

    /// Pairwise linking pass for optional line rendering. Quadratic in pool size: acceptable for a
    /// few hundred particles, flagged (never skipped) beyond `connection_pool_limit`.
    pub fn compute_connections(&mut self) -> ConnectionStats {
        self.connections.clear();
        let n = self.particles.len();
        let threshold = self.settings.connection_distance;
        let over_limit = n > self.settings.connection_pool_limit;
        if over_limit && !self.warned_over_limit {
            log::warn!(
                "particle connection pass over scaling limit: {n} particles > {} ({} pairs)",
                self.settings.connection_pool_limit,
                n * n.saturating_sub(1) / 2
            );
        }
        self.warned_over_limit = over_limit;

        if threshold > 0.0 {
            let threshold_sq = threshold * threshold;
            for i in 0..n {
                let a = self.particles[i].position;
                for j in (i + 1)..n {
                    let distance_sq = a.distance_squared(self.particles[j].position);
                    if distance_sq < threshold_sq {
                        let weight = (1.0 - distance_sq.sqrt() / threshold) * self.settings.connection_opacity;
                        self.connections.push(Connection { a: i as u32, b: j as u32, weight });
                    }
                }
            }
        }

        self.connection_stats = ConnectionStats {
            particles: n,
            pairs_tested: n * n.saturating_sub(1) / 2,
            links: self.connections.len(),
            over_limit,
        };
        self.connection_stats
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        self.connection_stats
    }

    /// Rewrites the instance buffer in place; capacity is kept between ticks.
    pub fn write_instances(&mut self) -> &[ParticleInstance] {
        self.instances.clear();
        self.instances.extend(self.particles.iter().map(|p| ParticleInstance {
            position: p.position.to_array(),
            size: p.size,
            color: [p.color.x, p.color.y, p.color.z, p.color.w * p.alpha],
        }));
        &self.instances
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    pub fn instance_capacity(&self) -> usize {
        self.instances.capacity()
    }

    pub fn clear_transients(&mut self) {
        self.particles.retain(|p| p.kind == ParticleKind::Ambient);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ParticlePool {
        ParticlePool::new(ParticleSettings::default(), 42)
    }

    #[test]
    fn overflowing_config_ranges_fall_back_to_defaults() {
        let mut config = ParticleConfig::default();
        config.ambient_speed = [0.1, f32::INFINITY];
        config.transient_size = [f32::MIN, f32::MAX];
        config.transient_life = [f32::NAN, 80.0];
        config.spawn_max = Some([f32::INFINITY, 10.0, 0.0]);
        let settings = ParticleSettings::from_config(&config, &ViewportConfig::default());
        let defaults = ParticleConfig::default();
        assert_eq!(settings.ambient_speed, defaults.ambient_speed);
        assert_eq!(settings.transient_size, defaults.transient_size);
        assert_eq!(settings.transient_life, defaults.transient_life);
        assert_eq!(settings.spawn_max, Vec3::new(1280.0, 720.0, 0.0));

        let mut pool = ParticlePool::new(settings, 3);
        pool.seed_ambient(20);
        pool.inject(Vec3::new(10.0, 10.0, 0.0), 5);
        pool.step(None);
        assert!(pool.particles().iter().all(|p| p.velocity.is_finite() && p.size.is_finite()));
    }

    #[test]
    fn unbounded_span_samples_the_lower_bound() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample(&mut rng, [f32::MIN, f32::MAX]), f32::MIN);
        assert_eq!(sample(&mut rng, [2.0, 2.0]), 2.0);
    }

    #[test]
    fn alpha_fades_with_age() {
        let mut pool = pool();
        pool.inject(Vec3::new(100.0, 100.0, 0.0), 1);
        let max_age = pool.particles()[0].max_age;
        pool.step(None);
        let alpha = pool.particles()[0].alpha;
        assert!((alpha - (1.0 - 1.0 / max_age)).abs() < 1e-6);
    }

    #[test]
    fn attraction_pulls_toward_focal_point() {
        let mut settings = ParticleSettings::default();
        settings.ambient_speed = [0.0, 0.0];
        let mut pool = ParticlePool::new(settings, 1);
        pool.seed_ambient(1);
        let start = pool.particles()[0].position;
        let focal = start + Vec3::new(50.0, 0.0, 0.0);
        pool.step(Some(focal));
        let velocity = pool.particles()[0].velocity;
        let expected = (200.0 - 50.0) / 200.0 * 0.5 * 0.98;
        assert!((velocity.x - expected).abs() < 1e-5, "velocity {velocity:?}");
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn repulsion_pushes_away() {
        let mut settings = ParticleSettings::default();
        settings.ambient_speed = [0.0, 0.0];
        settings.force_mode = ForceMode::Repel;
        let mut pool = ParticlePool::new(settings, 1);
        pool.seed_ambient(1);
        let start = pool.particles()[0].position;
        pool.step(Some(start + Vec3::new(0.0, 20.0, 0.0)));
        assert!(pool.particles()[0].velocity.y < 0.0);
    }

    #[test]
    fn focal_point_outside_radius_has_no_effect() {
        let mut settings = ParticleSettings::default();
        settings.ambient_speed = [0.0, 0.0];
        let mut pool = ParticlePool::new(settings, 1);
        pool.seed_ambient(1);
        let start = pool.particles()[0].position;
        pool.step(Some(start + Vec3::new(500.0, 0.0, 0.0)));
        assert_eq!(pool.particles()[0].velocity, Vec3::ZERO);
    }

    #[test]
    fn connections_weight_fades_with_distance() {
        let mut settings = ParticleSettings::default();
        settings.transient_speed = [0.0, 0.0];
        let mut pool = ParticlePool::new(settings, 3);
        pool.inject(Vec3::ZERO, 1);
        pool.inject(Vec3::new(50.0, 0.0, 0.0), 1);
        pool.inject(Vec3::new(500.0, 0.0, 0.0), 1);
        let stats = pool.compute_connections();
        assert_eq!(stats.pairs_tested, 3);
        assert_eq!(stats.links, 1);
        let link = pool.connections()[0];
        assert_eq!((link.a, link.b), (0, 1));
        assert!((link.weight - 0.15).abs() < 1e-5);
    }

    #[test]
    fn connection_pass_flags_oversized_pools() {
        let mut settings = ParticleSettings::default();
        settings.connection_pool_limit = 10;
        let mut pool = ParticlePool::new(settings, 9);
        pool.seed_ambient(12);
        let stats = pool.compute_connections();
        assert!(stats.over_limit);
        assert_eq!(stats.pairs_tested, 66, "the pass still runs in full");
    }

    #[test]
    fn instance_buffer_is_reused() {
        let mut pool = pool();
        pool.seed_ambient(20);
        pool.write_instances();
        let capacity = pool.instance_capacity();
        for _ in 0..10 {
            pool.step(None);
            assert_eq!(pool.write_instances().len(), 20);
        }
        assert_eq!(pool.instance_capacity(), capacity);
    }

    #[test]
    fn instance_alpha_is_premultiplied_into_color() {
        let mut pool = pool();
        pool.inject(Vec3::ZERO, 1);
        pool.step(None);
        let alpha = pool.particles()[0].alpha;
        let instance = pool.write_instances()[0];
        assert!((instance.color[3] - alpha).abs() < 1e-6);
    }
}
