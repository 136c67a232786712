use crate::easing::Easing;
use crate::particles::ForceMode;
use crate::visibility::WindowPolicy;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "SceneConfig::default_lead_in_pages")]
    pub lead_in_pages: u32,
    #[serde(default = "SceneConfig::default_convergence_rate")]
    pub convergence_rate: f32,
    #[serde(default = "SceneConfig::default_global_scale")]
    pub global_scale: f32,
    #[serde(default)]
    pub scroll_damping: f32,
    #[serde(default)]
    pub window_policy: WindowPolicy,
    #[serde(default = "SceneConfig::default_cursor_rates")]
    pub cursor_rates: [f32; 2],
    /// `[amplitude, frequency]` of the vertical float on entities marked as floating.
    #[serde(default = "SceneConfig::default_idle_bob")]
    pub idle_bob: [f32; 2],
    /// `[amplitude, frequency]` of the roll wobble, in radians.
    #[serde(default = "SceneConfig::default_idle_wobble")]
    pub idle_wobble: [f32; 2],
    /// Steady spin about the vertical axis, radians per second.
    #[serde(default = "SceneConfig::default_idle_spin")]
    pub idle_spin: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "ParticleConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "ParticleConfig::default_ambient_count")]
    pub ambient_count: u32,
    #[serde(default = "ParticleConfig::default_focal_radius")]
    pub focal_radius: f32,
    #[serde(default = "ParticleConfig::default_force_strength")]
    pub force_strength: f32,
    #[serde(default)]
    pub force_mode: ForceMode,
    #[serde(default = "ParticleConfig::default_damping")]
    pub damping: f32,
    #[serde(default = "ParticleConfig::default_ambient_speed")]
    pub ambient_speed: [f32; 2],
    #[serde(default = "ParticleConfig::default_ambient_size")]
    pub ambient_size: [f32; 2],
    #[serde(default = "ParticleConfig::default_ambient_life")]
    pub ambient_life: [f32; 2],
    #[serde(default = "ParticleConfig::default_transient_speed")]
    pub transient_speed: [f32; 2],
    #[serde(default = "ParticleConfig::default_transient_size")]
    pub transient_size: [f32; 2],
    #[serde(default = "ParticleConfig::default_transient_life")]
    pub transient_life: [f32; 2],
    #[serde(default = "ParticleConfig::default_trail_burst")]
    pub trail_burst: u32,
    #[serde(default = "ParticleConfig::default_connection_distance")]
    pub connection_distance: f32,
    #[serde(default = "ParticleConfig::default_connection_opacity")]
    pub connection_opacity: f32,
    #[serde(default = "ParticleConfig::default_connection_pool_limit")]
    pub connection_pool_limit: u32,
    /// Spawn volume; `None` uses the viewport rectangle on the z = 0 plane.
    #[serde(default)]
    pub spawn_min: Option<[f32; 3]>,
    #[serde(default)]
    pub spawn_max: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "SurfaceConfig::default_palette_a")]
    pub palette_a: [f32; 3],
    #[serde(default = "SurfaceConfig::default_palette_b")]
    pub palette_b: [f32; 3],
    #[serde(default = "SurfaceConfig::default_palette_c")]
    pub palette_c: [f32; 3],
    #[serde(default = "SurfaceConfig::default_palette_d")]
    pub palette_d: [f32; 3],
    #[serde(default = "SurfaceConfig::default_grid_threshold")]
    pub grid_threshold: f32,
    #[serde(default = "SurfaceConfig::default_grid_columns")]
    pub grid_columns: f32,
    #[serde(default = "SurfaceConfig::default_grid_rows")]
    pub grid_rows: f32,
    #[serde(default = "SurfaceConfig::default_scroll_speed")]
    pub scroll_speed: f32,
    #[serde(default = "SurfaceConfig::default_wobble")]
    pub wobble: f32,
    #[serde(default = "SurfaceConfig::default_color_speed")]
    pub color_speed: f32,
    #[serde(default = "SurfaceConfig::default_intensity")]
    pub intensity: f32,
    #[serde(default = "SurfaceConfig::default_fog")]
    pub fog: [f32; 2],
    #[serde(default = "SurfaceConfig::default_star_count")]
    pub star_count: u32,
    #[serde(default = "SurfaceConfig::default_drift_count")]
    pub drift_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_base_z")]
    pub base_z: f32,
    #[serde(default = "CameraConfig::default_travel")]
    pub travel: f32,
    #[serde(default)]
    pub look_at: [f32; 3],
    #[serde(default = "CameraConfig::default_fov_y_degrees")]
    pub fov_y_degrees: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntroConfig {
    #[serde(default = "IntroConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "IntroConfig::default_first_label")]
    pub first_label: i32,
    #[serde(default = "IntroConfig::default_label_count")]
    pub label_count: u32,
    #[serde(default = "IntroConfig::default_timeline_duration")]
    pub timeline_duration: f32,
    /// Distance from center, in label heights, at which falloff reaches its extreme.
    #[serde(default = "IntroConfig::default_falloff_distance")]
    pub falloff_distance: f32,
    #[serde(default)]
    pub falloff_easing: Easing,
    #[serde(default = "IntroConfig::default_edge_scale")]
    pub edge_scale: f32,
    #[serde(default = "IntroConfig::default_edge_opacity")]
    pub edge_opacity: f32,
    #[serde(default = "IntroConfig::default_edge_blur")]
    pub edge_blur: f32,
}

/// Hero content shown after the intro hands off: the staggered reveal and the pointer parallax.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "ContentConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "ContentConfig::default_subtitle_words")]
    pub subtitle_words: u32,
    #[serde(default = "ContentConfig::default_actions")]
    pub actions: u32,
    #[serde(default = "ContentConfig::default_reveal_delay")]
    pub reveal_delay: f32,
    /// One entry per parallax layer; negative speeds move against the pointer.
    #[serde(default = "ContentConfig::default_parallax_speeds")]
    pub parallax_speeds: Vec<f32>,
    #[serde(default = "ContentConfig::default_parallax_rate")]
    pub parallax_rate: f32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub intro: IntroConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfigOverrides {
    pub seed: Option<u64>,
    pub skip_intro: Option<bool>,
    pub ambient_count: Option<u32>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

impl SceneConfig {
    const fn default_lead_in_pages() -> u32 {
        1
    }

    const fn default_convergence_rate() -> f32 {
        0.1
    }

    const fn default_global_scale() -> f32 {
        1.0
    }

    const fn default_cursor_rates() -> [f32; 2] {
        [0.15, 0.6]
    }

    const fn default_idle_bob() -> [f32; 2] {
        [0.2, 0.5]
    }

    const fn default_idle_wobble() -> [f32; 2] {
        [0.1, 1.0]
    }

    const fn default_idle_spin() -> f32 {
        0.6
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            lead_in_pages: Self::default_lead_in_pages(),
            convergence_rate: Self::default_convergence_rate(),
            global_scale: Self::default_global_scale(),
            scroll_damping: 0.0,
            window_policy: WindowPolicy::default(),
            cursor_rates: Self::default_cursor_rates(),
            idle_bob: Self::default_idle_bob(),
            idle_wobble: Self::default_idle_wobble(),
            idle_spin: Self::default_idle_spin(),
        }
    }
}

impl ParticleConfig {
    const fn default_seed() -> u64 {
        0x5eed_2026
    }

    const fn default_ambient_count() -> u32 {
        150
    }

    const fn default_focal_radius() -> f32 {
        200.0
    }

    const fn default_force_strength() -> f32 {
        0.5
    }

    const fn default_damping() -> f32 {
        0.98
    }

    const fn default_ambient_speed() -> [f32; 2] {
        [0.1, 0.6]
    }

    const fn default_ambient_size() -> [f32; 2] {
        [1.0, 4.0]
    }

    const fn default_ambient_life() -> [f32; 2] {
        [300.0, 500.0]
    }

    const fn default_transient_speed() -> [f32; 2] {
        [2.0, 5.0]
    }

    const fn default_transient_size() -> [f32; 2] {
        [2.0, 6.0]
    }

    const fn default_transient_life() -> [f32; 2] {
        [60.0, 100.0]
    }

    const fn default_trail_burst() -> u32 {
        3
    }

    const fn default_connection_distance() -> f32 {
        100.0
    }

    const fn default_connection_opacity() -> f32 {
        0.3
    }

    const fn default_connection_pool_limit() -> u32 {
        300
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            ambient_count: Self::default_ambient_count(),
            focal_radius: Self::default_focal_radius(),
            force_strength: Self::default_force_strength(),
            force_mode: ForceMode::default(),
            damping: Self::default_damping(),
            ambient_speed: Self::default_ambient_speed(),
            ambient_size: Self::default_ambient_size(),
            ambient_life: Self::default_ambient_life(),
            transient_speed: Self::default_transient_speed(),
            transient_size: Self::default_transient_size(),
            transient_life: Self::default_transient_life(),
            trail_burst: Self::default_trail_burst(),
            connection_distance: Self::default_connection_distance(),
            connection_opacity: Self::default_connection_opacity(),
            connection_pool_limit: Self::default_connection_pool_limit(),
            spawn_min: None,
            spawn_max: None,
        }
    }
}

impl SurfaceConfig {
    const fn default_palette_a() -> [f32; 3] {
        [0.5, 0.5, 0.5]
    }

    const fn default_palette_b() -> [f32; 3] {
        [0.5, 0.5, 0.5]
    }

    const fn default_palette_c() -> [f32; 3] {
        [1.0, 1.0, 1.0]
    }

    const fn default_palette_d() -> [f32; 3] {
        [0.0, 0.33, 0.67]
    }

    const fn default_grid_threshold() -> f32 {
        0.95
    }

    const fn default_grid_columns() -> f32 {
        12.0
    }

    const fn default_grid_rows() -> f32 {
        3.0
    }

    const fn default_scroll_speed() -> f32 {
        0.8
    }

    const fn default_wobble() -> f32 {
        0.2
    }

    const fn default_color_speed() -> f32 {
        0.2
    }

    const fn default_intensity() -> f32 {
        2.0
    }

    const fn default_fog() -> [f32; 2] {
        [5.0, 60.0]
    }

    const fn default_star_count() -> u32 {
        400
    }

    const fn default_drift_count() -> u32 {
        150
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            palette_a: Self::default_palette_a(),
            palette_b: Self::default_palette_b(),
            palette_c: Self::default_palette_c(),
            palette_d: Self::default_palette_d(),
            grid_threshold: Self::default_grid_threshold(),
            grid_columns: Self::default_grid_columns(),
            grid_rows: Self::default_grid_rows(),
            scroll_speed: Self::default_scroll_speed(),
            wobble: Self::default_wobble(),
            color_speed: Self::default_color_speed(),
            intensity: Self::default_intensity(),
            fog: Self::default_fog(),
            star_count: Self::default_star_count(),
            drift_count: Self::default_drift_count(),
        }
    }
}

impl CameraConfig {
    const fn default_base_z() -> f32 {
        10.0
    }

    const fn default_travel() -> f32 {
        2.0
    }

    const fn default_fov_y_degrees() -> f32 {
        50.0
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_z: Self::default_base_z(),
            travel: Self::default_travel(),
            look_at: [0.0; 3],
            fov_y_degrees: Self::default_fov_y_degrees(),
        }
    }
}

impl IntroConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_first_label() -> i32 {
        2002
    }

    const fn default_label_count() -> u32 {
        25
    }

    const fn default_timeline_duration() -> f32 {
        4.0
    }

    const fn default_falloff_distance() -> f32 {
        1.0
    }

    const fn default_edge_scale() -> f32 {
        0.5
    }

    const fn default_edge_opacity() -> f32 {
        0.3
    }

    const fn default_edge_blur() -> f32 {
        8.0
    }
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            first_label: Self::default_first_label(),
            label_count: Self::default_label_count(),
            timeline_duration: Self::default_timeline_duration(),
            falloff_distance: Self::default_falloff_distance(),
            falloff_easing: Easing::default(),
            edge_scale: Self::default_edge_scale(),
            edge_opacity: Self::default_edge_opacity(),
            edge_blur: Self::default_edge_blur(),
        }
    }
}

impl ContentConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_subtitle_words() -> u32 {
        5
    }

    const fn default_actions() -> u32 {
        2
    }

    const fn default_reveal_delay() -> f32 {
        0.5
    }

    fn default_parallax_speeds() -> Vec<f32> {
        vec![0.5, 1.0, -0.8, 0.6, 0.2, 0.3, 0.1]
    }

    const fn default_parallax_rate() -> f32 {
        0.05
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            subtitle_words: Self::default_subtitle_words(),
            actions: Self::default_actions(),
            reveal_delay: Self::default_reveal_delay(),
            parallax_speeds: Self::default_parallax_speeds(),
            parallax_rate: Self::default_parallax_rate(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    /// Reports values the engine would have to clamp. The engine itself never refuses a config.
    pub fn validate(&self) -> Result<()> {
        let rate = self.scene.convergence_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            bail!("scene.convergence_rate must be in (0, 1], got {rate}");
        }
        if !(0.0..1.0).contains(&self.scene.scroll_damping) {
            bail!("scene.scroll_damping must be in [0, 1), got {}", self.scene.scroll_damping);
        }
        if self.intro.timeline_duration <= 0.0 {
            bail!("intro.timeline_duration must be positive, got {}", self.intro.timeline_duration);
        }
        if self.intro.label_count == 0 {
            bail!("intro.label_count must be at least 1");
        }
        let particles = &self.particles;
        for (name, range) in [
            ("particles.ambient_speed", particles.ambient_speed),
            ("particles.ambient_size", particles.ambient_size),
            ("particles.ambient_life", particles.ambient_life),
            ("particles.transient_speed", particles.transient_speed),
            ("particles.transient_size", particles.transient_size),
            ("particles.transient_life", particles.transient_life),
        ] {
            if !range.iter().all(|bound| bound.is_finite()) {
                bail!("{name} must hold finite numbers, got {range:?}");
            }
        }
        for (name, range) in [("particles.ambient_life", particles.ambient_life), ("particles.transient_life", particles.transient_life)] {
            if range[0] < 1.0 || range[1] < range[0] {
                bail!("{name} must be an ascending range of at least one tick, got {range:?}");
            }
        }
        if !(self.particles.damping > 0.0 && self.particles.damping <= 1.0) {
            bail!("particles.damping must be in (0, 1], got {}", self.particles.damping);
        }
        if !(self.content.reveal_delay.is_finite() && self.content.reveal_delay >= 0.0) {
            bail!("content.reveal_delay must be a non-negative number, got {}", self.content.reveal_delay);
        }
        let rate = self.content.parallax_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            bail!("content.parallax_rate must be in (0, 1], got {rate}");
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &EngineConfigOverrides) {
        if let Some(seed) = overrides.seed {
            self.particles.seed = seed;
        }
        if let Some(skip) = overrides.skip_intro {
            self.intro.enabled = !skip;
        }
        if let Some(count) = overrides.ambient_count {
            self.particles.ambient_count = count;
        }
    }
}

impl EngineConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.seed.is_none() && self.skip_intro.is_none() && self.ambient_count.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.seed.is_some() {
            fields.push("seed");
        }
        if self.skip_intro.is_some() {
            fields.push("skip_intro");
        }
        if self.ambient_count.is_some() {
            fields.push("ambient_count");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(cfg.particles.ambient_count, 150);
        assert_eq!(cfg.intro.label_count, 25);
        assert_eq!(cfg.scene.window_policy, WindowPolicy::Binary);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let json = r#"{
            "particles": { "ambient_count": 40, "force_mode": "repel" },
            "scene": { "window_policy": { "mode": "smoothstep", "edge": 0.02 } }
        }"#;
        let cfg: EngineConfig = serde_json::from_str(json).expect("parse config");
        assert_eq!(cfg.particles.ambient_count, 40);
        assert_eq!(cfg.particles.force_mode, ForceMode::Repel);
        assert!((cfg.particles.damping - 0.98).abs() < f32::EPSILON);
        assert_eq!(cfg.scene.window_policy, WindowPolicy::Smoothstep { edge: 0.02 });
    }

    #[test]
    fn validate_rejects_bad_rates() {
        let mut cfg = EngineConfig::default();
        cfg.scene.convergence_rate = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("convergence_rate"));
    }

    #[test]
    fn overflowing_particle_ranges_are_rejected() {
        // 1e39 does not fit in an f32 and parses to infinity.
        let json = r#"{ "particles": { "ambient_speed": [0.1, 1e39] } }"#;
        let cfg: EngineConfig = serde_json::from_str(json).expect("parse config");
        assert!(cfg.particles.ambient_speed[1].is_infinite());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("particles.ambient_speed"), "{err}");
    }

    #[test]
    fn content_section_defaults_and_checks() {
        let cfg: EngineConfig = serde_json::from_str(r#"{ "content": { "actions": 3 } }"#).expect("parse config");
        assert_eq!(cfg.content.actions, 3);
        assert_eq!(cfg.content.subtitle_words, 5);
        assert_eq!(cfg.content.parallax_speeds.len(), 7);
        let mut bad = cfg.clone();
        bad.content.parallax_rate = 0.0;
        assert!(bad.validate().unwrap_err().to_string().contains("parallax_rate"));
    }

    #[test]
    fn overrides_apply_and_report_fields() {
        let mut cfg = EngineConfig::default();
        let overrides = EngineConfigOverrides { seed: Some(7), skip_intro: Some(true), ambient_count: None };
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.particles.seed, 7);
        assert!(!cfg.intro.enabled);
        assert_eq!(overrides.applied_fields(), vec!["seed", "skip_intro"]);
        assert!(!overrides.is_empty());
    }
}
