use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Easing curves used by intro tweens and label falloff. Every curve maps 0 to 0 and 1 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuintIn,
    SmoothStep,
    ElasticOut { amplitude: f32, period: f32 },
    BackOut { overshoot: f32 },
}

impl Easing {
    pub const fn elastic(amplitude: f32, period: f32) -> Self {
        Easing::ElasticOut { amplitude, period }
    }

    pub const fn back(overshoot: f32) -> Self {
        Easing::BackOut { overshoot }
    }

    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    (2.0 * t).powi(3) * 0.5
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(3) * 0.5
                }
            }
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuintIn => t.powi(5),
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::ElasticOut { amplitude, period } => elastic_out(t, amplitude, period),
            Easing::BackOut { overshoot } => {
                let p = t - 1.0;
                p * p * ((overshoot + 1.0) * p + overshoot) + 1.0
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::CubicIn => "cubic_in",
            Easing::CubicOut => "cubic_out",
            Easing::CubicInOut => "cubic_in_out",
            Easing::QuartIn => "quart_in",
            Easing::QuartOut => "quart_out",
            Easing::QuintIn => "quint_in",
            Easing::SmoothStep => "smooth_step",
            Easing::ElasticOut { .. } => "elastic_out",
            Easing::BackOut { .. } => "back_out",
        }
    }
}

fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let amp = amplitude.max(1.0);
    let period = period.max(1e-3) / amplitude.clamp(1e-3, 1.0);
    let shift = period / TAU * (1.0 / amp).asin();
    amp * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / period).sin() + 1.0
}

/// Hermite smoothstep between two edges, matching the shading-language builtin (edges may be
/// reversed to produce a falling ramp).
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() <= f32::EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuintIn,
        Easing::SmoothStep,
        Easing::elastic(1.0, 0.3),
        Easing::back(2.0),
    ];

    #[test]
    fn every_curve_hits_both_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{} should start at 0", easing.label());
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{} should end at 1", easing.label());
        }
    }

    #[test]
    fn elastic_and_back_overshoot() {
        let elastic = Easing::elastic(1.0, 0.3);
        let peak = (1..100).map(|i| elastic.apply(i as f32 / 100.0)).fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "elastic settle should overshoot");
        let back = Easing::back(2.0);
        assert!(back.apply(0.6) > 1.0, "back-out should overshoot before settling");
    }

    #[test]
    fn in_out_is_symmetric() {
        let e = Easing::CubicInOut;
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((e.apply(t) + e.apply(1.0 - t) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn smoothstep_supports_reversed_edges() {
        assert_eq!(smoothstep(60.0, 5.0, 2.0), 1.0);
        assert_eq!(smoothstep(60.0, 5.0, 80.0), 0.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn easing_deserializes_from_tagged_json() {
        let easing: Easing = serde_json::from_str(r#"{"curve":"elastic_out","amplitude":1.0,"period":0.5}"#)
            .expect("parse easing");
        assert_eq!(easing, Easing::elastic(1.0, 0.5));
    }
}
