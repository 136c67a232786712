use crate::interpolation::Damped;
use bevy_ecs::prelude::Resource;

/// Continuous scroll progress `p` in [0, 1] plus the page index derived from it.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ProgressSource {
    value: Damped<f32>,
    page_count: u32,
    damped: bool,
}

impl ProgressSource {
    pub fn new(page_count: u32) -> Self {
        Self { value: Damped::new(0.0, 1.0), page_count: page_count.max(1), damped: false }
    }

    /// Eases the published value toward the raw scroll signal instead of following it exactly.
    /// A damping of zero disables smoothing.
    pub fn with_damping(mut self, damping: f32) -> Self {
        if damping.is_finite() && damping > 0.0 && damping < 1.0 {
            self.value.set_rate(1.0 - damping);
            self.damped = true;
        }
        self
    }

    /// Feeds a raw normalized scroll sample. Out-of-range input is clamped silently; the return
    /// value reports whether clamping happened.
    pub fn set_target(&mut self, raw: f32) -> bool {
        let (clamped, adjusted) = clamp_unit(raw);
        self.value.set_target(clamped);
        if !self.damped {
            self.value.snap();
        }
        adjusted
    }

    /// Advances damping by one tick. A no-op when undamped.
    pub fn step(&mut self) -> f32 {
        if self.damped {
            self.value.step();
        }
        self.value()
    }

    pub fn value(&self) -> f32 {
        self.value.current.clamp(0.0, 1.0)
    }

    pub fn target(&self) -> f32 {
        self.value.target
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn page_index(&self) -> u32 {
        let index = (self.value() * self.page_count as f32).floor() as u32;
        index.min(self.page_count - 1)
    }
}

/// Maps raw scroll distance onto [0, 1] given the scrollable extent.
pub fn normalize_scroll(offset: f32, scrollable: f32) -> f32 {
    if scrollable <= 0.0 || !scrollable.is_finite() {
        return 0.0;
    }
    offset / scrollable
}

pub(crate) fn clamp_unit(raw: f32) -> (f32, bool) {
    if raw.is_nan() {
        return (0.0, true);
    }
    let clamped = raw.clamp(0.0, 1.0);
    (clamped, clamped != raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_silently_at_both_ends() {
        let mut progress = ProgressSource::new(5);
        assert!(progress.set_target(1.7));
        assert_eq!(progress.value(), 1.0);
        assert!(progress.set_target(-0.3));
        assert_eq!(progress.value(), 0.0);
        assert!(!progress.set_target(0.42));
        assert!((progress.value() - 0.42).abs() < 1e-6);
    }

    #[test]
    fn page_index_floors_and_caps() {
        let mut progress = ProgressSource::new(5);
        progress.set_target(0.39);
        assert_eq!(progress.page_index(), 1);
        progress.set_target(0.4);
        assert_eq!(progress.page_index(), 2);
        progress.set_target(1.0);
        assert_eq!(progress.page_index(), 4);
    }

    #[test]
    fn damping_eases_toward_target() {
        let mut progress = ProgressSource::new(9).with_damping(0.8);
        progress.set_target(1.0);
        assert_eq!(progress.value(), 0.0);
        let first = progress.step();
        assert!(first > 0.0 && first < 1.0);
        for _ in 0..200 {
            progress.step();
        }
        assert!(progress.value() > 0.999);
    }

    #[test]
    fn normalizes_raw_scroll_distance() {
        assert!((normalize_scroll(450.0, 900.0) - 0.5).abs() < 1e-6);
        assert_eq!(normalize_scroll(10.0, 0.0), 0.0);
    }
}
