use crate::easing::smoothstep;
use bevy_ecs::prelude::{Component, Resource};
use serde::{Deserialize, Serialize};

/// Progress sub-range `[start, end)` in which a scene entity is the active one. The exclusive end
/// is stored rather than derived so adjacent windows can share the exact same boundary value.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationWindow {
    pub start: f32,
    pub end: f32,
}

impl ActivationWindow {
    /// Builds a window inside [0, 1]. `start` is clamped into range and `width` is trimmed so the
    /// window never extends past 1.
    pub fn new(start: f32, width: f32) -> Self {
        let start = sanitize(start).clamp(0.0, 1.0);
        let width = sanitize(width).clamp(0.0, 1.0 - start);
        Self { start, end: (start + width).min(1.0) }
    }

    /// Window between two explicit bounds, both clamped into [0, 1]. An inverted pair collapses to
    /// an empty window at `start`.
    pub fn spanning(start: f32, end: f32) -> Self {
        let start = sanitize(start).clamp(0.0, 1.0);
        let end = sanitize(end).clamp(start, 1.0);
        Self { start, end }
    }

    /// Like [`ActivationWindow::new`] but refuses windows that would have to be adjusted.
    pub fn checked(start: f32, width: f32) -> Option<Self> {
        if !(0.0..=1.0).contains(&start) || width < 0.0 || start + width > 1.0 + 1e-6 {
            return None;
        }
        Some(Self::new(start, width))
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn width(&self) -> f32 {
        self.end - self.start
    }

    /// Left-inclusive, right-exclusive membership test.
    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress < self.end
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// How an activation window is turned into a target weight. `Binary` is the contract; the
/// softened variant fades across `edge` progress units on both sides of the window.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindowPolicy {
    #[default]
    Binary,
    Smoothstep { edge: f32 },
}

pub fn evaluate(window: &ActivationWindow, progress: f32, policy: WindowPolicy) -> f32 {
    match policy {
        WindowPolicy::Binary => {
            if window.contains(progress) {
                1.0
            } else {
                0.0
            }
        }
        WindowPolicy::Smoothstep { edge } => {
            let edge = edge.max(0.0);
            if edge <= f32::EPSILON {
                return evaluate(window, progress, WindowPolicy::Binary);
            }
            let rise = smoothstep(window.start - edge, window.start + edge, progress);
            let fall = 1.0 - smoothstep(window.end - edge, window.end + edge, progress);
            (rise * fall).clamp(0.0, 1.0)
        }
    }
}

/// Topic descriptor supplied by the content layer. The label becomes the entity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDescriptor {
    pub label: String,
    /// Entity breathes (scale pulse) while active.
    #[serde(default)]
    pub pulse: bool,
    /// Entity floats in place: a vertical bob, a roll wobble and a slow spin.
    #[serde(default)]
    pub floating: bool,
}

impl TopicDescriptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), pulse: false, floating: false }
    }

    pub fn pulsing(mut self) -> Self {
        self.pulse = true;
        self
    }

    pub fn floating(mut self) -> Self {
        self.floating = true;
        self
    }
}

/// Lays out `count` adjacent equal windows after `lead_in_pages` empty pages. The scroll track has
/// `count + lead_in_pages` pages, so each window is one page wide. Window `i` ends at the bit-identical
/// value window `i + 1` starts at, so no progress value falls in two windows.
pub fn layout_windows(count: usize, lead_in_pages: usize) -> Vec<ActivationWindow> {
    if count == 0 {
        return Vec::new();
    }
    let pages = (count + lead_in_pages) as f32;
    let boundary = |page: usize| page as f32 / pages;
    (0..count)
        .map(|index| {
            let page = index + lead_in_pages;
            ActivationWindow::spanning(boundary(page), boundary(page + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_inclusive_and_end_is_exclusive() {
        let window = ActivationWindow::new(0.25, 0.25);
        assert_eq!(evaluate(&window, 0.25, WindowPolicy::Binary), 1.0);
        assert_eq!(evaluate(&window, 0.4999, WindowPolicy::Binary), 1.0);
        assert_eq!(evaluate(&window, 0.5, WindowPolicy::Binary), 0.0);
        assert_eq!(evaluate(&window, 0.2499, WindowPolicy::Binary), 0.0);
    }

    #[test]
    fn width_is_trimmed_to_unit_range() {
        let window = ActivationWindow::new(0.8, 0.5);
        assert!((window.end() - 1.0).abs() < 1e-6);
        assert!(ActivationWindow::checked(0.8, 0.5).is_none());
        assert!(ActivationWindow::checked(0.8, 0.2).is_some());
    }

    #[test]
    fn smoothstep_policy_grades_edges() {
        let window = ActivationWindow::new(0.4, 0.2);
        let policy = WindowPolicy::Smoothstep { edge: 0.05 };
        assert!((evaluate(&window, 0.5, policy) - 1.0).abs() < 1e-6);
        let at_edge = evaluate(&window, 0.4, policy);
        assert!(at_edge > 0.4 && at_edge < 0.6, "edge should be half on, got {at_edge}");
        assert_eq!(evaluate(&window, 0.2, policy), 0.0);
    }

    #[test]
    fn layout_reserves_lead_in_pages() {
        let windows = layout_windows(8, 1);
        assert_eq!(windows.len(), 8);
        assert_eq!(windows[0].start, 1.0 / 9.0);
        assert_eq!(windows[7].end, 1.0);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "windows should be adjacent");
        }
    }

    #[test]
    fn shared_boundary_belongs_to_the_later_window() {
        // 4 topics after 2 lead-in pages: 5/6 rounds differently as a start and as start + width.
        let windows = layout_windows(4, 2);
        let boundary = windows[3].start;
        assert!(!windows[2].contains(boundary));
        assert!(windows[3].contains(boundary));
    }

    #[test]
    fn spanning_clamps_and_orders_bounds() {
        let window = ActivationWindow::spanning(0.6, 0.2);
        assert_eq!(window.width(), 0.0);
        assert!(!window.contains(0.6));
        let window = ActivationWindow::spanning(-1.0, 2.0);
        assert_eq!((window.start, window.end), (0.0, 1.0));
    }
}
