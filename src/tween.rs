//! Virtual-clock tween timelines.
//!
//! A [`Timeline`] is an ordered list of steps placed one after another, optionally shifted by an
//! offset relative to the end of the previous step. Steps only ever see the time they are given
//! through [`Timeline::advance`], so a timeline is fully deterministic for a given `dt` sequence.

use crate::easing::{lerp, Easing};
use serde::Serialize;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetId {
    LabelTrack,
    RevealLabel,
    WorldTitle,
    Aperture,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Y,
    Scale,
    Opacity,
    Blur,
    Glow,
    Tilt,
}

/// Animatable properties of one intro element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
    pub blur: f32,
    pub glow: f32,
    /// Rotation about the horizontal axis, in degrees.
    pub tilt: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self { y: 0.0, scale: 1.0, opacity: 1.0, blur: 0.0, glow: 0.0, tilt: 0.0 }
    }
}

impl Pose {
    pub const HIDDEN: Pose = Pose { y: 0.0, scale: 1.0, opacity: 0.0, blur: 0.0, glow: 0.0, tilt: 0.0 };

    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Y => self.y,
            Channel::Scale => self.scale,
            Channel::Opacity => self.opacity,
            Channel::Blur => self.blur,
            Channel::Glow => self.glow,
            Channel::Tilt => self.tilt,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f32) {
        let slot = match channel {
            Channel::Y => &mut self.y,
            Channel::Scale => &mut self.scale,
            Channel::Opacity => &mut self.opacity,
            Channel::Blur => &mut self.blur,
            Channel::Glow => &mut self.glow,
            Channel::Tilt => &mut self.tilt,
        };
        *slot = value;
    }
}

/// Anything that owns one pose per target key. Intro timelines key by [`TargetId`]; other stages
/// bring their own key type.
pub trait PoseTargets<K = TargetId> {
    fn pose_mut(&mut self, target: K) -> &mut Pose;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ChannelTween {
    channel: Channel,
    from: Option<f32>,
    to: f32,
    resolved_from: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween<K = TargetId> {
    target: K,
    channels: SmallVec<[ChannelTween; 4]>,
    duration: f32,
    easing: Easing,
    yoyo: bool,
    repeat: u32,
}

impl<K> Tween<K> {
    /// Tween from whatever the channel holds when the step starts.
    pub fn to(target: K, duration: f32, easing: Easing) -> Self {
        Self {
            target,
            channels: SmallVec::new(),
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            easing,
            yoyo: false,
            repeat: 0,
        }
    }

    /// Zero-length step that snaps channels to their values.
    pub fn set(target: K) -> Self {
        Self::to(target, 0.0, Easing::Linear)
    }

    pub fn channel(mut self, channel: Channel, to: f32) -> Self {
        self.channels.push(ChannelTween { channel, from: None, to, resolved_from: 0.0 });
        self
    }

    pub fn from_to(mut self, channel: Channel, from: f32, to: f32) -> Self {
        self.channels.push(ChannelTween { channel, from: Some(from), to, resolved_from: from });
        self
    }

    /// Plays forward then backward `repeat` extra times.
    pub fn yoyo(mut self, repeat: u32) -> Self {
        self.yoyo = true;
        self.repeat = repeat;
        self
    }

    pub fn total_duration(&self) -> f32 {
        self.duration * (self.repeat + 1) as f32
    }

    fn begin(&mut self, pose: &Pose) {
        for tween in &mut self.channels {
            tween.resolved_from = tween.from.unwrap_or_else(|| pose.get(tween.channel));
        }
    }

    /// Eased fraction between `from` and `to` at `local` seconds into the step.
    fn fraction(&self, local: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let total = self.total_duration();
        if local >= total {
            let ends_reversed = self.yoyo && self.repeat % 2 == 1;
            return if ends_reversed { 0.0 } else { 1.0 };
        }
        let cycle = (local / self.duration).floor().min(self.repeat as f32);
        let mut t = (local - cycle * self.duration) / self.duration;
        if self.yoyo && cycle as u32 % 2 == 1 {
            t = 1.0 - t;
        }
        self.easing.apply(t)
    }

    fn apply(&self, local: f32, pose: &mut Pose) {
        let fraction = self.fraction(local);
        for tween in &self.channels {
            pose.set(tween.channel, lerp(tween.resolved_from, tween.to, fraction));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepKind<K = TargetId> {
    Tween(Tween<K>),
    Wait(f32),
    /// Named marker reported to the host when the playhead crosses it.
    Cue(&'static str),
}

impl<K> StepKind<K> {
    fn duration(&self) -> f32 {
        match self {
            StepKind::Tween(tween) => tween.total_duration(),
            StepKind::Wait(seconds) => seconds.max(0.0),
            StepKind::Cue(_) => 0.0,
        }
    }
}

impl<K> From<Tween<K>> for StepKind<K> {
    fn from(tween: Tween<K>) -> Self {
        StepKind::Tween(tween)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Step<K> {
    kind: StepKind<K>,
    start: f32,
    started: bool,
    finished: bool,
}

impl<K> Step<K> {
    fn end(&self) -> f32 {
        self.start + self.kind.duration()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineStatus {
    Running,
    /// Every step is done; `leftover` is the part of `dt` past the timeline end.
    Finished { leftover: f32 },
    /// A cue handler asked to stop. The playhead stays at the cue.
    Halted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<K = TargetId> {
    steps: Vec<Step<K>>,
    cursor: f32,
    time: f32,
    total: f32,
}

impl<K> Default for Timeline<K> {
    fn default() -> Self {
        Self { steps: Vec::new(), cursor: 0.0, time: 0.0, total: 0.0 }
    }
}

impl<K: Copy> Timeline<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step right after the previous one.
    pub fn then(self, kind: impl Into<StepKind<K>>) -> Self {
        self.then_at(0.0, kind)
    }

    /// Appends a step shifted by `offset` seconds from the end of the previous one.
    pub fn then_at(mut self, offset: f32, kind: impl Into<StepKind<K>>) -> Self {
        let start = (self.cursor + offset).max(0.0);
        let step = Step { kind: kind.into(), start, started: false, finished: false };
        self.cursor = step.end();
        self.insert(step);
        self
    }

    /// Appends a group of tweens as one placement: the first starts `offset` seconds from the end of
    /// the previous step and each later one `stagger` seconds after the one before it. The group
    /// ends when its last member does.
    pub fn then_staggered(mut self, offset: f32, stagger: f32, tweens: impl IntoIterator<Item = Tween<K>>) -> Self {
        let base = (self.cursor + offset).max(0.0);
        let stagger = if stagger.is_finite() { stagger.max(0.0) } else { 0.0 };
        let mut group_end = base;
        for (index, tween) in tweens.into_iter().enumerate() {
            let step = Step { kind: StepKind::Tween(tween), start: base + stagger * index as f32, started: false, finished: false };
            group_end = group_end.max(step.end());
            self.insert(step);
        }
        self.cursor = group_end;
        self.total = self.total.max(group_end);
        self
    }

    fn insert(&mut self, step: Step<K>) {
        self.total = self.total.max(step.end());
        let index = self.steps.partition_point(|existing| existing.start <= step.start);
        self.steps.insert(index, step);
    }

    pub fn total_duration(&self) -> f32 {
        self.total
    }

    pub fn elapsed(&self) -> f32 {
        self.time
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.iter().all(|step| step.finished) && self.time >= self.total
    }

    /// Drops every outstanding step.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.cursor = 0.0;
        self.total = 0.0;
    }

    /// Moves the playhead by `dt` and writes every active step into `targets`. `on_cue` returns
    /// `false` to halt the advance immediately.
    pub fn advance<T: PoseTargets<K>>(
        &mut self,
        dt: f32,
        targets: &mut T,
        on_cue: &mut dyn FnMut(&'static str) -> bool,
    ) -> TimelineStatus {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let now = self.time + dt;
        for step in &mut self.steps {
            if step.finished || step.start > now {
                continue;
            }
            let local = now - step.start;
            match &mut step.kind {
                StepKind::Tween(tween) => {
                    let pose = targets.pose_mut(tween.target);
                    if !step.started {
                        tween.begin(pose);
                    }
                    tween.apply(local, pose);
                }
                StepKind::Wait(_) => {}
                StepKind::Cue(name) => {
                    let name = *name;
                    step.started = true;
                    step.finished = true;
                    if !on_cue(name) {
                        self.time = step.start;
                        return TimelineStatus::Halted;
                    }
                    continue;
                }
            }
            step.started = true;
            step.finished = local >= step.kind.duration();
        }
        self.time = now;
        if now >= self.total && self.steps.iter().all(|step| step.finished) {
            TimelineStatus::Finished { leftover: now - self.total }
        } else {
            TimelineStatus::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Single(Pose);

    impl PoseTargets for Single {
        fn pose_mut(&mut self, _target: TargetId) -> &mut Pose {
            &mut self.0
        }
    }

    fn keep_going(_: &'static str) -> bool {
        true
    }

    #[test]
    fn steps_are_laid_out_back_to_back_with_offsets() {
        let timeline = Timeline::new()
            .then(Tween::to(TargetId::WorldTitle, 1.8, Easing::QuintIn).channel(Channel::Scale, 8.0))
            .then_at(-1.2, Tween::to(TargetId::Aperture, 1.2, Easing::CubicIn).channel(Channel::Scale, 60.0))
            .then_at(-0.4, Tween::to(TargetId::Overlay, 0.6, Easing::CubicOut).channel(Channel::Opacity, 0.0));
        assert!((timeline.total_duration() - 2.0).abs() < 1e-5);
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn to_captures_the_value_at_step_start() {
        let mut stage = Single::default();
        let mut timeline = Timeline::new()
            .then(Tween::to(TargetId::RevealLabel, 1.0, Easing::Linear).channel(Channel::Scale, 2.0))
            .then(Tween::to(TargetId::RevealLabel, 1.0, Easing::Linear).channel(Channel::Scale, 0.0));
        timeline.advance(0.5, &mut stage, &mut keep_going);
        assert!((stage.0.scale - 1.5).abs() < 1e-5);
        timeline.advance(1.0, &mut stage, &mut keep_going);
        assert!((stage.0.scale - 1.0).abs() < 1e-5, "second tween starts from 2.0");
        let status = timeline.advance(1.0, &mut stage, &mut keep_going);
        assert_eq!(stage.0.scale, 0.0);
        assert!(matches!(status, TimelineStatus::Finished { leftover } if (leftover - 0.5).abs() < 1e-5));
    }

    #[test]
    fn yoyo_returns_to_the_start_value() {
        let mut stage = Single::default();
        let mut timeline =
            Timeline::new().then(Tween::to(TargetId::WorldTitle, 0.6, Easing::CubicInOut).channel(Channel::Glow, 1.0).yoyo(1));
        assert!((timeline.total_duration() - 1.2).abs() < 1e-6);
        timeline.advance(0.6, &mut stage, &mut keep_going);
        assert!((stage.0.glow - 1.0).abs() < 1e-5);
        timeline.advance(0.3, &mut stage, &mut keep_going);
        assert!((stage.0.glow - 0.5).abs() < 1e-5);
        timeline.advance(0.5, &mut stage, &mut keep_going);
        assert_eq!(stage.0.glow, 0.0);
    }

    #[test]
    fn cues_fire_once_and_can_halt() {
        let mut stage = Single::default();
        let mut timeline = Timeline::<TargetId>::new().then(StepKind::Wait(0.5)).then(StepKind::Cue("flash")).then(StepKind::Wait(0.5));
        let mut fired = Vec::new();
        timeline.advance(0.4, &mut stage, &mut |name| {
            fired.push(name);
            true
        });
        assert!(fired.is_empty());
        let status = timeline.advance(0.4, &mut stage, &mut |name| {
            fired.push(name);
            false
        });
        assert_eq!(status, TimelineStatus::Halted);
        assert!((timeline.elapsed() - 0.5).abs() < 1e-6);
        timeline.advance(1.0, &mut stage, &mut |name| {
            fired.push(name);
            true
        });
        assert_eq!(fired, vec!["flash"]);
    }

    #[test]
    fn from_to_applies_start_values_immediately() {
        let mut stage = Single::default();
        let mut timeline = Timeline::new()
            .then(Tween::to(TargetId::WorldTitle, 1.5, Easing::QuartOut).from_to(Channel::Y, 400.0, 0.0));
        timeline.advance(0.0, &mut stage, &mut keep_going);
        assert_eq!(stage.0.y, 400.0);
    }

    #[test]
    fn staggered_group_spreads_starts_and_places_the_next_step_after_it() {
        let mut stage = Single::default();
        let tweens = (0..3).map(|_| Tween::to(TargetId::RevealLabel, 0.8, Easing::Linear).channel(Channel::Glow, 1.0));
        let mut timeline = Timeline::new()
            .then(StepKind::Wait(0.5))
            .then_staggered(0.8, 0.1, tweens)
            .then_at(-0.4, Tween::to(TargetId::Overlay, 0.6, Easing::Linear).channel(Channel::Opacity, 0.0));
        // Group: 1.3 .. 1.3 + 0.2 + 0.8 = 2.3; the follower starts at 1.9 and ends at 2.5.
        assert_eq!(timeline.len(), 5);
        assert!((timeline.total_duration() - 2.5).abs() < 1e-5);
        timeline.advance(1.35, &mut stage, &mut keep_going);
        assert!(stage.0.glow > 0.0, "first member has started");
        assert!(matches!(timeline.advance(1.0, &mut stage, &mut keep_going), TimelineStatus::Running));
        assert!(matches!(timeline.advance(0.2, &mut stage, &mut keep_going), TimelineStatus::Finished { .. }));
    }

    #[test]
    fn negative_stagger_collapses_to_simultaneous_starts() {
        let tweens = (0..4).map(|_| Tween::to(TargetId::WorldTitle, 1.0, Easing::Linear).channel(Channel::Y, 0.0));
        let timeline = Timeline::new().then_staggered(0.0, -0.5, tweens);
        assert!((timeline.total_duration() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cleared_timeline_is_inert() {
        let mut stage = Single::default();
        let mut timeline =
            Timeline::new().then(Tween::to(TargetId::Overlay, 1.0, Easing::Linear).channel(Channel::Opacity, 0.0));
        timeline.clear();
        assert!(timeline.is_empty());
        timeline.advance(0.5, &mut stage, &mut keep_going);
        assert_eq!(stage.0.opacity, 1.0);
    }
}
