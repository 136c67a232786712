//! Hero content that plays in once the intro has handed off: a name cue, then subtitle words and
//! call-to-action items rising into place one after another.

use crate::config::ContentConfig;
use crate::easing::Easing;
use crate::tween::{Channel, Pose, PoseTargets, StepKind, Timeline, TimelineStatus, Tween};
use serde::Serialize;

/// Cue fired when the headline should start its own reveal.
pub const NAME_CUE: &str = "name_revealed";

const WORD_DURATION: f32 = 0.8;
const WORD_STAGGER: f32 = 0.1;
const WORD_GAP: f32 = 0.8;
const ACTION_DURATION: f32 = 0.6;
const ACTION_STAGGER: f32 = 0.2;
const ACTION_OVERLAP: f32 = 0.4;
const OVERSHOOT: f32 = 1.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTarget {
    Word(usize),
    Action(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentStage {
    pub name_revealed: bool,
    pub words: Vec<Pose>,
    pub actions: Vec<Pose>,
    #[serde(skip)]
    spare: Pose,
}

impl ContentStage {
    fn new(config: &ContentConfig) -> Self {
        let word = Pose { y: 50.0, opacity: 0.0, tilt: -90.0, ..Pose::default() };
        let action = Pose { y: 30.0, opacity: 0.0, scale: 0.8, ..Pose::default() };
        Self {
            name_revealed: false,
            words: vec![word; config.subtitle_words as usize],
            actions: vec![action; config.actions as usize],
            spare: Pose::default(),
        }
    }

    /// Items whose reveal has fully landed.
    pub fn revealed_count(&self) -> usize {
        self.words.iter().chain(&self.actions).filter(|pose| pose.opacity >= 1.0 - 1e-4 && pose.y.abs() < 1e-4).count()
    }
}

impl PoseTargets<ContentTarget> for ContentStage {
    fn pose_mut(&mut self, target: ContentTarget) -> &mut Pose {
        let slot = match target {
            ContentTarget::Word(index) => self.words.get_mut(index),
            ContentTarget::Action(index) => self.actions.get_mut(index),
        };
        slot.unwrap_or(&mut self.spare)
    }
}

/// One-shot reveal timeline over a [`ContentStage`].
#[derive(Debug, Clone)]
pub struct ContentReveal {
    stage: ContentStage,
    timeline: Timeline<ContentTarget>,
    finished: bool,
}

impl ContentReveal {
    pub fn new(config: &ContentConfig) -> Self {
        let ease = Easing::back(OVERSHOOT);
        let words = (0..config.subtitle_words as usize).map(|index| {
            Tween::to(ContentTarget::Word(index), WORD_DURATION, ease)
                .from_to(Channel::Y, 50.0, 0.0)
                .from_to(Channel::Opacity, 0.0, 1.0)
                .from_to(Channel::Tilt, -90.0, 0.0)
        });
        let actions = (0..config.actions as usize).map(|index| {
            Tween::to(ContentTarget::Action(index), ACTION_DURATION, ease)
                .from_to(Channel::Y, 30.0, 0.0)
                .from_to(Channel::Opacity, 0.0, 1.0)
                .from_to(Channel::Scale, 0.8, 1.0)
        });
        let delay = if config.reveal_delay.is_finite() { config.reveal_delay.max(0.0) } else { 0.0 };
        let timeline = Timeline::new()
            .then(StepKind::Wait(delay))
            .then(StepKind::Cue(NAME_CUE))
            .then_staggered(WORD_GAP, WORD_STAGGER, words)
            .then_staggered(-ACTION_OVERLAP, ACTION_STAGGER, actions);
        Self { stage: ContentStage::new(config), timeline, finished: false }
    }

    pub fn stage(&self) -> &ContentStage {
        &self.stage
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed(&self) -> f32 {
        self.timeline.elapsed()
    }

    pub fn total_duration(&self) -> f32 {
        self.timeline.total_duration()
    }

    pub fn advance(&mut self, dt: f32) -> TimelineStatus {
        if self.finished {
            return TimelineStatus::Finished { leftover: dt.max(0.0) };
        }
        let mut named = false;
        let status = self.timeline.advance(dt, &mut self.stage, &mut |name| {
            named |= name == NAME_CUE;
            true
        });
        if named {
            self.stage.name_revealed = true;
            log::debug!(target: "aurora::reveal", "headline revealed");
        }
        if let TimelineStatus::Finished { .. } = status {
            self.finished = true;
            log::debug!(target: "aurora::reveal", "content reveal finished after {:.2}s", self.timeline.elapsed());
        }
        status
    }
}
