//! Intro choreography: a four-phase state machine driven by tween timelines.
//!
//! Timeline → EpicReveal → WorldEntry → Portal → Complete. Each phase owns one [`Timeline`]; when
//! it finishes the leftover part of `dt` flows straight into the next phase, so the total intro
//! length does not depend on how time is sliced into ticks.

use crate::config::IntroConfig;
use crate::easing::Easing;
use crate::error::EngineFault;
use crate::tween::{Channel, Pose, PoseTargets, StepKind, TargetId, Timeline, TimelineStatus, Tween};
use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroPhase {
    Timeline,
    EpicReveal,
    WorldEntry,
    Portal,
    Complete,
}

impl IntroPhase {
    pub fn next(self) -> IntroPhase {
        match self {
            IntroPhase::Timeline => IntroPhase::EpicReveal,
            IntroPhase::EpicReveal => IntroPhase::WorldEntry,
            IntroPhase::WorldEntry => IntroPhase::Portal,
            IntroPhase::Portal | IntroPhase::Complete => IntroPhase::Complete,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntroPhase::Timeline => "timeline",
            IntroPhase::EpicReveal => "epic_reveal",
            IntroPhase::WorldEntry => "world_entry",
            IntroPhase::Portal => "portal",
            IntroPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for IntroPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPose {
    pub label: i32,
    /// Signed distance from the focus line, in label heights.
    pub offset: f32,
    pub scale: f32,
    pub opacity: f32,
    pub blur: f32,
    pub emphasized: bool,
}

/// Everything the intro overlay needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntroStage {
    pub phase: IntroPhase,
    pub label_track: Pose,
    pub reveal: Pose,
    pub world_title: Pose,
    pub aperture: Pose,
    pub overlay: Pose,
    pub labels: Vec<LabelPose>,
    pub reveal_label: i32,
}

impl PoseTargets for IntroStage {
    fn pose_mut(&mut self, target: TargetId) -> &mut Pose {
        match target {
            TargetId::LabelTrack => &mut self.label_track,
            TargetId::RevealLabel => &mut self.reveal,
            TargetId::WorldTitle => &mut self.world_title,
            TargetId::Aperture => &mut self.aperture,
            TargetId::Overlay => &mut self.overlay,
        }
    }
}

impl IntroStage {
    fn new(config: &IntroConfig) -> Self {
        let count = config.label_count as i32;
        let labels = (0..count)
            .map(|i| LabelPose {
                label: config.first_label + i,
                offset: i as f32,
                scale: 1.0,
                opacity: 1.0,
                blur: 0.0,
                emphasized: false,
            })
            .collect();
        Self {
            phase: IntroPhase::Timeline,
            label_track: Pose { y: track_extent(config), ..Pose::default() },
            reveal: Pose::HIDDEN,
            world_title: Pose::HIDDEN,
            aperture: Pose { scale: 0.0, ..Pose::HIDDEN },
            overlay: Pose::default(),
            labels,
            reveal_label: config.first_label + count.max(1) - 1,
        }
    }

    pub fn pose(&self, target: TargetId) -> &Pose {
        match target {
            TargetId::LabelTrack => &self.label_track,
            TargetId::RevealLabel => &self.reveal,
            TargetId::WorldTitle => &self.world_title,
            TargetId::Aperture => &self.aperture,
            TargetId::Overlay => &self.overlay,
        }
    }

    pub fn emphasized_label(&self) -> Option<i32> {
        self.labels.iter().find(|pose| pose.emphasized).map(|pose| pose.label)
    }

    fn refresh_labels(&mut self, config: &IntroConfig) {
        let center = track_extent(config);
        let track = self.label_track;
        let reach = config.falloff_distance.max(f32::EPSILON);
        for (index, pose) in self.labels.iter_mut().enumerate() {
            let offset = index as f32 - center + track.y;
            let falloff = config.falloff_easing.apply((offset.abs() / reach).min(1.0));
            pose.offset = offset;
            pose.scale = 1.0 - (1.0 - config.edge_scale) * falloff;
            pose.opacity = (1.0 - (1.0 - config.edge_opacity) * falloff) * track.opacity;
            pose.blur = config.edge_blur * falloff;
            pose.emphasized = offset.abs() < 0.5;
        }
    }
}

/// Track offset that centers the first label.
fn track_extent(config: &IntroConfig) -> f32 {
    (config.label_count.max(1) - 1) as f32 * 0.5
}

/// Shared cancellation flag. Cloning hands out another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct DisposeHandle(Rc<Cell<bool>>);

impl DisposeHandle {
    pub fn dispose(&self) {
        self.0.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IntroEvent {
    PhaseEntered(IntroPhase),
    Cue { phase: IntroPhase, name: &'static str },
    Completed,
}

fn script(phase: IntroPhase, config: &IntroConfig) -> Timeline {
    use Channel::*;
    use TargetId::*;
    let extent = track_extent(config);
    match phase {
        IntroPhase::Timeline => Timeline::new()
            .then(Tween::set(LabelTrack).channel(Y, extent).channel(Opacity, 1.0))
            .then(Tween::to(LabelTrack, config.timeline_duration, Easing::CubicInOut).channel(Y, -extent)),
        IntroPhase::EpicReveal => Timeline::new()
            .then(Tween::set(LabelTrack).channel(Opacity, 0.0))
            .then(Tween::set(RevealLabel).channel(Opacity, 1.0).channel(Scale, 1.0))
            .then(Tween::to(RevealLabel, 0.4, Easing::CubicOut).channel(Scale, 1.5))
            .then(Tween::to(RevealLabel, 0.5, Easing::elastic(1.0, 0.3)).channel(Scale, 1.0))
            .then(StepKind::Wait(0.3))
            .then(StepKind::Cue("glow"))
            .then(Tween::to(RevealLabel, 0.6, Easing::CubicOut).channel(Scale, 1.8).channel(Glow, 1.0))
            .then(Tween::to(RevealLabel, 0.4, Easing::elastic(1.0, 0.5)).channel(Scale, 1.2))
            .then(StepKind::Wait(0.5))
            .then(StepKind::Cue("launch"))
            .then(
                Tween::to(RevealLabel, 0.8, Easing::QuartIn)
                    .channel(Y, -300.0)
                    .channel(Opacity, 0.0)
                    .channel(Scale, 2.0)
                    .channel(Tilt, -45.0),
            ),
        IntroPhase::WorldEntry => Timeline::new()
            .then(
                Tween::to(WorldTitle, 1.5, Easing::QuartOut)
                    .from_to(Y, 400.0, 0.0)
                    .from_to(Opacity, 0.0, 1.0)
                    .from_to(Scale, 0.5, 1.0)
                    .from_to(Tilt, 60.0, 0.0)
                    .from_to(Blur, 30.0, 0.0),
            )
            .then(Tween::to(WorldTitle, 0.3, Easing::back(2.0)).channel(Scale, 1.05))
            .then(StepKind::Wait(0.8))
            .then(StepKind::Cue("pulse"))
            .then(Tween::to(WorldTitle, 0.6, Easing::CubicInOut).channel(Glow, 1.0).channel(Scale, 1.08).yoyo(1)),
        IntroPhase::Portal => Timeline::new()
            .then(StepKind::Cue("portal_open"))
            .then(Tween::to(WorldTitle, 1.8, Easing::QuintIn).channel(Scale, 8.0).channel(Opacity, 0.0))
            .then_at(
                -1.2,
                Tween::to(Aperture, 1.2, Easing::CubicIn).from_to(Scale, 0.0, 60.0).from_to(Opacity, 0.0, 1.0),
            )
            .then_at(-0.4, Tween::to(Overlay, 0.6, Easing::CubicOut).channel(Opacity, 0.0)),
        IntroPhase::Complete => Timeline::new(),
    }
}

/// Nominal length of a phase with the given intro settings.
pub fn phase_duration(phase: IntroPhase, config: &IntroConfig) -> f32 {
    script(phase, config).total_duration()
}

pub struct PhaseSequencer {
    config: IntroConfig,
    stage: IntroStage,
    timeline: Timeline,
    elapsed: f32,
    dispose: DisposeHandle,
    torn_down: bool,
    completed: bool,
    on_complete: Option<Box<dyn FnOnce()>>,
    on_cue: Option<Box<dyn FnMut(IntroPhase, &'static str)>>,
    events: Vec<IntroEvent>,
}

impl PhaseSequencer {
    pub fn new(config: &IntroConfig) -> Self {
        let stage = IntroStage::new(config);
        let mut sequencer = Self {
            config: config.clone(),
            timeline: script(IntroPhase::Timeline, config),
            stage,
            elapsed: 0.0,
            dispose: DisposeHandle::default(),
            torn_down: false,
            completed: false,
            on_complete: None,
            on_cue: None,
            events: vec![IntroEvent::PhaseEntered(IntroPhase::Timeline)],
        };
        sequencer.stage.refresh_labels(&sequencer.config);
        sequencer
    }

    pub fn phase(&self) -> IntroPhase {
        self.stage.phase
    }

    pub fn stage(&self) -> &IntroStage {
        &self.stage
    }

    /// Total seconds consumed by the sequencer.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn dispose_handle(&self) -> DisposeHandle {
        self.dispose.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.dispose.is_disposed()
    }

    /// Registers the handoff callback. It runs once when Portal finishes and never after disposal.
    pub fn on_phase_complete(&mut self, callback: impl FnOnce() + 'static) {
        if self.is_disposed() {
            return;
        }
        if self.completed {
            callback();
            return;
        }
        self.on_complete = Some(Box::new(callback));
    }

    pub fn on_cue(&mut self, callback: impl FnMut(IntroPhase, &'static str) + 'static) {
        if !self.is_disposed() {
            self.on_cue = Some(Box::new(callback));
        }
    }

    pub fn dispose(&mut self) {
        self.dispose.dispose();
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.timeline.clear();
        self.on_complete = None;
        self.on_cue = None;
        log::debug!(target: "aurora::intro", "disposed in phase {}", self.stage.phase);
    }

    /// Jumps straight to Complete and runs the handoff.
    pub fn skip(&mut self) {
        if self.is_disposed() || self.completed {
            return;
        }
        self.timeline.clear();
        self.enter(IntroPhase::Complete);
    }

    pub fn drain_events(&mut self) -> Vec<IntroEvent> {
        self.events.drain(..).collect()
    }

    pub fn advance(&mut self, dt: f32) -> Result<IntroPhase, EngineFault> {
        if self.dispose.is_disposed() {
            self.teardown();
            return Err(EngineFault::PostDisposalTick);
        }
        let mut remaining = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += remaining;
        while !self.completed {
            let phase = self.stage.phase;
            let dispose = &self.dispose;
            let events = &mut self.events;
            let on_cue = &mut self.on_cue;
            let status = self.timeline.advance(remaining, &mut self.stage, &mut |name| {
                events.push(IntroEvent::Cue { phase, name });
                if let Some(callback) = on_cue.as_mut() {
                    callback(phase, name);
                }
                !dispose.is_disposed()
            });
            self.stage.refresh_labels(&self.config);
            match status {
                TimelineStatus::Running => break,
                TimelineStatus::Halted => {
                    self.teardown();
                    break;
                }
                TimelineStatus::Finished { leftover } => {
                    remaining = leftover;
                    self.enter(phase.next());
                }
            }
        }
        Ok(self.stage.phase)
    }

    fn enter(&mut self, phase: IntroPhase) {
        log::debug!(target: "aurora::intro", "{} -> {} at {:.3}s", self.stage.phase, phase, self.elapsed);
        self.stage.phase = phase;
        self.events.push(IntroEvent::PhaseEntered(phase));
        if phase == IntroPhase::Complete {
            self.completed = true;
            self.events.push(IntroEvent::Completed);
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
            return;
        }
        self.timeline = script(phase, &self.config);
    }
}

impl fmt::Debug for PhaseSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseSequencer")
            .field("phase", &self.stage.phase)
            .field("elapsed", &self.elapsed)
            .field("disposed", &self.is_disposed())
            .field("completed", &self.completed)
            .finish()
    }
}
