//! Host-facing facade: one `tick` per display frame, in a fixed order.
//!
//! 1. snapshot the latest input (last write wins)
//! 2. advance the intro sequencer while it is live
//! 3. once the intro has handed off (or when there is none): advance the hero content reveal and
//!    run the scene schedule (progress, windows, interpolation, pointer, particles, surface, camera)
//! 4. push the frame to the render surface, if there is one
//!
//! While the intro is live the scene is frozen. Scroll and pointer samples still land in the input
//! buffer, so the first scene tick after the handoff sees the latest values.

use crate::config::EngineConfig;
use crate::ecs::SceneWorld;
use crate::error::{EngineFault, FaultLog};
use crate::events::EngineEvent;
use crate::input::{Input, InputEvent};
use crate::render::{CursorPose, Frame, RenderSurface};
use crate::reveal::ContentReveal;
use crate::sequencer::{DisposeHandle, IntroPhase, PhaseSequencer};
use crate::visibility::TopicDescriptor;
use glam::Vec2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub progress: f32,
    pub intro_phase: Option<IntroPhase>,
    pub rendered: bool,
}

pub struct Engine {
    config: EngineConfig,
    scene: SceneWorld,
    input: Input,
    intro: Option<PhaseSequencer>,
    content: Option<ContentReveal>,
    dispose: DisposeHandle,
    ticks: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, topics: &[TopicDescriptor]) -> Self {
        if let Err(err) = config.validate() {
            log::warn!(target: "aurora::engine", "config problem, values will be clamped: {err:#}");
        }
        let scene = SceneWorld::new(&config, topics);
        let input = Input::new(Vec2::new(config.viewport.width, config.viewport.height));
        let intro = config.intro.enabled.then(|| PhaseSequencer::new(&config.intro));
        let dispose = intro.as_ref().map(PhaseSequencer::dispose_handle).unwrap_or_default();
        let content = config.content.enabled.then(|| ContentReveal::new(&config.content));
        log::debug!(
            target: "aurora::engine",
            "engine ready: {} entities, {} ambient particles, intro {}",
            topics.len(),
            config.particles.ambient_count,
            if intro.is_some() { "enabled" } else { "skipped" }
        );
        Self { config, scene, input, intro, content, dispose, ticks: 0 }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Records an external sample for the next tick. Ignored after disposal.
    pub fn push_input(&mut self, event: InputEvent) {
        if !self.is_disposed() {
            self.input.push(event);
        }
    }

    /// Published scroll progress `p` after the last tick.
    pub fn progress(&self) -> f32 {
        self.scene.progress().value()
    }

    pub fn page_index(&self) -> u32 {
        self.scene.progress().page_index()
    }

    /// `None` when the intro is disabled.
    pub fn intro_phase(&self) -> Option<IntroPhase> {
        self.intro.as_ref().map(PhaseSequencer::phase)
    }

    pub fn intro(&self) -> Option<&PhaseSequencer> {
        self.intro.as_ref()
    }

    /// True while the intro plays and the scene waits for the handoff.
    pub fn intro_live(&self) -> bool {
        self.intro.as_ref().is_some_and(|sequencer| !sequencer.is_complete())
    }

    /// Jumps the intro to its handoff. The scene starts running on the next tick.
    pub fn skip_intro(&mut self) {
        if self.is_disposed() {
            return;
        }
        if let Some(sequencer) = self.intro.as_mut() {
            sequencer.skip();
            let events: Vec<EngineEvent> = sequencer.drain_events().into_iter().map(EngineEvent::from).collect();
            for event in events {
                self.scene.push_event(event);
            }
        }
    }

    pub fn content(&self) -> Option<&ContentReveal> {
        self.content.as_ref()
    }

    /// Registers the intro handoff. With no intro configured the intro counts as already complete
    /// and the callback runs immediately.
    pub fn on_phase_complete(&mut self, callback: impl FnOnce() + 'static) {
        if self.is_disposed() {
            return;
        }
        match self.intro.as_mut() {
            Some(sequencer) => sequencer.on_phase_complete(callback),
            None => callback(),
        }
    }

    pub fn on_intro_cue(&mut self, callback: impl FnMut(IntroPhase, &'static str) + 'static) {
        if let Some(sequencer) = self.intro.as_mut() {
            sequencer.on_cue(callback);
        }
    }

    /// Shared cancellation flag; disposing through it is equivalent to [`Engine::dispose`].
    pub fn dispose_handle(&self) -> DisposeHandle {
        self.dispose.clone()
    }

    /// Cancels every outstanding intro step and callback. Idempotent.
    pub fn dispose(&mut self) {
        let first = !self.is_disposed();
        self.dispose.dispose();
        if let Some(sequencer) = self.intro.as_mut() {
            sequencer.dispose();
        }
        if first {
            log::debug!(target: "aurora::engine", "disposed after {} ticks", self.ticks);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.dispose.is_disposed()
    }

    pub fn faults(&self) -> &FaultLog {
        self.scene.faults()
    }

    pub fn scene(&self) -> &SceneWorld {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneWorld {
        &mut self.scene
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.scene.drain_events()
    }

    fn record(&mut self, fault: EngineFault) {
        self.scene.faults_mut().record(fault);
    }

    pub fn tick(&mut self, dt: f32, surface: Option<&mut dyn RenderSurface>) -> TickReport {
        if self.is_disposed() {
            self.dispose();
            self.record(EngineFault::PostDisposalTick);
            return self.report(false);
        }

        let snapshot = self.input.snapshot();
        for fault in self.input.drain_faults() {
            self.record(fault);
        }

        if let Some(sequencer) = self.intro.as_mut() {
            if !sequencer.is_complete() {
                let advanced = sequencer.advance(dt);
                let events: Vec<EngineEvent> = sequencer.drain_events().into_iter().map(EngineEvent::from).collect();
                for event in events {
                    self.scene.push_event(event);
                }
                if let Err(fault) = advanced {
                    self.record(fault);
                }
            }
        }
        if self.is_disposed() {
            // Disposed from inside an intro callback: leave the scene untouched.
            self.dispose();
            return self.report(false);
        }

        if !self.intro_live() {
            if let Some(reveal) = self.content.as_mut() {
                reveal.advance(dt);
            }
            self.scene.update(snapshot, dt);
            self.scene.collect_entities();
        }
        self.ticks += 1;

        let rendered = match surface {
            Some(surface) if surface.is_available() => {
                let frame = self.frame();
                surface.submit(&frame);
                true
            }
            _ => false,
        };
        if !rendered {
            self.record(EngineFault::MissingRenderTarget { tick: self.ticks });
        }
        self.report(rendered)
    }

    fn frame(&self) -> Frame<'_> {
        let scene = &self.scene;
        let camera = scene.camera_pose();
        let view_projection = scene.camera_rig().camera(&camera).view_projection(scene.viewport());
        let intro = self.intro.as_ref().filter(|sequencer| !sequencer.is_complete()).map(PhaseSequencer::stage);
        if intro.is_some() {
            return Frame {
                tick: self.ticks,
                elapsed: scene.clock().elapsed,
                progress: scene.progress().value(),
                entities: &[],
                particles: &[],
                connections: &[],
                streaks: &[],
                drift: &[],
                uniforms: &[],
                camera,
                view_projection,
                cursor: None,
                parallax: &[],
                intro,
                content: None,
            };
        }

        let pool = scene.particles();
        let surface = scene.surface();
        let cursor = scene.cursor();
        Frame {
            tick: self.ticks,
            elapsed: scene.clock().elapsed,
            progress: scene.progress().value(),
            entities: scene.entities(),
            particles: pool.instances(),
            connections: pool.connections(),
            streaks: surface.streaks.instances(),
            drift: surface.drift.instances(),
            uniforms: surface.uniforms(),
            camera,
            view_projection,
            cursor: cursor.visible.then(|| CursorPose {
                outer: cursor.follower.outer.current,
                inner: cursor.follower.inner.current,
                scale: cursor.follower.scale.current,
            }),
            parallax: scene.parallax().layers(),
            intro: None,
            content: self.content.as_ref().map(ContentReveal::stage),
        }
    }

    fn report(&self, rendered: bool) -> TickReport {
        TickReport { tick: self.ticks, progress: self.progress(), intro_phase: self.intro_phase(), rendered }
    }
}
