use aurora_engine::events::EngineEvent;
use aurora_engine::render::Frame;
use aurora_engine::{
    Engine, EngineConfig, FaultKind, InputEvent, IntroPhase, RecordingSurface, RenderSurface, TopicDescriptor,
};
use std::cell::Cell;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

fn topics() -> Vec<TopicDescriptor> {
    vec![TopicDescriptor::new("alpha"), TopicDescriptor::new("beta").pulsing(), TopicDescriptor::new("gamma")]
}

fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.intro.enabled = false;
    config.particles.ambient_count = 40;
    config
}

#[test]
fn full_run_hands_off_and_scrolls_to_the_end() {
    let mut engine = Engine::new(EngineConfig::default(), &topics());
    let handed_off = Rc::new(Cell::new(0u32));
    let flag = handed_off.clone();
    engine.on_phase_complete(move || flag.set(flag.get() + 1));

    let mut surface = RecordingSurface::new();
    let mut scroll = 0.0_f32;
    for _ in 0..1200 {
        if handed_off.get() > 0 {
            scroll = (scroll + 0.005).min(1.0);
        }
        engine.push_input(InputEvent::Scroll { progress: scroll });
        engine.push_input(InputEvent::PointerMove { x: 400.0, y: 300.0 });
        let report = engine.tick(DT, Some(&mut surface));
        assert!(report.rendered);
    }

    assert_eq!(handed_off.get(), 1);
    assert_eq!(engine.intro_phase(), Some(IntroPhase::Complete));
    assert_eq!(surface.frames().len(), 1200);
    assert_eq!(engine.progress(), 1.0);
    assert!((engine.scene().camera_pose().position.z - 8.0).abs() < 1e-5);
    assert_eq!(engine.faults().total(), 0);
    assert_eq!(engine.scene().particles().ambient_count(), 150);
}

#[test]
fn intro_frames_carry_the_overlay_then_drop_it() {
    let mut engine = Engine::new(EngineConfig::default(), &topics());
    let mut surface = RecordingSurface::new();
    engine.tick(DT, Some(&mut surface));
    let first = surface.last().cloned().unwrap_or_else(|| panic!("no frame"));
    assert_eq!(first.intro_phase, Some(IntroPhase::Timeline));
    assert_eq!(first.overlay_opacity, Some(1.0));

    engine.tick(14.0, Some(&mut surface));
    let last = surface.last().cloned().unwrap_or_else(|| panic!("no frame"));
    assert_eq!(last.intro_phase, None);
    assert_eq!(last.overlay_opacity, None);
}

struct LostContext {
    submitted: usize,
}

impl RenderSurface for LostContext {
    fn is_available(&self) -> bool {
        false
    }

    fn submit(&mut self, _frame: &Frame<'_>) {
        self.submitted += 1;
    }
}

#[test]
fn unavailable_surface_skips_the_push_but_not_the_state() {
    let mut engine = Engine::new(quiet_config(), &topics());
    let mut surface = LostContext { submitted: 0 };
    engine.push_input(InputEvent::Scroll { progress: 0.3 });
    for _ in 0..5 {
        let report = engine.tick(DT, Some(&mut surface));
        assert!(!report.rendered);
    }
    assert_eq!(surface.submitted, 0);
    assert_eq!(engine.faults().count(FaultKind::MissingRenderTarget), 5);
    assert_eq!(engine.ticks(), 5);
    assert_eq!(engine.progress(), 0.3);
}

#[test]
fn activation_events_follow_scroll() {
    let mut engine = Engine::new(quiet_config(), &topics());
    engine.tick(DT, None);
    assert!(engine.drain_events().is_empty());

    // Four pages: one lead-in, then alpha, beta, gamma.
    engine.push_input(InputEvent::Scroll { progress: 0.3 });
    engine.tick(DT, None);
    let events = engine.drain_events();
    assert!(matches!(events.as_slice(), [EngineEvent::EntityActivated { id }] if &**id == "alpha"));

    engine.push_input(InputEvent::Scroll { progress: 0.6 });
    engine.tick(DT, None);
    let ids: Vec<(String, bool)> = engine
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::EntityActivated { id } => Some((id.to_string(), true)),
            EngineEvent::EntityDeactivated { id } => Some((id.to_string(), false)),
            _ => None,
        })
        .collect();
    assert_eq!(ids, [("alpha".to_string(), false), ("beta".to_string(), true)]);
    assert_eq!(engine.page_index(), 2);
}

#[test]
fn visible_entities_converge_into_frames() {
    let mut engine = Engine::new(quiet_config(), &topics());
    let mut surface = RecordingSurface::new();
    engine.push_input(InputEvent::Scroll { progress: 0.8 });
    for _ in 0..60 {
        engine.tick(DT, Some(&mut surface));
    }
    let last = surface.last().cloned().unwrap_or_else(|| panic!("no frame"));
    assert_eq!(last.visible, ["gamma"]);
    assert_eq!(last.particles, 40);
}

#[test]
fn out_of_range_scroll_is_clamped_and_counted() {
    let mut engine = Engine::new(quiet_config(), &topics());
    engine.push_input(InputEvent::Scroll { progress: 1.7 });
    engine.tick(DT, None);
    assert_eq!(engine.progress(), 1.0);
    assert_eq!(engine.faults().count(FaultKind::InputOutOfRange), 1);
}

#[test]
fn dispose_mid_intro_cancels_the_handoff() {
    let mut engine = Engine::new(EngineConfig::default(), &topics());
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    engine.on_phase_complete(move || flag.set(true));
    let mut surface = RecordingSurface::new();
    for _ in 0..300 {
        engine.tick(DT, Some(&mut surface));
    }
    assert_eq!(engine.intro_phase(), Some(IntroPhase::EpicReveal));

    engine.dispose_handle().dispose();
    engine.dispose();
    for _ in 0..1000 {
        engine.tick(DT, Some(&mut surface));
    }
    assert!(!fired.get());
    assert_eq!(surface.frames().len(), 300);
    assert_eq!(engine.ticks(), 300);
    assert_eq!(engine.faults().count(FaultKind::PostDisposalTick), 1000);
}

#[test]
fn disposing_from_an_intro_cue_stops_the_tick() {
    let mut engine = Engine::new(EngineConfig::default(), &topics());
    let handle = engine.dispose_handle();
    engine.on_intro_cue(move |_, name| {
        if name == "launch" {
            handle.dispose();
        }
    });
    let mut surface = RecordingSurface::new();
    engine.tick(30.0, Some(&mut surface));
    assert!(engine.is_disposed());
    assert!(surface.frames().is_empty());
    assert_eq!(engine.ticks(), 0);
}

#[test]
fn camera_dolly_decreases_strictly_with_scroll() {
    let mut engine = Engine::new(quiet_config(), &topics());
    let mut last_z = f32::INFINITY;
    for step in 0..=20 {
        engine.push_input(InputEvent::Scroll { progress: step as f32 / 20.0 });
        engine.tick(DT, None);
        let z = engine.scene().camera_pose().position.z;
        let expected = 10.0 - 2.0 * step as f32 / 20.0;
        assert!((z - expected).abs() < 1e-5, "step {step}: z {z}");
        assert!(z < last_z);
        last_z = z;
    }
}

#[test]
fn scroll_and_pointer_during_the_intro_wait_for_the_handoff() {
    let mut engine = Engine::new(EngineConfig::default(), &topics());
    let mut surface = RecordingSurface::new();
    for _ in 0..60 {
        engine.push_input(InputEvent::Scroll { progress: 0.6 });
        engine.push_input(InputEvent::PointerMove { x: 640.0, y: 360.0 });
        engine.tick(DT, Some(&mut surface));
    }
    assert_eq!(engine.intro_phase(), Some(IntroPhase::Timeline));
    assert_eq!(engine.progress(), 0.0);
    assert_eq!(engine.scene().particles().transient_count(), 0);
    assert_eq!(engine.scene().camera_pose().position.z, 10.0);
    assert!(engine.drain_events().iter().all(|event| !matches!(event, EngineEvent::EntityActivated { .. })));
    assert!(surface.frames().iter().all(|frame| frame.particles == 0 && frame.intro_phase.is_some()));

    engine.tick(14.0, Some(&mut surface));
    assert_eq!(engine.intro_phase(), Some(IntroPhase::Complete));
    assert_eq!(engine.progress(), 0.6);
    assert!((engine.scene().camera_pose().position.z - 8.8).abs() < 1e-5);
    let last = surface.last().cloned().unwrap_or_else(|| panic!("no frame"));
    assert_eq!(last.intro_phase, None);
    assert_eq!(last.particles, 150);
}

#[derive(Default)]
struct FrameCapture {
    parallax_layers: Vec<usize>,
    origin_ndc: Vec<[f32; 2]>,
}

impl RenderSurface for FrameCapture {
    fn submit(&mut self, frame: &Frame<'_>) {
        self.parallax_layers.push(frame.parallax.len());
        let clip = frame.view_projection * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        self.origin_ndc.push([clip.x / clip.w, clip.y / clip.w]);
    }
}

#[test]
fn frames_carry_parallax_layers_and_the_camera_projection() {
    let mut engine = Engine::new(quiet_config(), &topics());
    let mut surface = FrameCapture::default();
    engine.push_input(InputEvent::PointerMove { x: 1280.0, y: 0.0 });
    for _ in 0..30 {
        engine.tick(DT, Some(&mut surface));
    }
    assert!(surface.parallax_layers.iter().all(|&layers| layers == 7));
    assert!(surface.origin_ndc.iter().all(|ndc| ndc[0].abs() < 1e-4 && ndc[1].abs() < 1e-4));
    let layers = engine.scene().parallax().layers();
    assert!(layers[1].offset.current.x > 0.0 && layers[1].offset.current.y < 0.0);
}
