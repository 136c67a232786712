use anyhow::{Context, Result};
use aurora_engine::cli::CliOptions;
use aurora_engine::ecs::SystemTimingSummary;
use aurora_engine::events::EngineEvent;
use aurora_engine::time::WallClock;
use aurora_engine::{Engine, EngineConfig, FaultLog, InputEvent, IntroPhase, RecordingSurface, TopicDescriptor};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TICK_SECONDS: f32 = 1.0 / 60.0;

fn log_filter(options: &CliOptions) -> EnvFilter {
    match options.log_level {
        Some(level) => EnvFilter::new(level.to_string().to_ascii_lowercase()),
        None => EnvFilter::try_from_env("AURORA_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}

/// Installs the stderr subscriber. `--log-level` wins over `AURORA_LOG`, which takes the usual
/// `EnvFilter` directives; `log` records from the library are bridged into it.
fn init_logging(options: &CliOptions) {
    let installed = tracing_subscriber::registry()
        .with(log_filter(options))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if let Err(err) = installed {
        eprintln!("[log] subscriber not installed: {err}");
    }
}

fn default_topics() -> Vec<TopicDescriptor> {
    vec![
        TopicDescriptor::new("what-is-it").floating(),
        TopicDescriptor::new("core-objectives"),
        TopicDescriptor::new("design-constraints").pulsing(),
        TopicDescriptor::new("fragmentation"),
        TopicDescriptor::new("memory-hierarchy").floating(),
        TopicDescriptor::new("os-as-conductor"),
        TopicDescriptor::new("study-table"),
        TopicDescriptor::new("summary"),
    ]
}

#[derive(Serialize)]
struct PhaseMark {
    tick: u64,
    phase: IntroPhase,
}

#[derive(Serialize)]
struct ActivationMark {
    tick: u64,
    id: String,
    active: bool,
}

#[derive(Serialize)]
struct RunReport {
    ticks: u64,
    wall_seconds: f32,
    frames: usize,
    final_progress: f32,
    page_index: u32,
    camera_z: f32,
    intro_completed_at: Option<u64>,
    content_revealed: Option<usize>,
    phases: Vec<PhaseMark>,
    activations: Vec<ActivationMark>,
    ambient_particles: usize,
    transient_particles: usize,
    links: usize,
    over_budget_ticks: u64,
    faults: FaultLog,
    systems: Vec<SystemTimingSummary>,
}

fn run(options: &CliOptions) -> Result<RunReport> {
    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let overrides = options.config_overrides();
    if !overrides.is_empty() {
        log::info!("cli overrides applied: {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }

    let mut engine = Engine::new(config, &default_topics());
    let handed_off = Rc::new(Cell::new(false));
    let flag = handed_off.clone();
    engine.on_phase_complete(move || flag.set(true));

    let viewport = glam::Vec2::new(engine.config().viewport.width, engine.config().viewport.height);
    let mut surface = RecordingSurface::new();
    let mut clock = WallClock::new();
    let mut scroll = 0.0_f32;
    let mut intro_completed_at = None;
    let mut phases = Vec::new();
    let mut activations = Vec::new();

    for tick in 0..options.ticks {
        if handed_off.get() {
            scroll = (scroll + options.scroll_step).min(1.0);
            intro_completed_at.get_or_insert(tick);
        }
        let angle = tick as f32 * 0.05;
        let pointer = viewport * 0.5 + glam::Vec2::new(angle.cos(), angle.sin()) * viewport.y * 0.3;
        engine.push_input(InputEvent::Scroll { progress: scroll });
        engine.push_input(InputEvent::PointerMove { x: pointer.x, y: pointer.y });
        engine.tick(TICK_SECONDS, Some(&mut surface));
        clock.tick();

        for event in engine.drain_events() {
            log::debug!(target: "aurora::run", "tick {tick}: {event}");
            match event {
                EngineEvent::PhaseEntered { phase } => phases.push(PhaseMark { tick, phase }),
                EngineEvent::EntityActivated { id } => {
                    activations.push(ActivationMark { tick, id: id.to_string(), active: true })
                }
                EngineEvent::EntityDeactivated { id } => {
                    activations.push(ActivationMark { tick, id: id.to_string(), active: false })
                }
                _ => {}
            }
        }
    }

    let scene = engine.scene();
    let pool = scene.particles();
    let report = RunReport {
        ticks: engine.ticks(),
        wall_seconds: clock.elapsed_seconds(),
        frames: surface.frames().len(),
        final_progress: engine.progress(),
        page_index: engine.page_index(),
        camera_z: scene.camera_pose().position.z,
        intro_completed_at,
        content_revealed: engine.content().map(|reveal| reveal.stage().revealed_count()),
        phases,
        activations,
        ambient_particles: pool.ambient_count(),
        transient_particles: pool.transient_count(),
        links: pool.connections().len(),
        over_budget_ticks: scene.profiler().over_budget_ticks(),
        faults: engine.faults().clone(),
        systems: scene.profiler().summaries(),
    };
    engine.dispose();
    Ok(report)
}

fn main() {
    let options = match CliOptions::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    init_logging(&options);
    match run(&options).and_then(|report| serde_json::to_string_pretty(&report).map_err(Into::into)) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Run error: {err:?}");
            std::process::exit(1);
        }
    }
}
