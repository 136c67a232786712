use super::profiler::TickProfiler;
use super::types::*;
use crate::camera::{CameraPose, CameraRig};
use crate::events::{EngineEvent, EventBus};
use crate::input::InputSnapshot;
use crate::interpolation::Lerp;
use crate::particles::ParticlePool;
use crate::progress::ProgressSource;
use crate::surface::SurfaceState;
use crate::time::FrameClock;
use crate::visibility::{evaluate, ActivationWindow, WindowPolicy};
use bevy_ecs::prelude::*;

/// Activation above which an entity counts as switched on for events.
const ACTIVE_THRESHOLD: f32 = 0.5;

pub fn sys_sample_progress(
    snapshot: Res<InputSnapshot>,
    mut progress: ResMut<ProgressSource>,
    mut profiler: ResMut<TickProfiler>,
) {
    let _span = profiler.scope("sys_sample_progress");
    progress.set_target(snapshot.scroll);
    progress.step();
}

pub fn sys_evaluate_windows(
    progress: Res<ProgressSource>,
    policy: Res<WindowPolicy>,
    scene_scale: Res<SceneScale>,
    clock: Res<FrameClock>,
    mut events: ResMut<EventBus>,
    mut profiler: ResMut<TickProfiler>,
    mut q: Query<(
        &SceneEntity,
        &ActivationWindow,
        &BaseTransform,
        Option<&ScalePulse>,
        Option<&IdleMotion>,
        &mut Activation,
        &mut TargetTransform,
    )>,
) {
    let _span = profiler.scope("sys_evaluate_windows");
    let p = progress.value();
    for (scene_entity, window, base, pulse, idle, mut activation, mut target) in &mut q {
        let level = evaluate(window, p, *policy);
        let was_active = activation.0 > ACTIVE_THRESHOLD;
        let is_active = level > ACTIVE_THRESHOLD;
        if was_active != is_active {
            let id = scene_entity.id.clone();
            events.push(if is_active {
                EngineEvent::EntityActivated { id }
            } else {
                EngineEvent::EntityDeactivated { id }
            });
        }
        activation.0 = level;

        let mut scale = base.0.scale * scene_scale.0 * level;
        if let Some(pulse) = pulse {
            scale *= 1.0 + (clock.elapsed * pulse.frequency).sin() * pulse.amplitude;
        }
        let (float, spin) = idle.map(|idle| idle.sample(clock.elapsed)).unwrap_or_default();
        target.0 = EntityTransform {
            position: base.0.position + float,
            rotation: base.0.rotation + spin,
            scale,
            opacity: base.0.opacity * level,
        };
    }
}

pub fn sys_interpolate_entities(
    mut profiler: ResMut<TickProfiler>,
    mut q: Query<(&ConvergenceRate, &TargetTransform, &mut CurrentTransform)>,
) {
    let _span = profiler.scope("sys_interpolate_entities");
    for (rate, target, mut current) in &mut q {
        current.0 = current.0.lerp_toward(target.0, rate.0);
    }
}

pub fn sys_track_pointer(
    snapshot: Res<InputSnapshot>,
    mut cursor: ResMut<CursorState>,
    mut parallax: ResMut<PointerParallax>,
    mut profiler: ResMut<TickProfiler>,
) {
    let _span = profiler.scope("sys_track_pointer");
    cursor.track(snapshot.pointer);
    parallax.track(snapshot.pointer, snapshot.viewport);
}

pub fn sys_step_particles(
    snapshot: Res<InputSnapshot>,
    mut pool: ResMut<ParticlePool>,
    mut events: ResMut<EventBus>,
    mut profiler: ResMut<TickProfiler>,
) {
    let _span = profiler.scope("sys_step_particles");
    if let Some(point) = snapshot.injection {
        pool.inject_trail(point.extend(0.0));
    }
    let report = pool.step(snapshot.pointer.map(|pointer| pointer.extend(0.0)));
    if report.expired > 0 {
        log::trace!(target: "aurora::particles", "{} transient expired, {} respawned", report.expired, report.respawned);
    }
    let was_over = pool.connection_stats().over_limit;
    let stats = pool.compute_connections();
    if stats.over_limit != was_over {
        events.push(EngineEvent::ConnectionLimit { exceeded: stats.over_limit, particles: stats.particles });
    }
    pool.write_instances();
}

pub fn sys_update_surface(
    clock: Res<FrameClock>,
    mut surface: ResMut<SurfaceState>,
    mut profiler: ResMut<TickProfiler>,
) {
    let _span = profiler.scope("sys_update_surface");
    surface.update(clock.elapsed);
}

pub fn sys_update_camera(
    progress: Res<ProgressSource>,
    rig: Res<CameraRig>,
    mut pose: ResMut<CameraPose>,
    mut profiler: ResMut<TickProfiler>,
) {
    let _span = profiler.scope("sys_update_camera");
    *pose = rig.pose(progress.value());
}
