use super::profiler::TickProfiler;
use super::systems::*;
use super::types::*;
use crate::camera::{CameraPose, CameraRig};
use crate::config::EngineConfig;
use crate::error::FaultLog;
use crate::events::{EngineEvent, EventBus};
use crate::input::InputSnapshot;
use crate::interpolation::{clamp_rate, ParallaxLayers};
use crate::particles::{ParticlePool, ParticleSettings};
use crate::progress::ProgressSource;
use crate::render::EntityRender;
use crate::surface::SurfaceState;
use crate::time::FrameClock;
use crate::visibility::{layout_windows, ActivationWindow, TopicDescriptor};
use bevy_ecs::prelude::{Entity, IntoSystemConfigs, Schedule, World};
use glam::Vec2;
use std::sync::Arc;

/// The scroll scene: entities, continuous resources and the fixed per-tick schedule.
pub struct SceneWorld {
    pub world: World,
    schedule: Schedule,
    entities: Vec<EntityRender>,
    next_order: u32,
}

impl SceneWorld {
    pub fn new(config: &EngineConfig, topics: &[TopicDescriptor]) -> Self {
        let mut world = World::new();
        let page_count = topics.len() as u32 + config.scene.lead_in_pages;
        let viewport = Vec2::new(config.viewport.width, config.viewport.height);
        world.insert_resource(InputSnapshot { viewport, ..InputSnapshot::default() });
        world.insert_resource(FrameClock::new());
        world.insert_resource(ProgressSource::new(page_count).with_damping(config.scene.scroll_damping));
        world.insert_resource(config.scene.window_policy);
        world.insert_resource(SceneScale(config.scene.global_scale.max(0.0)));
        world.insert_resource(CursorState::new(
            viewport * 0.5,
            config.scene.cursor_rates[0],
            config.scene.cursor_rates[1],
        ));
        world.insert_resource(PointerParallax(ParallaxLayers::new(
            &config.content.parallax_speeds,
            config.content.parallax_rate,
        )));
        let mut pool =
            ParticlePool::new(ParticleSettings::from_config(&config.particles, &config.viewport), config.particles.seed);
        pool.seed_ambient(config.particles.ambient_count as usize);
        world.insert_resource(pool);
        world.insert_resource(SurfaceState::new(&config.surface, config.particles.seed));
        let rig = CameraRig::from_config(&config.camera);
        world.insert_resource(rig.pose(0.0));
        world.insert_resource(rig);
        world.insert_resource(FaultLog::default());
        world.insert_resource(EventBus::default());
        world.insert_resource(TickProfiler::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                sys_sample_progress,
                sys_evaluate_windows,
                sys_interpolate_entities,
                sys_track_pointer,
                sys_step_particles,
                sys_update_surface,
                sys_update_camera,
            )
                .chain(),
        );

        let mut scene = Self { world, schedule, entities: Vec::with_capacity(topics.len()), next_order: 0 };
        let rate = config.scene.convergence_rate;
        let windows = layout_windows(topics.len(), config.scene.lead_in_pages as usize);
        for (topic, window) in topics.iter().zip(windows) {
            let entity = scene.spawn_entity(&topic.label, window, EntityTransform::default(), rate);
            if topic.pulse {
                scene.world.entity_mut(entity).insert(ScalePulse::default());
            }
            if topic.floating {
                let phase = scene.world.get::<SceneEntity>(entity).map_or(0.0, |e| e.order as f32);
                scene.world.entity_mut(entity).insert(IdleMotion::from_config(&config.scene, phase));
            }
        }
        scene
    }

    /// Spawns an entity that starts hidden and converges toward `base` while its window is active.
    pub fn spawn_entity(&mut self, id: &str, window: ActivationWindow, base: EntityTransform, rate: f32) -> Entity {
        let order = self.next_order;
        self.next_order += 1;
        let hidden = EntityTransform { position: base.position, rotation: base.rotation, ..EntityTransform::HIDDEN };
        self.world
            .spawn((
                SceneEntity { id: Arc::from(id), order },
                window,
                BaseTransform(base),
                TargetTransform(hidden),
                CurrentTransform(hidden),
                ConvergenceRate(clamp_rate(rate)),
                Activation::default(),
            ))
            .id()
    }

    pub fn despawn_entity(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity)
    }

    pub fn entity_count(&mut self) -> usize {
        self.world.query::<&SceneEntity>().iter(&self.world).count()
    }

    /// Runs one pass of the schedule against `snapshot`.
    pub fn update(&mut self, snapshot: InputSnapshot, dt: f32) {
        self.world.resource_mut::<TickProfiler>().begin_tick();
        self.world.resource_mut::<FrameClock>().advance(dt);
        self.world.insert_resource(snapshot);
        self.schedule.run(&mut self.world);
        self.world.resource_mut::<TickProfiler>().end_tick();
    }

    /// Refreshes and returns the per-entity render list, ordered by spawn order.
    pub fn collect_entities(&mut self) -> &[EntityRender] {
        self.entities.clear();
        let mut query = self.world.query::<(&SceneEntity, &Activation, &CurrentTransform)>();
        for (scene_entity, activation, current) in query.iter(&self.world) {
            self.entities.push(EntityRender {
                id: scene_entity.id.clone(),
                order: scene_entity.order,
                activation: activation.0,
                transform: current.0,
            });
        }
        self.entities.sort_by_key(|entity| entity.order);
        &self.entities
    }

    pub fn entities(&self) -> &[EntityRender] {
        &self.entities
    }

    pub fn find_entity(&mut self, id: &str) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &SceneEntity)>();
        query.iter(&self.world).find(|(_, scene_entity)| &*scene_entity.id == id).map(|(entity, _)| entity)
    }

    pub fn set_scene_scale(&mut self, scale: f32) {
        self.world.resource_mut::<SceneScale>().0 = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    pub fn progress(&self) -> &ProgressSource {
        self.world.resource::<ProgressSource>()
    }

    pub fn clock(&self) -> &FrameClock {
        self.world.resource::<FrameClock>()
    }

    pub fn camera_pose(&self) -> CameraPose {
        *self.world.resource::<CameraPose>()
    }

    pub fn cursor(&self) -> &CursorState {
        self.world.resource::<CursorState>()
    }

    pub fn parallax(&self) -> &ParallaxLayers {
        &self.world.resource::<PointerParallax>().0
    }

    pub fn camera_rig(&self) -> &CameraRig {
        self.world.resource::<CameraRig>()
    }

    pub fn viewport(&self) -> Vec2 {
        self.world.resource::<InputSnapshot>().viewport
    }

    pub fn particles(&self) -> &ParticlePool {
        self.world.resource::<ParticlePool>()
    }

    pub fn particles_mut(&mut self) -> bevy_ecs::world::Mut<'_, ParticlePool> {
        self.world.resource_mut::<ParticlePool>()
    }

    pub fn surface(&self) -> &SurfaceState {
        self.world.resource::<SurfaceState>()
    }

    pub fn faults(&self) -> &FaultLog {
        self.world.resource::<FaultLog>()
    }

    pub fn faults_mut(&mut self) -> bevy_ecs::world::Mut<'_, FaultLog> {
        self.world.resource_mut::<FaultLog>()
    }

    pub fn profiler(&self) -> &TickProfiler {
        self.world.resource::<TickProfiler>()
    }

    pub fn push_event(&mut self, event: EngineEvent) {
        self.world.resource_mut::<EventBus>().push(event);
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.world.resource_mut::<EventBus>().drain()
    }
}
