use aurora_engine::particles::{ParticleKind, ParticlePool, ParticleSettings};
use glam::Vec3;

fn pool(seed: u64) -> ParticlePool {
    ParticlePool::new(ParticleSettings::default(), seed)
}

#[test]
fn ambient_pool_size_is_invariant_over_a_thousand_ticks() {
    let mut pool = pool(2026);
    pool.seed_ambient(150);
    let mut respawned = 0;
    for tick in 0..1000 {
        let focal = (tick % 3 == 0).then(|| Vec3::new(640.0, 360.0, 0.0));
        let report = pool.step(focal);
        respawned += report.respawned;
        assert_eq!(report.expired, 0);
        assert_eq!(pool.len(), 150, "tick {tick}");
        assert_eq!(pool.ambient_count(), 150);
    }
    assert!(respawned >= 150, "every ambient particle outlives at most 500 ticks");
    assert!(pool.particles().iter().all(|p| p.age as f32 <= p.max_age));
}

#[test]
fn injected_batch_drains_within_its_max_age() {
    let mut pool = pool(7);
    pool.inject(Vec3::new(100.0, 100.0, 0.0), 12);
    assert_eq!(pool.transient_count(), 12);
    let longest = pool.particles().iter().map(|p| p.max_age).fold(0.0_f32, f32::max);
    let budget = longest.ceil() as usize;
    let mut ticks = 0;
    while !pool.is_empty() {
        let report = pool.step(None);
        assert_eq!(report.respawned, 0);
        ticks += 1;
        assert!(ticks <= budget, "pool still holds {} after {ticks} ticks", pool.len());
    }
    assert!(ticks <= budget);
}

#[test]
fn transients_leave_ambient_particles_alone() {
    let mut pool = pool(11);
    pool.seed_ambient(20);
    pool.inject_trail(Vec3::new(50.0, 50.0, 0.0));
    pool.inject_trail(Vec3::new(60.0, 50.0, 0.0));
    assert_eq!(pool.transient_count(), 6);
    for _ in 0..120 {
        pool.step(Some(Vec3::new(55.0, 50.0, 0.0)));
    }
    assert_eq!(pool.transient_count(), 0);
    assert_eq!(pool.ambient_count(), 20);
    assert!(pool.particles().iter().all(|p| p.kind == ParticleKind::Ambient));
}

#[test]
fn connection_pass_flags_pools_over_the_limit() {
    let mut settings = ParticleSettings::default();
    settings.connection_pool_limit = 10;
    let mut pool = ParticlePool::new(settings, 3);
    pool.seed_ambient(8);
    let stats = pool.compute_connections();
    assert!(!stats.over_limit);
    assert_eq!(stats.pairs_tested, 28);

    pool.inject(Vec3::new(10.0, 10.0, 0.0), 4);
    let stats = pool.compute_connections();
    assert!(stats.over_limit, "12 particles exceed a limit of 10");
    assert_eq!(stats.pairs_tested, 66);
    assert!(stats.links >= 6, "the four co-located transients all link to each other");
    assert!(pool.connections().iter().all(|c| c.weight > 0.0 && c.weight <= 0.3 + 1e-6));
}

#[test]
fn same_seed_same_pool() {
    let mut a = pool(99);
    let mut b = pool(99);
    a.seed_ambient(30);
    b.seed_ambient(30);
    for _ in 0..50 {
        a.step(Some(Vec3::new(300.0, 300.0, 0.0)));
        b.step(Some(Vec3::new(300.0, 300.0, 0.0)));
    }
    assert_eq!(a.write_instances(), b.write_instances());
    assert_eq!(a.instances().len(), 30);
}
