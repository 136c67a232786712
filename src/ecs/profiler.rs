use bevy_ecs::prelude::Resource;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Frame budget at the nominal 60 Hz display cadence.
pub const DEFAULT_TICK_BUDGET_MS: f32 = 1000.0 / 60.0;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SystemTimingSummary {
    pub name: &'static str,
    pub last_ms: f32,
    pub average_ms: f32,
    pub max_ms: f32,
    pub samples: u64,
}

#[derive(Default)]
struct SystemTiming {
    last_ms: f32,
    total_ms: f32,
    max_ms: f32,
    samples: u64,
}

/// Per-system wall time plus a whole-tick budget check.
#[derive(Resource)]
pub struct TickProfiler {
    timings: HashMap<&'static str, SystemTiming>,
    budget_ms: f32,
    tick_start: Option<Instant>,
    last_tick_ms: f32,
    ticks: u64,
    over_budget_ticks: u64,
}

impl TickProfiler {
    pub fn new(budget_ms: f32) -> Self {
        Self {
            timings: HashMap::new(),
            budget_ms: budget_ms.max(0.0),
            tick_start: None,
            last_tick_ms: 0.0,
            ticks: 0,
            over_budget_ticks: 0,
        }
    }

    pub fn begin_tick(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    pub fn end_tick(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        self.record_tick(start.elapsed().as_secs_f32() * 1000.0);
    }

    fn record_tick(&mut self, duration_ms: f32) {
        self.last_tick_ms = duration_ms;
        self.ticks += 1;
        if duration_ms > self.budget_ms {
            self.over_budget_ticks += 1;
            log::trace!(target: "aurora::profiler", "tick took {duration_ms:.3} ms (budget {:.3})", self.budget_ms);
        }
    }

    pub fn scope(&mut self, name: &'static str) -> SystemProfileScope<'_> {
        SystemProfileScope { name, profiler: self, start: Instant::now() }
    }

    fn record(&mut self, name: &'static str, duration: f32) {
        let entry = self.timings.entry(name).or_default();
        entry.last_ms = duration;
        entry.max_ms = entry.max_ms.max(duration);
        entry.total_ms += duration;
        entry.samples += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn over_budget_ticks(&self) -> u64 {
        self.over_budget_ticks
    }

    pub fn last_tick_ms(&self) -> f32 {
        self.last_tick_ms
    }

    pub fn summaries(&self) -> Vec<SystemTimingSummary> {
        let mut out = Vec::with_capacity(self.timings.len());
        for (&name, timing) in &self.timings {
            let avg = if timing.samples == 0 { 0.0 } else { timing.total_ms / timing.samples as f32 };
            out.push(SystemTimingSummary {
                name,
                last_ms: timing.last_ms,
                average_ms: avg,
                max_ms: timing.max_ms,
                samples: timing.samples,
            });
        }
        out.sort_by(|a, b| b.average_ms.partial_cmp(&a.average_ms).unwrap_or(std::cmp::Ordering::Equal));
        out
    }
}

impl Default for TickProfiler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_BUDGET_MS)
    }
}

pub struct SystemProfileScope<'a> {
    name: &'static str,
    profiler: &'a mut TickProfiler,
    start: Instant,
}

impl Drop for SystemProfileScope<'_> {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_secs_f32() * 1000.0;
        self.profiler.record(self.name, duration_ms);
    }
}
