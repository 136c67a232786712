use bevy_ecs::prelude::Resource;
use thiserror::Error;

/// Runtime faults the engine absorbs locally. None of these ever reach the host as a failure;
/// the worst visible effect is a dropped or jittered frame.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EngineFault {
    #[error("input {field} out of range ({value}), clamped")]
    InputOutOfRange { field: &'static str, value: f32 },
    #[error("render surface unavailable, frame {tick} not pushed")]
    MissingRenderTarget { tick: u64 },
    #[error("tick after dispose ignored")]
    PostDisposalTick,
}

impl EngineFault {
    pub fn kind(&self) -> FaultKind {
        match self {
            EngineFault::InputOutOfRange { .. } => FaultKind::InputOutOfRange,
            EngineFault::MissingRenderTarget { .. } => FaultKind::MissingRenderTarget,
            EngineFault::PostDisposalTick => FaultKind::PostDisposalTick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    InputOutOfRange,
    MissingRenderTarget,
    PostDisposalTick,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FaultLog {
    pub input_out_of_range: u64,
    pub missing_render_target: u64,
    pub post_disposal_tick: u64,
    #[serde(skip)]
    pub last: Option<EngineFault>,
}

impl FaultLog {
    pub fn record(&mut self, fault: EngineFault) {
        match fault.kind() {
            FaultKind::InputOutOfRange => {
                self.input_out_of_range += 1;
                log::trace!("{fault}");
            }
            FaultKind::MissingRenderTarget => {
                self.missing_render_target += 1;
                log::debug!("{fault}");
            }
            FaultKind::PostDisposalTick => {
                self.post_disposal_tick += 1;
                log::debug!("{fault}");
            }
        }
        self.last = Some(fault);
    }

    pub fn count(&self, kind: FaultKind) -> u64 {
        match kind {
            FaultKind::InputOutOfRange => self.input_out_of_range,
            FaultKind::MissingRenderTarget => self.missing_render_target,
            FaultKind::PostDisposalTick => self.post_disposal_tick,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_out_of_range + self.missing_render_target + self.post_disposal_tick
    }
}
