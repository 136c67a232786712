use crate::sequencer::{IntroEvent, IntroPhase};
use bevy_ecs::prelude::Resource;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EngineEvent {
    /// A scene entity's window target switched on.
    EntityActivated { id: Arc<str> },
    EntityDeactivated { id: Arc<str> },
    PhaseEntered { phase: IntroPhase },
    IntroCue { phase: IntroPhase, name: &'static str },
    IntroCompleted,
    /// The particle pool crossed the connection-pass limit (true) or dropped back under it.
    ConnectionLimit { exceeded: bool, particles: usize },
}

impl From<IntroEvent> for EngineEvent {
    fn from(event: IntroEvent) -> Self {
        match event {
            IntroEvent::PhaseEntered(phase) => EngineEvent::PhaseEntered { phase },
            IntroEvent::Cue { phase, name } => EngineEvent::IntroCue { phase, name },
            IntroEvent::Completed => EngineEvent::IntroCompleted,
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::EntityActivated { id } => write!(f, "EntityActivated id={id}"),
            EngineEvent::EntityDeactivated { id } => write!(f, "EntityDeactivated id={id}"),
            EngineEvent::PhaseEntered { phase } => write!(f, "PhaseEntered phase={phase}"),
            EngineEvent::IntroCue { phase, name } => write!(f, "IntroCue phase={phase} name={name}"),
            EngineEvent::IntroCompleted => f.write_str("IntroCompleted"),
            EngineEvent::ConnectionLimit { exceeded, particles } => {
                write!(f, "ConnectionLimit exceeded={exceeded} particles={particles}")
            }
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<EngineEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        self.events.extend(events);
    }

    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
