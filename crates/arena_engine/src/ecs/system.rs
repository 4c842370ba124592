//! Systems and phase-ordered scheduling
//!
//! Systems run once per fixed step in phase order. Within a phase they run in
//! the order they were added, so the schedule is deterministic.

use super::World;
use std::any::Any;

/// System execution phases with explicit ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemPhase {
    /// Input sampling and intent
    Input = 0,
    /// Gameplay logic, AI, spawning
    Logic = 1,
    /// Integration of velocities
    Physics = 2,
    /// Contact detection and response
    Collision = 3,
    /// Reactions to contacts such as damage
    Reaction = 4,
    /// Bookkeeping before the destruction flush
    Cleanup = 5,
}

/// A unit of per-step behaviour
pub trait System: Any {
    /// Name used for logging and enable/disable lookups
    fn name(&self) -> &'static str;

    /// Phase the system runs in
    fn phase(&self) -> SystemPhase {
        SystemPhase::Logic
    }

    /// Advance by `delta_time` seconds
    fn update(&mut self, world: &mut World, delta_time: f32);

    /// Downcast support for [`Schedule::get`]
    fn as_any(&self) -> &dyn Any;

    /// Downcast support for [`Schedule::get_mut`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct ScheduledSystem {
    system: Box<dyn System>,
    enabled: bool,
}

/// Ordered list of systems
#[derive(Default)]
pub struct Schedule {
    systems: Vec<ScheduledSystem>,
}

impl Schedule {
    /// Create an empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system after every system of the same or an earlier phase
    pub fn add_system<S: System>(&mut self, system: S) -> &mut Self {
        let phase = system.phase();
        let at = self
            .systems
            .partition_point(|scheduled| scheduled.system.phase() <= phase);
        log::debug!("Scheduled system {} in {:?}", system.name(), phase);
        self.systems.insert(
            at,
            ScheduledSystem {
                system: Box::new(system),
                enabled: true,
            },
        );
        self
    }

    /// Run every enabled system once
    pub fn run(&mut self, world: &mut World, delta_time: f32) {
        for scheduled in self.systems.iter_mut().filter(|s| s.enabled) {
            scheduled.system.update(world, delta_time);
        }
    }

    /// Enable or disable a system by name, returning whether it was found
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        for scheduled in self.systems.iter_mut().filter(|s| s.system.name() == name) {
            scheduled.enabled = enabled;
            found = true;
        }
        found
    }

    /// Whether a system with this name exists and is enabled
    pub fn is_enabled(&self, name: &str) -> bool {
        self.systems
            .iter()
            .any(|s| s.enabled && s.system.name() == name)
    }

    /// First system of type `S`
    pub fn get<S: System>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|s| s.system.as_any().downcast_ref::<S>())
    }

    /// First system of type `S`, mutably
    pub fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|s| s.system.as_any_mut().downcast_mut::<S>())
    }

    /// System names in execution order
    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.system.name()).collect()
    }

    /// Number of systems
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether the schedule has no systems
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
