//! Fixed-step frame orchestration
//!
//! One call to [`GameLoop::tick`] feeds a frame's elapsed time into the
//! accumulator and runs up to the configured number of fixed steps. Each step
//! runs the schedule, then destroys queued entities, then flushes deferred
//! events, so handlers never see an entity removed half way through a system.

use crate::config::EngineConfig;
use crate::ecs::{Schedule, World};
use crate::foundation::time::FixedTimestep;
use crate::physics::{CollisionSystem, MovementSystem};

/// What happened during one [`GameLoop::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Fixed steps simulated
    pub steps: u32,
    /// Seconds of accumulated time thrown away by the step cap
    pub dropped_time: f32,
    /// Deferred events delivered
    pub events_flushed: usize,
    /// Entities removed by destruction flushes
    pub entities_destroyed: usize,
}

/// World, systems and clock bundled together
pub struct GameLoop {
    /// Entities, components and the event bus
    pub world: World,
    /// Systems run every fixed step
    pub schedule: Schedule,
    timestep: FixedTimestep,
    frames: u64,
}

impl GameLoop {
    /// Loop with movement and collision systems installed
    pub fn new(config: &EngineConfig) -> Self {
        let mut schedule = Schedule::new();
        schedule
            .add_system(MovementSystem::new())
            .add_system(CollisionSystem::new(
                config.arena.width,
                config.arena.height,
                config.collision.cell_size,
            ));
        Self::with_schedule(config, schedule)
    }

    /// Loop running a caller-built schedule
    pub fn with_schedule(config: &EngineConfig, schedule: Schedule) -> Self {
        log::info!(
            "Game loop: arena {}x{}, step {:.4}s, at most {} steps per frame",
            config.arena.width,
            config.arena.height,
            config.timing.fixed_timestep,
            config.timing.max_steps_per_frame
        );
        Self {
            world: World::new(config.arena.width, config.arena.height),
            schedule,
            timestep: FixedTimestep::new(
                config.timing.fixed_timestep,
                config.timing.max_steps_per_frame,
            ),
            frames: 0,
        }
    }

    /// Advance by one rendered frame of `frame_time` seconds
    pub fn tick(&mut self, frame_time: f32) -> FrameReport {
        let plan = self.timestep.advance(frame_time);
        let mut report = FrameReport {
            steps: plan.steps,
            dropped_time: plan.dropped,
            ..FrameReport::default()
        };

        for _ in 0..plan.steps {
            let (destroyed, flushed) = self.step();
            report.entities_destroyed += destroyed;
            report.events_flushed += flushed;
        }

        if plan.dropped > 0.0 {
            log::debug!(
                "Frame {} hit the step cap, dropped {:.4}s",
                self.frames,
                plan.dropped
            );
        }
        self.frames += 1;
        report
    }

    /// Run exactly one fixed step, returning (entities destroyed, events flushed)
    pub fn step(&mut self) -> (usize, usize) {
        self.schedule.run(&mut self.world, self.timestep.step());
        let destroyed = self.world.process_destruction_queue();
        let flushed = self.world.flush_events();
        (destroyed, flushed)
    }

    /// Resize the arena for movement clamping and the broad-phase
    pub fn set_arena_size(&mut self, width: f32, height: f32) {
        self.world.set_arena_size(width, height);
        if let Some(collisions) = self.schedule.get_mut::<CollisionSystem>() {
            collisions.set_arena_size(width, height);
        }
    }

    /// The installed collision system, if any
    pub fn collisions(&self) -> Option<&CollisionSystem> {
        self.schedule.get::<CollisionSystem>()
    }

    /// The fixed-step clock
    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, Transform, Velocity};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_schedule() {
        let game = GameLoop::new(&EngineConfig::default());
        assert_eq!(game.schedule.system_names(), vec!["movement", "collision"]);
        assert!(game.collisions().is_some());
    }

    #[test]
    fn test_tick_moves_entities() {
        let mut config = EngineConfig::default();
        config.timing.fixed_timestep = 0.25;
        let mut game = GameLoop::new(&config);
        let ship = game.world.entities.create_entity();
        game.world.entities.add_component(ship, Transform::new(0.0, 0.0));
        game.world.entities.add_component(ship, Velocity::new(10.0, 0.0));

        let report = game.tick(0.75);

        assert_eq!(report.steps, 3);
        let x = game.world.entities.get_component::<Transform>(ship).unwrap().position.x;
        assert_relative_eq!(x, 7.5);
    }

    #[test]
    fn test_step_flushes_destruction_then_events() {
        let mut game = GameLoop::new(&EngineConfig::default());
        let rock = game.world.entities.create_entity();
        game.world.entities.add_component(rock, Collider::circle(4.0));
        game.world.entities.destroy_entity(rock);

        let (destroyed, flushed) = game.step();

        assert_eq!(destroyed, 1);
        assert_eq!(flushed, 1);
        assert!(!game.world.entities.exists(rock));
    }

    #[test]
    fn test_set_arena_size_reaches_collision_grid() {
        let mut game = GameLoop::new(&EngineConfig::default());
        game.set_arena_size(1000.0, 1000.0);

        assert_relative_eq!(game.world.arena.width(), 1000.0);
        let grid = game.collisions().and_then(CollisionSystem::grid).unwrap();
        assert_eq!(grid.dimensions(), (20, 20));
    }
}
