//! Headless arena simulation
//!
//! Spawns a player, boundary walls, waves of enemies and healing pickups,
//! then runs a fixed number of frames with jittery frame times and reports
//! what happened on the event bus.
//!
//! Usage: `arena_sim [config.toml|config.ron] [frames]`

mod gameplay;

use arena_engine::foundation::logging;
use arena_engine::prelude::*;
use gameplay::WaveSpawner;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

const DEFAULT_FRAMES: u32 = 1800;
const SEED: u64 = 0x5eed_a7e4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load_from_file(&path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    let frames = match args.next() {
        Some(count) => count.parse::<u32>()?,
        None => DEFAULT_FRAMES,
    };

    logging::init_with_filter(&config.logging.filter);
    log::info!("Starting arena simulation for {frames} frames");

    let mut game = GameLoop::new(&config);
    let stats = gameplay::track_stats(&game.world.events);
    gameplay::install_rules(&game.world.events, &stats);
    game.schedule.add_system(WaveSpawner::new(SEED, 3, Rc::clone(&stats)));

    gameplay::spawn_walls(&mut game.world);
    let player = gameplay::spawn_player(&mut game.world);

    let mut rng = StdRng::seed_from_u64(SEED ^ 0xf4a3);
    let nominal = config.timing.fixed_timestep;
    let mut total_steps = 0u64;
    let mut dropped = 0.0f32;
    let mut capped_frames = 0u32;

    for frame in 0..frames {
        // Occasional hitch to exercise the step cap
        let frame_time = if frame % 300 == 299 {
            0.25
        } else {
            nominal * rng.gen_range(0.8..1.2)
        };

        let report = game.tick(frame_time);
        total_steps += u64::from(report.steps);
        dropped += report.dropped_time;
        if report.dropped_time > 0.0 {
            capped_frames += 1;
        }

        if !game.world.entities.is_alive(player) {
            log::info!("Player destroyed on frame {frame}");
            break;
        }
    }

    let stats = stats.borrow();
    log::info!(
        "Simulated {} frames, {total_steps} steps, {capped_frames} capped frames, {dropped:.3}s dropped",
        game.frame_count()
    );
    log::info!(
        "Waves: {}, collisions: {}, damage events: {} ({:.0} total), deaths: {}, pickups: {}, destroyed: {}",
        stats.waves,
        stats.collisions,
        stats.damage_events,
        stats.damage_dealt,
        stats.deaths,
        stats.pickups,
        stats.destroyed
    );
    log::info!("{} entities remain", game.world.entities.entity_count());
    Ok(())
}
