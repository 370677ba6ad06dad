//! Cave Flyer headless runner
//!
//! Plays the simulation with a simple autopilot for a fixed time and prints
//! the final frame stats as JSON. Usage: `cave-flyer [settings.json]`.

use std::path::Path;

use cave_flyer::Settings;
use cave_flyer::sim::{Command, Game};

/// Corridor height the autopilot tries to hold
const CRUISE_Y: f32 = 0.5;
const CRUISE_BAND: f32 = 0.03;

fn main() {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    log::info!("Cave Flyer (headless) starting with seed {}", settings.seed);

    let mut game = Game::new(&settings);
    game.start();

    let frames = settings.demo_frames();
    let mut commands = Vec::with_capacity(2);
    for frame in 0..frames {
        commands.clear();
        autopilot(&game, &mut commands);
        game.apply_commands(&commands);
        game.update(settings.frame_ms);

        if frame % 600 == 0 {
            let stats = game.stats();
            log::debug!(
                "frame {}: x={:.2} score={} hp={} obstacles={} spiders={}",
                frame,
                stats.scroll,
                stats.score,
                stats.health,
                stats.obstacles,
                stats.spiders
            );
        }
        if game.is_finished() {
            log::info!("Run finished after {} frames", frame + 1);
            break;
        }
    }

    match serde_json::to_string_pretty(&game.stats()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to encode stats: {}", err),
    }
}

/// Hold the middle of the corridor and keep firing
fn autopilot(game: &Game, commands: &mut Vec<Command>) {
    let y = game.ship.pos.y;
    if y < CRUISE_Y - CRUISE_BAND {
        commands.push(Command::ThrustDown);
    } else if y > CRUISE_Y + CRUISE_BAND {
        commands.push(Command::ThrustUp);
    }
    commands.push(Command::Fire);
}
