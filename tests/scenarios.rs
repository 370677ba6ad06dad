//! End-to-end scenarios through the public API

use cave_flyer::Settings;
use cave_flyer::consts::*;
use cave_flyer::sim::{Bullet, Cave, Command, Game, GamePhase, Obstacle, resolve_bullet_hits};
use glam::Vec2;
use ordered_float::OrderedFloat;

fn active_game(seed: u64) -> Game {
    let mut game = Game::new(&Settings {
        seed,
        autostart: true,
        ..Settings::default()
    });
    assert_eq!(game.phase, GamePhase::Active);
    // Keep the opening stretch free of anything that could touch the ship
    game.cave.obstacles.retain(|_, o| o.pos.x > 1.0);
    game.cave.spiders.clear();
    game.cave.spits.clear();
    game
}

#[test]
fn initial_window_has_144_rocks_per_band() {
    let mut cave = Cave::new(0);
    let report = cave.generate(0.0, 1.8);
    assert_eq!(report.ceiling, 144);
    assert_eq!(report.floor, 144);
    assert_eq!(cave.obstacles.len(), report.placed());

    let mut again = Cave::new(0);
    assert_eq!(again.generate(0.0, 1.8), report);
    assert!(cave.obstacles.keys().eq(again.obstacles.keys()));
}

#[test]
fn bullet_kill_explodes_once() {
    let mut cave = Cave::new(0);
    cave.obstacles.clear();
    let verts: Vec<Vec2> = (0..7)
        .map(|i| {
            let a = i as f32 / 7.0 * std::f32::consts::TAU;
            Vec2::new(a.cos(), a.sin()) * 0.04
        })
        .collect();
    let rock = Obstacle::new(Vec2::new(0.7, 0.4), 0.04, 10, 100, verts);
    cave.obstacles.insert(OrderedFloat(0.7), rock);
    cave.bullets.push_back(Bullet {
        pos: Vec2::new(0.69, 0.41),
        vel: Vec2::X,
        normal: Vec2::Y,
        damage: 100,
        dead: false,
    });

    let outcome = resolve_bullet_hits(&mut cave, 1.0);
    assert_eq!(outcome.destroyed, 1);
    let rock = &cave.obstacles[&OrderedFloat(0.7)];
    assert!(rock.health <= 0);
    assert!(rock.destroyed);
    assert_eq!(cave.debris.len(), 7);

    // A second pass finds nothing left to destroy
    cave.bullets.push_back(Bullet {
        pos: Vec2::new(0.7, 0.4),
        vel: Vec2::X,
        normal: Vec2::Y,
        damage: 100,
        dead: false,
    });
    let outcome = resolve_bullet_hits(&mut cave, 1.0);
    assert_eq!(outcome.destroyed, 0);
    assert_eq!(cave.debris.len(), 7);
}

#[test]
fn death_spawns_exactly_one_burst() {
    let mut game = active_game(0);
    assert!(game.cave.debris.is_empty());
    game.ship.health = 0;
    game.update(16);
    assert!(game.is_game_over());
    assert_eq!(game.cave.debris.len(), DEATH_BURST_FRAGMENTS);

    for _ in 0..10 {
        game.ship.health -= 100;
        game.update(16);
        assert!(game.cave.debris.len() <= DEATH_BURST_FRAGMENTS);
    }
}

#[test]
fn scroll_freezes_but_ship_drifts_after_death() {
    let mut game = active_game(1);
    for _ in 0..10 {
        game.update(16);
    }
    game.give_up();
    game.update(16);
    let scroll = game.scroll;
    for _ in 0..30 {
        game.update(16);
    }
    assert_eq!(game.scroll, scroll);
    assert!(game.slowdown < 1.0);
}

#[test]
fn memory_stays_bounded_over_a_long_run() {
    let mut game = active_game(3);
    let mut peak = 0;
    for frame in 0..6000 {
        let dy = if game.ship.pos.y < 0.5 {
            Command::ThrustDown
        } else {
            Command::ThrustUp
        };
        game.apply_commands(&[dy, Command::Fire]);
        game.update(16);
        if frame > 600 {
            peak = peak.max(game.cave.obstacles.len());
        }
        // Nothing is kept past the generated edge plus the trailing margin
        let span = game.generated_to() - (game.scroll - PRUNE_MARGIN);
        assert!(span < GENERATION_CHUNK + PRUNE_MARGIN + 0.5);
        if game.is_finished() {
            break;
        }
    }
    // A window a few units wide at 80 rocks per unit per band
    assert!(peak < 2000, "peak obstacle count {peak}");
}
