//! Collision passes
//!
//! All tests compare squared distances. Obstacle checks only look at the
//! slice of the obstacle map within [`COLLISION_WINDOW`] of the collider's x.

use glam::Vec2;
use ordered_float::OrderedFloat;

use super::cave::Cave;
use super::state::{Obstacle, Ship};
use crate::consts::*;

/// Result of the bullet-vs-obstacle pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BulletOutcome {
    /// Bullets that struck an obstacle
    pub hits: usize,
    /// Obstacles destroyed (and exploded) by this pass
    pub destroyed: usize,
    /// Score earned
    pub score: u64,
}

/// Enemy spits against the ship
///
/// Every spit inside the ship's radius dies, damages the ship in proportion
/// to its own radius, and throws a shard off the hull. Returns the number of
/// hits.
pub fn resolve_spit_hits(cave: &mut Cave, ship: &mut Ship) -> usize {
    let radius_sq = ship.radius * ship.radius;
    let mut shards: Vec<Vec2> = Vec::new();

    for spit in cave.spits.iter_mut().filter(|s| !s.dead) {
        if spit.pos.distance_squared(ship.pos) < radius_sq {
            spit.dead = true;
            ship.take_damage((spit.radius * SPIT_DAMAGE_SCALE) as i32, SHIP_SPIT_FLASH_MS);
            shards.push(spit.vel);
        }
    }

    for vel in &shards {
        cave.spawn_hit_shard(ship.pos, *vel);
    }
    shards.len()
}

/// Obstacles touching the ship
///
/// Hits are marked destroyed at once and returned so damage and explosions
/// can be applied afterwards.
pub fn detect_ship_collisions(cave: &mut Cave, ship: &Ship) -> Vec<Obstacle> {
    let mut hits = Vec::new();
    for obstacle in cave.obstacles_near_mut(ship.pos.x, COLLISION_WINDOW) {
        if obstacle.destroyed {
            continue;
        }
        let reach = ship.radius + obstacle.radius;
        if ship.pos.distance_squared(obstacle.pos) < reach * reach {
            obstacle.destroyed = true;
            hits.push(obstacle.clone());
        }
    }
    hits
}

/// Apply recorded ship collisions: damage the ship and blow up each obstacle
pub fn apply_ship_collisions(cave: &mut Cave, ship: &mut Ship, hits: &[Obstacle]) {
    for obstacle in hits {
        ship.take_damage(
            (COLLISION_DAMAGE_SCALE * obstacle.radius) as i32,
            SHIP_COLLISION_FLASH_MS,
        );
        cave.explode_obstacle(obstacle);
    }
}

/// Player bullets against obstacles
///
/// A bullet is a point; it hits an obstacle when inside its radius, dies,
/// and deals `damage * multiplier`. Obstacles reaching zero health are
/// destroyed and exploded in the same pass.
pub fn resolve_bullet_hits(cave: &mut Cave, multiplier: f32) -> BulletOutcome {
    let mut outcome = BulletOutcome::default();
    let mut shattered: Vec<Obstacle> = Vec::new();

    let Cave {
        bullets, obstacles, ..
    } = cave;

    for bullet in bullets.iter_mut().filter(|b| !b.dead) {
        let window = OrderedFloat(bullet.pos.x - COLLISION_WINDOW)
            ..=OrderedFloat(bullet.pos.x + COLLISION_WINDOW);
        for (_, obstacle) in obstacles.range_mut(window) {
            if obstacle.destroyed {
                continue;
            }
            if bullet.pos.distance_squared(obstacle.pos) < obstacle.radius * obstacle.radius {
                bullet.dead = true;
                obstacle.take_hit((bullet.damage as f32 * multiplier) as i32);
                outcome.hits += 1;
                outcome.score += (HIT_SCORE_SCALE * obstacle.radius * multiplier) as u64;

                if obstacle.health <= 0 {
                    obstacle.destroyed = true;
                    shattered.push(obstacle.clone());
                }
                break;
            }
        }
    }

    for obstacle in &shattered {
        cave.explode_obstacle(obstacle);
    }
    outcome.destroyed = shattered.len();
    outcome
}
