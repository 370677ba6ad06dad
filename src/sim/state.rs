//! Entity types and game phase
//!
//! Plain data owned by [`super::Cave`] (obstacles, envelope, queues) and
//! [`super::Game`] (the ship). Outlines are write-once: they are built at
//! spawn time and shared immutably afterwards.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Input intents for one frame
///
/// Opposing thrusts on the same axis must be resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    ThrustUp,
    ThrustDown,
    ThrustForward,
    ThrustBackward,
    Fire,
}

/// Game-over sequencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    Ready,
    /// Normal play
    Active,
    /// Ship destroyed, world slowing down until the countdown runs out
    Dying { countdown_ms: u32 },
    /// Countdown expired; remaining obstacles blow up on the next update
    Clearing,
    /// Nothing left to do
    Over,
}

impl GamePhase {
    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            GamePhase::Dying { .. } | GamePhase::Clearing | GamePhase::Over
        )
    }
}

/// A destructible rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
    /// Color shade index (0-47)
    pub shade: i32,
    pub health: i32,
    pub destroyed: bool,
    /// Remaining damage flash (ms)
    pub flash_ms: u32,
    /// Outline around `pos`, fan-triangulated from the center
    pub vertices: Arc<[Vec2]>,
}

impl Obstacle {
    pub fn new(pos: Vec2, radius: f32, shade: i32, health: i32, vertices: Vec<Vec2>) -> Self {
        Self {
            pos,
            radius,
            shade,
            health,
            destroyed: false,
            flash_ms: 0,
            vertices: vertices.into(),
        }
    }

    /// Apply bullet damage and start the flash
    pub fn take_hit(&mut self, damage: i32) {
        self.health -= damage.max(0);
        self.flash_ms = OBSTACLE_FLASH_MS;
    }

    /// Decay the damage flash by `dt_ms`
    pub fn decay_flash(&mut self, dt_ms: u32) {
        self.flash_ms = self.flash_ms.saturating_sub(dt_ms);
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    /// Thrust velocity (scaled by the per-axis speed constants when integrated)
    pub vel: Vec2,
    pub radius: f32,
    pub health: i32,
    /// Remaining weapon cooldown (ms)
    pub cannon_cooldown_ms: u32,
    /// Remaining damage flash (ms)
    pub flash_ms: u32,
    /// Next shot is the angled one
    pub fire_angled: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec2::new(SHIP_START_X, SHIP_START_Y),
            vel: Vec2::ZERO,
            radius: SHIP_RADIUS,
            health: SHIP_MAX_HEALTH,
            cannon_cooldown_ms: 0,
            flash_ms: 0,
            fire_angled: false,
        }
    }
}

impl Ship {
    /// Take damage and start the flash
    pub fn take_damage(&mut self, amount: i32, flash_ms: u32) {
        self.health -= amount.max(0);
        self.flash_ms = flash_ms;
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_ms > 0
    }
}

/// A player bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Direction of travel (unit length)
    pub vel: Vec2,
    /// Facing normal, for drawing only
    pub normal: Vec2,
    pub damage: i32,
    pub dead: bool,
}

/// A cosmetic fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds since spawn
    pub age: f32,
    pub shade: i32,
    pub dead: bool,
    /// Shard edge relative to `pos`
    pub vertices: [Vec2; 2],
}

impl Debris {
    pub fn new(pos: Vec2, vel: Vec2, shade: i32, vertices: [Vec2; 2]) -> Self {
        Self {
            pos,
            vel,
            age: 0.0,
            shade,
            dead: false,
            vertices,
        }
    }
}

/// How a spider is moving
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpiderMotion {
    /// Following the floor envelope from slot `from` toward slot `to`
    Walking { from: i64, to: i64, t: f32 },
    /// Knocked loose; ballistic under gravity
    Falling,
}

/// A floor-walking enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spider {
    pub pos: Vec2,
    /// Used while falling
    pub vel: Vec2,
    pub motion: SpiderMotion,
    pub radius: f32,
    /// Envelope segments per second
    pub speed: f32,
    pub health: f32,
    /// Walks toward lower envelope slots
    pub forward: bool,
    pub dead: bool,
    /// Shots per burst
    pub burst_rate: i32,
    /// Shots fired in the current burst
    pub burst: i32,
    /// Seconds until the next shot
    pub cooldown: f32,
    /// Pause between bursts (s)
    pub fire_rate: f32,
    /// Pause between shots inside a burst (s)
    pub burst_fire_rate: f32,
    pub spit_speed: f32,
}

impl Spider {
    pub fn is_walking(&self) -> bool {
        matches!(self.motion, SpiderMotion::Walking { .. })
    }

    /// Burst-fire bookkeeping after a shot
    pub fn record_shot(&mut self) {
        self.burst += 1;
        if self.burst >= self.burst_rate {
            self.burst = 0;
            self.cooldown = self.fire_rate;
        } else {
            self.cooldown = self.burst_fire_rate;
        }
    }
}

/// An enemy projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spit {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub dead: bool,
}

/// A vertical background band edge
///
/// Vertices are `(dx, y)` offsets from `(x, 0)` spanning y in [0, 1].
/// Consecutive lines bound a filled strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundLine {
    pub x: f32,
    pub shade: i32,
    pub vertices: Arc<[Vec2]>,
}

/// Entity counts and scoring for debug overlays and logs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub score: u64,
    pub health: i32,
    pub multiplier: f32,
    pub scroll: f32,
    pub obstacles: usize,
    pub envelope_points: usize,
    pub bullets: usize,
    pub spits: usize,
    pub debris: usize,
    pub spiders: usize,
    pub background_lines: usize,
    pub collisions: usize,
    pub game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spider(burst_rate: i32) -> Spider {
        Spider {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            motion: SpiderMotion::Walking { from: 1, to: 0, t: 0.0 },
            radius: 0.01,
            speed: 1.0,
            health: 10.0,
            forward: true,
            dead: false,
            burst_rate,
            burst: 0,
            cooldown: 0.0,
            fire_rate: 1.0,
            burst_fire_rate: 0.1,
            spit_speed: 1.5,
        }
    }

    #[test]
    fn test_burst_cycle() {
        let mut s = spider(3);
        s.record_shot();
        assert_eq!(s.cooldown, 0.1);
        s.record_shot();
        assert_eq!(s.cooldown, 0.1);
        s.record_shot();
        assert_eq!(s.cooldown, 1.0);
        assert_eq!(s.burst, 0);
    }

    #[test]
    fn test_obstacle_flash_clamps_at_zero() {
        let mut o = Obstacle::new(Vec2::ZERO, 0.05, 0, 50, vec![Vec2::X; 5]);
        o.take_hit(20);
        assert_eq!(o.health, 30);
        assert_eq!(o.flash_ms, OBSTACLE_FLASH_MS);
        o.decay_flash(1000);
        assert_eq!(o.flash_ms, 0);
    }

    #[test]
    fn test_phase_game_over() {
        assert!(!GamePhase::Ready.is_game_over());
        assert!(!GamePhase::Active.is_game_over());
        assert!(GamePhase::Dying { countdown_ms: 10 }.is_game_over());
        assert!(GamePhase::Clearing.is_game_over());
        assert!(GamePhase::Over.is_game_over());
    }
}
