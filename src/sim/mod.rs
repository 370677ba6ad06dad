//! Deterministic simulation module
//!
//! All gameplay logic lives here. For a fixed seed and a fixed sequence of
//! commands and frame deltas the cave and every entity evolve identically:
//! - Seeded RNG only, split into a generation stream and a gameplay stream
//! - Ordered obstacle map, insertion-ordered entity queues
//! - No rendering or platform dependencies

pub mod cave;
pub mod collision;
pub mod geometry;
pub mod random;
pub mod state;
pub mod tick;

pub use cave::{Cave, GenerationReport, ObstacleKey};
pub use collision::{
    BulletOutcome, apply_ship_collisions, detect_ship_collisions, resolve_bullet_hits,
    resolve_spit_hits,
};
pub use random::{RandomStream, RngState};
pub use state::{
    BackgroundLine, Bullet, Command, Debris, FrameStats, GamePhase, Obstacle, Ship, Spider,
    SpiderMotion, Spit,
};
pub use tick::Game;
