//! Cave Flyer - simulation core of a side-scrolling cave shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (cave generation, physics, collisions, game state)
//! - `settings`: Seed and driver configuration
//!
//! Rendering, input polling, windowing and audio live outside this crate.
//! A renderer reads the public state of [`sim::Game`] and [`sim::Cave`].

pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{Cave, Command, Game, GamePhase};

/// Game configuration constants
///
/// World units: the viewport is 1.0 tall and [`VIEWPORT_WIDTH`] wide,
/// y grows downward (0 = ceiling, 1 = floor).
pub mod consts {
    /// Obstacle samples per world unit of generated range
    pub const DENSITY: f32 = 80.0;
    /// Horizontal step of the floor envelope
    pub const ENVELOPE_RESOLUTION: f32 = 1.0 / 128.0;
    /// Per-sample spider spawn probability (scaled by envelope resolution)
    pub const SPIDER_PROBABILITY: f32 = 0.1;
    /// Base chance of a formation in a chunk
    pub const FORMATION_PROBABILITY: f32 = 0.005;
    /// Chance of a background line per generated chunk
    pub const BACKGROUND_PROBABILITY: f32 = 0.5;
    /// Chance the background shade drift reverses on a given line
    pub const BACKGROUND_REVERSE_PROBABILITY: f32 = 0.1;
    pub const BACKGROUND_SHADE_MIN: i32 = 1;
    pub const BACKGROUND_SHADE_MAX: i32 = 47;

    /// Floor rows before this x keep the starting corridor open
    pub const START_REGION_END: f32 = 2.0;
    /// Floor obstacles are never lifted above this y in the start region
    pub const START_REGION_FLOOR: f32 = 0.85;
    /// Spiders only spawn in chunks ending past this x
    pub const SAFE_ZONE_END: f32 = 2.4;

    /// Visible world width (16:9 at unit height)
    pub const VIEWPORT_WIDTH: f32 = 1.77;
    /// Generate more cave when the generated edge is this close to the scroll offset
    pub const GENERATION_LOOKAHEAD: f32 = 2.0;
    /// Generated edge is pushed to scroll offset + this
    pub const GENERATION_CHUNK: f32 = 2.2;
    /// Initial generated window
    pub const INITIAL_GENERATION: f32 = 1.8;
    /// Obstacles and envelope samples behind scroll offset - this are dropped
    pub const PRUNE_MARGIN: f32 = 0.2;
    /// Moving entities behind scroll offset - this are dead
    pub const TRAILING_MARGIN: f32 = 0.1;
    /// Projectiles past scroll offset + this are dead
    pub const LEADING_EDGE: f32 = 1.8;
    /// Half-width of the obstacle window searched around a collider
    pub const COLLISION_WINDOW: f32 = 0.1;

    /// World scroll speed (units/s at multiplier 1)
    pub const SCROLL_SPEED: f32 = 0.5;

    /// Ship defaults
    pub const SHIP_START_X: f32 = 0.1;
    pub const SHIP_START_Y: f32 = 0.5;
    pub const SHIP_RADIUS: f32 = 0.0125;
    pub const SHIP_MAX_HEALTH: i32 = 1000;

    /// Thrust (velocity units per command frame)
    pub const VERTICAL_THRUST: f32 = 0.6;
    pub const VERTICAL_THRUST_MAX: f32 = 3.6;
    pub const VERTICAL_DECELERATION: f32 = 0.3;
    /// Velocity unit -> world units/s
    pub const VERTICAL_SPEED: f32 = 0.1;
    pub const HORIZONTAL_THRUST: f32 = 0.6;
    pub const HORIZONTAL_THRUST_MAX: f32 = 3.6;
    pub const HORIZONTAL_DECELERATION: f32 = 0.3;
    pub const HORIZONTAL_SPEED: f32 = 0.2;

    /// Player bullet speed (units/s)
    pub const BULLET_SPEED: f32 = 1.34;
    /// Milliseconds between shots
    pub const CANNON_COOLDOWN_MS: u32 = 100;
    pub const BULLET_DAMAGE: i32 = 100;

    /// Downward acceleration for falling spiders and debris (units/s²)
    pub const GRAVITY: f32 = 2.91;

    /// Damage-flash lengths (ms)
    pub const OBSTACLE_FLASH_MS: u32 = 50;
    pub const SHIP_SPIT_FLASH_MS: u32 = 50;
    pub const SHIP_COLLISION_FLASH_MS: u32 = 100;

    /// Ship damage per unit of spit radius
    pub const SPIT_DAMAGE_SCALE: f32 = 2000.0;
    /// Ship damage per unit of obstacle radius
    pub const COLLISION_DAMAGE_SCALE: f32 = 1000.0;
    /// Score per unit of obstacle radius hit by a bullet
    pub const HIT_SCORE_SCALE: f32 = 50.0;

    /// Multiplier decay while flashing (per second)
    pub const MULTIPLIER_DECAY: f32 = 3.0;
    /// Multiplier growth while not flashing (per second)
    pub const MULTIPLIER_GROWTH: f32 = 0.03;

    /// Fragments in the ship's death burst
    pub const DEATH_BURST_FRAGMENTS: usize = 50;
    /// Time between death and the final clear (ms)
    pub const GAMEOVER_COUNTDOWN_MS: u32 = 3000;

    /// Horizontal ship speed assumed by spider aim
    pub const SPIT_LEAD_SPEED: f32 = 0.5;
    /// Enemies closer than this factor times obstacle radius² get knocked loose
    pub const KNOCKBACK_FACTOR: f32 = 1.4;
}

/// Squared distance between two points
#[inline]
pub fn sqdist(a: glam::Vec2, b: glam::Vec2) -> f32 {
    a.distance_squared(b)
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (b - a) * t + a
}
