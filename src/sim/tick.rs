//! Per-frame simulation advance
//!
//! [`Game`] owns the ship and the cave and moves everything forward by a
//! wall-clock delta each frame. Large deltas are integrated in a single
//! explicit Euler step.

use glam::Vec2;

use super::cave::Cave;
use super::collision;
use super::random::RandomStream;
use super::state::{Bullet, Command, FrameStats, GamePhase, Obstacle, Ship};
use crate::Settings;
use crate::consts::*;

/// The running game
#[derive(Debug, Clone)]
pub struct Game {
    pub cave: Cave,
    pub ship: Ship,
    pub phase: GamePhase,
    /// Horizontal world scroll (left edge of the viewport)
    pub scroll: f32,
    pub score: u64,
    pub multiplier: f32,
    /// Scroll speed factor; decays to 0 after death
    pub slowdown: f32,
    /// Obstacles the ship ran into this frame
    pub collisions: Vec<Obstacle>,
    /// Right edge of generated content
    generated_to: f32,
    /// Simulated time since start (ms)
    time_ms: u64,
}

impl Game {
    /// Create a game from settings and generate the opening stretch of cave
    pub fn new(settings: &Settings) -> Self {
        let generator = RandomStream::new(settings.seed);
        let gameplay = match settings.gameplay_seed {
            Some(seed) => RandomStream::new(seed),
            None => RandomStream::gameplay_for(settings.seed),
        };

        let mut game = Self {
            cave: Cave::with_streams(generator, gameplay),
            ship: Ship::default(),
            phase: GamePhase::Ready,
            scroll: 0.0,
            score: 0,
            multiplier: 1.0,
            slowdown: 1.0,
            collisions: Vec::new(),
            generated_to: INITIAL_GENERATION,
            time_ms: 0,
        };
        game.cave.generate(0.0, INITIAL_GENERATION);
        let (world, events) = game.cave.rng_states();
        log::info!("New game: world {:?}, gameplay {:?}", world, events);

        if settings.autostart {
            game.start();
        }
        game
    }

    /// Game with default settings and the given world seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(&Settings {
            seed,
            ..Settings::default()
        })
    }

    /// Leave the ready screen
    pub fn start(&mut self) {
        if self.phase == GamePhase::Ready {
            self.phase = GamePhase::Active;
            log::info!("Game started");
        }
    }

    /// Abandon the run; the next update plays the death sequence
    pub fn give_up(&mut self) {
        if !self.phase.is_game_over() {
            self.ship.health = 0;
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_game_over()
    }

    /// Game over and the screen has emptied
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Over
            && self.cave.obstacles.is_empty()
            && self.cave.debris.is_empty()
    }

    /// Right edge of generated content
    pub fn generated_to(&self) -> f32 {
        self.generated_to
    }

    /// Simulated time since start (ms)
    pub fn time_ms(&self) -> u64 {
        self.time_ms
    }

    /// Map this frame's intents to ship thrust and firing
    ///
    /// Opposing intents on one axis must already be resolved by the caller.
    /// Ignored unless the game is active.
    pub fn apply_commands(&mut self, commands: &[Command]) {
        if self.phase != GamePhase::Active {
            return;
        }
        let has = |c: Command| commands.contains(&c);

        self.ship.vel.y = thrust(
            self.ship.vel.y,
            has(Command::ThrustUp),
            has(Command::ThrustDown),
            VERTICAL_THRUST,
            VERTICAL_THRUST_MAX,
            VERTICAL_DECELERATION,
        );
        self.ship.vel.x = thrust(
            self.ship.vel.x,
            has(Command::ThrustBackward),
            has(Command::ThrustForward),
            HORIZONTAL_THRUST,
            HORIZONTAL_THRUST_MAX,
            HORIZONTAL_DECELERATION,
        );

        if self.ship.cannon_cooldown_ms == 0 && has(Command::Fire) {
            self.fire();
        }
    }

    /// Spawn a bullet, alternating straight and angled shots
    fn fire(&mut self) {
        let half_sqrt3 = 3.0_f32.sqrt() / 2.0;
        let (vel, normal) = if self.ship.fire_angled {
            (Vec2::new(half_sqrt3, 0.5), Vec2::new(0.5, -half_sqrt3))
        } else {
            (Vec2::X, Vec2::Y)
        };
        self.cave.bullets.push_back(Bullet {
            pos: self.ship.pos,
            vel,
            normal,
            damage: BULLET_DAMAGE,
            dead: false,
        });
        self.ship.fire_angled = !self.ship.fire_angled;
        self.ship.cannon_cooldown_ms = CANNON_COOLDOWN_MS;
    }

    /// Advance the game by `dt_ms` milliseconds
    pub fn update(&mut self, dt_ms: u32) {
        if self.phase == GamePhase::Ready {
            return;
        }
        self.time_ms += u64::from(dt_ms);
        let dts = dt_ms as f32 / 1000.0;
        let offset = dts * SCROLL_SPEED * self.slowdown * self.multiplier;

        // Ship movement, carried along with the scroll
        self.ship.pos.x += self.ship.vel.x * HORIZONTAL_SPEED * dts + offset;
        self.ship.pos.y += self.ship.vel.y * VERTICAL_SPEED * dts;
        self.ship.pos.x = self.ship.pos.x.clamp(self.scroll, self.scroll + VIEWPORT_WIDTH);
        self.ship.pos.y = self.ship.pos.y.clamp(0.0, 1.0);

        // Stream in more cave ahead
        if self.generated_to - self.scroll <= GENERATION_LOOKAHEAD {
            let next = self.scroll + GENERATION_CHUNK;
            self.cave.generate(self.generated_to, next);
            self.generated_to = next;
        }

        self.ship.cannon_cooldown_ms = self.ship.cannon_cooldown_ms.saturating_sub(dt_ms);

        if !self.phase.is_game_over() {
            self.scroll += offset;
        }

        self.move_projectiles(dts, offset);
        collision::resolve_spit_hits(&mut self.cave, &mut self.ship);

        self.cave.prune_behind(self.scroll - PRUNE_MARGIN);
        self.decay_obstacle_flashes(dt_ms);

        self.cave
            .advance_spiders(dts, self.ship.pos, self.scroll - TRAILING_MARGIN);
        self.move_debris(dts);
        self.cave.compact();

        self.collisions = collision::detect_ship_collisions(&mut self.cave, &self.ship);
        let bullets = collision::resolve_bullet_hits(&mut self.cave, self.multiplier);
        self.score += bullets.score;
        collision::apply_ship_collisions(&mut self.cave, &mut self.ship, &self.collisions);

        self.update_ship_condition(dt_ms, dts);
        self.advance_phase(dt_ms, dts);

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{:?}", self.stats());
        }
    }

    fn move_projectiles(&mut self, dts: f32, offset: f32) {
        let scroll = self.scroll;
        for bullet in self.cave.bullets.iter_mut().filter(|b| !b.dead) {
            bullet.pos += bullet.vel * BULLET_SPEED * dts;
            bullet.pos.x += offset;
            if bullet.pos.x > scroll + LEADING_EDGE
                || bullet.pos.x < scroll - TRAILING_MARGIN
                || !(-TRAILING_MARGIN..=1.0 + TRAILING_MARGIN).contains(&bullet.pos.y)
            {
                bullet.dead = true;
            }
        }

        for spit in self.cave.spits.iter_mut().filter(|s| !s.dead) {
            spit.pos += spit.vel * dts;
            if spit.pos.x < scroll - TRAILING_MARGIN
                || spit.pos.x > scroll + LEADING_EDGE
                || spit.pos.y < 0.0
            {
                spit.dead = true;
            }
        }
    }

    /// Run down damage flashes; obstacles out of health blow up
    fn decay_obstacle_flashes(&mut self, dt_ms: u32) {
        let mut shattered = Vec::new();
        for obstacle in self.cave.obstacles.values_mut() {
            if obstacle.flash_ms == 0 {
                continue;
            }
            obstacle.decay_flash(dt_ms);
            if obstacle.health <= 0 && !obstacle.destroyed {
                obstacle.destroyed = true;
                shattered.push(obstacle.clone());
            }
        }
        for obstacle in &shattered {
            self.cave.explode_obstacle(obstacle);
        }
    }

    fn move_debris(&mut self, dts: f32) {
        let scroll = self.scroll;
        for debris in self.cave.debris.iter_mut().filter(|d| !d.dead) {
            debris.pos += debris.vel * dts;
            debris.vel.y += GRAVITY * dts;
            debris.age += dts;
            if debris.pos.x < scroll - TRAILING_MARGIN
                || debris.pos.y > 1.0 + TRAILING_MARGIN
                || debris.pos.y < -TRAILING_MARGIN
            {
                debris.dead = true;
            }
        }
    }

    /// Damage flash, multiplier drift and the moment of death
    fn update_ship_condition(&mut self, dt_ms: u32, dts: f32) {
        if self.ship.is_flashing() {
            self.ship.flash_ms = self.ship.flash_ms.saturating_sub(dt_ms);
            self.multiplier = (self.multiplier - dts * MULTIPLIER_DECAY).max(1.0);
        } else {
            self.multiplier += MULTIPLIER_GROWTH * dts;
        }

        if self.ship.health <= 0 && !self.phase.is_game_over() {
            self.cave.spawn_death_burst(self.ship.pos);
            self.phase = GamePhase::Dying {
                countdown_ms: GAMEOVER_COUNTDOWN_MS,
            };
            log::info!("Game over: score {} at x {:.2}", self.score, self.scroll);
        }
    }

    /// Game-over sequencing and score accrual
    fn advance_phase(&mut self, dt_ms: u32, dts: f32) {
        if self.phase.is_game_over() {
            self.slowdown = (self.slowdown - dts).max(0.0);
        }

        match self.phase {
            GamePhase::Active => {
                self.score += (self.multiplier * self.multiplier * dt_ms as f32) as u64;
            }
            GamePhase::Dying { countdown_ms } => {
                let remaining = countdown_ms.saturating_sub(dt_ms);
                self.phase = if remaining == 0 {
                    GamePhase::Clearing
                } else {
                    GamePhase::Dying {
                        countdown_ms: remaining,
                    }
                };
            }
            GamePhase::Clearing => {
                let fragments = self.cave.clear_obstacles();
                log::info!("Cleared remaining cave into {} fragments", fragments);
                self.phase = GamePhase::Over;
            }
            GamePhase::Ready | GamePhase::Over => {}
        }
    }

    /// Counts for debug overlays and logs
    pub fn stats(&self) -> FrameStats {
        FrameStats {
            score: self.score,
            health: self.ship.health,
            multiplier: self.multiplier,
            scroll: self.scroll,
            obstacles: self.cave.obstacles.len(),
            envelope_points: self.cave.envelope.len(),
            bullets: self.cave.bullets.len(),
            spits: self.cave.spits.len(),
            debris: self.cave.debris.len(),
            spiders: self.cave.spiders.len(),
            background_lines: self.cave.background.len(),
            collisions: self.collisions.len(),
            game_over: self.phase.is_game_over(),
        }
    }
}

/// One axis of thrust: push toward `neg` or `pos`, otherwise coast to zero
fn thrust(v: f32, neg: bool, pos: bool, step: f32, max: f32, decel: f32) -> f32 {
    if neg {
        (v - step).max(-max)
    } else if pos {
        (v + step).min(max)
    } else if v > 0.0 {
        (v - decel).max(0.0)
    } else {
        (v + decel).min(0.0)
    }
}
