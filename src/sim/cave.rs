//! The cave: procedural generation and everything that lives in it
//!
//! Obstacles are keyed by x in an ordered map so collision checks can
//! query a window around a position and pruning can cut everything behind
//! the trailing edge in one split. The floor envelope maps quantized x
//! slots to the highest floor surface seen at that slot and doubles as the
//! path graph for walking spiders.

use std::collections::{BTreeMap, VecDeque};
use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::geometry::{boulder_outline, heading, polygon_edges, shard, slot_x, surface_samples};
use super::random::{RandomStream, RngState};
use super::state::{BackgroundLine, Bullet, Debris, Obstacle, Spider, SpiderMotion, Spit};
use crate::consts::*;
use crate::lerp;

/// Obstacle map key (obstacle x)
pub type ObstacleKey = OrderedFloat<f32>;

/// Ceiling rocks health per unit radius
const CEILING_HEALTH_SCALE: f32 = 1000.0;
/// Floor rocks are tougher
const FLOOR_HEALTH_SCALE: f32 = 3000.0;

const RADIUS_RANGE: (f32, f32) = (0.02, 0.1);
const SHADE_RANGE: (i32, i32) = (0, 47);

const SPIDER_RADIUS_RANGE: (f32, f32) = (0.008, 0.012);
const SPIDER_SPEED_RANGE: (f32, f32) = (0.75, 1.5);
const SPIDER_BURST_RANGE: (i32, i32) = (1, 5);
const SPIDER_FIRE_RATE_RANGE: (f32, f32) = (0.5, 1.5);
const SPIDER_BURST_FIRE_RATE_RANGE: (f32, f32) = (0.1, 0.2);
const SPIDER_SPIT_SPEED_RANGE: (f32, f32) = (1.0, 2.0);
const SPIDER_HEALTH: f32 = 10.0;

const SPIT_RADIUS_RANGE: (f32, f32) = (0.004, 0.007);

/// Debris leaves an explosion somewhere in this cone
const DEBRIS_ANGLE_RANGE: (f32, f32) = (-FRAC_PI_2, PI);
/// Spiders are thrown back and up within this cone
const EJECTION_ANGLE_RANGE: (f32, f32) = (PI / 4.0 + FRAC_PI_2, PI * 2.0 / 3.0 + FRAC_PI_2);

/// Ship hit shards
const HIT_SHARD_SIZE: f32 = 0.02;
const HIT_SHARD_SHADE: i32 = 100;
/// Death burst fragments
const DEATH_BURST_SPEED: f32 = 0.2;
const DEATH_BURST_SIZE_SCALE: f32 = 0.01;
const DEATH_BURST_SHADE_SCALE: f32 = 10000.0;

/// Background line horizontal jitter
const BACKGROUND_X_JITTER: f32 = 0.02;
/// Background vertex jitter, as a fraction of vertex spacing
const BACKGROUND_Y_JITTER: f32 = 0.3;
const BACKGROUND_VERTICES: (i32, i32) = (5, 10);
const BACKGROUND_START_SHADE: i32 = 10;

/// What one `generate` call placed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Ceiling obstacle samples
    pub ceiling: usize,
    /// Floor obstacle samples
    pub floor: usize,
    /// Formation obstacle samples (0 when no formation rolled)
    pub formation: usize,
    /// Samples that landed on an existing key and replaced it
    pub overwritten: usize,
    pub spiders: usize,
    pub background_line: bool,
}

impl GenerationReport {
    /// Obstacles actually added to the map
    pub fn placed(&self) -> usize {
        self.ceiling + self.floor + self.formation - self.overwritten
    }
}

/// All spatially indexed content plus the live entity queues
#[derive(Debug, Clone)]
pub struct Cave {
    pub obstacles: BTreeMap<ObstacleKey, Obstacle>,
    /// Envelope slot -> floor surface y (running minimum)
    pub envelope: BTreeMap<i64, f32>,
    pub spiders: VecDeque<Spider>,
    pub bullets: VecDeque<Bullet>,
    pub spits: VecDeque<Spit>,
    pub debris: VecDeque<Debris>,
    pub background: VecDeque<BackgroundLine>,
    background_shade: i32,
    background_direction: i32,
    /// Consumed only by `generate`
    generator: RandomStream,
    /// Consumed only by gameplay events
    gameplay: RandomStream,
}

impl Cave {
    /// Cave with the gameplay stream derived from the world seed
    pub fn new(seed: u64) -> Self {
        Self::with_streams(RandomStream::new(seed), RandomStream::gameplay_for(seed))
    }

    pub fn with_streams(generator: RandomStream, gameplay: RandomStream) -> Self {
        Self {
            obstacles: BTreeMap::new(),
            envelope: BTreeMap::new(),
            spiders: VecDeque::new(),
            bullets: VecDeque::new(),
            spits: VecDeque::new(),
            debris: VecDeque::new(),
            background: VecDeque::new(),
            background_shade: BACKGROUND_START_SHADE,
            background_direction: 1,
            generator,
            gameplay,
        }
    }

    /// Origins of the generation and gameplay streams
    pub fn rng_states(&self) -> (RngState, RngState) {
        (self.generator.state(), self.gameplay.state())
    }

    /// Gameplay random stream (explosions, spits, shards)
    pub fn gameplay_rng(&mut self) -> &mut RandomStream {
        &mut self.gameplay
    }

    /// Populate `[start_x, end_x)`
    ///
    /// Ranges must be increasing and non-overlapping across calls;
    /// overlapping calls place content twice.
    pub fn generate(&mut self, start_x: f32, end_x: f32) -> GenerationReport {
        let mut report = GenerationReport::default();
        let width = end_x - start_x;
        let samples = (DENSITY * width) as usize;

        for _ in 0..samples {
            self.place_ceiling(start_x, width, &mut report);
        }
        for _ in 0..samples {
            self.place_floor(start_x, end_x, &mut report);
        }

        let roll = self.generator.uniform();
        if roll * width < FORMATION_PROBABILITY + start_x / 1000.0 {
            self.place_formation(start_x, width, &mut report);
        }

        if self.generator.chance(BACKGROUND_PROBABILITY) {
            self.place_background_line(end_x);
            report.background_line = true;
        }

        log::debug!(
            "Generated [{:.3}, {:.3}): ceiling={} floor={} formation={} spiders={} overwritten={}",
            start_x,
            end_x,
            report.ceiling,
            report.floor,
            report.formation,
            report.spiders,
            report.overwritten
        );
        report
    }

    fn insert_obstacle(&mut self, obstacle: Obstacle, report: &mut GenerationReport) {
        if self
            .obstacles
            .insert(OrderedFloat(obstacle.pos.x), obstacle)
            .is_some()
        {
            report.overwritten += 1;
        }
    }

    fn place_ceiling(&mut self, start_x: f32, width: f32, report: &mut GenerationReport) {
        let rng = &mut self.generator;
        let x = start_x + rng.uniform() * width;
        let y = rng.uniform() * x.sin().abs() * 0.3 - 0.05;
        let radius = rng.range(RADIUS_RANGE.0, RADIUS_RANGE.1);
        let shade = rng.int_inclusive(SHADE_RANGE.0, SHADE_RANGE.1);
        let vertices = boulder_outline(rng, radius);
        let health = (radius * CEILING_HEALTH_SCALE) as i32;

        self.insert_obstacle(
            Obstacle::new(Vec2::new(x, y), radius, shade, health, vertices),
            report,
        );
        report.ceiling += 1;
    }

    fn place_floor(&mut self, start_x: f32, end_x: f32, report: &mut GenerationReport) {
        let width = end_x - start_x;
        let rng = &mut self.generator;
        let x = start_x + rng.uniform() * width;
        let mut y = rng.uniform() * -(x.cos() + (3.0 * x).sin()).abs() * 0.3 + 1.05;
        if end_x < START_REGION_END {
            y = y.max(START_REGION_FLOOR);
        }
        let radius = rng.range(RADIUS_RANGE.0, RADIUS_RANGE.1);
        let shade = rng.int_inclusive(SHADE_RANGE.0, SHADE_RANGE.1);

        let spawn_chance = SPIDER_PROBABILITY * ENVELOPE_RESOLUTION * (100.0 + start_x) / 100.0;
        for (slot, surface_y) in surface_samples(Vec2::new(x, y), radius) {
            let floor_y = self.write_envelope(slot, surface_y);
            if end_x > SAFE_ZONE_END && self.generator.chance(spawn_chance) {
                let spider = self.roll_spider(slot, floor_y);
                self.spiders.push_back(spider);
                report.spiders += 1;
            }
        }

        let vertices = boulder_outline(&mut self.generator, radius);
        let health = (radius * FLOOR_HEALTH_SCALE) as i32;
        self.insert_obstacle(
            Obstacle::new(Vec2::new(x, y), radius, shade, health, vertices),
            report,
        );
        report.floor += 1;
    }

    /// Lower the envelope at `slot` to `y` if it is higher; returns the stored value
    pub fn write_envelope(&mut self, slot: i64, y: f32) -> f32 {
        let entry = self.envelope.entry(slot).or_insert(y);
        if y < *entry {
            *entry = y;
        }
        *entry
    }

    fn roll_spider(&mut self, slot: i64, floor_y: f32) -> Spider {
        let rng = &mut self.generator;
        let radius = rng.range(SPIDER_RADIUS_RANGE.0, SPIDER_RADIUS_RANGE.1);
        let speed = rng.range(SPIDER_SPEED_RANGE.0, SPIDER_SPEED_RANGE.1);
        let burst_rate = rng.int_inclusive(SPIDER_BURST_RANGE.0, SPIDER_BURST_RANGE.1);
        let fire_rate = rng.range(SPIDER_FIRE_RATE_RANGE.0, SPIDER_FIRE_RATE_RANGE.1);
        let burst_fire_rate =
            rng.range(SPIDER_BURST_FIRE_RATE_RANGE.0, SPIDER_BURST_FIRE_RATE_RANGE.1);
        let spit_speed = rng.range(SPIDER_SPIT_SPEED_RANGE.0, SPIDER_SPIT_SPEED_RANGE.1);

        Spider {
            pos: Vec2::new(slot_x(slot), floor_y),
            vel: Vec2::ZERO,
            motion: SpiderMotion::Walking {
                from: slot,
                to: slot - 1,
                t: 0.0,
            },
            radius,
            speed,
            health: SPIDER_HEALTH,
            forward: true,
            dead: false,
            burst_rate,
            burst: 0,
            cooldown: 0.0,
            fire_rate,
            burst_fire_rate,
            spit_speed,
        }
    }

    /// Dense cluster in the middle half of the range, bigger away from the midline
    fn place_formation(&mut self, start_x: f32, width: f32, report: &mut GenerationReport) {
        let samples = (DENSITY * width * 0.5) as usize;
        log::debug!("Formation at [{:.3}, {:.3}) with {} rocks", start_x, start_x + width, samples);

        for _ in 0..samples {
            let rng = &mut self.generator;
            let x = start_x + 0.25 * width + rng.uniform() * 0.5 * width;
            let y = rng.uniform() * x.sin().abs() * 0.95 - 0.05;
            let off_mid = 0.5 - y;
            let radius = rng.range(RADIUS_RANGE.0, RADIUS_RANGE.1) * (1.0 + off_mid * off_mid);
            let shade = rng.int_inclusive(SHADE_RANGE.0, SHADE_RANGE.1);
            let vertices = boulder_outline(rng, radius);
            let health = (radius * CEILING_HEALTH_SCALE) as i32;

            self.insert_obstacle(
                Obstacle::new(Vec2::new(x, y), radius, shade, health, vertices),
                report,
            );
            report.formation += 1;
        }
    }

    fn place_background_line(&mut self, x: f32) {
        let rng = &mut self.generator;
        if rng.chance(BACKGROUND_REVERSE_PROBABILITY) {
            self.background_direction = -self.background_direction;
        }
        self.background_shade += self.background_direction;
        if self.background_shade >= BACKGROUND_SHADE_MAX {
            self.background_shade = BACKGROUND_SHADE_MAX;
            self.background_direction = -1;
        } else if self.background_shade <= BACKGROUND_SHADE_MIN {
            self.background_shade = BACKGROUND_SHADE_MIN;
            self.background_direction = 1;
        }

        let count = rng.int_inclusive(BACKGROUND_VERTICES.0, BACKGROUND_VERTICES.1);
        let spacing = 1.0 / (count - 1) as f32;
        let vertices: Vec<Vec2> = (0..count)
            .map(|j| {
                let dx = rng.range(-BACKGROUND_X_JITTER, BACKGROUND_X_JITTER);
                let y = if j == 0 {
                    0.0
                } else if j == count - 1 {
                    1.0
                } else {
                    let jitter = rng.range(-BACKGROUND_Y_JITTER, BACKGROUND_Y_JITTER);
                    (j as f32 + jitter) * spacing
                };
                Vec2::new(dx, y)
            })
            .collect();

        self.background.push_back(BackgroundLine {
            x,
            shade: self.background_shade,
            vertices: vertices.into(),
        });
    }

    /// Current background drift shade
    pub fn background_shade(&self) -> i32 {
        self.background_shade
    }

    /// Obstacles with x in `[x - half_width, x + half_width]`
    pub fn obstacles_near(&self, x: f32, half_width: f32) -> impl Iterator<Item = &Obstacle> {
        self.obstacles
            .range(OrderedFloat(x - half_width)..=OrderedFloat(x + half_width))
            .map(|(_, o)| o)
    }

    /// Mutable variant of [`Self::obstacles_near`]
    pub fn obstacles_near_mut(
        &mut self,
        x: f32,
        half_width: f32,
    ) -> impl Iterator<Item = &mut Obstacle> {
        self.obstacles
            .range_mut(OrderedFloat(x - half_width)..=OrderedFloat(x + half_width))
            .map(|(_, o)| o)
    }

    /// Break an obstacle into one shard per outline edge and knock nearby spiders loose
    ///
    /// Returns the number of debris fragments spawned.
    pub fn explode_obstacle(&mut self, obstacle: &Obstacle) -> usize {
        let mut spawned = 0;
        for edge in polygon_edges(&obstacle.vertices) {
            let theta = self.gameplay.range(DEBRIS_ANGLE_RANGE.0, DEBRIS_ANGLE_RANGE.1);
            self.debris
                .push_back(Debris::new(obstacle.pos, heading(theta), obstacle.shade, edge));
            spawned += 1;
        }

        let reach_sq = obstacle.radius * obstacle.radius * KNOCKBACK_FACTOR;
        for spider in self.spiders.iter_mut().filter(|s| !s.dead) {
            if spider.pos.distance_squared(obstacle.pos) < reach_sq {
                let theta = self
                    .gameplay
                    .range(EJECTION_ANGLE_RANGE.0, EJECTION_ANGLE_RANGE.1);
                spider.motion = SpiderMotion::Falling;
                spider.vel = heading(theta);
            }
        }
        spawned
    }

    /// Blow up every remaining obstacle and empty the map
    ///
    /// Obstacles already destroyed have exploded once and are just dropped.
    pub fn clear_obstacles(&mut self) -> usize {
        let obstacles = std::mem::take(&mut self.obstacles);
        obstacles
            .into_values()
            .filter(|obstacle| !obstacle.destroyed)
            .map(|mut obstacle| {
                obstacle.destroyed = true;
                self.explode_obstacle(&obstacle)
            })
            .sum()
    }

    /// Fire one spit from `spider` at a ship at `ship_pos`
    pub fn spider_spit(&mut self, spider: &Spider, ship_pos: Vec2) {
        let spit = aimed_spit(&mut self.gameplay, spider, ship_pos);
        self.spits.push_back(spit);
    }

    /// Shard thrown off the ship when a spit lands
    pub fn spawn_hit_shard(&mut self, pos: Vec2, vel: Vec2) {
        let theta = self.gameplay.range(0.0, std::f32::consts::TAU);
        self.debris
            .push_back(Debris::new(pos, vel, HIT_SHARD_SHADE, shard(theta, HIT_SHARD_SIZE)));
    }

    /// The ship's death burst
    pub fn spawn_death_burst(&mut self, pos: Vec2) {
        for _ in 0..DEATH_BURST_FRAGMENTS {
            let theta = self.gameplay.range(0.0, std::f32::consts::TAU);
            let size = self.gameplay.range(0.0, std::f32::consts::TAU) * DEATH_BURST_SIZE_SCALE;
            self.debris.push_back(Debris::new(
                pos,
                heading(theta) * DEATH_BURST_SPEED,
                (DEATH_BURST_SHADE_SCALE * size) as i32,
                shard(theta, size),
            ));
        }
    }

    /// Advance every live spider by `dts` seconds
    ///
    /// Walking spiders follow the envelope; falling ones fly under gravity.
    /// Each spider fires at `ship_pos` on its burst schedule. Spiders behind
    /// `trailing_x` or below the floor die.
    pub fn advance_spiders(&mut self, dts: f32, ship_pos: Vec2, trailing_x: f32) {
        let Cave {
            spiders,
            spits,
            envelope,
            gameplay,
            ..
        } = self;

        for spider in spiders.iter_mut().filter(|s| !s.dead) {
            match spider.motion {
                SpiderMotion::Walking { .. } => walk(envelope, spider, dts),
                SpiderMotion::Falling => {
                    spider.pos += spider.vel * dts;
                    spider.vel.y += GRAVITY * dts;
                }
            }

            if spider.cooldown <= 0.0 {
                spits.push_back(aimed_spit(gameplay, spider, ship_pos));
                spider.record_shot();
            } else {
                spider.cooldown = (spider.cooldown - dts).max(0.0);
            }

            if spider.pos.x < trailing_x || spider.pos.y > 1.0 {
                spider.dead = true;
            }
        }
    }

    /// Drop obstacles and envelope samples behind `edge`, plus destroyed obstacles
    pub fn prune_behind(&mut self, edge: f32) {
        self.obstacles = self.obstacles.split_off(&OrderedFloat(edge));
        self.obstacles.retain(|_, o| !o.destroyed);

        let first_slot = (edge / ENVELOPE_RESOLUTION).ceil() as i64;
        self.envelope = self.envelope.split_off(&first_slot);

        // Keep one line behind the edge so the first strip stays closed
        while self.background.len() > 1 && self.background[1].x < edge {
            self.background.pop_front();
        }
    }

    /// Remove dead entries from every queue
    pub fn compact(&mut self) {
        self.spiders.retain(|s| !s.dead);
        self.bullets.retain(|b| !b.dead);
        self.spits.retain(|s| !s.dead);
        self.debris.retain(|d| !d.dead);
    }
}

/// Nearest envelope key below `slot` (forward) or above it (backward)
fn adjacent_slot(envelope: &BTreeMap<i64, f32>, slot: i64, forward: bool) -> Option<i64> {
    if forward {
        envelope.range(..slot).next_back().map(|(k, _)| *k)
    } else {
        envelope.range(slot + 1..).next().map(|(k, _)| *k)
    }
}

/// Move a walking spider along the envelope
///
/// Missing samples (pruned, or sparse near a generation edge) leave the
/// spider where it is for this frame.
fn walk(envelope: &BTreeMap<i64, f32>, spider: &mut Spider, dts: f32) {
    let SpiderMotion::Walking {
        mut from,
        mut to,
        mut t,
    } = spider.motion
    else {
        return;
    };

    // Spawn target may not be a sample; aim at the real neighbor instead
    if !envelope.contains_key(&to) {
        if let Some(next) = adjacent_slot(envelope, from, spider.forward) {
            to = next;
        }
    }

    t += spider.speed * dts;
    if t >= 1.0 {
        match adjacent_slot(envelope, to, spider.forward) {
            Some(next) if envelope.contains_key(&to) => {
                from = to;
                to = next;
                t = 0.0;
            }
            _ => t = 1.0,
        }
    }
    spider.motion = SpiderMotion::Walking { from, to, t };

    if let (Some(&y0), Some(&y1)) = (envelope.get(&from), envelope.get(&to)) {
        spider.pos = Vec2::new(lerp(slot_x(from), slot_x(to), t), lerp(y0, y1, t));
    }
}

/// Spit aimed with a linear lead on the ship's assumed scroll speed
fn aimed_spit(rng: &mut RandomStream, spider: &Spider, ship_pos: Vec2) -> Spit {
    let speed = spider.spit_speed;
    let vel = Vec2::new(
        (ship_pos.x + SPIT_LEAD_SPEED / speed - spider.pos.x) * speed,
        (ship_pos.y - spider.pos.y) * speed,
    );
    Spit {
        pos: spider.pos,
        vel,
        radius: rng.range(SPIT_RADIUS_RANGE.0, SPIT_RADIUS_RANGE.1),
        dead: false,
    }
}
