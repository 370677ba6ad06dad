//! Property tests over seeds and frame timings

use std::collections::HashMap;

use cave_flyer::Settings;
use cave_flyer::consts::*;
use cave_flyer::sim::geometry::slot_x;
use cave_flyer::sim::{Cave, Command, Game, SpiderMotion};
use proptest::prelude::*;

fn game(seed: u64) -> Game {
    Game::new(&Settings {
        seed,
        autostart: true,
        ..Settings::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn generation_is_deterministic(
        seed in any::<u64>(),
        widths in prop::collection::vec(0.05f32..1.0, 1..6),
    ) {
        let mut a = Cave::new(seed);
        let mut b = Cave::new(seed);
        let mut x = 0.0;
        for w in widths {
            prop_assert_eq!(a.generate(x, x + w), b.generate(x, x + w));
            x += w;
        }
        prop_assert!(a.obstacles.keys().eq(b.obstacles.keys()));
        for (oa, ob) in a.obstacles.values().zip(b.obstacles.values()) {
            prop_assert_eq!(oa.pos, ob.pos);
            prop_assert_eq!(oa.health, ob.health);
            prop_assert_eq!(&oa.vertices[..], &ob.vertices[..]);
        }
        prop_assert_eq!(&a.envelope, &b.envelope);
        prop_assert_eq!(a.spiders.len(), b.spiders.len());
        for (sa, sb) in a.spiders.iter().zip(b.spiders.iter()) {
            prop_assert_eq!(sa.pos, sb.pos);
            prop_assert_eq!(sa.motion, sb.motion);
        }
    }

    #[test]
    fn envelope_only_ever_lowers(
        seed in any::<u64>(),
        writes in prop::collection::vec((0i64..8, 0.5f32..1.1), 1..64),
    ) {
        let mut cave = Cave::new(seed);
        let mut expected: HashMap<i64, f32> = HashMap::new();
        for (slot, y) in writes {
            let before = cave.envelope.get(&slot).copied();
            let stored = cave.write_envelope(slot, y);
            if let Some(prev) = before {
                prop_assert!(stored <= prev);
            }
            let e = expected.entry(slot).or_insert(y);
            *e = e.min(y);
            prop_assert_eq!(stored, *e);
        }
    }

    #[test]
    fn frame_invariants_hold(seed in 0u64..1000, dts in prop::collection::vec(1u32..40, 50..400)) {
        let mut game = game(seed);
        let mut health: HashMap<u32, i32> = HashMap::new();

        for (i, dt) in dts.into_iter().enumerate() {
            let fire = if i % 2 == 0 { Command::Fire } else { Command::ThrustForward };
            game.apply_commands(&[fire]);
            game.update(dt);

            let edge = game.scroll - PRUNE_MARGIN - 1e-4;
            prop_assert!(game.cave.obstacles.keys().all(|k| k.0 >= edge));
            prop_assert!(game.cave.envelope.keys().all(|&s| slot_x(s) >= edge));

            for (k, o) in &game.cave.obstacles {
                if let Some(&prev) = health.get(&k.0.to_bits()) {
                    prop_assert!(o.health <= prev);
                }
            }
            health = game
                .cave
                .obstacles
                .iter()
                .map(|(k, o)| (k.0.to_bits(), o.health))
                .collect();

            for spider in &game.cave.spiders {
                let SpiderMotion::Walking { from, to, t } = spider.motion else {
                    continue;
                };
                prop_assert!((0.0..=1.0).contains(&t));
                let envelope = &game.cave.envelope;
                if let (Some(&y0), Some(&y1)) = (envelope.get(&from), envelope.get(&to)) {
                    let (x0, x1) = (slot_x(from), slot_x(to));
                    let (x, y) = (spider.pos.x, spider.pos.y);
                    prop_assert!(x >= x0.min(x1) - 1e-5 && x <= x0.max(x1) + 1e-5);
                    prop_assert!(y >= y0.min(y1) - 1e-5 && y <= y0.max(y1) + 1e-5);
                }
            }

            prop_assert!(game.ship.cannon_cooldown_ms <= CANNON_COOLDOWN_MS);
            prop_assert!(game.multiplier >= 1.0);
            prop_assert!((0.0..=1.0).contains(&game.ship.pos.y));
        }
    }
}
