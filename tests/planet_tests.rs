//! Randomizer, planet mapper and chunk generator tests

#[cfg(test)]
mod tests {
    use nomad_world::chunk::{Element, ItemKind};
    use nomad_world::generator::{item_count_for_roll, ChunkGenerator, VEHICLE_HP};
    use nomad_world::planet::Planet;
    use nomad_world::random::{pseudo_rand_int, Randomizer};
    use nomad_world::types::ChunkCoord;

    fn make_planet() -> Planet {
        Planet::new(1000, 64, 1000)
    }

    // -----------------------------------------------------------------------
    // Randomizer
    // -----------------------------------------------------------------------

    #[test]
    fn randomizer_is_deterministic() {
        let mut a = Randomizer::new(5);
        let mut b = Randomizer::new(5);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn adjacent_seeds_diverge() {
        let a: Vec<u32> = {
            let mut r = Randomizer::new(1000);
            (0..8).map(|_| r.next_u32()).collect()
        };
        let b: Vec<u32> = {
            let mut r = Randomizer::new(1001);
            (0..8).map(|_| r.next_u32()).collect()
        };
        assert_ne!(a, b);
    }

    #[test]
    fn next_int_stays_in_bounds() {
        let mut r = Randomizer::new(-17);
        assert_eq!(r.next_int(0), 0);
        for _ in 0..1000 {
            assert!(r.next_int(10) < 10);
        }
    }

    #[test]
    fn pick_returns_a_member() {
        let mut r = Randomizer::new(3);
        let empty: [u8; 0] = [];
        assert!(r.pick(&empty).is_none());
        for _ in 0..50 {
            let picked = r.pick(&Element::ALL).copied();
            assert!(matches!(picked, Some(Element::C | Element::H | Element::Na)));
        }
    }

    #[test]
    fn pseudo_rand_int_is_stable_and_bounded() {
        assert_eq!(pseudo_rand_int(7, 999), pseudo_rand_int(7, 999));
        assert_eq!(pseudo_rand_int(7, 0), 0);
        for v in -50..50 {
            assert!(pseudo_rand_int(v, 999) < 999);
        }
    }

    // -----------------------------------------------------------------------
    // Planet mapper
    // -----------------------------------------------------------------------

    #[test]
    fn planet_size_and_center() {
        let p = make_planet();
        assert_eq!(p.size(), 64_000);
        assert_eq!(p.center(), (32_000.0, 32_000.0));
    }

    #[test]
    fn coordinates_wrap_around_the_torus() {
        let p = make_planet();
        assert_eq!(p.wrap_coordinates(-1.0, 64_000.0), (63_999.0, 0.0));
        assert_eq!(p.wrap_coordinates(64_010.5, -64_000.0), (10.5, 0.0));
        assert_eq!(p.wrap_coordinates(123.0, 456.0), (123.0, 456.0));
    }

    #[test]
    fn chunk_coordinates_floor_after_wrap() {
        let p = make_planet();
        assert_eq!(p.chunk_coordinates_at(32_000.0, 32_000.0), ChunkCoord::new(500, 500));
        assert_eq!(p.chunk_coordinates_at(63.9, 64.0), ChunkCoord::new(0, 1));
        assert_eq!(p.chunk_coordinates_at(-1.0, -1.0), ChunkCoord::new(999, 999));
    }

    #[test]
    fn chunk_origin_round_trips() {
        let p = make_planet();
        for (x, y) in [(0, 0), (1, 999), (500, 500), (999, 0), (123, 456)] {
            let coord = ChunkCoord::new(x, y);
            let (ox, oy) = p.chunk_origin(coord);
            assert_eq!(p.chunk_coordinates_at(ox as f64, oy as f64), coord);
            assert_eq!(p.chunk_coordinates_at(ox as f64 + 63.5, oy as f64), coord);
        }
    }

    #[test]
    fn chunk_coordinates_wrap() {
        let p = make_planet();
        assert_eq!(p.wrap_chunk(ChunkCoord::new(-1, 1000)), ChunkCoord::new(999, 0));
        assert_eq!(p.wrap_chunk(ChunkCoord::new(5, 6)), ChunkCoord::new(5, 6));
    }

    #[test]
    fn chunk_id_format() {
        let p = make_planet();
        let id = p.chunk_id(ChunkCoord::new(3, 4));
        assert_eq!(id.to_string(), "0_0_0_0_3_4");
        assert_eq!(id.coord(), ChunkCoord::new(3, 4));
    }

    #[test]
    fn chunk_seed_is_deterministic() {
        let p = make_planet();
        let coord = ChunkCoord::new(500, 501);
        let seed = p.chunk_seed(coord);
        assert_eq!(seed, make_planet().chunk_seed(coord));
        assert!(seed >= 1000 && seed < 1000 + 2 * 999);

        let other = Planet::new(2000, 64, 1000);
        assert_eq!(other.chunk_seed(coord), seed + 1000);
    }

    // -----------------------------------------------------------------------
    // Generator
    // -----------------------------------------------------------------------

    #[test]
    fn item_count_bands() {
        for roll in 0..10 {
            assert_eq!(item_count_for_roll(roll), 0);
        }
        for roll in 10..90 {
            assert_eq!(item_count_for_roll(roll), 1);
        }
        assert_eq!(item_count_for_roll(90), 11);
        assert_eq!(item_count_for_roll(99), 2);
    }

    #[test]
    fn generation_is_deterministic() {
        let p = make_planet();
        let g = ChunkGenerator::for_planet(&p);
        for x in 495..505 {
            let coord = ChunkCoord::new(x, 500);
            let id = p.chunk_id(coord);
            let a = g.generate(&id, p.chunk_seed(coord), coord);
            let b = g.generate(&id, p.chunk_seed(coord), coord);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn generated_items_are_well_formed() {
        let p = make_planet();
        let g = ChunkGenerator::for_planet(&p);
        for seed in 0..2000 {
            let coord = ChunkCoord::new(12, 34);
            let id = p.chunk_id(coord);
            let items = g.generate(&id, seed, coord);
            assert!(items.len() <= 11);

            for (index, item) in items.iter().enumerate() {
                assert_eq!(item.id, format!("0_0_0_0_12_34-{}", index));
                assert!((1..7).contains(&item.size), "size {}", item.size);
                assert_eq!(item.hp, 10 + 2 * item.size as i32);
                assert!((0..64).contains(&item.offset_x));
                assert!((0..64).contains(&item.offset_y));
                assert_eq!(item.x, (12 * 64 + item.offset_x) as f64);
                assert_eq!(item.y, (34 * 64 + item.offset_y) as f64);
                assert!(item.element().is_some());
                assert!(item.is_alive());
            }
        }
    }

    #[test]
    fn item_count_distribution_matches_bands() {
        let p = make_planet();
        let g = ChunkGenerator::for_planet(&p);
        let coord = ChunkCoord::new(0, 0);
        let id = p.chunk_id(coord);

        let samples = 5000;
        let mut empty = 0;
        let mut single = 0;
        let mut many = 0;
        for seed in 0..samples {
            match g.generate(&id, seed, coord).len() {
                0 => empty += 1,
                1 => single += 1,
                _ => many += 1,
            }
        }

        let frac = |n: i32| n as f64 / samples as f64;
        assert!((frac(empty) - 0.1).abs() < 0.03, "empty {}", frac(empty));
        assert!((frac(single) - 0.8).abs() < 0.04, "single {}", frac(single));
        assert!((frac(many) - 0.1).abs() < 0.03, "many {}", frac(many));
    }

    #[test]
    fn spawn_vehicle_is_parked_at_offset() {
        let p = make_planet();
        let g = ChunkGenerator::for_planet(&p);
        let coord = ChunkCoord::new(500, 500);
        let id = p.chunk_id(coord);

        let v = g.spawn_vehicle(&id, coord, 1);
        assert_eq!(v.id, "0_0_0_0_500_500-v1");
        assert_eq!((v.x, v.y), (32_018.0, 32_018.0));
        assert_eq!(v.hp, VEHICLE_HP);
        assert!(v.is_vehicle());
        match v.kind {
            ItemKind::Vehicle { model, rotation } => {
                assert_eq!(model, "rasa");
                assert_eq!(rotation, -0.9);
            }
            ItemKind::Resource { .. } => panic!("expected a vehicle"),
        }
    }
}
