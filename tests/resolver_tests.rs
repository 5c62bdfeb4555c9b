//! Action, resolver, inventory and physics tests

#[cfg(test)]
mod tests {
    use nomad_world::action::{Action, ActionKind, ActionQueue, ActionTriple};
    use nomad_world::actor::{
        Inventory, JoinDetails, Locomotion, Nomad, Tool, HEAT_JAMMED,
    };
    use nomad_world::cache::ChunkItemCache;
    use nomad_world::chunk::{ChunkItem, ChunkItems, Element, ItemKind};
    use nomad_world::generator::ChunkGenerator;
    use nomad_world::physics::{self, sim_time, MAX_NOMAD_SPEED};
    use nomad_world::planet::Planet;
    use nomad_world::resolver::{resolve, ActionContext, DrillSpark};
    use nomad_world::settings::MountPolicy;
    use nomad_world::terrain::TerrainSource;
    use nomad_world::types::ChunkCoord;
    use serde_json::json;

    struct Flat;

    impl TerrainSource for Flat {
        fn height_at(&self, _x: f64, _y: f64) -> f64 {
            0.0
        }
    }

    /// Everything the resolver borrows, owned in one place.
    struct Fixture {
        planet: Planet,
        generator: ChunkGenerator,
        cache: ChunkItemCache,
        terrain: Flat,
        policy: MountPolicy,
        vehicle_seq: u64,
        sparks: Vec<DrillSpark>,
    }

    impl Fixture {
        fn new() -> Self {
            let planet = Planet::new(1000, 64, 1000);
            Self {
                generator: ChunkGenerator::for_planet(&planet),
                planet,
                cache: ChunkItemCache::new(64),
                terrain: Flat,
                policy: MountPolicy::FirstMatch,
                vehicle_seq: 0,
                sparks: Vec::new(),
            }
        }

        fn apply(&mut self, nomad: &mut Nomad, action: Action, tick: u64) {
            let mut ctx = ActionContext {
                planet: &self.planet,
                generator: &self.generator,
                cache: &mut self.cache,
                terrain: &self.terrain,
                tick,
                mount_policy: self.policy,
                max_inventory_stacks: 24,
                vehicle_seq: &mut self.vehicle_seq,
                sparks: &mut self.sparks,
            };
            resolve(&mut ctx, nomad, &action);
        }

        /// Replace the contents of the centre chunk.
        fn set_center_chunk(&mut self, items: Vec<ChunkItem>) {
            let id = self.planet.chunk_id(ChunkCoord::new(500, 500));
            self.cache.insert(id, ChunkItems::new(items));
        }

        fn center_chunk(&self) -> &ChunkItems {
            let id = self.planet.chunk_id(ChunkCoord::new(500, 500));
            self.cache.peek(&id).expect("centre chunk cached")
        }
    }

    fn nomad() -> Nomad {
        Nomad::new("n1", JoinDetails::default(), 32_000.0, 32_000.0)
    }

    fn crystal(offset: i64, size: u32, hp: i32) -> ChunkItem {
        ChunkItem {
            id: format!("crystal-{}", offset),
            offset_x: offset,
            offset_y: offset,
            x: (32_000 + offset) as f64,
            y: (32_000 + offset) as f64,
            size,
            hp,
            removed: false,
            kind: ItemKind::Resource {
                element: Element::C,
            },
        }
    }

    fn vehicle(fx: &Fixture, offset: i64) -> ChunkItem {
        let coord = ChunkCoord::new(500, 500);
        fx.generator
            .vehicle(format!("ship-{}", offset), coord, (offset, offset), -0.9)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // -----------------------------------------------------------------------
    // Parsing and queue
    // -----------------------------------------------------------------------

    #[test]
    fn parse_known_and_unknown_actions() {
        let drill = Action::parse("drill", &json!({"x": 1.0, "y": 2.0})).unwrap();
        assert_eq!(drill, Some(Action::Drill { x: 1.0, y: 2.0 }));
        assert_eq!(Action::parse("jump", &serde_json::Value::Null).unwrap(), Some(Action::Jump));
        assert_eq!(Action::parse("dance", &serde_json::Value::Null).unwrap(), None);
        assert_eq!(
            Action::parse("strafeLeft", &serde_json::Value::Null).unwrap().map(|a| a.kind()),
            Some(ActionKind::StrafeLeft)
        );
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(Action::parse("turn", &json!({"angle": "left"})).is_err());
        assert_eq!(
            Action::parse("turn", &json!({})).unwrap(),
            Some(Action::Turn { angle: 0.0 })
        );
    }

    #[test]
    fn triple_deserializes_without_details() {
        let triple: ActionTriple = serde_json::from_value(json!(["forward", "n1"])).unwrap();
        assert_eq!(triple.name(), "forward");
        assert_eq!(triple.actor_id(), "n1");
        assert!(triple.details().is_null());
    }

    #[test]
    fn queue_is_fifo_and_batches() {
        let mut q = ActionQueue::new();
        for i in 0..5 {
            q.push(ActionTriple::new("jump", format!("n{}", i)));
        }
        let batch = q.drain_batch(3);
        let ids: Vec<&str> = batch.iter().map(|t| t.actor_id()).collect();
        assert_eq!(ids, ["n0", "n1", "n2"]);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().map(|t| t.actor_id().to_string()), Some("n3".into()));
        assert_eq!(q.drain_batch(10).len(), 1);
        assert!(q.is_empty());
    }

    // -----------------------------------------------------------------------
    // Tools and inventory
    // -----------------------------------------------------------------------

    #[test]
    fn tool_cools_only_after_idle_delay() {
        let mut tool = Tool::default();
        assert!(tool.heat_up(5));
        assert_eq!(tool.heat_units(), 20);

        tool.cool_down(10);
        assert_eq!(tool.heat_units(), 20);
        tool.cool_down(11);
        assert_eq!(tool.heat_units(), 17);

        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json, json!({"overheat": 0.017, "tick": 5}));
    }

    #[test]
    fn inventory_fills_existing_stacks_first() {
        let mut inv = Inventory::default();
        assert_eq!(inv.give(Element::C, 30, 24), 30);
        assert_eq!(inv.give(Element::H, 1, 24), 1);
        assert_eq!(inv.give(Element::C, 5, 24), 5);

        let quantities: Vec<(Element, u32)> =
            inv.stacks().iter().map(|s| (s.element, s.quantity)).collect();
        assert_eq!(
            quantities,
            [(Element::C, 32), (Element::H, 1), (Element::C, 3)]
        );
        assert_eq!(inv.total_of(Element::C), 35);
        assert_eq!(inv.stacks()[1].color, "#4189a0");
    }

    #[test]
    fn inventory_discards_overflow() {
        let mut inv = Inventory::default();
        assert_eq!(inv.give(Element::C, 100, 2), 64);
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.give(Element::H, 5, 2), 0);
        assert_eq!(inv.total_of(Element::H), 0);
    }

    #[test]
    fn inventory_never_exceeds_max_stacks() {
        let mut inv = Inventory::default();
        assert_eq!(inv.give(Element::Na, 32 * 30, 24), 32 * 24);
        assert_eq!(inv.len(), 24);
    }

    // -----------------------------------------------------------------------
    // Drilling
    // -----------------------------------------------------------------------

    #[test]
    fn drill_damages_and_awards_one_unit() {
        let mut fx = Fixture::new();
        fx.set_center_chunk(vec![crystal(10, 3, 16)]);
        let mut n = nomad();

        fx.apply(&mut n, Action::Drill { x: 32_010.0, y: 32_010.0 }, 1);

        assert_eq!(fx.center_chunk().get(0).map(|i| i.hp), Some(15));
        assert_eq!(n.inventory.total_of(Element::C), 1);
        assert_eq!(fx.sparks.len(), 1);
        assert_eq!(fx.sparks[0].awarded, 1);
        assert!(!fx.sparks[0].jammed);
        assert_eq!(fx.sparks[0].color, "#dd7261");
    }

    #[test]
    fn destroyed_item_awards_its_size_and_disappears() {
        let mut fx = Fixture::new();
        fx.set_center_chunk(vec![crystal(10, 5, 1), crystal(40, 2, 14)]);
        let mut n = nomad();

        fx.apply(&mut n, Action::Drill { x: 32_010.5, y: 32_010.0 }, 1);

        assert_eq!(n.inventory.total_of(Element::C), 5);
        let chunk = fx.center_chunk();
        assert_eq!(chunk.len(), 1);
        assert_eq!(chunk.get(0).map(|i| i.id.as_str()), Some("crystal-40"));
    }

    #[test]
    fn drill_misses_out_of_range_items() {
        let mut fx = Fixture::new();
        fx.set_center_chunk(vec![crystal(10, 3, 16)]);
        let mut n = nomad();

        fx.apply(&mut n, Action::Drill { x: 32_012.0, y: 32_010.0 }, 1);

        assert_eq!(fx.center_chunk().get(0).map(|i| i.hp), Some(16));
        assert!(n.inventory.is_empty());
        // The tool still heats up
        assert_eq!(n.tool().map(|t| t.heat_units()), Some(20));
    }

    #[test]
    fn fiftieth_drill_jams_the_tool() {
        let mut fx = Fixture::new();
        fx.set_center_chunk(vec![crystal(10, 6, 1000)]);
        let mut n = nomad();
        let target = Action::Drill { x: 32_010.0, y: 32_010.0 };

        for tick in 1..50 {
            fx.apply(&mut n, target, tick);
        }
        assert_eq!(n.inventory.total_of(Element::C), 49);
        assert!(!n.tool().is_some_and(|t| t.is_jammed()));

        fx.apply(&mut n, target, 50);
        let tool = n.tool().expect("default tool");
        assert!(tool.is_jammed());
        assert_eq!(tool.heat_units(), HEAT_JAMMED);
        assert!(fx.sparks[49].jammed);
        assert_eq!(fx.sparks[49].awarded, 0);

        fx.apply(&mut n, target, 51);
        assert_eq!(n.inventory.total_of(Element::C), 49);
        assert_eq!(fx.center_chunk().get(0).map(|i| i.hp), Some(1000 - 49));
    }

    #[test]
    fn drill_is_ignored_while_riding() {
        let mut fx = Fixture::new();
        fx.set_center_chunk(vec![crystal(10, 3, 16)]);
        let mut n = nomad();
        n.locomotion = Locomotion::Mounted { ship: "rasa".into() };

        fx.apply(&mut n, Action::Drill { x: 32_010.0, y: 32_010.0 }, 1);

        assert!(fx.sparks.is_empty());
        assert_eq!(fx.center_chunk().get(0).map(|i| i.hp), Some(16));
    }

    // -----------------------------------------------------------------------
    // Vehicles
    // -----------------------------------------------------------------------

    #[test]
    fn mount_and_dismount_round_trip() {
        let mut fx = Fixture::new();
        let ship = vehicle(&fx, 18);
        fx.set_center_chunk(vec![ship]);
        let mut n = nomad();
        n.x = 32_010.0;
        n.y = 32_010.0;

        fx.apply(&mut n, Action::Mount, 1);
        assert_eq!(fx.center_chunk().vehicle_count(), 0);
        assert_eq!(n.locomotion, Locomotion::Mounted { ship: "rasa".into() });
        assert_eq!((n.x, n.y), (32_018.0, 32_018.0));
        assert_eq!(n.rotation, -0.9);

        n.x = 32_020.4;
        n.y = 32_030.6;
        fx.apply(&mut n, Action::Dismount, 2);
        assert_eq!(n.locomotion, Locomotion::Airborne);
        assert_eq!((n.vel.x, n.vel.z), (6.0, 8.0));

        let chunk = fx.center_chunk();
        assert_eq!(chunk.vehicle_count(), 1);
        let parked = chunk.get(0).expect("parked vehicle");
        assert_eq!(parked.id, "0_0_0_0_500_500-v1");
        assert_eq!((parked.x, parked.y), (32_020.0, 32_031.0));
        assert_eq!((parked.offset_x, parked.offset_y), (20, 31));
    }

    #[test]
    fn mount_requires_a_vehicle_in_reach() {
        let mut fx = Fixture::new();
        let ship = vehicle(&fx, 18);
        fx.set_center_chunk(vec![ship]);
        let mut n = nomad();

        fx.apply(&mut n, Action::Mount, 1);
        assert_eq!(n.locomotion, Locomotion::Grounded);
        assert_eq!(fx.center_chunk().vehicle_count(), 1);
    }

    #[test]
    fn mount_policy_selects_vehicle() {
        for (policy, expected_x) in [
            (MountPolicy::FirstMatch, 32_020.0),
            (MountPolicy::Nearest, 32_012.0),
        ] {
            let mut fx = Fixture::new();
            fx.policy = policy;
            let far = vehicle(&fx, 20);
            let near = vehicle(&fx, 12);
            fx.set_center_chunk(vec![far, near]);
            let mut n = nomad();
            n.x = 32_010.0;
            n.y = 32_010.0;

            fx.apply(&mut n, Action::Mount, 1);
            assert_eq!(n.x, expected_x, "{:?}", policy);
            assert_eq!(fx.center_chunk().vehicle_count(), 1);
        }
    }

    #[test]
    fn launch_and_land_toggle_flight() {
        let mut fx = Fixture::new();
        let mut n = nomad();

        fx.apply(&mut n, Action::Launch, 1);
        assert_eq!(n.locomotion, Locomotion::Grounded);

        n.locomotion = Locomotion::Mounted { ship: "rasa".into() };
        fx.apply(&mut n, Action::Launch, 1);
        assert_eq!(n.locomotion, Locomotion::Flying { ship: "rasa".into() });
        fx.apply(&mut n, Action::Land, 2);
        assert_eq!(n.locomotion, Locomotion::Mounted { ship: "rasa".into() });
    }

    // -----------------------------------------------------------------------
    // Motion
    // -----------------------------------------------------------------------

    #[test]
    fn turn_is_ignored_when_mounted_on_the_ground() {
        let mut fx = Fixture::new();
        let mut n = nomad();

        fx.apply(&mut n, Action::Turn { angle: 1.0 }, 1);
        assert_eq!(n.rotation, 1.0);

        n.locomotion = Locomotion::Mounted { ship: "rasa".into() };
        fx.apply(&mut n, Action::Turn { angle: 2.0 }, 2);
        assert_eq!(n.rotation, 1.0);

        n.locomotion = Locomotion::Flying { ship: "rasa".into() };
        fx.apply(&mut n, Action::Turn { angle: 2.0 }, 3);
        assert_eq!(n.rotation, 2.0);
    }

    #[test]
    fn heading_speeds_depend_on_locomotion() {
        let mut fx = Fixture::new();
        let mut n = nomad();

        fx.apply(&mut n, Action::Forward, 1);
        assert_eq!((n.vel.x, n.vel.y), (0.0, -7.0));
        fx.apply(&mut n, Action::Back, 1);
        assert_eq!((n.vel.x, n.vel.y), (0.0, 4.0));

        n.locomotion = Locomotion::Flying { ship: "rasa".into() };
        fx.apply(&mut n, Action::Forward, 2);
        assert_eq!(n.vel.y, -12.0);

        n.locomotion = Locomotion::Mounted { ship: "rasa".into() };
        fx.apply(&mut n, Action::Forward, 3);
        assert_eq!((n.vel.x, n.vel.y), (0.0, 0.0));
    }

    #[test]
    fn strafing_is_perpendicular_to_heading() {
        let mut fx = Fixture::new();
        let mut n = nomad();

        fx.apply(&mut n, Action::StrafeRight, 1);
        assert!(approx(n.vel.x, 4.0) && approx(n.vel.y, 0.0), "{}", n.vel);
        fx.apply(&mut n, Action::StrafeLeft, 1);
        assert!(approx(n.vel.x, -4.0) && approx(n.vel.y, 0.0), "{}", n.vel);
    }

    #[test]
    fn move_nudges_position_and_velocity() {
        let mut fx = Fixture::new();
        let mut n = nomad();

        fx.apply(&mut n, Action::Move { dx: 3.0, dy: -2.0 }, 1);
        assert_eq!((n.x, n.y), (32_003.0, 31_998.0));
        assert_eq!((n.vel.x, n.vel.y), (3.0, -2.0));
    }

    #[test]
    fn jump_only_on_foot() {
        let mut fx = Fixture::new();
        let mut n = nomad();
        fx.apply(&mut n, Action::Jump, 1);
        assert_eq!(n.vel.z, 5.0);
        assert_eq!(n.locomotion, Locomotion::Airborne);

        let mut rider = nomad();
        rider.locomotion = Locomotion::Mounted { ship: "rasa".into() };
        fx.apply(&mut rider, Action::Jump, 1);
        assert_eq!(rider.vel.z, 0.0);
    }

    // -----------------------------------------------------------------------
    // Physics
    // -----------------------------------------------------------------------

    #[test]
    fn ground_step_moves_then_applies_friction() {
        let planet = Planet::new(1000, 64, 1000);
        let mut n = nomad();
        n.vel.y = -7.0;

        physics::integrate(&planet, &mut n, 12.0);
        assert_eq!(n.y, 32_000.0 + (-7.0 * sim_time(12.0)));
        assert_eq!(n.vel.y, -7.0 * 0.96);
        assert_eq!(n.locomotion, Locomotion::Grounded);
    }

    #[test]
    fn gravity_pulls_down_twice_as_fast() {
        let planet = Planet::new(1000, 64, 1000);
        let mut n = nomad();
        n.z = 10.0;
        n.locomotion = Locomotion::Airborne;
        n.vel.x = 10.0;

        physics::integrate(&planet, &mut n, 12.0);
        let t = sim_time(12.0);
        assert!(approx(n.vel.z, -4.0 * t));
        assert!(approx(n.z, 10.0 - 4.0 * t * t * 2.0));
        assert!(approx(n.vel.x, 10.0 * 0.992));
        assert_eq!(n.locomotion, Locomotion::Airborne);
    }

    #[test]
    fn landing_snaps_to_ground() {
        let planet = Planet::new(1000, 64, 1000);
        let mut n = nomad();
        n.z = 0.001;
        n.vel.z = -5.0;
        n.locomotion = Locomotion::Airborne;

        physics::integrate(&planet, &mut n, 12.0);
        assert_eq!((n.z, n.vel.z), (0.0, 0.0));
        assert_eq!(n.locomotion, Locomotion::Grounded);
    }

    #[test]
    fn speed_is_clamped_and_small_velocity_snaps() {
        let planet = Planet::new(1000, 64, 1000);
        let mut n = nomad();
        n.vel.x = 100.0;
        physics::integrate(&planet, &mut n, 12.0);
        assert!(approx(n.vel.horizontal_length(), MAX_NOMAD_SPEED));

        let mut drifting = nomad();
        drifting.vel.y = 0.001;
        physics::integrate(&planet, &mut drifting, 12.0);
        assert_eq!(drifting.vel.y, 0.0);

        let mut rider = nomad();
        rider.locomotion = Locomotion::Mounted { ship: "rasa".into() };
        rider.vel.x = 100.0;
        physics::integrate(&planet, &mut rider, 12.0);
        assert!(approx(rider.vel.x, 96.0));
    }

    #[test]
    fn flight_rises_towards_cruise_height() {
        let planet = Planet::new(1000, 64, 1000);
        let mut n = nomad();
        n.locomotion = Locomotion::Flying { ship: "rasa".into() };
        n.vel.z = 3.0;

        physics::integrate(&planet, &mut n, 12.0);
        assert!(approx(n.z, 0.16));
        assert_eq!(n.vel.z, 0.0);
        assert!(n.locomotion.is_flying());
    }

    #[test]
    fn rounded_position_stays_on_the_planet() {
        let planet = Planet::new(1000, 64, 1000);
        let mut n = nomad();
        n.x = 63_999.6;
        n.y = 12.4;

        let r = n.rounded(&planet);
        assert_eq!((r.x, r.y), (0.0, 12.0));
        assert_eq!(planet.chunk_coordinates_at(r.x, r.y), ChunkCoord::new(0, 0));
        assert_eq!(n.x, 63_999.6);
    }

    #[test]
    fn position_wraps_across_the_seam() {
        let planet = Planet::new(1000, 64, 1000);
        let mut n = nomad();
        n.x = 63_999.9;
        n.vel.x = 10.0;

        physics::integrate(&planet, &mut n, 12.0);
        assert!(approx(n.x, 0.5), "x = {}", n.x);
    }
}
