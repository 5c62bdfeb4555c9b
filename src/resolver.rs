//! Action resolver: applies one [`Action`] to a nomad and the chunk cache.
//!
//! | Action            | Allowed when          | Effect                                  |
//! |-------------------|-----------------------|-----------------------------------------|
//! | `move`            | always                | velocity and position += delta          |
//! | `jump`            | on foot               | vertical launch                         |
//! | `turn`            | on foot or flying     | set heading                             |
//! | `forward`/`back`  | always                | velocity from heading, speed per state  |
//! | `strafe*`         | always                | velocity from heading ± 90°             |
//! | `drill`           | on foot               | damage items at target, award elements  |
//! | `mount`           | on foot, vehicle near | ride the vehicle                        |
//! | `dismount`        | riding                | park vehicle, hop off                   |
//! | `land`/`launch`   | flying / mounted      | toggle flight                           |

use crate::action::Action;
use crate::actor::{Locomotion, Nomad};
use crate::cache::ChunkItemCache;
use crate::chunk::{ChunkItem, ItemKind};
use crate::generator::ChunkGenerator;
use crate::planet::Planet;
use crate::settings::MountPolicy;
use crate::terrain::TerrainSource;
use crate::types::{distance, polar_to_xy};
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

pub const JUMP_VELOCITY: f64 = 5.0;
pub const FOOT_FORWARD_SPEED: f64 = 7.0;
pub const FOOT_BACK_SPEED: f64 = -4.0;
pub const FLYING_FORWARD_SPEED: f64 = 12.0;
pub const FLYING_BACK_SPEED: f64 = 0.0;
pub const MOUNTED_SPEED: f64 = 0.0;
pub const STRAFE_SPEED: f64 = 4.0;
/// Drill reach around the target point.
pub const DRILL_RANGE: f64 = 1.0;
/// How far a nomad can reach to mount a vehicle.
pub const MOUNT_RANGE: f64 = 16.0;
/// Velocity kick when hopping off a vehicle.
pub const DISMOUNT_KICK: (f64, f64) = (6.0, 8.0);

/// Cosmetic result of a drill action, handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSpark {
    pub nomad_id: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub jammed: bool,
    /// Units of elements stored in the inventory by this drill.
    pub awarded: u32,
}

/// Everything an action may touch besides the acting nomad.
pub struct ActionContext<'a> {
    pub planet: &'a Planet,
    pub generator: &'a ChunkGenerator,
    pub cache: &'a mut ChunkItemCache,
    pub terrain: &'a dyn TerrainSource,
    pub tick: u64,
    pub mount_policy: MountPolicy,
    pub max_inventory_stacks: usize,
    /// Counter for ids of vehicles placed after generation.
    pub vehicle_seq: &'a mut u64,
    pub sparks: &'a mut Vec<DrillSpark>,
}

/// Apply `action` to `nomad`. Actions whose precondition fails are no-ops.
pub fn resolve(ctx: &mut ActionContext<'_>, nomad: &mut Nomad, action: &Action) {
    match *action {
        Action::Move { dx, dy } => apply_move(ctx.planet, nomad, dx, dy),
        Action::Jump => jump(nomad),
        Action::Turn { angle } => turn(nomad, angle),
        Action::Forward => push_along_heading(nomad, heading_speed(nomad, true), 0.0),
        Action::Back => push_along_heading(nomad, heading_speed(nomad, false), 0.0),
        Action::StrafeLeft => push_along_heading(nomad, STRAFE_SPEED, -FRAC_PI_2),
        Action::StrafeRight => push_along_heading(nomad, STRAFE_SPEED, FRAC_PI_2),
        Action::Drill { x, y } => drill(ctx, nomad, x, y),
        Action::Mount => mount(ctx, nomad),
        Action::Dismount => dismount(ctx, nomad),
        Action::Land => land(nomad),
        Action::Launch => launch(nomad),
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

fn apply_move(planet: &Planet, nomad: &mut Nomad, dx: f64, dy: f64) {
    nomad.vel.x += dx;
    nomad.vel.y += dy;
    let (x, y) = planet.wrap_coordinates(nomad.x + dx, nomad.y + dy);
    nomad.x = x;
    nomad.y = y;
}

fn jump(nomad: &mut Nomad) {
    if nomad.locomotion.is_riding() {
        return;
    }
    nomad.vel.z = JUMP_VELOCITY;
    nomad.locomotion = Locomotion::Airborne;
}

fn turn(nomad: &mut Nomad, angle: f64) {
    if let Locomotion::Mounted { .. } = nomad.locomotion {
        return;
    }
    nomad.rotation = angle;
}

fn heading_speed(nomad: &Nomad, forward: bool) -> f64 {
    match (&nomad.locomotion, forward) {
        (Locomotion::Grounded | Locomotion::Airborne, true) => FOOT_FORWARD_SPEED,
        (Locomotion::Grounded | Locomotion::Airborne, false) => FOOT_BACK_SPEED,
        (Locomotion::Mounted { .. }, _) => MOUNTED_SPEED,
        (Locomotion::Flying { .. }, true) => FLYING_FORWARD_SPEED,
        (Locomotion::Flying { .. }, false) => FLYING_BACK_SPEED,
    }
}

/// Replace horizontal velocity with `speed` along heading + `turn`.
fn push_along_heading(nomad: &mut Nomad, speed: f64, turn: f64) {
    let (vx, vy) = polar_to_xy(nomad.rotation + turn, speed);
    nomad.vel.x = vx;
    nomad.vel.y = vy;
}

// ---------------------------------------------------------------------------
// Drilling
// ---------------------------------------------------------------------------

fn drill(ctx: &mut ActionContext<'_>, nomad: &mut Nomad, x: f64, y: f64) {
    if nomad.locomotion.is_riding() {
        return;
    }
    let tick = ctx.tick;
    let Some(tool) = nomad.tool_mut() else {
        return;
    };
    let usable = tool.heat_up(tick);

    let mut spark = DrillSpark {
        nomad_id: nomad.id.clone(),
        x,
        y,
        color: ctx.terrain.spark_color(x, y).to_string(),
        jammed: !usable,
        awarded: 0,
    };

    if usable {
        let coord = ctx.planet.chunk_coordinates_at(x, y);
        let items = ctx.cache.get_or_create(ctx.planet, ctx.generator, coord);

        let mut rewards = Vec::new();
        for index in items.indices_in_range(x, y, DRILL_RANGE) {
            let Some(item) = items.get_mut(index) else {
                continue;
            };
            item.hp -= 1;
            let destroyed = item.hp <= 0;
            if destroyed {
                item.removed = true;
            }
            if let Some(element) = item.element() {
                rewards.push((element, if destroyed { item.size } else { 1 }));
            }
        }
        items.compact();

        for (element, quantity) in rewards {
            spark.awarded += nomad
                .inventory
                .give(element, quantity, ctx.max_inventory_stacks);
        }
    }

    ctx.sparks.push(spark);
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

fn mount(ctx: &mut ActionContext<'_>, nomad: &mut Nomad) {
    if nomad.locomotion.is_riding() {
        return;
    }
    let coord = ctx.planet.chunk_coordinates_at(nomad.x, nomad.y);
    let items = ctx.cache.get_or_create(ctx.planet, ctx.generator, coord);

    let candidates: Vec<usize> = items
        .indices_in_range(nomad.x, nomad.y, MOUNT_RANGE)
        .into_iter()
        .filter(|&i| items.get(i).is_some_and(ChunkItem::is_vehicle))
        .collect();

    let chosen = match ctx.mount_policy {
        MountPolicy::FirstMatch => candidates.first().copied(),
        MountPolicy::Nearest => candidates.iter().copied().min_by(|&a, &b| {
            let da = items.get(a).map_or(f64::MAX, |v| distance(v.x, v.y, nomad.x, nomad.y));
            let db = items.get(b).map_or(f64::MAX, |v| distance(v.x, v.y, nomad.x, nomad.y));
            da.total_cmp(&db)
        }),
    };
    let Some(vehicle) = chosen.and_then(|i| items.get_mut(i)) else {
        return;
    };

    vehicle.removed = true;
    nomad.x = vehicle.x;
    nomad.y = vehicle.y;
    if let ItemKind::Vehicle { rotation, .. } = vehicle.kind {
        nomad.rotation = rotation;
    }
    debug!("Nomad {} mounted vehicle {}", nomad.id, vehicle.id);
    items.compact();

    nomad.locomotion = Locomotion::Mounted {
        ship: nomad.main_ship.clone(),
    };
}

fn dismount(ctx: &mut ActionContext<'_>, nomad: &mut Nomad) {
    if nomad.locomotion.is_on_foot() {
        return;
    }
    let coord = ctx.planet.chunk_coordinates_at(nomad.x, nomad.y);
    let (origin_x, origin_y) = ctx.planet.chunk_origin(coord);
    let offset = (
        nomad.x.round() as i64 - origin_x,
        nomad.y.round() as i64 - origin_y,
    );

    let chunk_id = ctx.planet.chunk_id(coord);
    *ctx.vehicle_seq += 1;
    let vehicle = ctx.generator.vehicle(
        ChunkGenerator::vehicle_id(&chunk_id, *ctx.vehicle_seq),
        coord,
        offset,
        nomad.rotation,
    );
    debug!("Nomad {} parked vehicle {}", nomad.id, vehicle.id);
    ctx.cache
        .get_or_create(ctx.planet, ctx.generator, coord)
        .push(vehicle);

    nomad.locomotion = Locomotion::Airborne;
    nomad.vel.x = DISMOUNT_KICK.0;
    nomad.vel.z = DISMOUNT_KICK.1;
}

fn land(nomad: &mut Nomad) {
    if let Locomotion::Flying { ship } = &nomad.locomotion {
        nomad.locomotion = Locomotion::Mounted { ship: ship.clone() };
    }
}

fn launch(nomad: &mut Nomad) {
    if let Locomotion::Mounted { ship } = &nomad.locomotion {
        nomad.locomotion = Locomotion::Flying { ship: ship.clone() };
    }
}
