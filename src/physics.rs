//! Per-tick physics integrator.
//!
//! Simple ballistic model: gravity while above ground, a lerp towards cruise
//! height while flying, exponential friction and a speed clamp.

use crate::actor::{Locomotion, Nomad};
use crate::planet::Planet;
use crate::types::lerp;

/// Converts tick milliseconds into simulation time.
pub const TIME_SCALE: f64 = 5.0;
pub const GRAVITY: f64 = 4.0;
/// Falling is this many times faster than rising.
pub const FALL_MULTIPLIER: f64 = 2.0;
pub const FLIGHT_HEIGHT: f64 = 16.0;
pub const FLIGHT_LERP: f64 = 0.01;
pub const GROUND_FRICTION: f64 = 0.96;
pub const AIR_FRICTION: f64 = 0.992;
pub const MAX_NOMAD_SPEED: f64 = 18.0;
pub const MAX_VEHICLE_SPEED: f64 = 200.0;
/// Velocity components below this snap to zero.
pub const REST_EPSILON: f64 = 0.001;

/// Simulation time covered by a tick of `time_ms` milliseconds.
pub fn sim_time(time_ms: f64) -> f64 {
    (time_ms / 1000.0) * TIME_SCALE
}

pub fn max_speed(locomotion: &Locomotion) -> f64 {
    if locomotion.is_riding() {
        MAX_VEHICLE_SPEED
    } else {
        MAX_NOMAD_SPEED
    }
}

/// Advance one nomad by one tick of `time_ms`.
pub fn integrate(planet: &Planet, nomad: &mut Nomad, time_ms: f64) {
    let time = sim_time(time_ms);
    let flying = nomad.locomotion.is_flying();

    // Vertical
    if flying {
        nomad.z = lerp(FLIGHT_LERP, nomad.z, FLIGHT_HEIGHT);
        nomad.vel.z = 0.0;
    } else if nomad.z > 0.0 {
        nomad.vel.z -= GRAVITY * time;
    }

    let fall = if nomad.vel.z < 0.0 { FALL_MULTIPLIER } else { 1.0 };
    nomad.z += nomad.vel.z * time * fall;
    if !flying && nomad.z < 0.0 {
        nomad.z = 0.0;
        nomad.vel.z = 0.0;
    }

    // Horizontal
    let (x, y) = planet.wrap_coordinates(
        nomad.x + nomad.vel.x * time,
        nomad.y + nomad.vel.y * time,
    );
    nomad.x = x;
    nomad.y = y;

    let friction = if nomad.z > 0.0 {
        AIR_FRICTION
    } else {
        GROUND_FRICTION
    };
    nomad.vel.x *= friction;
    nomad.vel.y *= friction;

    let max = max_speed(&nomad.locomotion);
    let speed = nomad.vel.horizontal_length();
    if speed > max {
        let scale = max / speed;
        nomad.vel.x *= scale;
        nomad.vel.y *= scale;
    }

    if nomad.vel.x.abs() < REST_EPSILON {
        nomad.vel.x = 0.0;
    }
    if nomad.vel.y.abs() < REST_EPSILON {
        nomad.vel.y = 0.0;
    }

    if nomad.locomotion.is_on_foot() {
        nomad.locomotion = if nomad.z > 0.0 {
            Locomotion::Airborne
        } else {
            Locomotion::Grounded
        };
    }
}
