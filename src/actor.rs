//! Nomad state: position, motion, inventory, tools and vehicles.

use crate::chunk::Element;
use crate::planet::Planet;
use crate::types::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Key of the tool every nomad starts with.
pub const DEFAULT_TOOL: char = 'A';
pub const DEFAULT_SHIP_KEY: &str = "rasa";
pub const DEFAULT_SHIP_NAME: &str = "Rasa N24";

// ---------------------------------------------------------------------------
// Locomotion
// ---------------------------------------------------------------------------

/// How a nomad is currently getting around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Locomotion {
    /// On foot, standing on the ground.
    Grounded,
    /// On foot, in the air (jumping or thrown off a vehicle).
    Airborne,
    /// Riding a vehicle that is on the ground.
    Mounted { ship: String },
    /// Riding a vehicle in flight.
    Flying { ship: String },
}

impl Locomotion {
    pub fn is_on_foot(&self) -> bool {
        matches!(self, Locomotion::Grounded | Locomotion::Airborne)
    }

    /// Riding a vehicle, in the air or not.
    pub fn is_riding(&self) -> bool {
        !self.is_on_foot()
    }

    pub fn is_flying(&self) -> bool {
        matches!(self, Locomotion::Flying { .. })
    }

    pub fn ship(&self) -> Option<&str> {
        match self {
            Locomotion::Mounted { ship } | Locomotion::Flying { ship } => Some(ship),
            Locomotion::Grounded | Locomotion::Airborne => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Heat is tracked in thousandths so that repeated steps sum exactly.
pub const HEAT_SCALE: u32 = 1000;
pub const HEAT_PER_USE: u32 = 20;
/// At or above this the tool jams.
pub const HEAT_JAM_THRESHOLD: u32 = 1000;
/// Heat a jammed tool is pinned to.
pub const HEAT_JAMMED: u32 = 1100;
pub const HEAT_COOLDOWN_PER_TICK: u32 = 3;
/// A tool cools once it has been idle for more than this many ticks.
pub const COOLDOWN_DELAY_TICKS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(
        rename = "overheat",
        serialize_with = "heat_as_fraction",
        deserialize_with = "heat_from_fraction"
    )]
    heat: u32,
    /// Tick of the last use.
    pub tick: u64,
}

fn heat_as_fraction<S: Serializer>(heat: &u32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(*heat as f64 / HEAT_SCALE as f64)
}

fn heat_from_fraction<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let fraction = f64::deserialize(d)?;
    Ok((fraction * HEAT_SCALE as f64).round().max(0.0) as u32)
}

impl Tool {
    /// Overheat level in [0, 1.1].
    pub fn overheat(&self) -> f64 {
        self.heat as f64 / HEAT_SCALE as f64
    }

    pub fn heat_units(&self) -> u32 {
        self.heat
    }

    pub fn is_jammed(&self) -> bool {
        self.heat >= HEAT_JAM_THRESHOLD
    }

    /// Register one use at `tick`. Returns `false` if the tool jammed and
    /// the use produced nothing.
    pub fn heat_up(&mut self, tick: u64) -> bool {
        self.tick = tick;
        self.heat += HEAT_PER_USE;
        if self.heat >= HEAT_JAM_THRESHOLD {
            self.heat = HEAT_JAMMED;
            return false;
        }
        true
    }

    /// Cool by one step when idle long enough. `elapsed` is ticks since last
    /// use.
    pub fn cool_down(&mut self, elapsed: u64) {
        if elapsed > COOLDOWN_DELAY_TICKS {
            self.heat = self.heat.saturating_sub(HEAT_COOLDOWN_PER_TICK);
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStack {
    pub element: Element,
    pub quantity: u32,
    pub max: u32,
    pub name: String,
    pub color: String,
}

impl InventoryStack {
    pub fn empty(element: Element) -> Self {
        let info = element.info();
        Self {
            element,
            quantity: 0,
            max: info.max,
            name: info.name.to_string(),
            color: info.color.to_string(),
        }
    }

    pub fn space(&self) -> u32 {
        self.max.saturating_sub(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    stacks: Vec<InventoryStack>,
}

impl Inventory {
    pub fn stacks(&self) -> &[InventoryStack] {
        &self.stacks
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn total_of(&self, element: Element) -> u32 {
        self.stacks
            .iter()
            .filter(|s| s.element == element)
            .map(|s| s.quantity)
            .sum()
    }

    /// Add `quantity` of `element`, filling existing stacks first and opening
    /// new ones while fewer than `max_stacks` exist. Whatever does not fit is
    /// dropped. Returns the amount actually stored.
    pub fn give(&mut self, element: Element, quantity: u32, max_stacks: usize) -> u32 {
        let mut left = quantity;

        for stack in self.stacks.iter_mut().filter(|s| s.element == element) {
            if left == 0 {
                break;
            }
            let give = left.min(stack.space());
            stack.quantity += give;
            left -= give;
        }

        while left > 0 && self.stacks.len() < max_stacks {
            let mut stack = InventoryStack::empty(element);
            if stack.max == 0 {
                break;
            }
            let give = left.min(stack.max);
            stack.quantity = give;
            left -= give;
            self.stacks.push(stack);
        }

        quantity - left
    }
}

// ---------------------------------------------------------------------------
// Nomad
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInfo {
    pub name: String,
}

/// Optional details supplied on join.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinDetails {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nomad {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vel: Vec3,
    /// Heading in radians. 0 faces up (-y), positive turns clockwise.
    pub rotation: f64,
    pub inventory: Inventory,
    pub equipped_tool: char,
    pub tools: BTreeMap<char, Tool>,
    pub locomotion: Locomotion,
    pub main_ship: String,
    pub ships: BTreeMap<String, ShipInfo>,
}

impl Nomad {
    pub fn new(id: impl Into<String>, details: JoinDetails, x: f64, y: f64) -> Self {
        let id = id.into();
        let mut tools = BTreeMap::new();
        tools.insert(DEFAULT_TOOL, Tool::default());
        let mut ships = BTreeMap::new();
        ships.insert(
            DEFAULT_SHIP_KEY.to_string(),
            ShipInfo {
                name: DEFAULT_SHIP_NAME.to_string(),
            },
        );

        Self {
            name: details.name.unwrap_or_else(|| id.clone()),
            id,
            x,
            y,
            z: 0.0,
            vel: Vec3::zero(),
            rotation: 0.0,
            inventory: Inventory::default(),
            equipped_tool: DEFAULT_TOOL,
            tools,
            locomotion: Locomotion::Grounded,
            main_ship: DEFAULT_SHIP_KEY.to_string(),
            ships,
        }
    }

    pub fn tool(&self) -> Option<&Tool> {
        self.tools.get(&self.equipped_tool)
    }

    pub fn tool_mut(&mut self) -> Option<&mut Tool> {
        self.tools.get_mut(&self.equipped_tool)
    }

    /// Copy with x and y rounded to whole units, as sent to renderers.
    /// Rounding can land on the planet size, so the result is wrapped again.
    pub fn rounded(&self, planet: &Planet) -> Self {
        let mut copy = self.clone();
        (copy.x, copy.y) = planet.wrap_coordinates(copy.x.round(), copy.y.round());
        copy
    }
}
