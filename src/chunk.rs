//! Chunk contents: harvestable resources and parked vehicles.

use crate::types::distance;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Element registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Element {
    C,
    H,
    Na,
}

/// Inventory metadata for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementInfo {
    pub name: &'static str,
    /// Capacity of one inventory stack.
    pub max: u32,
    pub color: &'static str,
}

impl Element {
    /// Every element the generator may place, in draw order.
    pub const ALL: [Element; 3] = [Element::C, Element::H, Element::Na];

    pub fn info(&self) -> ElementInfo {
        match self {
            Element::C => ElementInfo {
                name: "Carbon",
                max: 32,
                color: "#9a3846",
            },
            Element::H => ElementInfo {
                name: "Hydrogen",
                max: 32,
                color: "#4189a0",
            },
            Element::Na => ElementInfo {
                name: "Sodium",
                max: 32,
                color: "#f1d56c",
            },
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Element::C => "C",
            Element::H => "H",
            Element::Na => "Na",
        };
        f.write_str(symbol)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// A crystal deposit that yields `element` when drilled.
    Resource { element: Element },
    /// A parked vehicle that a nomad can mount.
    Vehicle { model: String, rotation: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkItem {
    pub id: String,
    /// Position relative to the chunk origin.
    pub offset_x: i64,
    pub offset_y: i64,
    /// Absolute planet position (chunk origin + offset).
    pub x: f64,
    pub y: f64,
    pub size: u32,
    pub hp: i32,
    pub removed: bool,
    pub kind: ItemKind,
}

impl ChunkItem {
    pub fn is_vehicle(&self) -> bool {
        matches!(self.kind, ItemKind::Vehicle { .. })
    }

    pub fn element(&self) -> Option<Element> {
        match self.kind {
            ItemKind::Resource { element } => Some(element),
            ItemKind::Vehicle { .. } => None,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.removed && self.hp > 0
    }
}

// ---------------------------------------------------------------------------
// Item list
// ---------------------------------------------------------------------------

/// The live item list of one chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkItems {
    items: Vec<ChunkItem>,
}

impl ChunkItems {
    pub fn new(items: Vec<ChunkItem>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: ChunkItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ChunkItem] {
        &self.items
    }

    pub fn vehicle_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_vehicle()).count()
    }

    /// Indices of live items within `range` of `(x, y)`, in list order.
    pub fn indices_in_range(&self, x: f64, y: f64, range: f64) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_alive() && distance(item.x, item.y, x, y) <= range)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ChunkItem> {
        self.items.get_mut(index)
    }

    pub fn get(&self, index: usize) -> Option<&ChunkItem> {
        self.items.get(index)
    }

    /// Drop every removed or destroyed item. Returns how many were dropped.
    pub fn compact(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(ChunkItem::is_alive);
        before - self.items.len()
    }
}
