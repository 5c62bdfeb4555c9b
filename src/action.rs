//! Actions and the FIFO action queue.
//!
//! Actions arrive as `(name, actor id, details)` triples, e.g.
//! `["drill", "nomad-1", {"x": 32010, "y": 31990}]`, and are parsed into the
//! typed [`Action`] enum before they reach the resolver.

use crate::error::{Result, SimError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

/// An action as enqueued by input code: name, actor id, detail payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTriple(
    pub String,
    pub String,
    #[serde(default)] pub serde_json::Value,
);

impl ActionTriple {
    pub fn new(name: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self(name.into(), actor_id.into(), serde_json::Value::Null)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.2 = details;
        self
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn actor_id(&self) -> &str {
        &self.1
    }

    pub fn details(&self) -> &serde_json::Value {
        &self.2
    }
}

// ---------------------------------------------------------------------------
// Detail payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct XyDetails {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct TurnDetails {
    #[serde(default)]
    angle: f64,
}

fn parse_details<T: DeserializeOwned + Default>(action: &str, details: &serde_json::Value) -> Result<T> {
    if details.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(details.clone()).map_err(|source| SimError::InvalidPayload {
        action: action.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Typed actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move,
    Jump,
    Turn,
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Drill,
    Mount,
    Dismount,
    Land,
    Launch,
}

impl ActionKind {
    /// Kind for a wire name; `None` for names the simulator does not know.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "move" => ActionKind::Move,
            "jump" => ActionKind::Jump,
            "turn" => ActionKind::Turn,
            "forward" => ActionKind::Forward,
            "back" => ActionKind::Back,
            "strafeLeft" => ActionKind::StrafeLeft,
            "strafeRight" => ActionKind::StrafeRight,
            "drill" => ActionKind::Drill,
            "mount" => ActionKind::Mount,
            "dismount" => ActionKind::Dismount,
            "land" => ActionKind::Land,
            "launch" => ActionKind::Launch,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Cardinal nudge: adds to both velocity and position.
    Move { dx: f64, dy: f64 },
    Jump,
    Turn { angle: f64 },
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    /// Drill at a planet position.
    Drill { x: f64, y: f64 },
    Mount,
    Dismount,
    Land,
    Launch,
}

impl Action {
    /// Parse a wire name and payload. `Ok(None)` for unknown names.
    pub fn parse(name: &str, details: &serde_json::Value) -> Result<Option<Action>> {
        let Some(kind) = ActionKind::from_name(name) else {
            return Ok(None);
        };

        let action = match kind {
            ActionKind::Move => {
                let d: XyDetails = parse_details(name, details)?;
                Action::Move { dx: d.x, dy: d.y }
            }
            ActionKind::Turn => {
                let d: TurnDetails = parse_details(name, details)?;
                Action::Turn { angle: d.angle }
            }
            ActionKind::Drill => {
                let d: XyDetails = parse_details(name, details)?;
                Action::Drill { x: d.x, y: d.y }
            }
            ActionKind::Jump => Action::Jump,
            ActionKind::Forward => Action::Forward,
            ActionKind::Back => Action::Back,
            ActionKind::StrafeLeft => Action::StrafeLeft,
            ActionKind::StrafeRight => Action::StrafeRight,
            ActionKind::Mount => Action::Mount,
            ActionKind::Dismount => Action::Dismount,
            ActionKind::Land => Action::Land,
            ActionKind::Launch => Action::Launch,
        };
        Ok(Some(action))
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Jump => ActionKind::Jump,
            Action::Turn { .. } => ActionKind::Turn,
            Action::Forward => ActionKind::Forward,
            Action::Back => ActionKind::Back,
            Action::StrafeLeft => ActionKind::StrafeLeft,
            Action::StrafeRight => ActionKind::StrafeRight,
            Action::Drill { .. } => ActionKind::Drill,
            Action::Mount => ActionKind::Mount,
            Action::Dismount => ActionKind::Dismount,
            Action::Land => ActionKind::Land,
            Action::Launch => ActionKind::Launch,
        }
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Strict FIFO of pending action triples.
#[derive(Debug, Default)]
pub struct ActionQueue {
    pending: VecDeque<ActionTriple>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: ActionTriple) {
        self.pending.push_back(action);
    }

    pub fn pop(&mut self) -> Option<ActionTriple> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take up to `limit` actions off the front, in order.
    pub fn drain_batch(&mut self, limit: usize) -> Vec<ActionTriple> {
        let n = limit.min(self.pending.len());
        self.pending.drain(..n).collect()
    }
}
