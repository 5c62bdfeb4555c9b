//! Action log replay.
//!
//! A world is fully determined by its configuration plus the ordered list of
//! actions fed to it. An [`ActionLog`] records that list with the tick each
//! action was enqueued before, so a run can be reproduced bit for bit.

use crate::action::ActionTriple;
use crate::actor::JoinDetails;
use crate::error::Result;
use crate::service::WorldService;
use crate::settings::SimConfig;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedAction {
    /// Number of ticks already run when this action was enqueued.
    pub tick: u64,
    pub action: ActionTriple,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    /// Nomads to join before the first tick, in order.
    #[serde(default)]
    pub joins: Vec<String>,
    #[serde(default)]
    pub actions: Vec<LoggedAction>,
}

impl ActionLog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn record(&mut self, tick: u64, action: ActionTriple) {
        self.actions.push(LoggedAction { tick, action });
    }

    /// Last tick that has an action attached.
    pub fn last_tick(&self) -> u64 {
        self.actions.iter().map(|a| a.tick).max().unwrap_or(0)
    }
}

/// Build a fresh world from `config` and run `ticks` ticks of `log`.
pub fn replay(config: SimConfig, log: &ActionLog, ticks: u64) -> Result<WorldService> {
    let tick_ms = config.tick_ms;
    let mut service = WorldService::new(config)?;
    for id in &log.joins {
        service.join(id.clone(), JoinDetails::default());
    }

    let mut actions = log.actions.clone();
    // Stable: actions sharing a tick keep their recorded order.
    actions.sort_by_key(|a| a.tick);
    let mut pending = actions.into_iter().peekable();

    for ran in 0..ticks {
        while let Some(next) = pending.next_if(|a| a.tick <= ran) {
            service.enqueue(next.action);
        }
        service.tick(tick_ms);
    }

    debug!(
        "Replayed {} ticks; {} actions left unplayed",
        ticks,
        pending.count()
    );
    Ok(service)
}
