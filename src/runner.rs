//! Realtime tick loop.
//!
//! [`start`] spawns a tokio task that ticks the [`WorldService`] every
//! `tick_ms` and broadcasts one snapshot event per nomad per tick.
//!
//! The loop sleeps only after a tick has completed, so ticks never overlap
//! and a slow tick pushes the next one back rather than queueing a burst.
//! Stopping flips a watch flag: the tick in progress finishes, no further
//! tick is scheduled.
//!
//! ```text
//! input ──enqueue──▶ SimHandle ──lock──▶ WorldService
//!                        ▲                    │ tick()
//!                        └──── broadcast ◀────┘ snapshots
//! ```

use crate::action::ActionTriple;
use crate::actor::JoinDetails;
use crate::service::WorldService;
use crate::snapshot::{NomadWorldData, WorldEvent};
use crate::types::SimStats;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Snapshot event as delivered to subscribers.
pub type SnapshotEvent = Arc<WorldEvent<NomadWorldData>>;

/// Buffered snapshots per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Control surface of a running simulation.
pub struct SimHandle {
    service: Arc<Mutex<WorldService>>,
    events: broadcast::Sender<SnapshotEvent>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SimHandle {
    pub fn join(&self, id: impl Into<String>, details: JoinDetails) -> bool {
        self.service.lock().join(id, details)
    }

    pub fn enqueue(&self, action: ActionTriple) {
        self.service.lock().enqueue(action);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotEvent> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> SimStats {
        self.service.lock().stats()
    }

    /// Shared access to the service, e.g. for inspection between ticks.
    pub fn service(&self) -> Arc<Mutex<WorldService>> {
        self.service.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Ask the loop to stop after the current tick.
    pub fn stop(&self) {
        // send_replace never fails, even with no receiver left
        self.stop_tx.send_replace(true);
    }

    /// Stop and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            log::error!("Simulation loop ended abnormally: {}", e);
        }
    }
}

/// Spawn the tick loop for `service`. Must be called inside a tokio runtime.
pub fn start(service: WorldService) -> SimHandle {
    let tick_ms = service.config().tick_ms;
    let name = service.config().name.clone();
    let service = Arc::new(Mutex::new(service));
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let (stop_tx, stop_rx) = watch::channel(false);

    let task = tokio::spawn(run_loop(
        service.clone(),
        events.clone(),
        stop_rx,
        tick_ms,
        name,
    ));

    SimHandle {
        service,
        events,
        stop_tx,
        task,
    }
}

async fn run_loop(
    service: Arc<Mutex<WorldService>>,
    events: broadcast::Sender<SnapshotEvent>,
    mut stop_rx: watch::Receiver<bool>,
    tick_ms: u64,
    name: String,
) {
    info!("Simulation '{}' started ({} ms ticks)", name, tick_ms);
    let interval = Duration::from_millis(tick_ms);

    loop {
        if *stop_rx.borrow() {
            break;
        }

        // Hold the lock only for the tick itself, then release before publishing.
        let tick_events = {
            let _span = tracing::debug_span!("tick", sim = %name).entered();
            service.lock().tick(tick_ms)
        };

        if !tick_events.sparks.is_empty() {
            tracing::trace!(
                tick = tick_events.tick,
                sparks = tick_events.sparks.len(),
                "drill effects"
            );
        }
        for snapshot in tick_events.snapshots {
            // No subscribers is fine.
            let _ = events.send(Arc::new(snapshot));
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Simulation '{}' stopped", name);
}
