//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use admin_client::{ApiClient, ClientConfig, ClientError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::console::Console;

/// Shortest accepted sweep interval.
const MIN_GC_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Tracked {
    console: Console,
    last_seen: Instant,
}

/// Shared application state: the open consoles, keyed by browser.
#[derive(Debug, Clone)]
pub struct AppState {
    config: ClientConfig,
    idle_timeout: Duration,
    consoles: Arc<RwLock<HashMap<Uuid, Tracked>>>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Each console gets its own client built from `config`. Consoles unused
    /// for `idle_timeout` are closed by the sweep.
    pub fn new(config: ClientConfig, idle_timeout: Duration) -> Self {
        Self {
            config,
            idle_timeout,
            consoles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a console for a browser we have not seen.
    pub fn open(&self) -> Result<Console, ClientError> {
        let console = Console::new(Uuid::new_v4(), ApiClient::new(self.config.clone())?);
        let tracked = Tracked {
            console: console.clone(),
            last_seen: Instant::now(),
        };
        self.consoles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(console.id(), tracked);
        debug!(console = %console.id(), "Opened console");
        Ok(console)
    }

    /// Look up a console and mark it used.
    pub fn find(&self, id: Uuid) -> Option<Console> {
        let mut consoles = self.consoles.write().unwrap_or_else(PoisonError::into_inner);
        let tracked = consoles.get_mut(&id)?;
        tracked.last_seen = Instant::now();
        Some(tracked.console.clone())
    }

    /// Close a console, e.g. on logout.
    pub fn close(&self, id: Uuid) -> Option<Console> {
        let closed = self
            .consoles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|tracked| tracked.console);
        if closed.is_some() {
            debug!(console = %id, "Closed console");
        }
        closed
    }

    /// Number of open consoles.
    pub fn len(&self) -> usize {
        self.consoles.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close idle consoles and evict idle cache entries from the rest.
    ///
    /// Returns the number of consoles closed.
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let (closed, open) = {
            let mut consoles = self.consoles.write().unwrap_or_else(PoisonError::into_inner);
            let before = consoles.len();
            consoles.retain(|_, tracked| now.duration_since(tracked.last_seen) < self.idle_timeout);
            let open: Vec<Console> = consoles.values().map(|t| t.console.clone()).collect();
            (before - consoles.len(), open)
        };

        let evicted: usize = open.iter().map(|console| console.queries.collect_garbage()).sum();
        if closed > 0 || evicted > 0 {
            info!(closed, evicted, open = open.len(), "Console sweep");
        }
        closed
    }

    /// Sweep every `interval` in the background.
    pub fn spawn_gc(&self, interval: Duration) -> JoinHandle<()> {
        let state = self.clone();
        let interval = interval.max(MIN_GC_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                state.collect_garbage();
            }
        })
    }
}
