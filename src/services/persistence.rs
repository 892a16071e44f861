use crate::services::store::ClientStore;
use crate::utils::{join_list, lock, split_list};
use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const FAVORITES_KEY: &str = "FAV_FILE_LIST";
pub const TAB_LIST_KEY: &str = "OPENED_TAB_LIST";

#[derive(Default)]
struct PendingWrite {
    paths: Option<Vec<String>>,
    timer: Option<JoinHandle<()>>,
    writes: usize,
}

/// Persists the list of open tabs, coalescing bursts of changes.
///
/// Every `schedule` call restarts the delay; only the most recent list is
/// written once the delay elapses. Outside a tokio runtime the list is
/// written immediately.
#[derive(Clone)]
pub struct TabListWriter {
    store: Arc<dyn ClientStore>,
    delay: Duration,
    pending: Arc<Mutex<PendingWrite>>,
}

impl TabListWriter {
    pub fn new(store: Arc<dyn ClientStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: Arc::new(Mutex::new(PendingWrite::default())),
        }
    }

    /// Tab paths saved by a previous session.
    pub fn load(&self) -> Vec<String> {
        self.store
            .get(TAB_LIST_KEY)
            .map(|value| split_list(&value))
            .unwrap_or_default()
    }

    pub fn schedule(&self, paths: Vec<String>) {
        let mut pending = lock(&self.pending);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.paths = Some(paths);

        match Handle::try_current() {
            Ok(handle) => {
                let store = Arc::clone(&self.store);
                let shared = Arc::clone(&self.pending);
                let delay = self.delay;
                pending.timer = Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(e) = write_pending(store.as_ref(), &shared) {
                        log::error!("Failed to save tab list: {:#}", e);
                    }
                }));
            }
            Err(_) => {
                drop(pending);
                if let Err(e) = write_pending(self.store.as_ref(), &self.pending) {
                    log::error!("Failed to save tab list: {:#}", e);
                }
            }
        }
    }

    /// Writes any pending list right away.
    pub fn flush(&self) -> Result<()> {
        if let Some(timer) = lock(&self.pending).timer.take() {
            timer.abort();
        }
        write_pending(self.store.as_ref(), &self.pending)
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.pending).paths.is_some()
    }

    /// Number of writes that reached the store.
    pub fn write_count(&self) -> usize {
        lock(&self.pending).writes
    }
}

fn write_pending(store: &dyn ClientStore, pending: &Mutex<PendingWrite>) -> Result<()> {
    let mut pending = lock(pending);
    let Some(paths) = pending.paths.take() else {
        return Ok(());
    };
    log::debug!("Saving {} open tab(s)", paths.len());
    store.set(TAB_LIST_KEY, &join_list(&paths))?;
    pending.writes += 1;
    Ok(())
}
