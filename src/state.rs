use crate::clock::Clock;
use crate::tracker::Tracker;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::{Mutex, watch};

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub tracker: Arc<Mutex<Tracker>>,
    pub clock: Arc<dyn Clock>,
    pub debug: bool,
    revision: Arc<watch::Sender<u64>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, tracker: Tracker, clock: Arc<dyn Clock>, debug: bool) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            data_path,
            tracker: Arc::new(Mutex::new(tracker)),
            clock,
            debug,
            revision: Arc::new(revision),
        }
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn notify_changed(&self) -> u64 {
        self.revision.send_modify(|rev| *rev += 1);
        self.revision()
    }

    /// Returns the revision once it moves past `since`, or at `timeout`.
    pub async fn wait_for_change(&self, since: u64, timeout: Duration) -> u64 {
        let mut rx = self.revision.subscribe();
        let _ = tokio::time::timeout(timeout, rx.wait_for(|rev| *rev > since)).await;
        self.revision()
    }
}
