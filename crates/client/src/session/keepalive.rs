//! Background refresh pings while a session is active

use super::state::SessionState;
use crate::client::StorefrontClient;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Periodic refresh task, one at a time
pub(crate) struct KeepAlive {
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl KeepAlive {
    pub(crate) const fn new(period: Duration) -> Self {
        Self {
            period,
            task: Mutex::new(None),
        }
    }

    /// Start pinging unless a task is already running.
    ///
    /// The task ends by itself once the session stops being active.
    pub(crate) fn ensure_running(&self, client: &StorefrontClient) {
        if self.period.is_zero() {
            return;
        }

        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let state_rx = client.session().subscribe();
        *task = Some(tokio::spawn(run(client.clone(), state_rx, self.period)));
    }

    pub(crate) fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(crate) fn stop(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    client: StorefrontClient,
    mut state_rx: watch::Receiver<SessionState>,
    period: Duration,
) {
    if !state_rx.borrow_and_update().is_active() {
        return;
    }

    info!(interval_secs = period.as_secs(), "Session keep-alive started");
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() || !state_rx.borrow_and_update().is_active() {
                    break;
                }
            }
            _ = interval.tick() => {
                debug!("Pinging session refresh endpoint");
                client.guard().ping().await;
            }
        }
    }

    info!("Session keep-alive stopped");
}
