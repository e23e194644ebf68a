//! Turns link-change events into probes, one at a time.
//!
//! Each event supersedes the probe that is running: the old probe is
//! cancelled and awaited, its result dropped, and the new event handled.
//! Outcomes go to the `Notifier`; `None` clears what was shown before.

use inetify_core::{LinkEvent, Notifier, ProbeConfig, Settings, TestInfo, Tester, WifiStore};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler has shut down")]
    Closed,
}

pub struct ProbeScheduler {
    enabled: bool,
    config: ProbeConfig,
    tester: Arc<dyn Tester>,
    store: Arc<dyn WifiStore>,
    notifier: Arc<dyn Notifier>,
    cancel_grace: Duration,
}

struct ActiveProbe {
    cancel: CancellationToken,
    task: JoinHandle<Option<TestInfo>>,
}

/// Sending side of a running scheduler.
pub struct SchedulerHandle {
    events: mpsc::UnboundedSender<LinkEvent>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Queues an event. Never waits on the running probe.
    pub fn send(&self, event: LinkEvent) -> Result<(), SchedulerError> {
        self.events.send(event).map_err(|_| SchedulerError::Closed)
    }

    /// Token that shuts the scheduler down when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops accepting events and waits for the running probe, if any, to
    /// be reported.
    pub async fn finish(self) {
        let SchedulerHandle { events, task, .. } = self;
        drop(events);
        if let Err(e) = task.await {
            error!("scheduler task failed: {e}");
        }
    }

    /// Cancels any running probe, closes the store and waits for the
    /// scheduler task to end.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            error!("scheduler task failed: {e}");
        }
    }
}

impl ProbeScheduler {
    pub fn new(
        settings: &Settings,
        tester: Arc<dyn Tester>,
        store: Arc<dyn WifiStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        ProbeScheduler {
            enabled: settings.enabled,
            config: settings.probe_config(),
            tester,
            store,
            notifier,
            cancel_grace: settings.fetch_timeout() + Duration::from_secs(1),
        }
    }

    /// How long a cancelled probe may take to return before it is aborted.
    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    pub fn spawn(self) -> SchedulerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(self.run(rx, shutdown.clone()));
        SchedulerHandle { events: tx, shutdown, task }
    }

    async fn run(self, mut events: mpsc::UnboundedReceiver<LinkEvent>, shutdown: CancellationToken) {
        let mut active: Option<ActiveProbe> = None;
        let mut draining = false;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("scheduler shutting down");
                    break;
                }
                event = events.recv(), if !draining => {
                    let Some(event) = event else {
                        if active.is_none() {
                            break;
                        }
                        debug!("no more events, letting the running test finish");
                        draining = true;
                        continue;
                    };
                    if let Some(probe) = active.take() {
                        info!("new connectivity event, cancelling running test");
                        self.stop(probe).await;
                    }
                    active = self.handle(event).await;
                    if active.is_none() {
                        self.store.close();
                    }
                }
                // Polled after `events` so a queued event discards a result
                // that became ready in the same wakeup.
                res = wait_active(&mut active) => {
                    active = None;
                    self.complete(res);
                    if draining {
                        break;
                    }
                }
            }
        }

        if let Some(probe) = active.take() {
            self.stop(probe).await;
        }
        self.store.close();
    }

    async fn handle(&self, event: LinkEvent) -> Option<ActiveProbe> {
        if !self.enabled {
            debug!("disabled, ignoring {event:?}");
            return None;
        }
        if !event.connected {
            debug!("not connected, clearing notifications");
            self.notifier.notify(None);
            return None;
        }
        if let Some((ssid, bssid)) = event.identity() {
            let store = self.store.clone();
            let lookup = ssid.to_string();
            match tokio::task::spawn_blocking(move || store.is_ignored(&lookup)).await {
                Ok(Ok(true)) => {
                    info!("{ssid} ({bssid}) is ignored, skipping test");
                    self.notifier.notify(None);
                    return None;
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => {
                    error!("could not read ignore list: {e}");
                    self.notifier.notify(None);
                    return None;
                }
                Err(e) => {
                    error!("ignore list lookup failed: {e}");
                    self.notifier.notify(None);
                    return None;
                }
            }
        }

        debug!("starting test for {event:?}");
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tester = self.tester.clone();
        let cfg = self.config.clone();
        let task = tokio::spawn(async move { tester.test(cfg.retries, cfg.delay, cfg.require_wifi, token).await });
        Some(ActiveProbe { cancel, task })
    }

    fn complete(&self, res: Result<Option<TestInfo>, JoinError>) {
        let outcome = match res {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("test failed unexpectedly: {e}");
                None
            }
        };
        match &outcome {
            Some(info) => debug!("test done, expected title: {}", info.is_expected_title),
            None => debug!("test gave no result"),
        }
        self.store.close();
        self.notifier.notify(outcome);
    }

    /// Cancels a probe and waits for it, discarding its result.
    async fn stop(&self, mut probe: ActiveProbe) {
        probe.cancel.cancel();
        match tokio::time::timeout(self.cancel_grace, &mut probe.task).await {
            Ok(Ok(_)) => debug!("cancelled test returned, result discarded"),
            Ok(Err(e)) => warn!("cancelled test failed: {e}"),
            Err(_) => {
                warn!("test did not stop within {:?}, aborting", self.cancel_grace);
                probe.task.abort();
            }
        }
    }
}

async fn wait_active(active: &mut Option<ActiveProbe>) -> Result<Option<TestInfo>, JoinError> {
    match active {
        Some(probe) => (&mut probe.task).await,
        None => std::future::pending().await,
    }
}
