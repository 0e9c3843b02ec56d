//! Polls the settings change log and broadcasts new entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use crate::error::{AstroError, Result};
use crate::settings::store::{SettingChange, SettingsStore};

/// Background task that turns rows of `setting_changes` into
/// [`SettingChange`] messages. Changes made by any process sharing the
/// database file are picked up.
pub struct ChangeListener {
    sender: broadcast::Sender<SettingChange>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl ChangeListener {
    const CHANNEL_CAPACITY: usize = 64;

    /// Starts polling every `interval`. Only changes made after this call
    /// are delivered. Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<SettingsStore>, interval: Duration) -> Result<Self> {
        let last_seen = store.latest_change_id()?;
        let (sender, _) = broadcast::channel(Self::CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_sender = sender.clone();
        let handle = tokio::spawn(async move {
            Self::run(store, interval, last_seen, task_sender, shutdown_rx).await;
        });

        Ok(Self {
            sender,
            shutdown: Some(shutdown_tx),
            handle,
        })
    }

    async fn run(
        store: Arc<SettingsStore>,
        interval: Duration,
        mut last_seen: i64,
        sender: broadcast::Sender<SettingChange>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let poll_store = Arc::clone(&store);
            let polled = tokio::task::spawn_blocking(move || poll_store.changes_since(last_seen)).await;
            let changes = match polled {
                Ok(Ok(changes)) => changes,
                Ok(Err(e)) => {
                    tracing::warn!("settings poll failed: {}", e);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("settings poll task failed: {}", e);
                    continue;
                }
            };

            for change in changes {
                last_seen = change.id;
                tracing::debug!("setting '{}' changed (#{})", change.key, change.id);
                // no subscribers is fine
                let _ = sender.send(change);
            }
        }
        tracing::debug!("settings listener stopped");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.sender.subscribe()
    }

    /// Stops polling and waits for the task to finish.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        (&mut self.handle)
            .await
            .map_err(|e| AstroError::Settings(format!("listener task failed: {}", e)))
    }
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
