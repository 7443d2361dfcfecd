// ── Controller abstraction ──
//
// Full lifecycle management for one scheduler connection: the initial
// refresh, the adaptive poll task, command routing, and snapshot/event
// fan-out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, Notify, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use xsched_api::commands::clamp_percent;
use xsched_api::{PlaylistStep, XScheduleClient, check_result};

use crate::command::{Command, CommandResult};
use crate::config::ControllerConfig;
use crate::coordinator::{DerivedState, DerivedView, PollCoordinator, PollSettings};
use crate::error::CoreError;
use crate::model::{PlaybackStatus, SchedulerEvent, StatusSnapshot};
use crate::store::{SnapshotStore, TimedCache, UpdateStatus};
use crate::stream::SnapshotStream;

const EVENT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Poll cycles (timer
/// driven or requested) are serialized through the coordinator mutex;
/// user commands bypass it and may run concurrently.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: Arc<XScheduleClient>,
    coordinator: Mutex<PollCoordinator>,
    derived: Arc<DerivedState>,
    store: SnapshotStore,
    steps: std::sync::Mutex<HashMap<String, TimedCache<Vec<PlaylistStep>>>>,
    connection_state: watch::Sender<ConnectionState>,
    event_tx: broadcast::Sender<Arc<SchedulerEvent>>,
    refresh_requested: Notify,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller. Does NOT connect -- call
    /// [`connect()`](Self::connect) to run the first cycle and start polling.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let client = Arc::new(XScheduleClient::new(
            config.url.clone(),
            config.password.clone(),
            config.reference.clone(),
            &config.transport(),
        )?);
        let coordinator = PollCoordinator::new(Arc::clone(&client), PollSettings::from(&config));
        let derived = coordinator.derived();
        let store = SnapshotStore::new(coordinator.next_interval());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                coordinator: Mutex::new(coordinator),
                derived,
                store,
                steps: std::sync::Mutex::new(HashMap::new()),
                connection_state,
                event_tx,
                refresh_requested: Notify::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// The underlying protocol client.
    pub fn client(&self) -> &XScheduleClient {
        &self.inner.client
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Run the first cycle (which logs in when needed) and spawn the poll
    /// task. Fails if that first cycle fails.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner.connection_state.send_replace(ConnectionState::Connecting);

        if let Err(e) = self.refresh().await {
            self.inner.connection_state.send_replace(ConnectionState::Failed);
            return Err(e);
        }

        if self.inner.config.polling_enabled {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(poll_task(ctrl, cancel)));
        }

        self.inner.connection_state.send_replace(ConnectionState::Connected);
        info!(url = %self.inner.config.url, "connected to scheduler");
        Ok(())
    }

    /// Cancel and join background tasks.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Run one poll cycle now and publish its result.
    ///
    /// Serialized with the timer-driven cycle: if one is in flight this
    /// waits for it, then runs its own.
    pub async fn refresh(&self) -> Result<Arc<StatusSnapshot>, CoreError> {
        let mut coordinator = self.inner.coordinator.lock().await;
        match coordinator.run_cycle().await {
            Ok(outcome) => {
                self.inner.store.set_interval(coordinator.next_interval());
                self.inner.store.publish(Arc::clone(&outcome.snapshot));
                for event in outcome.events {
                    debug!(event = event.name(), "scheduler event");
                    let _ = self.inner.event_tx.send(Arc::new(event));
                }
                Ok(outcome.snapshot)
            }
            Err(e) => {
                self.inner.store.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Wake the poll task for an early cycle. Requests made while a cycle
    /// is pending collapse into one.
    pub fn request_refresh(&self) {
        self.inner.refresh_requested.notify_one();
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a typed command. A successful command requests a refresh.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }

        let result = route_command(self, cmd).await?;
        if result == CommandResult::Ok {
            self.request_refresh();
        }
        Ok(result)
    }

    /// Send a named command verbatim. A non-"ok" result is an error.
    pub async fn run_command(
        &self,
        name: &str,
        parameters: &str,
        body: Option<&str>,
    ) -> Result<Value, CoreError> {
        let reply = check_result(self.inner.client.command(name, parameters, body).await?)?;
        self.request_refresh();
        Ok(reply)
    }

    /// Send a named query and return the reply unchecked.
    pub async fn query(&self, name: &str, parameters: &str) -> Result<Value, CoreError> {
        Ok(self.inner.client.query(name, parameters).await?)
    }

    /// Steps of a playlist, cached with the playlist-list TTL and dropped
    /// when the session changes.
    pub async fn get_steps(&self, playlist: &str) -> Result<Arc<Vec<PlaylistStep>>, CoreError> {
        let ttl = self.inner.config.lists_refresh;
        let now = Instant::now();
        let epoch = self.inner.client.session_epoch();

        let cached = self
            .inner
            .steps
            .lock()
            .expect("step cache lock poisoned")
            .get(playlist)
            .filter(|c| c.is_fresh(now, ttl, epoch))
            .and_then(|c| c.get().cloned());
        if let Some(steps) = cached {
            return Ok(steps);
        }

        let steps = self.inner.client.get_playlist_steps(playlist).await?;
        let epoch = self.inner.client.session_epoch();
        let mut cache = self.inner.steps.lock().expect("step cache lock poisoned");
        Ok(cache
            .entry(playlist.to_owned())
            .or_default()
            .store(steps, now, epoch))
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect. No poll task.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.polling_enabled = false;

        let controller = Controller::new(cfg)?;
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to edge-triggered events.
    pub fn events(&self) -> broadcast::Receiver<Arc<SchedulerEvent>> {
        self.inner.event_tx.subscribe()
    }

    /// Latest good snapshot; `None` before the first successful cycle.
    pub fn snapshot(&self) -> Option<Arc<StatusSnapshot>> {
        self.inner.store.snapshot()
    }

    pub fn snapshots(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn update_status(&self) -> UpdateStatus {
        self.inner.store.update_status()
    }

    /// Interval the poll task will wait before its next cycle.
    pub fn poll_interval(&self) -> Duration {
        self.inner.store.interval()
    }

    pub fn derived(&self) -> DerivedView {
        self.inner.derived.view()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll on the adaptive interval, or earlier when a refresh is requested.
async fn poll_task(controller: Controller, cancel: CancellationToken) {
    loop {
        let interval = controller.poll_interval();
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = controller.inner.refresh_requested.notified() => {
                debug!("refresh requested");
            }
            () = tokio::time::sleep(interval) => {}
        }

        if let Err(e) = controller.refresh().await {
            warn!(error = %e, "poll cycle failed");
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = &controller.inner.client;
    let derived = &controller.inner.derived;
    let snapshot = controller.snapshot();

    match cmd {
        // ── Playback ─────────────────────────────────────────────

        Command::PlayPlaylist { playlist, looped } => {
            ensure_known_playlist(snapshot.as_deref(), &playlist)?;
            client.play_playlist(&playlist, looped).await?;
        }

        Command::PlayStep {
            playlist,
            step,
            looped,
        } => {
            ensure_known_playlist(snapshot.as_deref(), &playlist)?;
            client.play_playlist_step(&playlist, &step, looped).await?;
        }

        Command::Resume => {
            let status = snapshot.as_ref().map(|s| s.status).unwrap_or_default();
            match status {
                PlaybackStatus::Paused => {
                    client.pause_toggle().await?;
                }
                PlaybackStatus::Playing => return Ok(CommandResult::Unchanged),
                PlaybackStatus::Idle => {
                    let playlist = derived
                        .last_playlist()
                        .or_else(|| {
                            snapshot
                                .as_ref()
                                .and_then(|s| s.playlists.first())
                                .map(|p| p.name.clone())
                        })
                        .ok_or_else(|| CoreError::Rejected {
                            message: "nothing to resume: no known playlist".into(),
                        })?;
                    debug!(%playlist, "resuming playlist from idle");
                    client.play_playlist(&playlist, false).await?;
                }
            }
        }

        Command::PauseToggle => {
            client.pause_toggle().await?;
        }
        Command::Stop => {
            client.stop().await?;
        }
        Command::StopAll => {
            client.stop_all_now().await?;
        }
        Command::NextStep => {
            client.next_step().await?;
        }
        Command::PriorStep => {
            client.prior_step().await?;
        }
        Command::RestartStep => {
            client.restart_step().await?;
        }
        Command::Seek { position_ms } => {
            client.seek_ms(position_ms).await?;
        }

        // ── Audio / output ───────────────────────────────────────

        Command::SetVolume(volume) => {
            client.set_volume(volume).await?;
            let applied = u64::try_from(clamp_percent(volume)).unwrap_or_default();
            derived.remember_volume(applied);
        }
        Command::AdjustVolume(delta) => {
            client.adjust_volume(delta).await?;
        }
        Command::Mute(true) => {
            if let Some(current) = snapshot.as_ref().map(|s| s.volume) {
                derived.remember_volume(current);
            }
            client.set_volume(0).await?;
        }
        Command::Mute(false) => {
            let restore = derived.unmute_volume();
            client.set_volume(i64::try_from(restore).unwrap_or(100)).await?;
        }
        Command::SetBrightness(percent) => {
            client.set_brightness(percent).await?;
        }
        Command::ToggleOutput => {
            client.toggle_output_to_lights().await?;
        }
        Command::SetOutput(desired) => {
            let current = snapshot.as_ref().is_some_and(|s| s.output_to_lights);
            if current == desired {
                return Ok(CommandResult::Unchanged);
            }
            client.toggle_output_to_lights().await?;
        }
        Command::TogglePlaylistLoop => {
            client.toggle_playlist_loop().await?;
        }
        Command::SetPlaylistLoop(desired) => {
            let current = snapshot.as_ref().is_some_and(|s| s.playlist_looping);
            if current == desired {
                return Ok(CommandResult::Unchanged);
            }
            client.toggle_playlist_loop().await?;
        }

        // ── Test mode ────────────────────────────────────────────

        Command::StartTestMode(request) => {
            client.start_test_mode(&request).await?;
            derived.set_test_mode(true);
            let _ = controller
                .inner
                .event_tx
                .send(Arc::new(SchedulerEvent::TestModeStarted {
                    mode: request.mode().to_owned(),
                }));
        }
        Command::StopTestMode => {
            client.stop_test_mode().await?;
            derived.set_test_mode(false);
            let _ = controller
                .inner
                .event_tx
                .send(Arc::new(SchedulerEvent::TestModeStopped));
        }

        // ── Background playlist ──────────────────────────────────

        Command::SetBackgroundPlaylist(playlist) => {
            ensure_known_playlist(snapshot.as_deref(), &playlist)?;
            client.set_background_playlist(&playlist).await?;
            derived.set_background_playlist(Some(playlist));
        }
        Command::ClearBackgroundPlaylist => {
            client.clear_background_playlist().await?;
            derived.set_background_playlist(None);
        }

        // ── System ───────────────────────────────────────────────

        Command::CloseScheduler => {
            client.close_scheduler().await?;
        }
    }

    Ok(CommandResult::Ok)
}

// ── Helpers ──────────────────────────────────────────────────────

/// Reject names missing from a non-empty cached playlist list. With no
/// list cached the scheduler gets to decide.
fn ensure_known_playlist(snapshot: Option<&StatusSnapshot>, name: &str) -> Result<(), CoreError> {
    match snapshot {
        Some(snap) if !snap.playlists.is_empty() && snap.find_playlist(name).is_none() => {
            Err(CoreError::PlaylistNotFound { name: name.into() })
        }
        _ => Ok(()),
    }
}
