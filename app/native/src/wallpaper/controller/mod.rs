//! Rotation controller.
//!
//! A single task owns the preview history, the rotation files and the busy
//! flag. Commands arrive as [`ControlMessage`]s; network and image work runs
//! in spawned tasks that report back with completion messages, so all state
//! changes happen on the controller task.
//!
//! At most one rotation or preview fetch is in flight. Requests that arrive
//! while busy are dropped, not queued.

pub mod error;
mod handle;
pub mod messages;
pub mod pipeline;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

pub use error::ControllerError;
use futures::FutureExt;
pub use handle::ControllerHandle;
pub use messages::{ControlMessage, ControllerStatus, RotationOutcome, RotationReport};
pub use pipeline::Services;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::config::WallspanConfig;
use crate::unsplash::{Photo, PhotoSource};
use crate::wallpaper::desktop::DesktopIntegration;
use crate::wallpaper::history::{Forward, PreviewEntry, PreviewHistory};
use crate::wallpaper::rotation::RotationFiles;
use crate::wallpaper::screens::DisplayEnumerator;

/// Size of the controller's message queue.
pub const CHANNEL_BUFFER_SIZE: usize = 64;

/// Collaborators rebuilt from a reloaded configuration.
pub struct Reconfigured<P, D> {
    pub config: WallspanConfig,
    pub photos: P,
    pub displays: D,
}

/// Reloads the configuration when the file changes.
pub type Reloader<P, D> = Box<dyn FnMut() -> Result<Reconfigured<P, D>, ControllerError> + Send>;

/// Mutable state owned by the controller task.
#[derive(Debug, Default)]
pub struct ControllerState {
    pub history: PreviewHistory,
    pub busy: bool,
    pub paused: bool,
    pub credit: Option<String>,
    /// Kept until the next successful operation.
    pub last_error: Option<String>,
}

/// The rotation controller actor.
pub struct Controller<P, D, W> {
    services: Services<P, D, W>,
    config: WallspanConfig,
    /// `None` while a rotation task holds the files.
    files: Option<RotationFiles>,
    state: ControllerState,
    reloader: Option<Reloader<P, D>>,
    timer: Option<Interval>,
    receiver: mpsc::Receiver<ControlMessage>,
    events: mpsc::WeakSender<ControlMessage>,
}

impl<P, D, W> Controller<P, D, W>
where
    P: PhotoSource,
    D: DisplayEnumerator,
    W: DesktopIntegration,
{
    /// Creates a controller and the handle that drives it.
    pub fn new(
        services: Services<P, D, W>,
        config: WallspanConfig,
        files: RotationFiles,
    ) -> (Self, ControllerHandle) {
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let handle = ControllerHandle::new(sender);

        let controller = Self {
            services,
            state: ControllerState {
                history: PreviewHistory::new(config.history_capacity),
                ..ControllerState::default()
            },
            config,
            files: Some(files),
            reloader: None,
            timer: None,
            receiver,
            events: handle.downgrade(),
        };

        (controller, handle)
    }

    /// Sets the function called on [`ControlMessage::ConfigChanged`].
    #[must_use]
    pub fn with_reloader(mut self, reloader: Reloader<P, D>) -> Self {
        self.reloader = Some(reloader);
        self
    }

    /// Runs the controller on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tracing::debug!("Spawning wallpaper controller");
        tokio::spawn(self.run())
    }

    /// Runs the message loop until shutdown or until every handle is dropped.
    ///
    /// With a rotation interval configured the first rotation starts
    /// immediately.
    pub async fn run(mut self) {
        tracing::debug!(
            mode = %self.config.mode,
            interval = self.config.interval,
            "Wallpaper controller started"
        );
        self.restart_timer(true);

        loop {
            let paused = self.state.paused;
            tokio::select! {
                msg = self.receiver.recv() => {
                    let Some(msg) = msg else {
                        break;
                    };
                    if !self.dispatch(msg) {
                        break;
                    }
                }
                () = next_tick(self.timer.as_mut(), paused) => {
                    tracing::debug!("Rotation timer fired");
                    self.start_rotation(None);
                }
            }
        }

        tracing::debug!("Wallpaper controller stopped");
    }

    /// Handles one message, recovering from panics. Returns `false` to stop.
    fn dispatch(&mut self, msg: ControlMessage) -> bool {
        if matches!(msg, ControlMessage::Shutdown) {
            tracing::debug!("Wallpaper controller received shutdown");
            return false;
        }

        let name = msg.name();
        let result = catch_unwind(AssertUnwindSafe(|| self.handle_message(msg)));
        if let Err(panic_info) = result {
            let panic_msg = panic_message(&*panic_info);
            tracing::error!(msg = name, panic = %panic_msg, "Controller panicked handling message");
        }
        true
    }

    fn handle_message(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::Next => self.start_rotation(None),
            ControlMessage::PreviewBack => {
                if let Some(entry) = self.state.history.move_back() {
                    tracing::info!(credit = %entry.photo.credit(), "Previous preview");
                }
            }
            ControlMessage::PreviewForward => self.preview_forward(),
            ControlMessage::ApplyPreview => self.apply_preview(),
            ControlMessage::TogglePause => self.toggle_pause(),
            ControlMessage::ConfigChanged => self.config_changed(),
            ControlMessage::Status { respond_to } => {
                if respond_to.send(self.status()).is_err() {
                    tracing::debug!("Status requester went away");
                }
            }
            ControlMessage::Shutdown => {}
            ControlMessage::RotationFinished(outcome) => self.rotation_finished(*outcome),
            ControlMessage::PreviewFetched(result) => self.preview_fetched(*result),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    fn start_rotation(&mut self, preset: Option<Photo>) {
        if self.state.busy {
            tracing::info!("Wallpaper controller is busy, ignoring rotation request");
            return;
        }
        let Some(events) = self.events.upgrade() else {
            return;
        };
        let Some(mut files) = self.files.take() else {
            tracing::warn!("Rotation files are in use, ignoring rotation request");
            return;
        };

        self.state.busy = true;
        self.state.last_error = None;

        let services = self.services.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            // The files go back to the controller even if the rotation panics.
            let result = AssertUnwindSafe(services.rotate(&config, &mut files, preset))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(task_panicked("rotation", &*payload)));
            let outcome = RotationOutcome { files, result };
            if events.send(ControlMessage::RotationFinished(Box::new(outcome))).await.is_err() {
                tracing::debug!("Controller stopped before the rotation finished");
            }
        });
    }

    fn preview_forward(&mut self) {
        let needs_fetch = match self.state.history.move_forward() {
            Forward::Entry(entry) => {
                tracing::info!(credit = %entry.photo.credit(), "Next preview");
                false
            }
            Forward::NeedsFetch => true,
        };

        if needs_fetch {
            self.start_preview_fetch();
        }
    }

    fn start_preview_fetch(&mut self) {
        if self.state.busy {
            tracing::info!("Wallpaper controller is busy, ignoring preview request");
            return;
        }
        let Some(events) = self.events.upgrade() else {
            return;
        };

        self.state.busy = true;

        let services = self.services.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(services.fetch_preview(&config))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(task_panicked("preview fetch", &*payload)));
            if events.send(ControlMessage::PreviewFetched(Box::new(result))).await.is_err() {
                tracing::debug!("Controller stopped before the preview arrived");
            }
        });
    }

    fn apply_preview(&mut self) {
        let Some(photo) = self.state.history.current().map(|entry| entry.photo.clone()) else {
            tracing::info!("No preview to apply");
            return;
        };
        self.start_rotation(Some(photo));
    }

    fn toggle_pause(&mut self) {
        self.state.paused = !self.state.paused;
        if self.state.paused {
            tracing::info!("Automatic rotation paused");
        } else {
            tracing::info!("Automatic rotation resumed");
            self.restart_timer(false);
        }
    }

    fn config_changed(&mut self) {
        if !self.reload() {
            return;
        }
        self.restart_timer(false);
        if !self.state.paused {
            self.start_rotation(None);
        }
    }

    /// Applies a reloaded configuration. Returns `false` if reloading failed.
    fn reload(&mut self) -> bool {
        let Some(reloader) = self.reloader.as_mut() else {
            return true;
        };

        match reloader() {
            Ok(Reconfigured { config, photos, displays }) => {
                self.services.photos = Arc::new(photos);
                self.services.displays = Arc::new(displays);
                self.state.history.set_capacity(config.history_capacity);
                self.config = config;
                tracing::info!(mode = %self.config.mode, "Configuration reloaded");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to reload configuration, keeping the previous one");
                self.state.last_error = Some(err.to_string());
                false
            }
        }
    }

    fn restart_timer(&mut self, immediate: bool) {
        self.timer = self.config.rotation_interval().map(|period| {
            let start = if immediate { Instant::now() } else { Instant::now() + period };
            let mut timer = tokio::time::interval_at(start, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });
    }

    // ========================================================================
    // Completions
    // ========================================================================

    fn rotation_finished(&mut self, outcome: RotationOutcome) {
        let RotationOutcome { files, result } = outcome;
        self.files = Some(files);
        self.state.busy = false;

        match result {
            Ok(report) => {
                if let Some(credit) = report.credit {
                    tracing::info!(credit = %credit, "Wallpaper rotated");
                    self.state.credit = Some(credit);
                }
                if let Some(warning) = &report.warning {
                    tracing::warn!(warning = %warning, "Wallpaper rotated with problems");
                }
                self.state.last_error = report.warning;
            }
            Err(err) => {
                tracing::error!(error = %err, "Wallpaper rotation failed");
                self.state.last_error = Some(err.to_string());
            }
        }
    }

    fn preview_fetched(&mut self, result: Result<PreviewEntry, ControllerError>) {
        self.state.busy = false;

        match result {
            Ok(entry) => {
                tracing::info!(credit = %entry.photo.credit(), "New preview");
                self.state.history.append(entry);
                self.state.last_error = None;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch preview");
                self.state.last_error = Some(err.to_string());
            }
        }
    }

    fn status(&self) -> ControllerStatus {
        ControllerStatus {
            busy: self.state.busy,
            paused: self.state.paused,
            mode: self.config.mode,
            credit: self.state.credit.clone(),
            last_error: self.state.last_error.clone(),
            history_len: self.state.history.len(),
            history_cursor: self.state.history.cursor(),
            preview: self.state.history.current().map(|entry| entry.photo.credit()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn task_panicked(task: &str, payload: &(dyn Any + Send)) -> ControllerError {
    let panic_msg = panic_message(payload);
    tracing::error!(task, panic = %panic_msg, "Background task panicked");
    ControllerError::Task(format!("{task} panicked: {panic_msg}"))
}

/// Waits for the next timer tick, or forever when there is no active timer.
async fn next_tick(timer: Option<&mut Interval>, paused: bool) {
    match timer {
        Some(timer) if !paused => {
            timer.tick().await;
        }
        _ => std::future::pending::<()>().await,
    }
}
