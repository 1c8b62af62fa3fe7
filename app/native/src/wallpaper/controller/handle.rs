//! Handle for communicating with the rotation controller.
//!
//! `ControllerHandle` is cheap to clone. It is used from async code, from
//! plain threads (stdin and the config watcher) and from tests.

use tokio::sync::{mpsc, oneshot};

use super::ControllerError;
use super::messages::{ControlMessage, ControllerStatus};

/// Handle for communicating with the controller.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<ControlMessage>,
}

impl ControllerHandle {
    pub(crate) const fn new(sender: mpsc::Sender<ControlMessage>) -> Self { Self { sender } }

    // ========================================================================
    // Sending
    // ========================================================================

    /// Sends a message without waiting for buffer space.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::ActorClosed`] if the controller has stopped
    /// or its queue is full.
    pub fn send(&self, msg: ControlMessage) -> Result<(), ControllerError> {
        self.sender.try_send(msg).map_err(|_| ControllerError::ActorClosed)
    }

    /// Sends a message, waiting for buffer space.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::ActorClosed`] if the controller has stopped.
    pub async fn send_async(&self, msg: ControlMessage) -> Result<(), ControllerError> {
        self.sender.send(msg).await.map_err(|_| ControllerError::ActorClosed)
    }

    /// Sends a message from a thread outside the runtime.
    ///
    /// Must not be called from async code.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::ActorClosed`] if the controller has stopped.
    pub fn send_blocking(&self, msg: ControlMessage) -> Result<(), ControllerError> {
        self.sender.blocking_send(msg).map_err(|_| ControllerError::ActorClosed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns a snapshot of the controller state.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::ActorClosed`] if the controller has stopped.
    pub async fn status(&self) -> Result<ControllerStatus, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send_async(ControlMessage::Status { respond_to: tx }).await?;
        rx.await.map_err(|_| ControllerError::ActorClosed)
    }

    /// Like [`Self::status`], for threads outside the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::ActorClosed`] if the controller has stopped.
    pub fn status_blocking(&self) -> Result<ControllerStatus, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send_blocking(ControlMessage::Status { respond_to: tx })?;
        rx.blocking_recv().map_err(|_| ControllerError::ActorClosed)
    }

    /// Returns whether the controller is still running.
    #[must_use]
    pub fn is_running(&self) -> bool { !self.sender.is_closed() }

    /// Creates a sender for the controller's own background tasks.
    pub(crate) fn downgrade(&self) -> mpsc::WeakSender<ControlMessage> { self.sender.downgrade() }
}
