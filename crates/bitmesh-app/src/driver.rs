//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use bitmesh_core::ConversationKey;

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the binary and in simulation.
///
/// # Implementations
///
/// - **CLI**: replays a scripted event log and logs every render
/// - **Simulation**: injected events with invariant checks on each render
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns `None` once the event source is exhausted; the runtime then
    /// stops.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Bring a conversation on screen.
    fn open_conversation(&mut self, conversation: &ConversationKey) -> Result<(), Self::Error>;

    /// Raise a notification for an unread conversation.
    fn notify(&mut self, conversation: &ConversationKey, unread: u32) -> Result<(), Self::Error>;

    /// Release resources.
    fn stop(&mut self);
}
