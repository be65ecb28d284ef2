//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the CLI's script driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`bitmesh_app::Runtime`] orchestration code runs in both production and
//! simulation. When an [`InvariantRegistry`] is attached, every render checks
//! it and a violation aborts the run with [`SimDriverError`].

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]
#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use bitmesh_app::{App, AppEvent, Driver};
use bitmesh_core::ConversationKey;

use crate::invariants::{InvariantRegistry, SystemSnapshot, Violation};

/// Error type for simulation driver.
#[derive(Debug, thiserror::Error)]
pub enum SimDriverError {
    /// An invariant failed at a render.
    #[error("{} invariant violation(s) at render {render}: {}", .violations.len(), summarize(.violations))]
    InvariantViolation {
        /// 1-based render count at which the check failed.
        render: usize,
        /// Every violation found.
        violations: Vec<Violation>,
    },
}

fn summarize(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Shared state for event injection and effect capture.
///
/// This allows injection from outside async contexts.
#[derive(Debug, Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    renders: usize,
    opened: Vec<ConversationKey>,
    notifications: Vec<(ConversationKey, u32)>,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share the same event queue and captured effects, so a test can
/// keep a handle while the runtime owns the driver.
#[derive(Debug, Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject several events, in order.
    pub fn inject_events(&self, events: impl IntoIterator<Item = AppEvent>) {
        self.lock().pending_events.extend(events);
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending_events.is_empty()
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    /// Conversations the runtime asked to open, in order.
    pub fn opened(&self) -> Vec<ConversationKey> {
        self.lock().opened.clone()
    }

    /// Notifications raised, in order.
    pub fn notifications(&self) -> Vec<(ConversationKey, u32)> {
        self.lock().notifications.clone()
    }

    /// Whether the runtime has stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().expect("sim driver mutex poisoned")
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let render = {
            let mut state = self.lock();
            state.renders += 1;
            state.renders
        };

        let Some(registry) = &self.invariants else {
            return Ok(());
        };

        registry.check_all(&SystemSnapshot::from_app(app)).map_err(|violations| {
            tracing::warn!(render, violations = violations.len(), "invariant violated");
            SimDriverError::InvariantViolation { render, violations }
        })
    }

    fn open_conversation(&mut self, conversation: &ConversationKey) -> Result<(), Self::Error> {
        self.lock().opened.push(conversation.clone());
        Ok(())
    }

    fn notify(&mut self, conversation: &ConversationKey, unread: u32) -> Result<(), Self::Error> {
        self.lock().notifications.push((conversation.clone(), unread));
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use bitmesh_app::AppConfig;

    use super::*;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::new();
        driver.inject_event(AppEvent::Tick);

        assert!(driver.has_pending());
    }

    #[test]
    fn clones_share_state() {
        let driver = SimDriver::new();
        let handle = driver.clone();
        handle.inject_events([AppEvent::Tick, AppEvent::Quit]);

        assert!(driver.has_pending());
    }

    #[test]
    fn render_counts_and_checks() {
        let mut driver = SimDriver::new().with_invariants(InvariantRegistry::standard());
        let app = App::new(AppConfig::new("self"));

        driver.render(&app).unwrap();
        driver.render(&app).unwrap();
        assert_eq!(driver.render_count(), 2);
    }

    #[test]
    fn captures_effects() {
        let mut driver = SimDriver::new();
        let peer = ConversationKey::private("peerA");

        driver.notify(&peer, 3).unwrap();
        driver.open_conversation(&peer).unwrap();
        driver.stop();

        assert_eq!(driver.notifications(), [(peer.clone(), 3)]);
        assert_eq!(driver.opened(), [peer]);
        assert!(driver.is_stopped());
    }
}
