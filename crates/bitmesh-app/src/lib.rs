//! Application layer for bitmesh
//!
//! Event-driven state machine and generic runtime that feed transport,
//! location and UI events into the presence core, so the same orchestration
//! runs in the binary and in simulation.
//!
//! # Components
//!
//! - [`App`]: state machine owning the registry, presence aggregator and
//!   unread tracker for one session
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic orchestration loop using a Driver
//! - [`AppConfig`]: per-session configuration

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod config;
mod driver;
mod event;
mod runtime;

pub use action::AppAction;
pub use app::App;
pub use config::AppConfig;
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::Runtime;
