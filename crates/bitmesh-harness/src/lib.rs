//! Simulation harness for bitmesh testing.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the App built
//! from plain vectors and linear scans. Events are applied to both the model
//! and the real App, and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! registry, presence and unread invariants.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_driver;
pub mod strategies;

pub use invariants::{
    Invariant, InvariantKind, InvariantRegistry, InvariantResult, NoZeroUnreadEntries,
    OpenConversationHasNoUnread, PresenceMatchesInputs, RegionPartition, SystemSnapshot,
    UniqueGroupIds, Violation,
};
pub use model::{ObservableState, ReferenceModel};
pub use sim_driver::{SimDriver, SimDriverError};
