//! Error types for identifier parsing.
//!
//! The presence components themselves are total: duplicate group
//! advertisements and empty unread queues are ordinary outcomes, not errors.
//! Fallibility only exists where untrusted text becomes a typed identifier.

use thiserror::Error;

/// Errors produced when parsing channel identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Geohash string was empty.
    #[error("geohash is empty")]
    EmptyGeohash,

    /// Geohash exceeded the maximum supported precision.
    #[error("geohash has {len} characters, maximum is {max}")]
    GeohashTooLong {
        /// Length of the rejected input.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Geohash contained a character outside the base32 geohash alphabet.
    #[error("invalid geohash character {ch:?} in {geohash:?}")]
    InvalidGeohashChar {
        /// The rejected input.
        geohash: String,
        /// First offending character.
        ch: char,
    },

    /// Channel name was empty (or only `#`).
    #[error("channel name is empty")]
    EmptyChannelName,
}
