//! Channel identity.
//!
//! A client always has exactly one selected channel: either the transport-local
//! [`ChannelId::Mesh`] channel or a [`ChannelId::Location`] channel scoped to a
//! geohash cell. An absent selection means mesh; that rule lives in
//! [`ChannelId::from_selection`] and nowhere else.
//!
//! Named mesh channels (`#general`) that a user joins are a separate concept
//! and are identified by [`ChannelName`].

use std::{fmt, str::FromStr};

use crate::error::ChannelError;

/// Base32 alphabet used by geohashes (no `a`, `i`, `l`, `o`).
pub const GEOHASH_ALPHABET: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest geohash we accept. Twelve characters is sub-metre precision.
pub const MAX_GEOHASH_LEN: usize = 12;

/// Validated, lower-case geohash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Geohash(String);

impl Geohash {
    /// Parse and normalise a geohash. Input is case-insensitive.
    pub fn parse(input: &str) -> Result<Self, ChannelError> {
        let normalized = input.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ChannelError::EmptyGeohash);
        }
        if let Some(ch) = normalized.chars().find(|c| !GEOHASH_ALPHABET.contains(*c)) {
            return Err(ChannelError::InvalidGeohashChar { geohash: input.to_owned(), ch });
        }
        // Alphabet is ASCII, so bytes are characters from here on.
        if normalized.len() > MAX_GEOHASH_LEN {
            return Err(ChannelError::GeohashTooLong {
                len: normalized.len(),
                max: MAX_GEOHASH_LEN,
            });
        }
        Ok(Self(normalized))
    }

    /// Geohash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters, i.e. the cell precision level.
    pub fn precision(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Geohash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Geohash {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The selected channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelId {
    /// Transport-local mesh channel. Always present.
    #[default]
    Mesh,
    /// Location channel for a geohash cell.
    Location(Geohash),
}

impl ChannelId {
    /// Resolve an optional selection. `None` is the mesh channel.
    pub fn from_selection(selection: Option<ChannelId>) -> Self {
        selection.unwrap_or_default()
    }

    /// Geohash of a location channel. `None` for mesh.
    pub fn geohash(&self) -> Option<&Geohash> {
        match self {
            Self::Mesh => None,
            Self::Location(geohash) => Some(geohash),
        }
    }

    /// Whether this is the mesh channel.
    pub fn is_mesh(&self) -> bool {
        matches!(self, Self::Mesh)
    }
}

/// Badge text: `#mesh` or `#<geohash>`.
impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesh => f.write_str("#mesh"),
            Self::Location(geohash) => write!(f, "#{geohash}"),
        }
    }
}

/// Accepts `mesh`, `#mesh`, `<geohash>` and `#<geohash>`.
///
/// `mesh` is itself a valid geohash; the mesh channel takes precedence.
impl FromStr for ChannelId {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if bare.eq_ignore_ascii_case("mesh") {
            return Ok(Self::Mesh);
        }
        Geohash::parse(bare).map(Self::Location)
    }
}

/// Name of a joined mesh channel, normalised to a single leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelName(String);

impl ChannelName {
    /// Parse a channel name. `general` and `#general` are the same channel.
    pub fn parse(input: &str) -> Result<Self, ChannelError> {
        let bare = input.trim().trim_start_matches('#');
        if bare.is_empty() {
            return Err(ChannelError::EmptyChannelName);
        }
        Ok(Self(format!("#{bare}")))
    }

    /// Name including the leading `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelName {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
