//! Line-oriented event scripts.
//!
//! Each non-blank line that does not start with `//` is one command. The
//! first word selects the command, the rest are arguments:
//!
//! | command | event |
//! |---|---|
//! | `transport <on\|off>` | transport connectivity |
//! | `peers [peer...]` | connected peer list (may be empty) |
//! | `session <peer> <state>` | handshake state label |
//! | `group <id> <region> <creator> <name...>` | group advertisement |
//! | `join <channel>` / `leave <channel>` | joined channel set |
//! | `select <mesh\|geohash\|none>` | selected channel |
//! | `participants <geohash> [peer...]` | geohash participant list |
//! | `message <conversation>` | message arrival |
//! | `open <conversation>` / `close` | open conversation |
//! | `open-latest [private]` | jump to latest unread |
//! | `tick` / `quit` | |
//!
//! A conversation is `@peer`, `#channel`, or `public <mesh|geohash>` for the
//! public chat of the mesh or a geohash cell.

use std::path::PathBuf;

use bitmesh_app::AppEvent;
use bitmesh_core::{
    ChannelError, ChannelId, ChannelName, ConversationKey, Geohash, GroupInfo, PeerId,
    SessionState,
};

/// Errors reading or parsing a script. Line numbers are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Script file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// First word is not a known command.
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand {
        /// Line number.
        line: usize,
        /// The unrecognised word.
        command: String,
    },

    /// A required argument is absent.
    #[error("line {line}: {command} expects {expected}")]
    MissingArgument {
        /// Line number.
        line: usize,
        /// Command being parsed.
        command: &'static str,
        /// Description of the missing argument.
        expected: &'static str,
    },

    /// A flag is not `on`/`off`.
    #[error("line {line}: expected on or off, got {value:?}")]
    BadBoolean {
        /// Line number.
        line: usize,
        /// The offending word.
        value: String,
    },

    /// A conversation is not `@peer`, `#channel` or `public <channel>`.
    #[error("line {line}: expected @peer, #channel or public <channel>, got {value:?}")]
    InvalidConversation {
        /// Line number.
        line: usize,
        /// The offending word.
        value: String,
    },

    /// A channel, channel name or geohash failed validation.
    #[error("line {line}: {source}")]
    InvalidChannel {
        /// Line number.
        line: usize,
        /// Validation failure.
        #[source]
        source: ChannelError,
    },
}

/// Parse a whole script into events.
pub fn parse_script(source: &str) -> Result<Vec<AppEvent>, ScriptError> {
    let mut events = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if let Some(event) = parse_line(index + 1, line)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Parse one script line. `None` for blank lines and comments.
pub fn parse_line(line: usize, text: &str) -> Result<Option<AppEvent>, ScriptError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with("//") {
        return Ok(None);
    }

    let mut words = text.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let mut args = Args { line, command: "", words };

    let event = match command {
        "tick" => AppEvent::Tick,
        "quit" => AppEvent::Quit,
        "close" => AppEvent::ConversationClosed,
        "transport" => {
            args.command = "transport";
            let value = args.required("on or off")?;
            AppEvent::TransportStatus { connected: parse_flag(line, value)? }
        },
        "peers" => AppEvent::PeersChanged { peers: args.peers() },
        "session" => {
            args.command = "session";
            let peer = PeerId::from(args.required("a peer id")?);
            let state = SessionState::from_label(args.required("a session state")?);
            AppEvent::SessionChanged { peer, state }
        },
        "group" => {
            args.command = "group";
            let id = args.required("a group id")?;
            let region = args.required("a region")?;
            let creator = args.required("a creator peer id")?;
            let name = args.rest();
            if name.is_empty() {
                return Err(args.missing("a group name"));
            }
            AppEvent::GroupAdvertised(GroupInfo::observed_now(id, name, region, creator))
        },
        "join" => {
            args.command = "join";
            AppEvent::ChannelJoined(args.channel_name()?)
        },
        "leave" => {
            args.command = "leave";
            AppEvent::ChannelLeft(args.channel_name()?)
        },
        "select" => {
            args.command = "select";
            let value = args.required("mesh, a geohash or none")?;
            let selection = if value == "none" {
                None
            } else {
                Some(value.parse::<ChannelId>().map_err(|source| invalid(line, source))?)
            };
            AppEvent::ChannelSelected(selection)
        },
        "participants" => {
            args.command = "participants";
            let value = args.required("a geohash")?;
            let geohash = Geohash::parse(value).map_err(|source| invalid(line, source))?;
            AppEvent::GeohashParticipants { geohash, peers: args.peers() }
        },
        "message" => {
            args.command = "message";
            AppEvent::MessageArrived(args.conversation()?)
        },
        "open" => {
            args.command = "open";
            AppEvent::ConversationOpened(args.conversation()?)
        },
        "open-latest" => match args.words.next() {
            None => AppEvent::OpenLatestUnread { private_only: false },
            Some("private") => AppEvent::OpenLatestUnread { private_only: true },
            Some(other) => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    command: format!("open-latest {other}"),
                });
            },
        },
        other => return Err(ScriptError::UnknownCommand { line, command: other.to_owned() }),
    };

    Ok(Some(event))
}

/// Remaining words of one line.
struct Args<'a> {
    line: usize,
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn required(&mut self, expected: &'static str) -> Result<&'a str, ScriptError> {
        self.words.next().ok_or_else(|| self.missing(expected))
    }

    fn missing(&self, expected: &'static str) -> ScriptError {
        ScriptError::MissingArgument { line: self.line, command: self.command, expected }
    }

    fn rest(&mut self) -> String {
        self.words.by_ref().collect::<Vec<_>>().join(" ")
    }

    fn peers(&mut self) -> Vec<PeerId> {
        self.words.by_ref().map(PeerId::from).collect()
    }

    fn channel_name(&mut self) -> Result<ChannelName, ScriptError> {
        let value = self.required("a channel name")?;
        ChannelName::parse(value).map_err(|source| invalid(self.line, source))
    }

    fn conversation(&mut self) -> Result<ConversationKey, ScriptError> {
        let value = self.required("@peer, #channel or public <channel>")?;
        if value == "public" {
            let channel = self.required("mesh or a geohash")?;
            return channel
                .parse::<ChannelId>()
                .map(ConversationKey::Public)
                .map_err(|source| invalid(self.line, source));
        }
        if let Some(peer) = value.strip_prefix('@').filter(|p| !p.is_empty()) {
            return Ok(ConversationKey::private(peer));
        }
        if value.starts_with('#') {
            let channel = ChannelName::parse(value).map_err(|source| invalid(self.line, source))?;
            return Ok(ConversationKey::Channel(channel));
        }
        Err(ScriptError::InvalidConversation { line: self.line, value: value.to_owned() })
    }
}

fn parse_flag(line: usize, value: &str) -> Result<bool, ScriptError> {
    match value {
        "on" | "up" | "true" => Ok(true),
        "off" | "down" | "false" => Ok(false),
        other => Err(ScriptError::BadBoolean { line, value: other.to_owned() }),
    }
}

fn invalid(line: usize, source: ChannelError) -> ScriptError {
    ScriptError::InvalidChannel { line, source }
}
