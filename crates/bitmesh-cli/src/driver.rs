//! Driver that replays a script and logs every render.
//!
//! Lines are parsed lazily as the runtime polls, so a malformed line stops
//! the run at that point with a [`ScriptError`] carrying its line number.

use std::path::Path;

use bitmesh_app::{App, AppEvent, Driver};
use bitmesh_core::ConversationKey;

use crate::{ScriptError, StatusView, parse_line};

/// Script-replaying [`Driver`].
#[derive(Debug, Clone)]
pub struct ScriptDriver {
    lines: Vec<String>,
    /// Index of the next line to parse.
    cursor: usize,
    renders: usize,
    last_view: Option<StatusView>,
}

impl ScriptDriver {
    /// Load a script from disk.
    pub async fn open(path: &Path) -> Result<Self, ScriptError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ScriptError::Io { path: path.to_path_buf(), source })?;
        Ok(Self::from_source(&source))
    }

    /// Driver over an in-memory script.
    pub fn from_source(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_owned).collect(),
            cursor: 0,
            renders: 0,
            last_view: None,
        }
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// View produced by the most recent render.
    pub fn last_view(&self) -> Option<&StatusView> {
        self.last_view.as_ref()
    }
}

impl Driver for ScriptDriver {
    type Error = ScriptError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        while let Some(text) = self.lines.get(self.cursor) {
            self.cursor += 1;
            if let Some(event) = parse_line(self.cursor, text)? {
                tracing::trace!(line = self.cursor, ?event, "replaying");
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.renders += 1;
        let view = StatusView::from_app(app);

        if self.last_view.as_ref() == Some(&view) {
            tracing::trace!(render = self.renders, "view unchanged");
        } else {
            tracing::info!(render = self.renders, "{view}");
        }
        self.last_view = Some(view);
        Ok(())
    }

    fn open_conversation(&mut self, conversation: &ConversationKey) -> Result<(), Self::Error> {
        tracing::info!(conversation = %conversation, "opening conversation");
        Ok(())
    }

    fn notify(&mut self, conversation: &ConversationKey, unread: u32) -> Result<(), Self::Error> {
        tracing::info!(conversation = %conversation, unread, "new private message");
        Ok(())
    }

    fn stop(&mut self) {
        tracing::debug!(lines = self.cursor, renders = self.renders, "script driver stopped");
    }
}
