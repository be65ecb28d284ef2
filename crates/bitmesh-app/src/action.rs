//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use bitmesh_core::ConversationKey;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Show a conversation chosen by the app (e.g. "open latest unread").
    OpenConversation {
        /// Conversation to show.
        conversation: ConversationKey,
    },

    /// Raise a notification for a private message outside the open
    /// conversation.
    Notify {
        /// Conversation that received the message.
        conversation: ConversationKey,
        /// Unread count after the arrival.
        unread: u32,
    },

    /// Quit the application.
    Quit,
}
