//! Message types for conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One role-tagged turn of a conversation.
///
/// # Examples
///
/// ```
/// use storyloom_core::{Message, Role};
///
/// let message = Message::user("Expand the next beat.");
/// assert_eq!(*message.role(), Role::User);
/// assert_eq!(message.content(), "Expand the next beat.");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct Message {
    /// The role of the message sender
    role: Role,
    /// The text of the turn
    content: String,
}

impl Message {
    /// Create a message with the given role and text.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}
