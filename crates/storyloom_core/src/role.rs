//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Who authored a conversation turn.
///
/// Serializes to the lowercase wire names used by chat-completion endpoints.
///
/// # Examples
///
/// ```
/// use storyloom_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::User), "user");
/// assert_eq!(Role::Assistant.as_str(), "assistant");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages provide context and instructions
    #[display("system")]
    System,
    /// User messages carry rendered prompts
    #[display("user")]
    User,
    /// Assistant messages carry model responses
    #[display("assistant")]
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}
