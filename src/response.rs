//! Parsed Mailjet send responses.

use serde::Deserialize;

/// The body of a successful send, attached to the message.
///
/// Mailjet reports one [`SentMessage`] per recipient. Unknown fields in
/// the body are ignored rather than rejected, so newer API revisions keep
/// deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendResponse {
    /// One entry per recipient the provider accepted.
    #[serde(rename = "Sent", default)]
    pub sent: Vec<SentMessage>,
}

/// A single accepted recipient.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SentMessage {
    /// The recipient address.
    #[serde(rename = "Email")]
    pub email: String,
    /// The provider-assigned message id.
    #[serde(rename = "MessageID")]
    pub message_id: u64,
}
