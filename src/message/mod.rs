//! Outbound message model and builder.

use std::collections::{BTreeMap, HashMap};

use mime::Mime;
use serde_json::Value;

pub use self::attachment::Attachment;
use crate::response::SendResponse;

pub mod attachment;

/// An alternative content part, such as an HTML rendering of the body.
///
/// Only the first part whose declared content type is exactly `text/html`
/// is picked up when building the payload; other parts are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    /// The part content.
    pub content: String,
    /// The declared content type of the part.
    pub content_type: Mime,
}

/// Mailjet-specific send options.
///
/// Every field is optional; absent fields are left out of the payload
/// entirely. `template_vars` maps to the top-level `Vars` payload key
/// (global template variables, as opposed to the per-recipient variables
/// carried on [`Message`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailjetOptions {
    /// Template to render the message with (`Mj-TemplateID`).
    pub template_id: Option<u64>,
    /// Enable template language processing (`Mj-TemplateLanguage`).
    pub template_language: Option<bool>,
    /// Address receiving templating error reports (`Mj-TemplateErrorReporting`).
    pub template_error_reporting: Option<String>,
    /// Deliver the message even on templating errors (`Mj-TemplateErrorDeliver`).
    pub template_error_deliver: Option<bool>,
    /// Campaign name (`Mj-Campaign`).
    pub campaign: Option<String>,
    /// Send at most one message per recipient within the campaign
    /// (`Mj-deduplicatecampaign`).
    pub deduplicate_campaign: Option<bool>,
    /// Open tracking mode (`Mj-trackopen`).
    pub track_open: Option<u8>,
    /// Click tracking mode (`Mj-trackclick`).
    pub track_click: Option<u8>,
    /// Caller-chosen message identifier (`Mj-CustomID`).
    pub custom_id: Option<String>,
    /// Opaque payload echoed back in events (`Mj-EventPayLoad`).
    pub event_payload: Option<String>,
    /// Global template variables (`Vars`).
    pub template_vars: Option<Value>,
}

/// An outbound email message.
///
/// Built with [`Message::builder`]. The message itself never touches the
/// network; [`MailjetTransport`][crate::MailjetTransport] reads it, and the
/// only field it writes back is the attached send [`response`][Message::response].
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub(crate) subject: String,
    pub(crate) body: String,
    pub(crate) from: String,
    pub(crate) to: Vec<String>,
    pub(crate) cc: Vec<String>,
    pub(crate) bcc: Vec<String>,
    pub(crate) reply_to: Vec<String>,
    pub(crate) extra_headers: BTreeMap<String, String>,
    pub(crate) alternatives: Vec<Alternative>,
    pub(crate) attachments: Vec<Attachment>,
    pub(crate) recipient_vars: HashMap<String, Value>,
    pub(crate) options: MailjetOptions,
    pub(crate) response: Option<SendResponse>,
}

impl Message {
    /// Creates a new message builder.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// Total number of recipients across to, cc and bcc.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// The provider response attached by the last send, if any.
    ///
    /// `None` until the message has been sent, and reset to `None` at the
    /// start of every send attempt, so a message that failed (or was
    /// skipped for having no recipients) carries no stale response.
    pub fn response(&self) -> Option<&SendResponse> {
        self.response.as_ref()
    }
}

/// Builder for [`Message`] instances.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    /// Set the sender address, as `Name <email>` or a bare email.
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.message.from = address.into();
        self
    }

    /// Add a primary recipient.
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.message.to.push(address.into());
        self
    }

    /// Add a carbon-copy recipient.
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.message.cc.push(address.into());
        self
    }

    /// Add a blind-carbon-copy recipient.
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.message.bcc.push(address.into());
        self
    }

    /// Add a reply-to address.
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.message.reply_to.push(address.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.subject = subject.into();
        self
    }

    /// Set the plain text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.message.body = body.into();
        self
    }

    /// Add a custom header. Applied after the synthesized `Reply-To`
    /// header, so a `Reply-To` added here overrides it.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.message.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Add an alternative content part.
    pub fn alternative(mut self, content: impl Into<String>, content_type: Mime) -> Self {
        self.message.alternatives.push(Alternative {
            content: content.into(),
            content_type,
        });
        self
    }

    /// Shorthand for adding a `text/html` alternative part.
    pub fn html(self, content: impl Into<String>) -> Self {
        self.alternative(content, mime::TEXT_HTML)
    }

    /// Add an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.message.attachments.push(attachment);
        self
    }

    /// Attach template variables to one recipient, keyed by the exact
    /// string passed to [`to`][MessageBuilder::to].
    pub fn recipient_vars(mut self, address: impl Into<String>, vars: Value) -> Self {
        self.message.recipient_vars.insert(address.into(), vars);
        self
    }

    /// Set the Mailjet-specific options.
    pub fn options(mut self, options: MailjetOptions) -> Self {
        self.message.options = options;
        self
    }

    /// Build the message.
    ///
    /// Never fails: addresses are parsed and validated when the payload is
    /// built, and a message without recipients is skipped at send time
    /// rather than rejected here.
    pub fn build(self) -> Message {
        self.message
    }
}
