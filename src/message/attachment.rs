//! Attachment descriptor.

use mime::Mime;

/// A file attached to a [`Message`][crate::Message].
///
/// The content type may be declared explicitly; otherwise it is inferred
/// from the filename extension, falling back to `application/octet-stream`.
/// An attachment whose resolved type is an image and which carries a
/// content-id is treated as an inline attachment, referenced from the HTML
/// body by that content-id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    filename: Option<String>,
    content: Vec<u8>,
    content_type: Option<Mime>,
    content_id: Option<String>,
}

impl Attachment {
    /// Creates an attachment from raw content bytes.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Attachment {
            filename: None,
            content: content.into(),
            content_type: None,
            content_id: None,
        }
    }

    /// Set the filename offered to the recipient.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Declare the content type explicitly.
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Set the content-id, for attachments referenced from the HTML body.
    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    /// The raw content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The declared or inferred content type.
    pub(crate) fn resolved_content_type(&self) -> Mime {
        if let Some(content_type) = &self.content_type {
            return content_type.clone();
        }
        self.filename
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM)
    }

    pub(crate) fn is_inline(&self) -> bool {
        self.content_id.is_some() && self.resolved_content_type().type_() == mime::IMAGE
    }

    /// The name put on the wire: the content-id for inline attachments,
    /// the filename otherwise, defaulting to an empty string.
    pub(crate) fn wire_name(&self) -> String {
        let name = if self.is_inline() {
            self.content_id.as_deref()
        } else {
            self.filename.as_deref()
        };
        name.unwrap_or_default().to_string()
    }
}
