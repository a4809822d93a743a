//! Mailjet transactional email transport.
//!
//! This crate translates a generic outbound email message into the JSON
//! payload expected by Mailjet's v3 send API, dispatches it over a single
//! blocking HTTP POST and maps the provider response back into a typed
//! result or error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mailjet_transport::{MailjetTransport, Message};
//!
//! # fn main() -> Result<(), mailjet_transport::Error> {
//! let transport = MailjetTransport::new("api-key", "api-secret")?;
//!
//! let mut message = Message::builder()
//!     .from("Sender <sender@example.com>")
//!     .to("Jane Doe <jane@example.com>")
//!     .subject("Hello")
//!     .body("Hello world!")
//!     .build();
//!
//! let sent = transport.send_all(std::slice::from_mut(&mut message))?;
//! assert_eq!(sent, 1);
//! # Ok(())
//! # }
//! ```
//!
//! Batch sends are strictly sequential. With [`MailjetTransport::fail_silently`]
//! enabled, per-message failures are swallowed and reported only through the
//! returned success count; otherwise the first failure aborts the batch.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod address;
pub mod message;
pub mod payload;
pub mod response;
pub mod transport;

pub use crate::{
    address::{Address, AddressError},
    message::{Alternative, Attachment, MailjetOptions, Message, MessageBuilder},
    payload::Payload,
    response::{SendResponse, SentMessage},
    transport::{error::Error, MailjetTransport},
};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
