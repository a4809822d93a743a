//! Error and result type for the Mailjet transport.

use std::{error::Error as StdError, fmt};

use reqwest::StatusCode;

use crate::{address::AddressError, payload::Payload, BoxError};

// Inspired by https://github.com/seanmonstar/reqwest/blob/a8566383168c0ef06c21f38cbc9213af6ff6db31/src/error.rs

/// The errors that may occur when building a payload or sending it to
/// Mailjet.
///
/// The `Display` implementation composes the full diagnostic surface:
/// the error itself, a best-effort "sending a message to … from …" line
/// derived from the retained payload, and a description of the provider
/// response (status, reason and body).
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
    payload: Option<Payload>,
    response: Option<ResponseContext>,
}

/// The provider response retained on an error, for diagnostics.
struct ResponseContext {
    status: u16,
    reason: Option<&'static str>,
    body: String,
}

impl Error {
    fn new(kind: Kind, source: Option<BoxError>) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source,
                payload: None,
                response: None,
            }),
        }
    }

    fn with_payload(mut self, payload: Payload) -> Error {
        self.inner.payload = Some(payload);
        self
    }

    fn with_response(mut self, status: StatusCode, body: String) -> Error {
        self.inner.response = Some(ResponseContext {
            status: status.as_u16(),
            reason: status.canonical_reason(),
            body,
        });
        self
    }

    /// Returns true if the error comes from missing or invalid credentials.
    pub fn is_configuration(&self) -> bool {
        matches!(self.inner.kind, Kind::Configuration)
    }

    /// Returns true if an address string could not be parsed.
    pub fn is_malformed_address(&self) -> bool {
        matches!(self.inner.kind, Kind::MalformedAddress)
    }

    /// Returns true if Mailjet answered with a non-200 status.
    pub fn is_provider_rejected(&self) -> bool {
        matches!(self.inner.kind, Kind::ProviderRejected)
    }

    /// Returns true if a 200 response body failed to parse.
    pub fn is_invalid_response_body(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidResponseBody)
    }

    /// Returns true if the HTTP client itself failed before a response
    /// was received.
    pub fn is_connection(&self) -> bool {
        matches!(self.inner.kind, Kind::Connection)
    }

    /// The HTTP status code, if a provider response was received.
    pub fn status(&self) -> Option<u16> {
        self.inner.response.as_ref().map(|r| r.status)
    }

    /// The payload that was being sent, if the error occurred after
    /// building it.
    pub fn payload(&self) -> Option<&Payload> {
        self.inner.payload.as_ref()
    }

    /// The raw provider response body, if one was received.
    pub fn response_body(&self) -> Option<&str> {
        self.inner.response.as_ref().map(|r| r.body.as_str())
    }
}

#[derive(Debug)]
enum Kind {
    /// Missing or invalid credentials at construction
    Configuration,
    /// An address string could not be split into name and email
    MalformedAddress,
    /// Non-200 response from the provider
    ProviderRejected,
    /// 200 response whose body is not the expected JSON
    InvalidResponseBody,
    /// The HTTP client failed before receiving a response
    Connection,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("mailjet_transport::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(response) = &self.inner.response {
            builder.field("status", &response.status);
        }
        if let Some(source) = &self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Configuration => f.write_str("configuration error")?,
            Kind::MalformedAddress => f.write_str("malformed address")?,
            Kind::ProviderRejected => f.write_str("the Mailjet API rejected the message")?,
            Kind::InvalidResponseBody => {
                f.write_str("invalid JSON in Mailjet API response")?
            }
            Kind::Connection => f.write_str("connection error")?,
        };

        if let Some(e) = &self.inner.source {
            write!(f, ": {e}")?;
        }

        if let Some(payload) = &self.inner.payload {
            f.write_str("\nsending a message")?;
            let to_emails: Vec<&str> = payload.recipient_emails().collect();
            if !to_emails.is_empty() {
                write!(f, " to {}", to_emails.join(", "))?;
            }
            if !payload.from_email().is_empty() {
                write!(f, " from {}", payload.from_email())?;
            }
        }

        if let Some(response) = &self.inner.response {
            write!(f, "\nMailjet API response {}", response.status)?;
            if let Some(reason) = response.reason {
                write!(f, ": {reason}")?;
            }
            match serde_json::from_str::<serde_json::Value>(&response.body) {
                Ok(body) => {
                    let pretty =
                        serde_json::to_string_pretty(&body).unwrap_or_else(|_| response.body.clone());
                    write!(f, "\n{pretty}")?;
                }
                Err(_) if !response.body.is_empty() => write!(f, " {}", response.body)?,
                Err(_) => {}
            }
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn StdError + 'static) = &**e;
            r
        })
    }
}

pub(crate) fn configuration<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Configuration, Some(e.into()))
}

pub(crate) fn malformed_address(e: AddressError) -> Error {
    Error::new(Kind::MalformedAddress, Some(Box::new(e)))
}

pub(crate) fn connection(e: reqwest::Error, payload: Payload) -> Error {
    Error::new(Kind::Connection, Some(Box::new(e))).with_payload(payload)
}

pub(crate) fn provider_rejected(payload: Payload, status: StatusCode, body: String) -> Error {
    Error::new(Kind::ProviderRejected, None)
        .with_payload(payload)
        .with_response(status, body)
}

pub(crate) fn invalid_response_body(
    e: serde_json::Error,
    payload: Payload,
    status: StatusCode,
    body: String,
) -> Error {
    Error::new(Kind::InvalidResponseBody, Some(Box::new(e)))
        .with_payload(payload)
        .with_response(status, body)
}
