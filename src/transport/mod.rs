//! Sends messages through the Mailjet v3 send API.
//!
//! The transport owns the credentials and a blocking HTTP client; both are
//! constructed once and reused for every dispatch. Batches are processed
//! strictly in order, one POST per message with at least one recipient.

use std::env;

use reqwest::{blocking::Client, StatusCode};
use tracing::{debug, warn};

use self::error::Error;
use crate::{message::Message, payload::Payload, response::SendResponse};

pub mod error;

/// The Mailjet v3 transactional send endpoint.
pub const DEFAULT_API_URL: &str = "https://api.mailjet.com/v3/send";

const ENV_API_KEY: &str = "MAILJET_API_KEY";
const ENV_API_SECRET: &str = "MAILJET_API_SECRET";

/// Sends [`Message`]s through Mailjet.
///
/// ```rust,no_run
/// use mailjet_transport::MailjetTransport;
///
/// # fn main() -> Result<(), mailjet_transport::Error> {
/// let transport = MailjetTransport::from_env()?.fail_silently(true);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MailjetTransport {
    client: Client,
    api_key: String,
    api_secret: String,
    api_url: String,
    fail_silently: bool,
}

impl MailjetTransport {
    /// Creates a transport from an API key and secret pair.
    ///
    /// Empty credentials are a configuration error, raised here rather
    /// than on first send. The fail-silently flag never suppresses this:
    /// without credentials there is no transport to fail silently with.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(error::configuration(
                "a Mailjet API key and secret are required",
            ));
        }

        let client = Client::builder().build().map_err(error::configuration)?;

        Ok(MailjetTransport {
            client,
            api_key,
            api_secret,
            api_url: DEFAULT_API_URL.to_string(),
            fail_silently: false,
        })
    }

    /// Creates a transport from the `MAILJET_API_KEY` and
    /// `MAILJET_API_SECRET` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        match (env::var(ENV_API_KEY), env::var(ENV_API_SECRET)) {
            (Ok(key), Ok(secret)) if !key.is_empty() && !secret.is_empty() => {
                Self::new(key, secret)
            }
            _ => Err(error::configuration(
                "MAILJET_API_KEY and MAILJET_API_SECRET must be set to use Mailjet",
            )),
        }
    }

    /// Swallow per-message send errors instead of propagating them.
    ///
    /// With this enabled, a failing message is simply not counted by
    /// [`send_all`][MailjetTransport::send_all] and the batch continues.
    pub fn fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    /// Override the send endpoint URL. Mainly useful for tests.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sends a single message.
    ///
    /// Returns `Ok(false)` without any network call when the message has
    /// no recipients at all. On success the parsed provider response is
    /// attached to the message and `Ok(true)` is returned. The
    /// fail-silently flag is not consulted here; it only affects
    /// [`send_all`][MailjetTransport::send_all].
    pub fn send(&self, message: &mut Message) -> Result<bool, Error> {
        message.response = None;

        if message.recipient_count() == 0 {
            debug!("skipping message without recipients");
            return Ok(false);
        }

        let payload = Payload::build(message)?;
        let response = self.post(&payload)?;
        message.response = Some(response);
        Ok(true)
    }

    /// Sends a batch of messages in order, returning how many succeeded.
    ///
    /// Messages without recipients are skipped and not counted. Without
    /// fail-silently, the first error aborts the batch: earlier messages
    /// keep their attached responses, later ones are never attempted.
    pub fn send_all(&self, messages: &mut [Message]) -> Result<usize, Error> {
        let mut sent = 0;
        for message in messages.iter_mut() {
            match self.send(message) {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) if self.fail_silently => {
                    warn!(error = %e, "message send failed, continuing batch");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(sent)
    }

    fn post(&self, payload: &Payload) -> Result<SendResponse, Error> {
        debug!(recipients = payload.recipients.len(), "posting send request");

        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(payload)
            .send()
            .map_err(|e| error::connection(e, payload.clone()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| error::connection(e, payload.clone()))?;

        if status != StatusCode::OK {
            return Err(error::provider_rejected(payload.clone(), status, body));
        }

        serde_json::from_str(&body)
            .map_err(|e| error::invalid_response_body(e, payload.clone(), status, body))
    }
}

#[cfg(test)]
mod test {
    use super::MailjetTransport;

    #[test]
    fn empty_credentials_are_a_configuration_error() {
        let error = MailjetTransport::new("", "secret").unwrap_err();
        assert!(error.is_configuration());

        let error = MailjetTransport::new("key", "").unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn transport_is_built_with_defaults() {
        let transport = MailjetTransport::new("key", "secret").unwrap();
        assert_eq!(transport.api_url, super::DEFAULT_API_URL);
        assert!(!transport.fail_silently);
    }
}
