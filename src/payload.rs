//! Translation of a [`Message`] into the Mailjet v3 send payload.
//!
//! Building a payload is pure: no I/O happens here, and every address
//! problem is caught before a network call is ever made. Optional payload
//! keys are omitted from the JSON instead of being sent empty.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use serde_json::Value;

use crate::{
    address::Address,
    message::Message,
    transport::error::{self, Error},
};

/// The JSON body POSTed to the Mailjet send endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    #[serde(rename = "Subject", skip_serializing_if = "Option::is_none")]
    pub(crate) subject: Option<String>,
    #[serde(rename = "Text-part", skip_serializing_if = "Option::is_none")]
    pub(crate) text_part: Option<String>,
    #[serde(rename = "Html-part", skip_serializing_if = "Option::is_none")]
    pub(crate) html_part: Option<String>,
    #[serde(rename = "FromEmail")]
    pub(crate) from_email: String,
    #[serde(rename = "FromName")]
    pub(crate) from_name: String,
    #[serde(rename = "Recipients")]
    pub(crate) recipients: Vec<Recipient>,
    // Cc and bcc are passed through unparsed, unlike "to". Key casing
    // follows the provider API.
    #[serde(rename = "Cc", skip_serializing_if = "Vec::is_empty")]
    pub(crate) cc: Vec<String>,
    #[serde(rename = "bcc", skip_serializing_if = "Vec::is_empty")]
    pub(crate) bcc: Vec<String>,
    #[serde(rename = "Headers", skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) headers: BTreeMap<String, String>,
    #[serde(rename = "Mj-TemplateID", skip_serializing_if = "Option::is_none")]
    pub(crate) template_id: Option<u64>,
    #[serde(rename = "Mj-TemplateLanguage", skip_serializing_if = "Option::is_none")]
    pub(crate) template_language: Option<bool>,
    #[serde(
        rename = "Mj-TemplateErrorReporting",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) template_error_reporting: Option<String>,
    #[serde(
        rename = "Mj-TemplateErrorDeliver",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) template_error_deliver: Option<bool>,
    #[serde(rename = "Mj-Campaign", skip_serializing_if = "Option::is_none")]
    pub(crate) campaign: Option<String>,
    #[serde(
        rename = "Mj-deduplicatecampaign",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) deduplicate_campaign: Option<bool>,
    #[serde(rename = "Mj-trackopen", skip_serializing_if = "Option::is_none")]
    pub(crate) track_open: Option<u8>,
    #[serde(rename = "Mj-trackclick", skip_serializing_if = "Option::is_none")]
    pub(crate) track_click: Option<u8>,
    #[serde(rename = "Mj-CustomID", skip_serializing_if = "Option::is_none")]
    pub(crate) custom_id: Option<String>,
    #[serde(rename = "Mj-EventPayLoad", skip_serializing_if = "Option::is_none")]
    pub(crate) event_payload: Option<String>,
    #[serde(rename = "Vars", skip_serializing_if = "Option::is_none")]
    pub(crate) vars: Option<Value>,
    #[serde(rename = "Attachments", skip_serializing_if = "Vec::is_empty")]
    pub(crate) attachments: Vec<PayloadAttachment>,
    #[serde(rename = "Inline_attachments", skip_serializing_if = "Vec::is_empty")]
    pub(crate) inline_attachments: Vec<PayloadAttachment>,
}

/// One parsed entry of the `Recipients` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    #[serde(rename = "Email")]
    pub(crate) email: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(rename = "Vars", skip_serializing_if = "Option::is_none")]
    pub(crate) vars: Option<Value>,
}

/// One entry of the `Attachments` or `Inline_attachments` arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadAttachment {
    #[serde(rename = "Content-type")]
    pub(crate) content_type: String,
    #[serde(rename = "Filename")]
    pub(crate) filename: String,
    #[serde(rename = "content")]
    pub(crate) content: String,
}

impl Payload {
    /// Builds the payload for one message.
    ///
    /// Fails with a malformed-address error when the from, a "to" or a
    /// reply-to address cannot be parsed. Cc and bcc entries are passed
    /// through without parsing, mirroring the provider API's asymmetric
    /// treatment of recipient lists.
    pub fn build(message: &Message) -> Result<Payload, Error> {
        let from: Address = message.from.parse().map_err(error::malformed_address)?;

        let mut recipients = Vec::with_capacity(message.to.len());
        for raw in &message.to {
            let address: Address = raw.parse().map_err(error::malformed_address)?;
            recipients.push(Recipient {
                email: address.email().to_string(),
                name: address.name().map(str::to_string),
                // Vars are looked up by the raw input string, not the
                // parsed email.
                vars: message.recipient_vars.get(raw).cloned(),
            });
        }

        let mut headers = BTreeMap::new();
        if !message.reply_to.is_empty() {
            let mut sanitized = Vec::with_capacity(message.reply_to.len());
            for raw in &message.reply_to {
                let address: Address = raw.parse().map_err(error::malformed_address)?;
                sanitized.push(address.to_string());
            }
            headers.insert("Reply-To".to_string(), sanitized.join(", "));
        }
        // Extra headers are applied last so they can override Reply-To.
        headers.extend(
            message
                .extra_headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        let html_part = message
            .alternatives
            .iter()
            .find(|alt| alt.content_type == mime::TEXT_HTML)
            .map(|alt| alt.content.clone());

        let mut attachments = Vec::new();
        let mut inline_attachments = Vec::new();
        for attachment in &message.attachments {
            let encoded = PayloadAttachment {
                content_type: attachment.resolved_content_type().to_string(),
                filename: attachment.wire_name(),
                content: BASE64.encode(attachment.content()),
            };
            if attachment.is_inline() {
                inline_attachments.push(encoded);
            } else {
                attachments.push(encoded);
            }
        }

        let options = &message.options;
        Ok(Payload {
            subject: (!message.subject.is_empty()).then(|| message.subject.clone()),
            text_part: (!message.body.is_empty()).then(|| message.body.clone()),
            html_part,
            from_email: from.email().to_string(),
            from_name: from.name().unwrap_or_default().to_string(),
            recipients,
            cc: message.cc.clone(),
            bcc: message.bcc.clone(),
            headers,
            template_id: options.template_id,
            template_language: options.template_language,
            template_error_reporting: options.template_error_reporting.clone(),
            template_error_deliver: options.template_error_deliver,
            campaign: options.campaign.clone(),
            deduplicate_campaign: options.deduplicate_campaign,
            track_open: options.track_open,
            track_click: options.track_click,
            custom_id: options.custom_id.clone(),
            event_payload: options.event_payload.clone(),
            vars: options.template_vars.clone(),
            attachments,
            inline_attachments,
        })
    }

    pub(crate) fn recipient_emails(&self) -> impl Iterator<Item = &str> {
        self.recipients.iter().map(|r| r.email.as_str())
    }

    pub(crate) fn from_email(&self) -> &str {
        &self.from_email
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::Payload;
    use crate::message::{Attachment, MailjetOptions, Message};

    fn to_json(payload: &Payload) -> Value {
        serde_json::to_value(payload).unwrap()
    }

    fn base_message() -> crate::message::MessageBuilder {
        Message::builder()
            .from("Sender <sender@example.com>")
            .to("jane@example.com")
    }

    #[test]
    fn named_recipient_is_split() {
        let message = Message::builder()
            .from("sender@example.com")
            .to("Jane Doe <jane@example.com>")
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(
            json["Recipients"],
            json!([{"Email": "jane@example.com", "Name": "Jane Doe"}])
        );
        assert_eq!(json["FromEmail"], json!("sender@example.com"));
        assert_eq!(json["FromName"], json!(""));
    }

    #[test]
    fn empty_subject_and_body_keys_are_absent() {
        let message = base_message().build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert!(json.get("Subject").is_none());
        assert!(json.get("Text-part").is_none());
        assert!(json.get("Html-part").is_none());
        assert!(json.get("Headers").is_none());
        assert!(json.get("Attachments").is_none());
        assert!(json.get("Inline_attachments").is_none());
        assert!(json.get("Cc").is_none());
        assert!(json.get("bcc").is_none());
    }

    #[test]
    fn subject_and_body_are_set_when_non_empty() {
        let message = base_message().subject("Hi").body("Hello world").build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(json["Subject"], json!("Hi"));
        assert_eq!(json["Text-part"], json!("Hello world"));
    }

    #[test]
    fn malformed_from_fails_before_any_send() {
        let message = Message::builder()
            .from("not-an-address")
            .to("jane@example.com")
            .build();
        let error = Payload::build(&message).unwrap_err();
        assert!(error.is_malformed_address());
    }

    #[test]
    fn malformed_recipient_fails() {
        let message = base_message().to("Broken <>").build();
        assert!(Payload::build(&message).unwrap_err().is_malformed_address());
    }

    #[test]
    fn recipient_order_and_duplicates_are_kept() {
        let message = base_message()
            .to("jane@example.com")
            .to("a@example.com")
            .build();
        let payload = Payload::build(&message).unwrap();
        let emails: Vec<&str> = payload.recipient_emails().collect();
        assert_eq!(
            emails,
            vec!["jane@example.com", "jane@example.com", "a@example.com"]
        );
    }

    #[test]
    fn recipient_vars_are_keyed_by_raw_address() {
        let message = Message::builder()
            .from("sender@example.com")
            .to("Jane Doe <jane@example.com>")
            .to("john@example.com")
            .recipient_vars("Jane Doe <jane@example.com>", json!({"day": "Monday"}))
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(
            json["Recipients"],
            json!([
                {"Email": "jane@example.com", "Name": "Jane Doe", "Vars": {"day": "Monday"}},
                {"Email": "john@example.com"}
            ])
        );
    }

    #[test]
    fn cc_and_bcc_are_passed_through_unparsed() {
        let message = base_message()
            .cc("Copy Target <copy@example.com>")
            .bcc("hidden@example.com")
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(json["Cc"], json!(["Copy Target <copy@example.com>"]));
        assert_eq!(json["bcc"], json!(["hidden@example.com"]));
    }

    #[test]
    fn reply_to_is_sanitized_and_joined() {
        let message = base_message()
            .reply_to("  Support <support@example.com> ")
            .reply_to("help@example.com")
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(
            json["Headers"]["Reply-To"],
            json!("Support <support@example.com>, help@example.com")
        );
    }

    #[test]
    fn extra_headers_override_reply_to() {
        let message = base_message()
            .reply_to("support@example.com")
            .header("Reply-To", "override@example.com")
            .header("X-Campaign-Run", "42")
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(
            json["Headers"],
            json!({"Reply-To": "override@example.com", "X-Campaign-Run": "42"})
        );
    }

    #[test]
    fn options_map_to_provider_keys() {
        let message = base_message()
            .options(MailjetOptions {
                template_id: Some(12345),
                template_language: Some(true),
                campaign: Some("spring".to_string()),
                deduplicate_campaign: Some(true),
                track_open: Some(2),
                track_click: Some(1),
                custom_id: Some("run-7".to_string()),
                event_payload: Some("batch=7".to_string()),
                template_vars: Some(json!({"greeting": "Hello"})),
                ..Default::default()
            })
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(json["Mj-TemplateID"], json!(12345));
        assert_eq!(json["Mj-TemplateLanguage"], json!(true));
        assert_eq!(json["Mj-Campaign"], json!("spring"));
        assert_eq!(json["Mj-deduplicatecampaign"], json!(true));
        assert_eq!(json["Mj-trackopen"], json!(2));
        assert_eq!(json["Mj-trackclick"], json!(1));
        assert_eq!(json["Mj-CustomID"], json!("run-7"));
        assert_eq!(json["Mj-EventPayLoad"], json!("batch=7"));
        assert_eq!(json["Vars"], json!({"greeting": "Hello"}));
        assert!(json.get("Mj-TemplateErrorReporting").is_none());
        assert!(json.get("Mj-TemplateErrorDeliver").is_none());
    }

    #[test]
    fn first_html_alternative_wins() {
        let message = base_message()
            .alternative("ignored", mime::TEXT_PLAIN)
            .html("<p>first</p>")
            .html("<p>second</p>")
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(json["Html-part"], json!("<p>first</p>"));
    }

    #[test]
    fn non_exact_html_types_are_ignored() {
        let message = base_message()
            .alternative(
                "<p>with charset</p>",
                "text/html; charset=utf-8".parse().unwrap(),
            )
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert!(json.get("Html-part").is_none());
    }

    #[test]
    fn attachments_are_partitioned_and_encoded() {
        let message = base_message()
            .attachment(
                Attachment::new(b"%PDF-1.4".as_slice()).filename("report.pdf"),
            )
            .attachment(
                Attachment::new(b"png-bytes".as_slice())
                    .filename("logo.png")
                    .content_id("logo"),
            )
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(
            json["Attachments"],
            json!([{
                "Content-type": "application/pdf",
                "Filename": "report.pdf",
                "content": "JVBERi0xLjQ="
            }])
        );
        assert_eq!(
            json["Inline_attachments"],
            json!([{
                "Content-type": "image/png",
                "Filename": "logo",
                "content": "cG5nLWJ5dGVz"
            }])
        );
    }

    #[test]
    fn attachment_without_type_or_filename_falls_back() {
        let message = base_message()
            .attachment(Attachment::new(b"raw".as_slice()))
            .build();
        let json = to_json(&Payload::build(&message).unwrap());

        assert_eq!(
            json["Attachments"],
            json!([{
                "Content-type": "application/octet-stream",
                "Filename": "",
                "content": "cmF3"
            }])
        );
    }
}
