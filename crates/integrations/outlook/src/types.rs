use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use unimail_core::{Attachment, Message};

const FILE_ATTACHMENT_TYPE: &str = "#microsoft.graph.fileAttachment";

/// Body of `POST /users/{id}/sendMail`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest<'a> {
    pub message: GraphMessage<'a>,
    pub save_to_sent_items: bool,
}

impl<'a> SendMailRequest<'a> {
    /// Map a unimail message onto the Graph message resource.
    pub fn from_message(message: &'a Message, save_to_sent_items: bool) -> Self {
        Self {
            message: GraphMessage {
                subject: &message.subject,
                body: ItemBody {
                    content_type: if message.is_html {
                        BodyType::Html
                    } else {
                        BodyType::Text
                    },
                    content: &message.body,
                },
                to_recipients: recipients(&message.to),
                cc_recipients: recipients(&message.cc),
                bcc_recipients: recipients(&message.bcc),
                attachments: message.attachments.iter().map(FileAttachment::from).collect(),
            },
            save_to_sent_items,
        }
    }
}

/// The subset of the Graph `message` resource needed to send mail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMessage<'a> {
    pub subject: &'a str,
    pub body: ItemBody<'a>,
    pub to_recipients: Vec<Recipient<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc_recipients: Vec<Recipient<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc_recipients: Vec<Recipient<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<FileAttachment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody<'a> {
    pub content_type: BodyType,
    pub content: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyType {
    #[serde(rename = "HTML")]
    Html,
    Text,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient<'a> {
    pub email_address: EmailAddress<'a>,
}

#[derive(Debug, Serialize)]
pub struct EmailAddress<'a> {
    pub address: &'a str,
}

/// A `#microsoft.graph.fileAttachment` with inline base64 content.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment<'a> {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    pub name: &'a str,
    pub content_type: &'a str,
    pub content_bytes: String,
}

impl<'a> From<&'a Attachment> for FileAttachment<'a> {
    fn from(attachment: &'a Attachment) -> Self {
        Self {
            odata_type: FILE_ATTACHMENT_TYPE,
            name: &attachment.filename,
            content_type: attachment.content_type(),
            content_bytes: STANDARD.encode(&attachment.content),
        }
    }
}

fn recipients(addresses: &[String]) -> Vec<Recipient<'_>> {
    addresses
        .iter()
        .map(|address| Recipient {
            email_address: EmailAddress {
                address: address.as_str(),
            },
        })
        .collect()
}

/// Error envelope returned by Graph and the identity platform.
///
/// Graph nests `{code, message}` under `error`; the token endpoint uses flat
/// `error` / `error_description` fields.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    /// Best human-readable description available in the body.
    pub fn describe(&self) -> Option<String> {
        if let Some(description) = &self.error_description {
            return Some(description.clone());
        }
        match self.error.as_ref()? {
            serde_json::Value::String(code) => Some(code.clone()),
            serde_json::Value::Object(fields) => {
                let code = fields.get("code").and_then(serde_json::Value::as_str);
                let message = fields.get("message").and_then(serde_json::Value::as_str);
                match (code, message) {
                    (Some(code), Some(message)) => Some(format!("{code}: {message}")),
                    (Some(text), None) | (None, Some(text)) => Some(text.to_owned()),
                    (None, None) => None,
                }
            }
            _ => None,
        }
    }
}
