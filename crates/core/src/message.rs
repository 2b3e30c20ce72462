use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mime::content_type_for;

/// A provider-agnostic outbound email.
///
/// Messages are plain values: build one, hand it to a client, and it is
/// treated as read-only from then on. Only presence of the required fields is
/// checked by [`validate`](Self::validate); address syntax is left to the
/// provider.
///
/// # Examples
///
/// ```
/// use unimail_core::{Attachment, Message};
///
/// let message = Message::new("a@x.com", "b@y.com", "Hi", "Hello")
///     .with_cc("c@z.com")
///     .with_attachment(Attachment::new("notes.txt", b"remember".to_vec()));
/// assert!(message.validate().is_ok());
/// assert_eq!(message.attachments.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender address.
    pub from: String,

    /// Primary recipients, in order.
    pub to: Vec<String>,

    /// Carbon-copy recipients.
    #[serde(default)]
    pub cc: Vec<String>,

    /// Blind carbon-copy recipients.
    #[serde(default)]
    pub bcc: Vec<String>,

    /// Subject line.
    pub subject: String,

    /// Message body, plain text or HTML depending on `is_html`.
    pub body: String,

    /// Whether `body` is HTML.
    #[serde(default)]
    pub is_html: bool,

    /// File attachments, in order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Create a plain-text message with a single recipient.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: vec![to.into()],
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Add another primary recipient.
    #[must_use]
    pub fn with_to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Add a carbon-copy recipient.
    #[must_use]
    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a blind carbon-copy recipient.
    #[must_use]
    pub fn with_bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Mark the body as HTML.
    #[must_use]
    pub fn html(mut self) -> Self {
        self.is_html = true;
        self
    }

    /// Append an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Check that all required fields are present.
    ///
    /// Returns the first violation found, in the order `from`, `to`,
    /// `subject`, `body`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.from.is_empty() {
            return Err(ValidationError::MissingFrom);
        }
        if self.to.is_empty() {
            return Err(ValidationError::MissingRecipient);
        }
        if self.subject.is_empty() {
            return Err(ValidationError::MissingSubject);
        }
        if self.body.is_empty() {
            return Err(ValidationError::MissingBody);
        }
        Ok(())
    }

    /// MIME type of the body part, including the charset parameter.
    pub fn body_content_type(&self) -> &'static str {
        if self.is_html {
            "text/html; charset=utf-8"
        } else {
            "text/plain; charset=utf-8"
        }
    }
}

/// A file embedded in a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name shown to the recipient; also drives content-type inference.
    pub filename: String,

    /// Raw file bytes. Serialized as standard base64.
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,

    /// Explicit MIME type. Inferred from `filename` when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Attachment {
    /// Create an attachment whose MIME type is inferred from the filename.
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            mime_type: None,
        }
    }

    /// Read an attachment from disk, named after the file's last path
    /// component.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("path has no file name: {}", path.display()),
                )
            })?;
        Ok(Self::new(filename, content))
    }

    /// Set an explicit MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The explicit MIME type, or the one inferred from the filename.
    pub fn content_type(&self) -> &str {
        match self.mime_type.as_deref() {
            Some(mime) if !mime.is_empty() => mime,
            _ => content_type_for(&self.filename),
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_message() -> Message {
        Message::new("a@x.com", "b@y.com", "Hi", "Hello")
    }

    #[test]
    fn valid_message_passes() {
        assert_eq!(valid_message().validate(), Ok(()));
    }

    #[test]
    fn missing_from_reported_regardless_of_other_fields() {
        let message = Message::default();
        assert_eq!(message.validate(), Err(ValidationError::MissingFrom));

        let mut message = valid_message();
        message.from.clear();
        assert_eq!(message.validate(), Err(ValidationError::MissingFrom));
    }

    #[test]
    fn missing_recipient_checked_before_subject_and_body() {
        let mut message = valid_message();
        message.to.clear();
        assert_eq!(message.validate(), Err(ValidationError::MissingRecipient));

        let message = Message {
            from: "a@x.com".into(),
            ..Message::default()
        };
        assert_eq!(message.validate(), Err(ValidationError::MissingRecipient));
    }

    #[test]
    fn missing_subject_reported_when_sender_and_recipient_present() {
        let mut message = valid_message();
        message.subject.clear();
        assert_eq!(message.validate(), Err(ValidationError::MissingSubject));
    }

    #[test]
    fn missing_body() {
        let mut message = valid_message();
        message.body.clear();
        assert_eq!(message.validate(), Err(ValidationError::MissingBody));
    }

    #[test]
    fn cc_bcc_and_attachments_do_not_affect_validity() {
        let message = valid_message();
        assert!(message.cc.is_empty());
        assert!(message.bcc.is_empty());
        assert!(message.attachments.is_empty());
        assert!(message.validate().is_ok());
    }

    #[test]
    fn malformed_addresses_are_accepted() {
        let message = Message::new("not an address", "also not", "Hi", "Hello");
        assert!(message.validate().is_ok());
    }

    #[test]
    fn builder_appends_in_order() {
        let message = valid_message()
            .with_to("c@y.com")
            .with_cc("d@y.com")
            .with_bcc("e@y.com")
            .html();
        assert_eq!(message.to, vec!["b@y.com", "c@y.com"]);
        assert_eq!(message.cc, vec!["d@y.com"]);
        assert_eq!(message.bcc, vec!["e@y.com"]);
        assert!(message.is_html);
        assert_eq!(message.body_content_type(), "text/html; charset=utf-8");
    }

    #[test]
    fn attachment_content_type_prefers_explicit_value() {
        let inferred = Attachment::new("report.pdf", Vec::new());
        assert_eq!(inferred.content_type(), "application/pdf");

        let explicit = Attachment::new("report.pdf", Vec::new()).with_mime_type("text/x-custom");
        assert_eq!(explicit.content_type(), "text/x-custom");

        let blank = Attachment::new("data.bin", Vec::new()).with_mime_type("");
        assert_eq!(blank.content_type(), "application/octet-stream");
    }

    #[test]
    fn attachment_from_path_uses_file_name() {
        let dir = std::env::temp_dir().join(format!("unimail-core-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("invoice.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();

        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.filename, "invoice.csv");
        assert_eq!(attachment.content, b"a,b\n1,2\n");
        assert_eq!(attachment.content_type(), "text/csv");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn attachment_from_missing_path_fails() {
        let result = Attachment::from_path("/definitely/not/here.txt");
        assert!(result.is_err());
    }

    #[test]
    fn message_deserializes_with_defaults() {
        let json = serde_json::json!({
            "from": "a@x.com",
            "to": ["b@y.com"],
            "subject": "Hi",
            "body": "Hello",
            "attachments": [{ "filename": "hello.txt", "content": "SGVsbG8=" }]
        });
        let message: Message = serde_json::from_value(json).unwrap();
        assert!(message.cc.is_empty());
        assert!(!message.is_html);
        assert_eq!(message.attachments[0].content, b"Hello");
        assert!(message.attachments[0].mime_type.is_none());
    }

    #[test]
    fn attachment_with_invalid_base64_fails_to_deserialize() {
        let json = serde_json::json!({ "filename": "x.bin", "content": "***" });
        let result = serde_json::from_value::<Attachment>(json);
        assert!(result.is_err());
    }
}
