//! RFC 2822 message encoding.
//!
//! Turns a [`Message`] into the raw text of an email: a header block, then
//! either the body on its own or a `multipart/mixed` structure carrying the
//! body and base64 attachments. Lines end in CRLF. The encoder does not wrap
//! the result in any transport framing.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::message::{Attachment, Message};

const CRLF: &str = "\r\n";

/// Maximum encoded line length for base64 bodies (RFC 2045).
pub const BASE64_LINE_LENGTH: usize = 76;

/// Fallback MIME type for unknown or missing file extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

static BOUNDARY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Encode a message, generating a fresh boundary when it has attachments.
pub fn encode(message: &Message) -> String {
    if message.attachments.is_empty() {
        encode_single_part(message)
    } else {
        encode_multipart(message, &generate_boundary())
    }
}

/// Encode a message using the given multipart boundary.
///
/// The boundary is only used when the message has attachments.
pub fn encode_with_boundary(message: &Message, boundary: &str) -> String {
    if message.attachments.is_empty() {
        encode_single_part(message)
    } else {
        encode_multipart(message, boundary)
    }
}

/// Generate a boundary token that is unique within this process.
pub fn generate_boundary() -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    let sequence = BOUNDARY_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("boundary-{nanos}-{sequence}")
}

/// Infer a MIME type from a filename's extension.
///
/// Matching is case-insensitive. Unknown extensions and names without one
/// map to [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain",
        Some("html" | "htm") => "text/html",
        Some("zip") => "application/zip",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("json") => "application/json",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

fn encode_single_part(message: &Message) -> String {
    let mut out = String::with_capacity(message.body.len() + 256);
    write_envelope_headers(&mut out, message);
    write_header(&mut out, "Content-Type", message.body_content_type());
    out.push_str(CRLF);
    out.push_str(&message.body);
    out
}

fn encode_multipart(message: &Message, boundary: &str) -> String {
    let mut out = String::new();
    write_envelope_headers(&mut out, message);
    write_header(
        &mut out,
        "Content-Type",
        &format!("multipart/mixed; boundary={boundary}"),
    );
    out.push_str(CRLF);

    write_boundary(&mut out, boundary);
    write_header(&mut out, "Content-Type", message.body_content_type());
    out.push_str(CRLF);
    out.push_str(&message.body);
    out.push_str(CRLF);
    out.push_str(CRLF);

    for attachment in &message.attachments {
        write_attachment(&mut out, attachment, boundary);
    }

    out.push_str("--");
    out.push_str(boundary);
    out.push_str("--");
    out.push_str(CRLF);
    out
}

fn write_envelope_headers(out: &mut String, message: &Message) {
    write_header(out, "From", &message.from);
    write_header(out, "To", &message.to.join(", "));
    if !message.cc.is_empty() {
        write_header(out, "Cc", &message.cc.join(", "));
    }
    if !message.bcc.is_empty() {
        write_header(out, "Bcc", &message.bcc.join(", "));
    }
    write_header(out, "Subject", &message.subject);
    write_header(out, "MIME-Version", "1.0");
}

fn write_attachment(out: &mut String, attachment: &Attachment, boundary: &str) {
    let filename = &attachment.filename;

    write_boundary(out, boundary);
    write_header(
        out,
        "Content-Type",
        &format!("{}; name=\"{filename}\"", attachment.content_type()),
    );
    write_header(out, "Content-Transfer-Encoding", "base64");
    write_header(
        out,
        "Content-Disposition",
        &format!("attachment; filename=\"{filename}\""),
    );
    out.push_str(CRLF);

    let encoded = STANDARD.encode(&attachment.content);
    for start in (0..encoded.len()).step_by(BASE64_LINE_LENGTH) {
        let end = (start + BASE64_LINE_LENGTH).min(encoded.len());
        out.push_str(&encoded[start..end]);
        out.push_str(CRLF);
    }
    out.push_str(CRLF);
}

fn write_boundary(out: &mut String, boundary: &str) {
    out.push_str("--");
    out.push_str(boundary);
    out.push_str(CRLF);
}

fn write_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str(CRLF);
}
