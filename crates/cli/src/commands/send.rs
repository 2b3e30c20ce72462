use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgGroup, Args};
use tracing::{info, warn};
use unimail::{
    Attachment, CancellationToken, Client, EmailConfig, Message, SendContext,
    config_from_env,
};

use crate::OutputFormat;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("content").required(true).args(["body", "body_file"])))]
pub struct SendArgs {
    /// Sender address.
    #[arg(long)]
    pub from: String,
    /// Recipient address (repeatable or comma-separated).
    #[arg(long, required = true, value_delimiter = ',')]
    pub to: Vec<String>,
    /// Carbon-copy address.
    #[arg(long, value_delimiter = ',')]
    pub cc: Vec<String>,
    /// Blind carbon-copy address.
    #[arg(long, value_delimiter = ',')]
    pub bcc: Vec<String>,
    /// Subject line.
    #[arg(long)]
    pub subject: String,
    /// Message body.
    #[arg(long)]
    pub body: Option<String>,
    /// Read the message body from a file.
    #[arg(long)]
    pub body_file: Option<PathBuf>,
    /// Treat the body as HTML.
    #[arg(long)]
    pub html: bool,
    /// File to attach (repeatable).
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,
    /// Give up after this many seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
    /// TOML configuration file. Without it, configuration comes from the
    /// environment.
    #[arg(long, env = "UNIMAIL_CONFIG")]
    pub config: Option<PathBuf>,
}

impl SendArgs {
    fn message(&self) -> anyhow::Result<Message> {
        let body = match (&self.body, &self.body_file) {
            (Some(body), _) => body.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read body file {}", path.display()))?,
            (None, None) => anyhow::bail!("either --body or --body-file is required"),
        };

        let mut message = Message {
            from: self.from.clone(),
            to: self.to.clone(),
            cc: self.cc.clone(),
            bcc: self.bcc.clone(),
            subject: self.subject.clone(),
            body,
            is_html: self.html,
            attachments: Vec::with_capacity(self.attachments.len()),
        };
        for path in &self.attachments {
            let attachment = Attachment::from_path(path)
                .with_context(|| format!("failed to read attachment {}", path.display()))?;
            message = message.with_attachment(attachment);
        }
        Ok(message)
    }

    fn config(&self) -> anyhow::Result<EmailConfig> {
        let config = match &self.config {
            Some(path) => EmailConfig::from_file(path)?,
            None => config_from_env()?,
        };
        Ok(config)
    }
}

pub async fn run(args: &SendArgs, format: OutputFormat) -> anyhow::Result<()> {
    let message = args.message()?;
    let client = Client::new(&args.config()?)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling send");
            on_interrupt.cancel();
        }
    });

    let ctx = SendContext::with_timeout(Duration::from_secs(args.timeout)).with_cancellation(cancel);
    let receipt = client.send_with_context(&message, &ctx).await?;
    info!(provider = receipt.provider, "message sent");

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "ok": true,
                "provider": receipt.provider,
                "message_id": receipt.message_id,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => match &receipt.message_id {
            Some(id) => println!("Sent via {} (message id {id}).", receipt.provider),
            None => println!("Sent via {}.", receipt.provider),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        args: SendArgs,
    }

    fn parse(argv: &[&str]) -> Result<SendArgs, clap::Error> {
        let mut full = vec!["send"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).map(|h| h.args)
    }

    #[test]
    fn builds_message_from_flags() {
        let args = parse(&[
            "--from",
            "a@x.com",
            "--to",
            "b@y.com,c@y.com",
            "--to",
            "d@y.com",
            "--bcc",
            "e@y.com",
            "--subject",
            "Hi",
            "--body",
            "<p>hello</p>",
            "--html",
        ])
        .unwrap();

        let message = args.message().unwrap();
        assert_eq!(message.to, ["b@y.com", "c@y.com", "d@y.com"]);
        assert!(message.cc.is_empty());
        assert_eq!(message.bcc, ["e@y.com"]);
        assert!(message.is_html);
        assert!(message.validate().is_ok());
        assert_eq!(args.timeout, 30);
    }

    #[test]
    fn body_and_body_file_are_exclusive() {
        let err = parse(&[
            "--from", "a@x.com", "--to", "b@y.com", "--subject", "Hi", "--body", "x",
            "--body-file", "body.txt",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn body_is_required() {
        let err = parse(&["--from", "a@x.com", "--to", "b@y.com", "--subject", "Hi"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn reads_body_and_attachments_from_disk() {
        let dir = std::env::temp_dir().join(format!("unimail-cli-send-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let body = dir.join("body.txt");
        let attachment = dir.join("report.csv");
        std::fs::write(&body, "from a file").unwrap();
        std::fs::write(&attachment, "a,b\n").unwrap();

        let args = parse(&[
            "--from",
            "a@x.com",
            "--to",
            "b@y.com",
            "--subject",
            "Hi",
            "--body-file",
            body.to_str().unwrap(),
            "--attach",
            attachment.to_str().unwrap(),
        ])
        .unwrap();
        let message = args.message().unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(message.body, "from a file");
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].filename, "report.csv");
        assert_eq!(message.attachments[0].content_type(), "text/csv");
    }

    #[test]
    fn missing_attachment_is_reported() {
        let args = parse(&[
            "--from",
            "a@x.com",
            "--to",
            "b@y.com",
            "--subject",
            "Hi",
            "--body",
            "x",
            "--attach",
            "/nonexistent/file.pdf",
        ])
        .unwrap();
        let err = args.message().unwrap_err();
        assert!(err.to_string().contains("failed to read attachment"));
    }
}
