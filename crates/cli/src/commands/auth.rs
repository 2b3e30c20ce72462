use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::info;
use unimail::GmailAuthHelper;

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Run the Gmail consent flow and store the resulting token.
    Gmail {
        /// OAuth client file downloaded from the Google Cloud Console.
        #[arg(long, env = "GMAIL_CREDENTIALS_FILE")]
        credentials: PathBuf,
        /// Where to write the token.
        #[arg(long, env = "GMAIL_TOKEN_FILE", default_value = "token.json")]
        output: PathBuf,
    },
}

pub async fn run(args: &AuthArgs) -> anyhow::Result<()> {
    match &args.command {
        AuthCommand::Gmail {
            credentials,
            output,
        } => {
            let helper = GmailAuthHelper::from_file(credentials)?;
            let token = helper.authenticate_interactive().await?;
            write_token(output, &token)?;
            info!(path = %output.display(), "stored Gmail token");
            println!("Token saved to {}.", output.display());
            Ok(())
        }
    }
}

fn write_token(path: &Path, token: &str) -> anyhow::Result<()> {
    std::fs::write(path, token)
        .with_context(|| format!("failed to write token file {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_token_file() {
        let dir = std::env::temp_dir().join(format!("unimail-cli-auth-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("token.json");

        write_token(&path, r#"{"access_token":"a"}"#).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"access_token":"a"}"#
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
