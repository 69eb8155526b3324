//! Account settings: password change and the read-only data-collection flag.

use clap::{Args, Subcommand};

use idport_api_client::PortalClient;
use idport_client_core::session::AccountSession;

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: Option<SettingsCommand>,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings (default)
    Show,
    /// Change the account password (minimum 6 characters)
    SetPassword { password: String },
}

pub async fn run(
    args: SettingsArgs,
    session: &AccountSession,
    client: &PortalClient,
) -> anyhow::Result<()> {
    match args.command.unwrap_or(SettingsCommand::Show) {
        SettingsCommand::Show => {
            println!("Account");
            println!("  password: ********");
            println!(
                "  save sent attributes: {}",
                if session.profile.collect_data {
                    "on"
                } else {
                    "off"
                }
            );
            Ok(())
        }
        SettingsCommand::SetPassword { password } => {
            let message = session
                .change_password(client, &password)
                .await
                .map_err(|error| anyhow::anyhow!("{error}"))?;
            if message.is_empty() {
                println!("Password updated.");
            } else {
                println!("{message}");
            }
            Ok(())
        }
    }
}
