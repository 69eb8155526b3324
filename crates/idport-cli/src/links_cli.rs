//! Linked sign-in providers: list, link (prints the navigation URL the
//! browser must follow) and unlink.

use clap::{Args, Subcommand};

use idport_api_client::PortalClient;
use idport_client_core::profile::{LinkedProvider, mask_email};
use idport_client_core::session::AccountSession;

#[derive(Args)]
pub struct LinksArgs {
    #[command(subcommand)]
    pub command: Option<LinksCommand>,
}

#[derive(Subcommand)]
pub enum LinksCommand {
    /// Show linked and linkable providers (default)
    List,
    /// Print the URL that links another provider to this account
    Link { provider: String },
    /// Remove a provider link
    Unlink { provider: String },
}

fn parse_provider(raw: &str) -> anyhow::Result<LinkedProvider> {
    LinkedProvider::parse(raw)
        .ok_or_else(|| anyhow::anyhow!("unknown provider {raw}; expected discord, github, google or twitch"))
}

pub async fn run(
    args: LinksArgs,
    session: &mut AccountSession,
    client: &PortalClient,
) -> anyhow::Result<()> {
    match args.command.unwrap_or(LinksCommand::List) {
        LinksCommand::List => {
            if let Some(email) = &session.profile.email {
                println!("E-mail  {}", mask_email(email));
            }
            for provider in session.profile.linked_providers() {
                let id = session.profile.provider_id(provider).unwrap_or_default();
                println!("{:<7} ID: {id}", provider.as_str());
            }
            let unlinked = session.profile.unlinked_providers();
            if !unlinked.is_empty() {
                println!("Link another provider:");
                for provider in unlinked {
                    println!(
                        "  {:<7} {}",
                        provider.as_str(),
                        client.link_provider_url(provider, session.token())
                    );
                }
            }
            Ok(())
        }
        LinksCommand::Link { provider } => {
            let provider = parse_provider(&provider)?;
            if session.profile.provider_id(provider).is_some() {
                anyhow::bail!("{} is already linked", provider.as_str());
            }
            println!(
                "Open to link {}: {}",
                provider.as_str(),
                client.link_provider_url(provider, session.token())
            );
            Ok(())
        }
        LinksCommand::Unlink { provider } => {
            let provider = parse_provider(&provider)?;
            if session.profile.provider_id(provider).is_none() {
                anyhow::bail!("{} is not linked", provider.as_str());
            }
            session.unlink(client, provider).await?;
            println!("{} unlinked.", provider.as_str());
            Ok(())
        }
    }
}
