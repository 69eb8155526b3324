//! Profile view: show the profile card, edit one field at a time.

use clap::{Args, Subcommand};

use idport_api_client::PortalClient;
use idport_client_core::notify::format_registration_date;
use idport_client_core::profile::mask_email;
use idport_client_core::session::AccountSession;

#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: Option<ProfileCommand>,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Print the profile card (default)
    Show,
    /// Change the display name (minimum 4 characters)
    SetUsername { username: String },
    /// Change the user tag; a leading @ and disallowed characters are stripped
    SetTag { tag: String },
    /// Upload a new avatar image
    SetAvatar { path: std::path::PathBuf },
}

pub async fn run(
    args: ProfileArgs,
    session: &mut AccountSession,
    client: &PortalClient,
) -> anyhow::Result<()> {
    match args.command.unwrap_or(ProfileCommand::Show) {
        ProfileCommand::Show => {
            show(session);
            Ok(())
        }
        ProfileCommand::SetUsername { username } => {
            session
                .set_username(client, &username)
                .await
                .map_err(|error| anyhow::anyhow!("{error}"))?;
            println!("Username updated to {}", session.profile.username);
            Ok(())
        }
        ProfileCommand::SetTag { tag } => {
            session
                .set_tag(client, &tag)
                .await
                .map_err(|error| anyhow::anyhow!("{error}"))?;
            println!(
                "Tag updated to {}",
                session.profile.tag.as_deref().unwrap_or_default()
            );
            Ok(())
        }
        ProfileCommand::SetAvatar { path } => {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow::anyhow!("avatar path has no file name"))?
                .to_string();
            let bytes = std::fs::read(&path)?;
            let url = session.set_avatar(client, &file_name, bytes).await?;
            println!("Avatar updated: {url}");
            Ok(())
        }
    }
}

fn show(session: &AccountSession) {
    let profile = &session.profile;
    println!("{}", profile.username);
    if let Some(tag) = &profile.tag {
        println!("  tag:     @{tag}");
    }
    if let Some(role) = &profile.role {
        println!("  role:    {role}");
    }
    if let Some(email) = &profile.email {
        println!("  email:   {}", mask_email(email));
    }
    if let Some(country) = &profile.country {
        println!("  country: {country}");
    }
    if let Some(avatar) = &profile.avatar {
        println!("  avatar:  {avatar}");
    }
    if let Some(created_at) = &profile.created_at {
        println!("  since:   {}", format_registration_date(created_at));
    }
}
