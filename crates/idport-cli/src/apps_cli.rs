//! Developer portal: API keys / applications with optional OAuth config.

use clap::{Args, Subcommand};

use idport_api_client::PortalClient;
use idport_client_core::apps::{
    ApplicationDraft, ApplicationEdit, OAuthDraft, OAuthScope, authorize_url,
};
use idport_client_core::session::AccountSession;

use crate::config::PortalConfig;

#[derive(Args)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: Option<AppsCommand>,
}

#[derive(Subcommand)]
pub enum AppsCommand {
    /// List applications, sorted by name (default)
    List,
    /// Create an application; id and key are assigned by the server
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Enable the OAuth sub-record
        #[arg(long)]
        oauth: bool,
        #[arg(long)]
        redirect_uri: Option<String>,
        /// Scope grants; repeat for more than one (identify, email, profile,
        /// connections, token)
        #[arg(long = "scope")]
        scopes: Vec<String>,
    },
    /// Update name, description or OAuth config of an existing application
    Update {
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        oauth: Option<bool>,
        #[arg(long)]
        redirect_uri: Option<String>,
        #[arg(long = "scope")]
        scopes: Vec<String>,
    },
    /// Print the authorization URL end users of an OAuth application visit
    AuthorizeUrl { id: String },
}

fn parse_scopes(raw: &[String]) -> anyhow::Result<Vec<OAuthScope>> {
    raw.iter()
        .map(|scope| {
            OAuthScope::parse(scope).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown scope {scope}; expected identify, email, profile, connections or token"
                )
            })
        })
        .collect()
}

pub async fn run(
    args: AppsArgs,
    session: &mut AccountSession,
    client: &PortalClient,
    config: &PortalConfig,
) -> anyhow::Result<()> {
    match args.command.unwrap_or(AppsCommand::List) {
        AppsCommand::List => {
            let token = session.token().clone();
            session.applications.refresh(&token, client).await;
            if let Some(error) = session.applications.last_error() {
                println!("Key list may be stale: {error}");
            }
            if session.applications.is_empty() {
                println!("No applications yet.");
            }
            for app in session.applications.iter() {
                println!("{:<20} {:<28} usages: {}", app.name, app.key, app.usages);
                if let Some(description) = &app.description {
                    println!("  {description}");
                }
                if let Some(oauth) = &app.oauth {
                    let scopes = oauth
                        .scopes
                        .iter()
                        .map(|scope| scope.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!(
                        "  oauth: {} redirect: {} scopes: [{scopes}]",
                        if oauth.enabled { "on" } else { "off" },
                        oauth.redirect_uri.as_deref().unwrap_or("-"),
                    );
                }
            }
            Ok(())
        }
        AppsCommand::Create {
            name,
            description,
            oauth,
            redirect_uri,
            scopes,
        } => {
            let oauth = if oauth || redirect_uri.is_some() || !scopes.is_empty() {
                Some(OAuthDraft {
                    enabled: oauth,
                    redirect_uri,
                    scopes: parse_scopes(&scopes)?,
                })
            } else {
                None
            };
            let draft = ApplicationDraft {
                name,
                description,
                oauth,
            };
            let token = session.token().clone();
            let created = session
                .applications
                .create(&token, client, &draft)
                .await
                .map_err(|error| anyhow::anyhow!("{error}"))?;
            println!("Created {} ({})", created.name, created.id);
            println!("  key: {}", created.key);
            Ok(())
        }
        AppsCommand::Update {
            key,
            name,
            description,
            oauth,
            redirect_uri,
            scopes,
        } => {
            let record = session
                .applications
                .by_key(&key)
                .ok_or_else(|| anyhow::anyhow!("no application with key {key}"))?;
            let mut edit = ApplicationEdit::from_record(record);

            if let Some(name) = name {
                edit.name = name;
            }
            if let Some(description) = description {
                edit.description = if description.is_empty() {
                    None
                } else {
                    Some(description)
                };
            }
            if oauth.is_some() || redirect_uri.is_some() || !scopes.is_empty() {
                let mut draft = edit.oauth.take().unwrap_or_default();
                if let Some(enabled) = oauth {
                    draft.enabled = enabled;
                }
                if let Some(redirect_uri) = redirect_uri {
                    draft.set_redirect_uri(redirect_uri);
                }
                if !scopes.is_empty() {
                    draft.scopes = parse_scopes(&scopes)?;
                }
                edit.oauth = Some(draft);
            }

            let token = session.token().clone();
            let updated = session
                .applications
                .update(&token, client, &key, &edit)
                .await
                .map_err(|error| anyhow::anyhow!("{error}"))?;
            println!("Updated {} ({})", updated.name, updated.key);
            Ok(())
        }
        AppsCommand::AuthorizeUrl { id } => {
            let app = session
                .applications
                .iter()
                .find(|app| app.id == id)
                .ok_or_else(|| anyhow::anyhow!("no application with id {id}"))?;
            let oauth = app
                .oauth
                .as_ref()
                .filter(|oauth| oauth.enabled)
                .ok_or_else(|| anyhow::anyhow!("OAuth is not enabled for {}", app.name))?;
            let redirect_uri = oauth
                .redirect_uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("{} has no redirect URI", app.name))?;
            println!(
                "{}",
                authorize_url(&config.auth_portal_url, &app.id, redirect_uri, &oauth.scopes)
            );
            Ok(())
        }
    }
}
