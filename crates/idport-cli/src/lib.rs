//! `idport` umbrella CLI: the presentation layer of the account portal.
//!
//! Every invocation runs the session bootstrap first; views only ever see an
//! authenticated session value passed by parameter. Without a session the
//! command prints the auth-portal sign-in URL and exits.
#![allow(clippy::print_stdout)]

use clap::Parser;

use idport_api_client::{GeoClient, PortalClient, PortalClientConfig};
use idport_client_core::session::{Session, bootstrap};
use idport_client_core::token_store::FileTokenStore;

mod apps_cli;
mod config;
mod links_cli;
mod notifications_cli;
mod profile_cli;
mod region_cli;
mod settings_cli;

pub use config::PortalConfig;

#[derive(Parser)]
#[command(name = "idport")]
#[command(about = "Account portal CLI")]
pub struct IdportCli {
    /// Session token handed over by the auth portal; takes precedence over
    /// the stored one and is persisted for later runs.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Profile view and single-field edits
    Profile(profile_cli::ProfileArgs),
    /// Notification feed
    Notifications(notifications_cli::NotificationsArgs),
    /// Account settings (password, data collection)
    Settings(settings_cli::SettingsArgs),
    /// Linked sign-in providers
    Links(links_cli::LinksArgs),
    /// Developer portal: API keys and applications
    Apps(apps_cli::AppsArgs),
    /// Region wizard: move the account to the detected country
    Region(region_cli::RegionArgs),
}

pub async fn run() -> anyhow::Result<()> {
    let cli = IdportCli::parse();
    let config = PortalConfig::load()?;
    let store = FileTokenStore::new(config.token_path.clone());
    let client = PortalClient::new(PortalClientConfig::new(&config.api_base_url))?;

    let session = bootstrap(
        cli.token.as_deref(),
        &store,
        &client,
        &config.auth_portal_url,
    )
    .await;

    let mut session = match session {
        Session::Authenticated(session) => session,
        Session::RedirectToAuth(target) => {
            println!("No active session. Sign in at: {}", target.url);
            return Ok(());
        }
    };

    match cli.command {
        Commands::Profile(args) => profile_cli::run(args, &mut session, &client).await,
        Commands::Notifications(args) => notifications_cli::run(args, &session),
        Commands::Settings(args) => settings_cli::run(args, &session, &client).await,
        Commands::Links(args) => links_cli::run(args, &mut session, &client).await,
        Commands::Apps(args) => apps_cli::run(args, &mut session, &client, &config).await,
        Commands::Region(args) => {
            let geo = GeoClient::new(&config.geo_base_url)?;
            region_cli::run(args, &mut session, &client, &geo, config.locale).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;

    use super::IdportCli;

    #[test]
    fn cli_requires_subcommand() {
        let err = match IdportCli::try_parse_from(["idport"]) {
            Ok(_) => panic!("expected missing subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn cli_rejects_unknown_subcommand() {
        let err = match IdportCli::try_parse_from(["idport", "unknown-subcommand"]) {
            Ok(_) => panic!("expected invalid subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn global_token_flag_is_accepted_before_and_after_the_subcommand() {
        let cli = IdportCli::try_parse_from(["idport", "--token", "tok_abc", "notifications"])
            .expect("token before subcommand parses");
        assert_eq!(cli.token.as_deref(), Some("tok_abc"));

        let cli = IdportCli::try_parse_from(["idport", "notifications", "--token", "tok_abc"])
            .expect("token after subcommand parses");
        assert_eq!(cli.token.as_deref(), Some("tok_abc"));
    }
}
