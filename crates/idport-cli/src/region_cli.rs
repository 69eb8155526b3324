//! Region wizard: compare the detected country with the registered one and
//! optionally move the account.

use clap::Args;

use idport_api_client::{GeoClient, PortalClient};
use idport_client_core::locale::Locale;
use idport_client_core::region::RegionWizard;
use idport_client_core::session::AccountSession;

#[derive(Args)]
pub struct RegionArgs {
    /// Apply the change instead of only showing the comparison
    #[arg(long)]
    pub confirm: bool,
}

pub async fn run(
    args: RegionArgs,
    session: &mut AccountSession,
    client: &PortalClient,
    geo: &GeoClient,
    locale: Locale,
) -> anyhow::Result<()> {
    let phrases = locale.phrases();

    println!("{}", phrases.loading);
    let mut wizard = RegionWizard::default();
    wizard.resolve(geo).await;

    let detected = wizard.looked_up_country().unwrap_or(phrases.unknown);
    let registered = session.profile.country.as_deref().unwrap_or(phrases.unknown);
    println!(
        "{} {detected} {} {registered}.",
        phrases.contact_from, phrases.and_registered
    );

    if !wizard.can_change(session.profile.country.as_deref()) {
        println!("{}", phrases.already_set);
        return Ok(());
    }

    if !args.confirm {
        println!("{}", phrases.continue_hint);
        println!("Run again with --confirm to apply.");
        return Ok(());
    }

    match wizard.confirm(session, client).await {
        Ok(Some(message)) if !message.is_empty() => println!("{message}"),
        Ok(Some(_)) => println!("{}", phrases.change_country),
        Ok(None) => println!("{}", phrases.no_changes),
        Err(error) => anyhow::bail!("{error}"),
    }
    Ok(())
}
