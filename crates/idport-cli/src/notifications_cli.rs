//! Notification feed. Currently a single locally derived card.

use clap::Args;

use idport_client_core::notify::WelcomeNotification;
use idport_client_core::session::AccountSession;

#[derive(Args)]
pub struct NotificationsArgs {}

pub fn run(_args: NotificationsArgs, session: &AccountSession) -> anyhow::Result<()> {
    let card = WelcomeNotification::for_profile(&session.profile);
    match &card.date {
        Some(date) => println!("{} · {date}", card.title),
        None => println!("{}", card.title),
    }
    println!("  {}", card.body);
    Ok(())
}
