//! Notification feed. The only notification this portal derives locally is
//! the registration welcome card.

use chrono::{DateTime, Utc};

use crate::profile::Profile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeNotification {
    pub title: String,
    pub date: Option<String>,
    pub body: String,
}

/// Registration dates render as `YYYY.MM.DD`.
#[must_use]
pub fn format_registration_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y.%m.%d").to_string()
}

impl WelcomeNotification {
    #[must_use]
    pub fn for_profile(profile: &Profile) -> Self {
        Self {
            title: format!("Hello, {}", profile.username),
            date: profile.created_at.as_ref().map(format_registration_date),
            body: "You have successfully registered.".to_string(),
        }
    }
}
