//! The user profile value object and its single-field patch model.
//!
//! The remote service owns the profile; this type mirrors the last fetched
//! document and is only ever patched after a successful remote write, one
//! field per call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer credential issued by the auth portal.
///
/// Captured once at startup (launch parameter or persisted store) and
/// attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, rename = "discordId", skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,
    #[serde(default, rename = "githubId", skip_serializing_if = "Option::is_none")]
    pub github_id: Option<String>,
    #[serde(default, rename = "googleId", skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(default, rename = "twitchId", skip_serializing_if = "Option::is_none")]
    pub twitch_id: Option<String>,
    #[serde(default)]
    pub collect_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The single-field update surface of `/v3/auth/update/me`.
///
/// `wire_name` is the JSON key the remote service expects; `apply` is the
/// matching local patch, run only after the remote write succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Username,
    Tag,
    Avatar,
    Country,
    DiscordId,
    GithubId,
    GoogleId,
    TwitchId,
}

impl ProfileField {
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Tag => "tag",
            Self::Avatar => "avatar",
            Self::Country => "country",
            Self::DiscordId => "discordId",
            Self::GithubId => "githubId",
            Self::GoogleId => "googleId",
            Self::TwitchId => "twitchId",
        }
    }
}

/// OAuth providers a profile can be linked to.
///
/// E-mail is displayed alongside these but is not a linkable provider and
/// cannot be unlinked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedProvider {
    Discord,
    Github,
    Google,
    Twitch,
}

impl LinkedProvider {
    pub const ALL: [Self; 4] = [Self::Discord, Self::Github, Self::Google, Self::Twitch];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Github => "github",
            Self::Google => "google",
            Self::Twitch => "twitch",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "discord" => Some(Self::Discord),
            "github" => Some(Self::Github),
            "google" => Some(Self::Google),
            "twitch" => Some(Self::Twitch),
            _ => None,
        }
    }

    #[must_use]
    pub fn field(self) -> ProfileField {
        match self {
            Self::Discord => ProfileField::DiscordId,
            Self::Github => ProfileField::GithubId,
            Self::Google => ProfileField::GoogleId,
            Self::Twitch => ProfileField::TwitchId,
        }
    }
}

impl Profile {
    /// Patch one field to the value the remote service just accepted.
    ///
    /// An empty value clears optional fields, which is how provider links are
    /// removed.
    pub fn apply(&mut self, field: ProfileField, value: &str) {
        let slot = match field {
            ProfileField::Username => {
                self.username = value.to_string();
                return;
            }
            ProfileField::Tag => &mut self.tag,
            ProfileField::Avatar => &mut self.avatar,
            ProfileField::Country => &mut self.country,
            ProfileField::DiscordId => &mut self.discord_id,
            ProfileField::GithubId => &mut self.github_id,
            ProfileField::GoogleId => &mut self.google_id,
            ProfileField::TwitchId => &mut self.twitch_id,
        };
        *slot = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    #[must_use]
    pub fn provider_id(&self, provider: LinkedProvider) -> Option<&str> {
        match provider {
            LinkedProvider::Discord => self.discord_id.as_deref(),
            LinkedProvider::Github => self.github_id.as_deref(),
            LinkedProvider::Google => self.google_id.as_deref(),
            LinkedProvider::Twitch => self.twitch_id.as_deref(),
        }
    }

    #[must_use]
    pub fn linked_providers(&self) -> Vec<LinkedProvider> {
        LinkedProvider::ALL
            .into_iter()
            .filter(|provider| self.provider_id(*provider).is_some())
            .collect()
    }

    #[must_use]
    pub fn unlinked_providers(&self) -> Vec<LinkedProvider> {
        LinkedProvider::ALL
            .into_iter()
            .filter(|provider| self.provider_id(*provider).is_none())
            .collect()
    }
}

/// Mask an e-mail address for display: keep the first character of the local
/// part and the whole domain.
#[must_use]
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}******@{domain}")
        }
        None => email.to_string(),
    }
}
