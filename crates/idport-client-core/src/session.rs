//! Session bootstrap and the authenticated session value object.
//!
//! Startup is a two-state machine: `loading -> {authenticated, redirecting}`.
//! A launch token (the URL query parameter of the hosted portal) takes
//! precedence and is persisted; otherwise the stored token is read. Any
//! profile-fetch failure, or the absence of a token, clears the store and
//! ends in a redirect to the external auth portal. The session value is
//! threaded through views by parameter; there is no ambient global state.

use async_trait::async_trait;

use crate::apps::{ApplicationDirectory, ApplicationTransport};
use crate::profile::{BearerToken, LinkedProvider, Profile, ProfileField};
use crate::validate::{
    ValidationError, normalize_password, normalize_user_tag, normalize_username,
};

/// Query hint carried on the auth-portal redirect so the portal sends the
/// browser back to the account app after sign-in.
pub const AUTH_REDIRECT_HINT: &str = "account";

/// Persistence seam for the session token. One opaque string, nothing else.
pub trait TokenStore {
    type Error: std::fmt::Display;

    fn load_token(&self) -> Result<Option<BearerToken>, Self::Error>;
    fn persist_token(&self, token: &BearerToken) -> Result<(), Self::Error>;
    fn clear_token(&self) -> Result<(), Self::Error>;
}

/// Transport seam for the profile endpoints of the remote account service.
#[async_trait]
pub trait ProfileTransport {
    type Error: std::fmt::Display + Send;

    async fn fetch_profile(&self, token: &BearerToken) -> Result<Profile, Self::Error>;
    async fn update_profile_field(
        &self,
        token: &BearerToken,
        field: ProfileField,
        value: &str,
    ) -> Result<(), Self::Error>;
    /// Returns the server acknowledgement message.
    async fn update_password(
        &self,
        token: &BearerToken,
        password: &str,
    ) -> Result<String, Self::Error>;
    /// The server derives the new country from the caller's address; the
    /// request carries no body. Returns the acknowledgement message.
    async fn update_country(&self, token: &BearerToken) -> Result<String, Self::Error>;
    /// Uploads an avatar image and returns the public URL it is served from.
    async fn upload_avatar(
        &self,
        token: &BearerToken,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub url: String,
}

/// Where to send the browser when no valid session exists.
#[must_use]
pub fn auth_redirect_url(auth_portal_base: &str) -> String {
    format!(
        "{}/?redirect={AUTH_REDIRECT_HINT}",
        auth_portal_base.trim_end_matches('/')
    )
}

/// Outcome of the session bootstrap. Every consumer has to handle the
/// unauthenticated case; no view renders before this resolves.
#[derive(Debug)]
pub enum Session {
    Authenticated(AccountSession),
    RedirectToAuth(RedirectTarget),
}

/// The authenticated session: the fetched profile augmented with its token,
/// plus the application directory populated right after the profile fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSession {
    token: BearerToken,
    pub profile: Profile,
    pub applications: ApplicationDirectory,
}

/// A failed mutation: either the input never left the client, or the remote
/// write failed and local state was left untouched.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError<E> {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("remote update failed: {0}")]
    Transport(E),
}

/// Resolve a token, validate it against the profile endpoint and populate the
/// session. Exactly one profile fetch per call; the key-list fetch runs only
/// after the profile succeeded.
pub async fn bootstrap<S, A>(
    launch_token: Option<&str>,
    store: &S,
    api: &A,
    auth_portal_base: &str,
) -> Session
where
    S: TokenStore,
    A: ProfileTransport + ApplicationTransport,
{
    let Some(token) = resolve_token(launch_token, store) else {
        clear_stored_token(store);
        return Session::RedirectToAuth(RedirectTarget {
            url: auth_redirect_url(auth_portal_base),
        });
    };

    match api.fetch_profile(&token).await {
        Ok(profile) => {
            let mut applications = ApplicationDirectory::default();
            applications.refresh(&token, api).await;
            Session::Authenticated(AccountSession {
                token,
                profile,
                applications,
            })
        }
        Err(error) => {
            tracing::warn!(%error, "profile fetch failed, dropping session");
            clear_stored_token(store);
            Session::RedirectToAuth(RedirectTarget {
                url: auth_redirect_url(auth_portal_base),
            })
        }
    }
}

fn resolve_token<S: TokenStore>(launch_token: Option<&str>, store: &S) -> Option<BearerToken> {
    if let Some(raw) = launch_token.map(str::trim).filter(|raw| !raw.is_empty()) {
        let token = BearerToken::new(raw);
        if let Err(error) = store.persist_token(&token) {
            tracing::warn!(%error, "failed to persist launch token");
        }
        return Some(token);
    }

    match store.load_token() {
        Ok(stored) => stored,
        Err(error) => {
            tracing::warn!(%error, "failed to read stored token");
            None
        }
    }
}

fn clear_stored_token<S: TokenStore>(store: &S) {
    if let Err(error) = store.clear_token() {
        tracing::warn!(%error, "failed to clear stored token");
    }
}

impl AccountSession {
    #[must_use]
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// One remote write scoped to a single field, then the matching local
    /// patch. On failure the error propagates and the profile is unchanged.
    pub async fn set_field<A: ProfileTransport>(
        &mut self,
        api: &A,
        field: ProfileField,
        value: &str,
    ) -> Result<(), A::Error> {
        api.update_profile_field(&self.token, field, value).await?;
        self.profile.apply(field, value);
        Ok(())
    }

    pub async fn set_username<A: ProfileTransport>(
        &mut self,
        api: &A,
        raw: &str,
    ) -> Result<(), UpdateError<A::Error>> {
        let username = normalize_username(raw)?;
        self.set_field(api, ProfileField::Username, &username)
            .await
            .map_err(UpdateError::Transport)
    }

    pub async fn set_tag<A: ProfileTransport>(
        &mut self,
        api: &A,
        raw: &str,
    ) -> Result<(), UpdateError<A::Error>> {
        let tag = normalize_user_tag(raw)?;
        self.set_field(api, ProfileField::Tag, &tag)
            .await
            .map_err(UpdateError::Transport)
    }

    pub async fn unlink<A: ProfileTransport>(
        &mut self,
        api: &A,
        provider: LinkedProvider,
    ) -> Result<(), A::Error> {
        self.set_field(api, provider.field(), "").await
    }

    /// Validate and submit a new password. The server message is returned for
    /// display; nothing is patched locally.
    pub async fn change_password<A: ProfileTransport>(
        &self,
        api: &A,
        raw: &str,
    ) -> Result<String, UpdateError<A::Error>> {
        let password = normalize_password(raw)?;
        api.update_password(&self.token, &password)
            .await
            .map_err(UpdateError::Transport)
    }

    /// Upload an avatar image, then write the returned URL through the
    /// ordinary single-field update.
    pub async fn set_avatar<A: ProfileTransport>(
        &mut self,
        api: &A,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, A::Error> {
        let avatar_url = api.upload_avatar(&self.token, file_name, bytes).await?;
        self.set_field(api, ProfileField::Avatar, &avatar_url)
            .await?;
        Ok(avatar_url)
    }
}
