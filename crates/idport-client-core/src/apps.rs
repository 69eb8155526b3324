//! Developer-portal state: the directory of API keys / applications owned by
//! the signed-in user.
//!
//! The remote key list is the single source of truth. The directory mirrors
//! it sorted by name; create and update go to the remote service first and
//! the local list is patched only from the record the server returned. The
//! key secret is server-assigned and never regenerated client-side; only
//! metadata (name, description, OAuth config) is editable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::profile::BearerToken;
use crate::validate::{ValidationError, normalize_application_name};

/// Permission grants selectable per OAuth-enabled application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthScope {
    Identify,
    Email,
    Profile,
    Connections,
    Token,
}

impl OAuthScope {
    pub const ALL: [Self; 5] = [
        Self::Identify,
        Self::Email,
        Self::Profile,
        Self::Connections,
        Self::Token,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identify => "identify",
            Self::Email => "email",
            Self::Profile => "profile",
            Self::Connections => "connections",
            Self::Token => "token",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "identify" => Some(Self::Identify),
            "email" => Some(Self::Email),
            "profile" => Some(Self::Profile),
            "connections" => Some(Self::Connections),
            "token" => Some(Self::Token),
            _ => None,
        }
    }
}

/// Persisted OAuth sub-record of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthGrant {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub scopes: Vec<OAuthScope>,
}

/// An API key / application record as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    /// Opaque key secret, assigned at creation and immutable afterwards.
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub usages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthGrant>,
}

/// In-progress OAuth edit. Pure local state; nothing is persisted until the
/// surrounding save runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthDraft {
    pub enabled: bool,
    pub redirect_uri: Option<String>,
    pub scopes: Vec<OAuthScope>,
}

impl OAuthDraft {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn set_redirect_uri(&mut self, uri: impl Into<String>) {
        let uri = uri.into();
        self.redirect_uri = if uri.trim().is_empty() {
            None
        } else {
            Some(uri)
        };
    }

    /// Add or remove one scope from the multi-select.
    pub fn toggle_scope(&mut self, scope: OAuthScope) {
        if let Some(position) = self.scopes.iter().position(|existing| *existing == scope) {
            self.scopes.remove(position);
        } else {
            self.scopes.push(scope);
            self.scopes.sort();
        }
    }
}

impl From<OAuthDraft> for OAuthGrant {
    fn from(draft: OAuthDraft) -> Self {
        Self {
            enabled: draft.enabled,
            redirect_uri: draft.redirect_uri,
            scopes: draft.scopes,
        }
    }
}

impl From<OAuthGrant> for OAuthDraft {
    fn from(grant: OAuthGrant) -> Self {
        Self {
            enabled: grant.enabled,
            redirect_uri: grant.redirect_uri,
            scopes: grant.scopes,
        }
    }
}

/// Creation form: everything the client may choose. Id and key come back
/// from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub name: String,
    pub description: Option<String>,
    pub oauth: Option<OAuthDraft>,
}

/// The editable subset of an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEdit {
    pub name: String,
    pub description: Option<String>,
    pub oauth: Option<OAuthDraft>,
}

impl ApplicationEdit {
    #[must_use]
    pub fn from_record(record: &Application) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            oauth: record.oauth.clone().map(Into::into),
        }
    }
}

/// Transport seam for the key endpoints of the remote account service.
#[async_trait]
pub trait ApplicationTransport {
    type Error: std::fmt::Display + Send;

    async fn list_applications(
        &self,
        token: &BearerToken,
    ) -> Result<Vec<Application>, Self::Error>;
    async fn create_application(
        &self,
        token: &BearerToken,
        draft: &ApplicationDraft,
    ) -> Result<Application, Self::Error>;
    async fn update_application(
        &self,
        token: &BearerToken,
        key: &str,
        edit: &ApplicationEdit,
    ) -> Result<Application, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError<E> {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("remote call failed: {0}")]
    Transport(E),
    #[error("no application with key {0}")]
    UnknownKey(String),
}

/// Local mirror of the remote key list, kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDirectory {
    applications: Vec<Application>,
    last_error: Option<String>,
}

impl ApplicationDirectory {
    pub fn iter(&self) -> impl Iterator<Item = &Application> {
        self.applications.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// The error string from the most recent failed remote call, if the list
    /// shown is stale because of it.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.key == key)
    }

    /// Replace the list wholesale with a fresh fetch, sorted by name. On
    /// failure the previous list stays visible and the error is recorded.
    pub async fn refresh<A: ApplicationTransport>(&mut self, token: &BearerToken, api: &A) {
        match api.list_applications(token).await {
            Ok(mut applications) => {
                applications.sort_by(|a, b| a.name.cmp(&b.name));
                self.applications = applications;
                self.last_error = None;
            }
            Err(error) => {
                tracing::warn!(%error, "key list fetch failed, keeping previous list");
                self.last_error = Some(error.to_string());
            }
        }
    }

    /// Validate the draft, create remotely and insert the server-returned
    /// record (with its assigned id and key) in name order. An empty name is
    /// rejected before any request; a transport failure leaves the list
    /// untouched.
    pub async fn create<A: ApplicationTransport>(
        &mut self,
        token: &BearerToken,
        api: &A,
        draft: &ApplicationDraft,
    ) -> Result<&Application, DirectoryError<A::Error>> {
        let name = normalize_application_name(&draft.name)?;
        let draft = ApplicationDraft {
            name,
            description: draft.description.clone(),
            oauth: draft.oauth.clone(),
        };

        let created = api
            .create_application(token, &draft)
            .await
            .map_err(DirectoryError::Transport)?;

        let position = self
            .applications
            .partition_point(|existing| existing.name <= created.name);
        self.applications.insert(position, created);
        self.last_error = None;
        Ok(&self.applications[position])
    }

    /// Persist the editable subset for one record and splice the returned
    /// record into the list by key match, keeping name order.
    pub async fn update<A: ApplicationTransport>(
        &mut self,
        token: &BearerToken,
        api: &A,
        key: &str,
        edit: &ApplicationEdit,
    ) -> Result<&Application, DirectoryError<A::Error>> {
        let name = normalize_application_name(&edit.name)?;
        if self.by_key(key).is_none() {
            return Err(DirectoryError::UnknownKey(key.to_string()));
        }
        let edit = ApplicationEdit {
            name,
            description: edit.description.clone(),
            oauth: edit.oauth.clone(),
        };

        let updated = api
            .update_application(token, key, &edit)
            .await
            .map_err(DirectoryError::Transport)?;

        self.applications.retain(|existing| existing.key != key);
        let position = self
            .applications
            .partition_point(|existing| existing.name <= updated.name);
        self.applications.insert(position, updated);
        self.last_error = None;
        Ok(&self.applications[position])
    }
}

/// The authorization URL an OAuth-enabled application sends end users to,
/// built from the application id, its redirect URI and the granted scopes.
#[must_use]
pub fn authorize_url(
    auth_portal_base: &str,
    application_id: &str,
    redirect_uri: &str,
    scopes: &[OAuthScope],
) -> String {
    let scope_list = scopes
        .iter()
        .map(|scope| scope.as_str())
        .collect::<Vec<_>>()
        .join("+");
    format!(
        "{}/oauth/authorize?client_id={application_id}&redirect_uri={redirect_uri}&scope={scope_list}",
        auth_portal_base.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::FakeApi;

    fn record(name: &str, key: &str) -> Application {
        Application {
            id: format!("id_{key}"),
            key: key.to_string(),
            name: name.to_string(),
            avatar: None,
            description: None,
            usages: 0,
            oauth: None,
        }
    }

    fn token() -> BearerToken {
        BearerToken::new("tok_abc")
    }

    #[tokio::test]
    async fn refresh_replaces_the_list_sorted_by_name() {
        let api = FakeApi {
            applications: vec![record("zeta", "k2"), record("alpha", "k1")],
            ..FakeApi::default()
        };
        let mut directory = ApplicationDirectory::default();

        directory.refresh(&token(), &api).await;

        let names = directory.iter().map(|app| app.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["alpha", "zeta"]);
        assert_eq!(directory.last_error(), None);
    }

    #[tokio::test]
    async fn refresh_failure_keeps_previous_list_and_records_error() {
        let api = FakeApi {
            applications: vec![record("alpha", "k1")],
            ..FakeApi::default()
        };
        let mut directory = ApplicationDirectory::default();
        directory.refresh(&token(), &api).await;

        let failing = FakeApi {
            fail_list: true,
            ..FakeApi::default()
        };
        directory.refresh(&token(), &failing).await;

        assert_eq!(directory.len(), 1);
        assert!(
            directory
                .last_error()
                .is_some_and(|error| error.contains("keys unavailable"))
        );
    }

    #[tokio::test]
    async fn create_with_empty_name_is_a_local_noop() {
        let api = FakeApi::default();
        let mut directory = ApplicationDirectory::default();
        let draft = ApplicationDraft {
            name: "   ".to_string(),
            ..ApplicationDraft::default()
        };

        let result = directory.create(&token(), &api, &draft).await;

        assert!(matches!(
            result,
            Err(DirectoryError::Invalid(
                ValidationError::EmptyApplicationName
            ))
        ));
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn create_inserts_the_server_record_once_in_name_order() {
        let api = FakeApi {
            applications: vec![record("alpha", "k1"), record("zeta", "k2")],
            ..FakeApi::default()
        };
        let mut directory = ApplicationDirectory::default();
        directory.refresh(&token(), &api).await;

        let draft = ApplicationDraft {
            name: "middle".to_string(),
            description: Some("between the two".to_string()),
            oauth: None,
        };
        let created_key = directory
            .create(&token(), &api, &draft)
            .await
            .expect("create succeeds")
            .key
            .clone();

        let names = directory.iter().map(|app| app.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["alpha", "middle", "zeta"]);
        assert_eq!(
            directory
                .iter()
                .filter(|app| app.key == created_key)
                .count(),
            1
        );
        // Server-assigned credentials, not client-chosen.
        assert_eq!(created_key, "sk_live_1");
    }

    #[tokio::test]
    async fn update_splices_by_key_and_keeps_name_order() {
        let api = FakeApi {
            applications: vec![record("alpha", "k1"), record("beta", "k2")],
            ..FakeApi::default()
        };
        let mut directory = ApplicationDirectory::default();
        directory.refresh(&token(), &api).await;

        let mut edit = ApplicationEdit::from_record(
            directory.by_key("k1").expect("record exists"),
        );
        edit.name = "omega".to_string();
        directory
            .update(&token(), &api, "k1", &edit)
            .await
            .expect("update succeeds");

        let names = directory.iter().map(|app| app.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["beta", "omega"]);
        assert_eq!(directory.by_key("k1").map(|app| app.name.as_str()), Some("omega"));
    }

    #[tokio::test]
    async fn update_unknown_key_is_rejected_locally() {
        let api = FakeApi::default();
        let mut directory = ApplicationDirectory::default();

        let edit = ApplicationEdit {
            name: "anything".to_string(),
            description: None,
            oauth: None,
        };
        let result = directory.update(&token(), &api, "missing", &edit).await;

        assert!(matches!(result, Err(DirectoryError::UnknownKey(_))));
    }

    #[test]
    fn oauth_draft_scope_toggle_is_a_multi_select() {
        let mut draft = OAuthDraft::default();
        draft.toggle_scope(OAuthScope::Email);
        draft.toggle_scope(OAuthScope::Identify);
        assert_eq!(draft.scopes, vec![OAuthScope::Identify, OAuthScope::Email]);

        draft.toggle_scope(OAuthScope::Email);
        assert_eq!(draft.scopes, vec![OAuthScope::Identify]);
    }

    #[test]
    fn oauth_draft_edits_stay_local_until_saved() {
        let record = Application {
            oauth: Some(OAuthGrant {
                enabled: true,
                redirect_uri: Some("https://app.example.com/cb".to_string()),
                scopes: vec![OAuthScope::Identify],
            }),
            ..record("alpha", "k1")
        };

        let mut draft: OAuthDraft = record.oauth.clone().expect("oauth present").into();
        draft.toggle();
        draft.set_redirect_uri("");
        draft.toggle_scope(OAuthScope::Token);

        // The record itself is untouched by draft edits.
        let grant = record.oauth.expect("oauth present");
        assert!(grant.enabled);
        assert_eq!(grant.scopes, vec![OAuthScope::Identify]);
        assert!(!draft.enabled);
        assert_eq!(draft.redirect_uri, None);
    }

    #[test]
    fn authorize_url_carries_id_redirect_and_scopes() {
        let url = authorize_url(
            "https://auth.example.com/",
            "app_1",
            "https://app.example.com/cb",
            &[OAuthScope::Identify, OAuthScope::Email],
        );
        assert_eq!(
            url,
            "https://auth.example.com/oauth/authorize?client_id=app_1&redirect_uri=https://app.example.com/cb&scope=identify+email"
        );
    }

    #[test]
    fn scope_parse_round_trips_the_fixed_set() {
        for scope in OAuthScope::ALL {
            assert_eq!(OAuthScope::parse(scope.as_str()), Some(scope));
        }
        assert_eq!(OAuthScope::parse("admin"), None);
    }
}
