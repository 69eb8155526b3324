//! Typed client for the remote account service (`/v3` API).
//!
//! Every call is one request: no retries, no configured timeouts. Failures
//! come back as [`PortalApiError`] and the caller decides what stays on
//! screen; nothing here mutates client state.

pub mod geo;

pub use geo::GeoClient;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use idport_client_core::apps::{
    Application, ApplicationDraft, ApplicationEdit, ApplicationTransport, OAuthGrant, OAuthScope,
};
use idport_client_core::profile::{BearerToken, LinkedProvider, Profile, ProfileField};
use idport_client_core::session::{AUTH_REDIRECT_HINT, ProfileTransport};

#[derive(Debug, Clone)]
pub struct PortalClientConfig {
    pub api_base_url: String,
}

impl PortalClientConfig {
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum PortalApiError {
    #[error("portal_base_url_missing")]
    BaseUrlMissing,
    #[error("portal_invalid_path")]
    InvalidPath,
    #[error("portal_request_failed:{message}")]
    Request { message: String },
    #[error("portal_read_failed:{message}")]
    Read { message: String },
    #[error("portal_http_{status}:{body}")]
    Http { status: StatusCode, body: String },
    #[error("portal_json_decode_failed:{message}")]
    Decode { message: String },
}

/// `{message}` on success, `{error}` on failure; several `/v3/auth/update`
/// endpoints answer in this envelope.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A key record as `/v3/keys` endpoints report it. Older records carry a
/// `type` label instead of a display name; the transform into the
/// application shape falls back to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub type_label: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub usages: u64,
    #[serde(default)]
    pub oauth: Option<OAuthWireRecord>,
}

/// OAuth sub-record on the wire; scopes arrive as free strings and unknown
/// ones are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthWireRecord {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl From<OAuthWireRecord> for OAuthGrant {
    fn from(wire: OAuthWireRecord) -> Self {
        Self {
            enabled: wire.enabled,
            redirect_uri: wire.redirect_uri,
            scopes: wire
                .scopes
                .iter()
                .filter_map(|scope| OAuthScope::parse(scope))
                .collect(),
        }
    }
}

impl From<KeyRecord> for Application {
    fn from(record: KeyRecord) -> Self {
        let name = record
            .name
            .or(record.type_label)
            .unwrap_or_else(|| "(unnamed)".to_string());
        Self {
            id: record.id.unwrap_or_else(|| record.key.clone()),
            key: record.key,
            name,
            avatar: record.avatar,
            description: record.description,
            usages: record.usages,
            oauth: record.oauth.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
struct OAuthWritePayload<'a> {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    scopes: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct ApplicationWritePayload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    oauth: Option<OAuthWritePayload<'a>>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    #[serde(rename = "fileName")]
    file_name: String,
}

impl PortalClient {
    pub fn new(config: PortalClientConfig) -> Result<Self, PortalApiError> {
        let base_url = normalize_base_url(&config.api_base_url)?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{}", self.base_url, trimmed))
        } else {
            Some(format!("{}/{}", self.base_url, trimmed))
        }
    }

    #[must_use]
    pub fn profile_path() -> &'static str {
        "/v3/auth/profile"
    }

    #[must_use]
    pub fn update_me_path() -> &'static str {
        "/v3/auth/update/me"
    }

    #[must_use]
    pub fn update_password_path() -> &'static str {
        "/v3/auth/update/password"
    }

    #[must_use]
    pub fn update_country_path() -> &'static str {
        "/v3/auth/update/country"
    }

    #[must_use]
    pub fn keys_list_path() -> &'static str {
        "/v3/keys/get"
    }

    #[must_use]
    pub fn keys_create_path() -> &'static str {
        "/v3/keys/create"
    }

    #[must_use]
    pub fn keys_update_path(key: &str) -> String {
        format!("/v3/keys/update/{}", key.trim())
    }

    #[must_use]
    pub fn storage_upload_path() -> &'static str {
        "/v3/cloud/storage/upload"
    }

    #[must_use]
    pub fn stored_file_url(&self, file_name: &str) -> String {
        format!("{}/v3/cloud/storage/get/{}", self.base_url, file_name.trim())
    }

    /// Full-page navigation target that links another sign-in provider to
    /// the current account.
    #[must_use]
    pub fn link_provider_url(&self, provider: LinkedProvider, token: &BearerToken) -> String {
        format!(
            "{}/v3/auth/other/{}?redirect={AUTH_REDIRECT_HINT}&token={}",
            self.base_url,
            provider.as_str(),
            token.as_str()
        )
    }

    async fn get_json<T>(&self, path: &str, token: &BearerToken) -> Result<T, PortalApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let url = self.endpoint(path).ok_or(PortalApiError::InvalidPath)?;
        let response = self
            .http
            .get(url.as_str())
            .bearer_auth(token.as_str())
            .header("x-request-id", request_id())
            .send()
            .await
            .map_err(|error| PortalApiError::Request {
                message: error.to_string(),
            })?;
        decode_json_response(response).await
    }

    async fn send_json<Req>(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &BearerToken,
        payload: &Req,
    ) -> Result<reqwest::Response, PortalApiError>
    where
        Req: Serialize + ?Sized,
    {
        let url = self.endpoint(path).ok_or(PortalApiError::InvalidPath)?;
        tracing::debug!(%method, %url, "portal request");
        self.http
            .request(method, url.as_str())
            .bearer_auth(token.as_str())
            .header("x-request-id", request_id())
            .json(payload)
            .send()
            .await
            .map_err(|error| PortalApiError::Request {
                message: error.to_string(),
            })
    }

    async fn post_json<Req, Res>(
        &self,
        path: &str,
        token: &BearerToken,
        payload: &Req,
    ) -> Result<Res, PortalApiError>
    where
        Req: Serialize + ?Sized,
        Res: for<'de> serde::Deserialize<'de>,
    {
        let response = self
            .send_json(reqwest::Method::POST, path, token, payload)
            .await?;
        decode_json_response(response).await
    }

    async fn put_json<Req, Res>(
        &self,
        path: &str,
        token: &BearerToken,
        payload: &Req,
    ) -> Result<Res, PortalApiError>
    where
        Req: Serialize + ?Sized,
        Res: for<'de> serde::Deserialize<'de>,
    {
        let response = self
            .send_json(reqwest::Method::PUT, path, token, payload)
            .await?;
        decode_json_response(response).await
    }

    /// POST and decode the `{message}`/`{error}` envelope, preferring the
    /// server's error text when the status is non-OK.
    async fn post_for_message<Req>(
        &self,
        path: &str,
        token: &BearerToken,
        payload: &Req,
    ) -> Result<String, PortalApiError>
    where
        Req: Serialize + ?Sized,
    {
        let response = self
            .send_json(reqwest::Method::POST, path, token, payload)
            .await?;
        let status = response.status();
        let bytes = read_body(response).await?;

        let envelope = serde_json::from_slice::<ApiMessage>(&bytes).ok();
        if status.is_success() {
            return Ok(envelope
                .and_then(|envelope| envelope.message)
                .unwrap_or_default());
        }
        let body = envelope
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).trim().to_string());
        Err(PortalApiError::Http { status, body })
    }
}

#[async_trait]
impl ProfileTransport for PortalClient {
    type Error = PortalApiError;

    async fn fetch_profile(&self, token: &BearerToken) -> Result<Profile, Self::Error> {
        self.get_json(Self::profile_path(), token).await
    }

    async fn update_profile_field(
        &self,
        token: &BearerToken,
        field: ProfileField,
        value: &str,
    ) -> Result<(), Self::Error> {
        let payload = serde_json::json!({ field.wire_name(): value });
        self.post_for_message(Self::update_me_path(), token, &payload)
            .await
            .map(|_| ())
    }

    async fn update_password(
        &self,
        token: &BearerToken,
        password: &str,
    ) -> Result<String, Self::Error> {
        let payload = serde_json::json!({ "password": password });
        self.post_for_message(Self::update_password_path(), token, &payload)
            .await
    }

    async fn update_country(&self, token: &BearerToken) -> Result<String, Self::Error> {
        // The server derives the country from the caller's address.
        self.post_for_message(Self::update_country_path(), token, &serde_json::json!({}))
            .await
    }

    async fn upload_avatar(
        &self,
        token: &BearerToken,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, Self::Error> {
        let url = self
            .endpoint(Self::storage_upload_path())
            .ok_or(PortalApiError::InvalidPath)?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(url.as_str())
            .bearer_auth(token.as_str())
            .header("x-request-id", request_id())
            .multipart(form)
            .send()
            .await
            .map_err(|error| PortalApiError::Request {
                message: error.to_string(),
            })?;

        let uploaded: UploadResponse = decode_json_response(response).await?;
        Ok(self.stored_file_url(&uploaded.data.file_name))
    }
}

#[async_trait]
impl ApplicationTransport for PortalClient {
    type Error = PortalApiError;

    async fn list_applications(
        &self,
        token: &BearerToken,
    ) -> Result<Vec<Application>, Self::Error> {
        let records: Vec<KeyRecord> = self.get_json(Self::keys_list_path(), token).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn create_application(
        &self,
        token: &BearerToken,
        draft: &ApplicationDraft,
    ) -> Result<Application, Self::Error> {
        let payload = ApplicationWritePayload {
            name: &draft.name,
            description: draft.description.as_deref(),
            oauth: draft.oauth.as_ref().map(|oauth| OAuthWritePayload {
                enabled: oauth.enabled,
                redirect_uri: oauth.redirect_uri.as_deref(),
                scopes: oauth.scopes.iter().map(|scope| scope.as_str()).collect(),
            }),
        };
        let record: KeyRecord = self
            .post_json(Self::keys_create_path(), token, &payload)
            .await?;
        Ok(record.into())
    }

    async fn update_application(
        &self,
        token: &BearerToken,
        key: &str,
        edit: &ApplicationEdit,
    ) -> Result<Application, Self::Error> {
        let payload = ApplicationWritePayload {
            name: &edit.name,
            description: edit.description.as_deref(),
            oauth: edit.oauth.as_ref().map(|oauth| OAuthWritePayload {
                enabled: oauth.enabled,
                redirect_uri: oauth.redirect_uri.as_deref(),
                scopes: oauth.scopes.iter().map(|scope| scope.as_str()).collect(),
            }),
        };
        let record: KeyRecord = self
            .put_json(Self::keys_update_path(key).as_str(), token, &payload)
            .await?;
        Ok(record.into())
    }
}

fn request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

fn normalize_base_url(base_url: &str) -> Result<String, PortalApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(PortalApiError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, PortalApiError> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|error| PortalApiError::Read {
            message: error.to_string(),
        })
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> PortalApiError {
    let body = String::from_utf8_lossy(body).trim().to_string();
    let body = if body.is_empty() {
        "<empty>".to_string()
    } else {
        body
    };
    PortalApiError::Http { status, body }
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T, PortalApiError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();
    let bytes = read_body(response).await?;

    if !status.is_success() {
        return Err(format_http_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|error| PortalApiError::Decode {
        message: error.to_string(),
    })
}
