//! Request pipeline shared by every call to the auth server and gateway.
//!
//! A call goes through `attempt → (401 with a credential attached) →
//! refresh → attempt once more`. The replay is never refreshed again, so a
//! pair of dead tokens costs one refresh call and no loop.

use super::endpoints;
use super::error::ApiError;
use crate::models::{ApiEnvelope, ErrorBody, TokenPair, GENERIC_FAILURE};
use crate::routes::{Navigator, Route};
use crate::store::TokenStore;
use console_core::observability::TracedClientExt;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Which collaborator a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Auth,
    Gateway,
}

#[derive(Debug, Clone)]
enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

/// A replayable description of an outbound call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append every field of a serializable filter struct as query params.
    pub fn query_from<T: Serialize>(mut self, params: &T) -> Result<Self, ApiError> {
        if let Value::Object(map) = serde_json::to_value(params)? {
            for (key, value) in map {
                let value = match value {
                    Value::Null => continue,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                self.query.push((key, value));
            }
        }
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// The refresh endpoint answers either with the envelope or a bare pair.
#[derive(Deserialize)]
#[serde(untagged)]
enum RefreshReply {
    Envelope(ApiEnvelope<TokenPair>),
    Raw(TokenPair),
}

#[derive(Clone)]
pub struct RequestPipeline {
    http: Client,
    auth_url: String,
    gateway_url: String,
    tokens: TokenStore,
    navigator: Navigator,
}

impl RequestPipeline {
    pub fn new(
        auth_url: &str,
        gateway_url: &str,
        timeout: Duration,
        tokens: TokenStore,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            tokens,
            navigator,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Send and unwrap the `{success, data, message, error}` envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        upstream: Upstream,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.send_with_refresh(upstream, &request).await?;
        decode_envelope(response).await
    }

    /// Send and decode a JSON body that is not wrapped in the envelope.
    pub async fn call_raw<T: DeserializeOwned>(
        &self,
        upstream: Upstream,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.send_with_refresh(upstream, &request).await?;
        let (status, bytes) = read_success_body(response).await?;
        serde_json::from_slice(&bytes).map_err(|e| malformed(status, e))
    }

    /// Send and return the body as text (e.g. Prometheus exposition).
    pub async fn call_text(&self, upstream: Upstream, request: ApiRequest) -> Result<String, ApiError> {
        let response = self.send_with_refresh(upstream, &request).await?;
        let (_, bytes) = read_success_body(response).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tracing::instrument(
        name = "api_request",
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    async fn send_with_refresh(
        &self,
        upstream: Upstream,
        request: &ApiRequest,
    ) -> Result<Response, ApiError> {
        let token = self.tokens.access_token();
        let response = self.attempt(upstream, request, token.as_deref()).await?;

        // Without a credential there is no session to recover.
        if response.status() != StatusCode::UNAUTHORIZED || token.is_none() {
            return Ok(response);
        }

        // This request is now marked as retried: the replay below goes out
        // at most once and its result is final.
        tracing::info!("Access token rejected, attempting refresh");
        let pair = self.refresh_credentials().await?;
        self.attempt(upstream, request, Some(&pair.access_token))
            .await
    }

    async fn attempt(
        &self,
        upstream: Upstream,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.url(upstream, &request.path);
        let mut builder = self.http.traced_request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let request_id = builder.request_id().to_string();
        let response = builder.send().await.map_err(|e| {
            tracing::error!(url = %url, request_id = %request_id, error = %e, "Request failed to complete");
            ApiError::Network(e)
        })?;

        tracing::debug!(
            url = %url,
            request_id = %request_id,
            status = %response.status(),
            "Response received"
        );
        Ok(response)
    }

    /// Exchange the stored refresh token for a new pair and persist it.
    ///
    /// Any failure ends the session: the store is cleared, the navigator is
    /// sent to the login route and [`ApiError::SessionExpired`] is returned.
    pub async fn refresh_credentials(&self) -> Result<TokenPair, ApiError> {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            tracing::warn!("No refresh token stored");
            return Err(self.end_session());
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(pair) => {
                self.tokens.save(&pair)?;
                tracing::info!("Credentials refreshed");
                Ok(pair)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                Err(self.end_session())
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post(endpoints::auth::REFRESH)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))?;
        let response = self.attempt(Upstream::Auth, &request, None).await?;
        let (status, bytes) = read_success_body(response).await?;

        match serde_json::from_slice::<RefreshReply>(&bytes).map_err(|e| malformed(status, e))? {
            RefreshReply::Raw(pair) => Ok(pair),
            RefreshReply::Envelope(envelope) => envelope
                .into_result()
                .map_err(|message| ApiError::request_failed(status, message))?
                .ok_or_else(|| ApiError::request_failed(status, "Refresh response carried no tokens")),
        }
    }

    fn end_session(&self) -> ApiError {
        if let Err(e) = self.tokens.clear() {
            tracing::error!(error = %e, "Failed to clear token store");
        }
        self.navigator.redirect(Route::Login);
        ApiError::SessionExpired
    }

    fn url(&self, upstream: Upstream, path: &str) -> String {
        let base = match upstream {
            Upstream::Auth => &self.auth_url,
            Upstream::Gateway => &self.gateway_url,
        };
        format!("{}{}", base, path)
    }
}

async fn read_body(response: Response) -> Result<(StatusCode, Vec<u8>), ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ApiError::Network)?;
    Ok((status, bytes.to_vec()))
}

/// Read the body, turning any non-2xx answer into `RequestFailed`.
async fn read_success_body(response: Response) -> Result<(StatusCode, Vec<u8>), ApiError> {
    let (status, bytes) = read_body(response).await?;
    if !status.is_success() {
        return Err(failure_from_body(status, &bytes));
    }
    Ok((status, bytes))
}

async fn decode_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let (status, bytes) = read_success_body(response).await?;

    let envelope: ApiEnvelope = serde_json::from_slice(&bytes).map_err(|e| malformed(status, e))?;
    let data = envelope
        .into_result()
        .map_err(|message| ApiError::request_failed(status, message))?;

    // Absent data decodes as null so `()`/`Option<_>` callers succeed.
    serde_json::from_value(data.unwrap_or(Value::Null)).map_err(|e| malformed(status, e))
}

fn failure_from_body(status: StatusCode, bytes: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(ErrorBody::message)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    ApiError::request_failed(status, message)
}

fn malformed(status: StatusCode, err: serde_json::Error) -> ApiError {
    tracing::warn!(status = %status, error = %err, "Malformed response body");
    ApiError::request_failed(status, GENERIC_FAILURE)
}
