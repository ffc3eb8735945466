use super::api_client::{ApiRequest, RequestPipeline, Upstream};
use super::endpoints::auth;
use super::error::ApiError;
use crate::models::{LoginCredentials, Profile, RegisterData, TokenPair};
use crate::routes::Navigator;

/// Typed calls to the auth server. Token persistence is left to the
/// session manager; this client only talks HTTP.
#[derive(Clone)]
pub struct AuthClient {
    pipeline: RequestPipeline,
}

impl AuthClient {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub fn navigator(&self) -> &Navigator {
        self.pipeline.navigator()
    }

    /// Form-encoded login; the server answers with a bare token pair.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post(auth::LOGIN).form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        self.pipeline.call_raw(Upstream::Auth, request).await
    }

    pub async fn register(&self, data: &RegisterData) -> Result<Profile, ApiError> {
        let request = ApiRequest::post(auth::REGISTER).json(data)?;
        self.pipeline.call(Upstream::Auth, request).await
    }

    /// Revoke the current session server-side. Only the status matters.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = ApiRequest::post(auth::LOGOUT).json(&serde_json::json!({}))?;
        self.pipeline.call_text(Upstream::Auth, request).await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<Profile, ApiError> {
        self.pipeline
            .call(Upstream::Auth, ApiRequest::get(auth::ME))
            .await
    }

    /// Run a refresh cycle outside of a rejected request.
    pub async fn refresh(&self) -> Result<TokenPair, ApiError> {
        self.pipeline.refresh_credentials().await
    }
}
