use super::api_client::{ApiRequest, RequestPipeline, Upstream};
use super::endpoints::users;
use super::error::ApiError;
use crate::models::FriendUser;

/// Invited platform users, as listed by the gateway.
#[derive(Clone)]
pub struct UserManagementClient {
    pipeline: RequestPipeline,
}

impl UserManagementClient {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn friends(&self) -> Result<Vec<FriendUser>, ApiError> {
        self.pipeline
            .call(Upstream::Gateway, ApiRequest::get(users::FRIENDS))
            .await
    }

    pub async fn friend(&self, id: &str) -> Result<FriendUser, ApiError> {
        self.pipeline
            .call(Upstream::Gateway, ApiRequest::get(users::friend(id)))
            .await
    }
}
