pub mod cli;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod store;
pub mod utils;

use config::Settings;
use routes::{evaluate, GuardDecision, Navigator, Route};
use services::{
    ApiError, AuthClient, GatewayClient, MonitoringClient, RequestPipeline, UserManagementClient,
    VmClient,
};
use session::SessionManager;
use std::sync::Arc;
use store::{FileStore, TokenStore};

/// Everything a console front end needs, constructed once at startup and
/// passed down explicitly.
#[derive(Clone)]
pub struct Console {
    pub tokens: TokenStore,
    pub navigator: Navigator,
    pub session: Arc<SessionManager>,
    pub gateway: GatewayClient,
    pub monitoring: MonitoringClient,
    pub vms: VmClient,
    pub users: UserManagementClient,
}

impl Console {
    /// Wire the clients around an existing token store. The session is left
    /// in its initializing state.
    pub fn new(settings: &Settings, tokens: TokenStore) -> Result<Self, ApiError> {
        let navigator = Navigator::default();
        let pipeline = RequestPipeline::new(
            &settings.auth_service.url,
            &settings.gateway.url,
            settings.client.timeout(),
            tokens.clone(),
            navigator.clone(),
        )?;

        Ok(Self {
            session: Arc::new(SessionManager::new(
                AuthClient::new(pipeline.clone()),
                tokens.clone(),
            )),
            gateway: GatewayClient::new(pipeline.clone()),
            monitoring: MonitoringClient::new(pipeline.clone()),
            vms: VmClient::new(pipeline.clone()),
            users: UserManagementClient::new(pipeline),
            tokens,
            navigator,
        })
    }

    /// Open the persisted state file and restore any saved session.
    pub async fn bootstrap(settings: &Settings) -> Result<Self, ApiError> {
        let path = settings.client.state_file_path();
        tracing::debug!(path = %path.display(), "Opening state file");

        let tokens = TokenStore::new(Arc::new(FileStore::open(path)?));
        let console = Self::new(settings, tokens)?;
        console.session.initialize().await;
        Ok(console)
    }

    /// Navigate to `route` if the current session allows it, otherwise
    /// follow the guard's redirect. `Pending` leaves the location unchanged.
    pub fn navigate(&self, route: Route) -> GuardDecision {
        let decision = evaluate(route, &self.session.session());
        match decision {
            GuardDecision::Render => self.navigator.navigate(route),
            GuardDecision::Redirect(target) => self.navigator.redirect(target),
            GuardDecision::Pending => {}
        }
        decision
    }
}
