//! Authenticated-user state and the operations that change it.

use crate::models::{LoginCredentials, Profile, RegisterData};
use crate::routes::Route;
use crate::services::{ApiError, AuthClient};
use crate::store::TokenStore;
use crate::utils::jwt::is_token_expired;
use tokio::sync::watch;
use validator::Validate;

/// Snapshot of the session as seen by routes and commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<Profile>,
    /// `user` present and an access token stored. Computed per snapshot.
    pub is_authenticated: bool,
    /// Admin flag of the cached profile; false unless authenticated.
    pub is_admin: bool,
    pub is_loading: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_admin: false,
            is_loading: false,
        }
    }
}

/// Raw state held by the manager. Use [`SessionManager::session`] for the
/// derived view; this is what [`SessionManager::subscribe`] publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<Profile>,
    pub is_loading: bool,
}

pub struct SessionManager {
    auth: AuthClient,
    tokens: TokenStore,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Starts in the initializing state (`is_loading`, no user) until
    /// [`SessionManager::initialize`] runs.
    pub fn new(auth: AuthClient, tokens: TokenStore) -> Self {
        let (state, _) = watch::channel(SessionState {
            user: None,
            is_loading: true,
        });
        Self {
            auth,
            tokens,
            state,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Current session. If the credentials were cleared elsewhere (a failed
    /// refresh in the request pipeline), the stale profile is dropped in the
    /// same read so no caller ever sees a user without tokens.
    pub fn session(&self) -> Session {
        let has_token = self.tokens.access_token().is_some();
        if !has_token {
            self.state.send_if_modified(|s| s.user.take().is_some());
        }

        let state = self.state.borrow();
        let is_authenticated = has_token && state.user.is_some();
        Session {
            user: state.user.clone(),
            is_authenticated,
            is_admin: is_authenticated && self.tokens.is_admin(),
            is_loading: state.is_loading,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Restore a persisted session at startup.
    ///
    /// An expired or missing access token goes straight to anonymous without
    /// contacting the auth server.
    #[tracing::instrument(skip(self))]
    pub async fn initialize(&self) -> Session {
        self.set_loading(true);

        let restored = match self.tokens.access_token() {
            Some(token) if !is_token_expired(&token) => match self.load_profile().await {
                Ok(profile) => {
                    tracing::info!(user = %profile.username, "Session restored");
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to restore session");
                    false
                }
            },
            Some(_) => {
                tracing::info!("Stored access token has expired");
                false
            }
            None => false,
        };

        if !restored {
            self.logout().await;
        }

        self.set_loading(false);
        self.session()
    }

    #[tracing::instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Profile, ApiError> {
        self.set_loading(true);
        let result = self.authenticate(credentials).await;
        self.set_loading(false);
        result
    }

    /// Create the account, then sign in with the same username and password.
    #[tracing::instrument(skip(self, data), fields(username = %data.username))]
    pub async fn register(&self, data: &RegisterData) -> Result<Profile, ApiError> {
        self.set_loading(true);

        let result = match self.create_account(data).await {
            Ok(()) => self.authenticate(&data.credentials()).await,
            Err(e) => {
                self.reset();
                Err(e)
            }
        };

        self.set_loading(false);
        result
    }

    /// Always ends anonymous on the home route. The server-side revoke is
    /// best effort.
    pub async fn logout(&self) {
        if self.session().is_authenticated {
            match self.auth.logout().await {
                Ok(()) => tracing::info!("Session revoked"),
                Err(e) => tracing::warn!(error = %e, "Logout request failed"),
            }
        }
        self.reset();
        self.auth.navigator().navigate(Route::Home);
    }

    /// Re-fetch the profile. A failure here is fatal to the session: it is
    /// logged out and the error is handed back to the caller.
    pub async fn refresh_user(&self) -> Result<(), ApiError> {
        if !self.session().is_authenticated {
            return Ok(());
        }

        match self.load_profile().await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(error = %e, "User refresh failed");
                self.logout().await;
                Err(e)
            }
        }
    }

    async fn create_account(&self, data: &RegisterData) -> Result<(), ApiError> {
        data.validate()?;
        let profile = self.auth.register(data).await?;
        tracing::info!(user = %profile.username, "Account registered");
        Ok(())
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Profile, ApiError> {
        let result = self.exchange_credentials(credentials).await;

        match &result {
            Ok(profile) => tracing::info!(user = %profile.username, "Logged in"),
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.reset();
            }
        }
        result
    }

    async fn exchange_credentials(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Profile, ApiError> {
        credentials.validate()?;
        let pair = self.auth.login(credentials).await?;
        self.tokens.save(&pair)?;
        self.load_profile().await
    }

    async fn load_profile(&self) -> Result<Profile, ApiError> {
        let profile = self.auth.me().await?;
        self.tokens.cache_profile(&profile)?;
        self.state.send_modify(|s| s.user = Some(profile.clone()));
        Ok(profile)
    }

    /// Clear credentials and profile together.
    fn reset(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::error!(error = %e, "Failed to clear token store");
        }
        self.state.send_if_modified(|s| s.user.take().is_some());
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.is_loading != loading;
            s.is_loading = loading;
            changed
        });
    }
}
