use super::{KeyValueStore, MemoryStore, StoreError};
use crate::models::{Profile, Theme, TokenPair};
use std::sync::Arc;

pub const ACCESS_TOKEN_KEY: &str = "console_access_token";
pub const REFRESH_TOKEN_KEY: &str = "console_refresh_token";
pub const USER_KEY: &str = "console_user";
pub const THEME_KEY: &str = "console_theme";

/// Typed access to the persisted credential pair, cached profile and
/// theme preference. Cheap to clone; clones share the same medium.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist both tokens in a single write.
    pub fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        self.backend.set_many(&[
            (ACCESS_TOKEN_KEY, pair.access_token.clone()),
            (REFRESH_TOKEN_KEY, pair.refresh_token.clone()),
        ])
    }

    /// The stored pair, or `None` unless both tokens are present.
    pub fn read(&self) -> Option<TokenPair> {
        let access = self.backend.get(ACCESS_TOKEN_KEY)?;
        let refresh = self.backend.get(REFRESH_TOKEN_KEY)?;
        Some(TokenPair::new(access, refresh))
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().map(|pair| pair.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().map(|pair| pair.refresh_token)
    }

    /// Drop tokens and the cached profile. The theme preference is kept.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend
            .remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY])
    }

    pub fn cache_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.backend.set(USER_KEY, serde_json::to_string(profile)?)
    }

    pub fn read_profile(&self) -> Option<Profile> {
        let raw = self.backend.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Cached profile is unreadable");
                None
            }
        }
    }

    /// Synchronous admin check against the cached profile.
    pub fn is_admin(&self) -> bool {
        self.read_profile().is_some_and(|p| p.is_admin())
    }

    pub fn theme(&self) -> Theme {
        self.backend
            .get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.backend.set(THEME_KEY, theme.to_string())
    }
}
