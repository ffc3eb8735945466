pub mod guard;

pub use guard::{evaluate, GuardDecision};

use std::fmt;
use tokio::sync::watch;

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Login and registration; signed-in users are sent home.
    AnonymousOnly,
    Authenticated,
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Portfolio,
    Admin,
    Monitoring,
    VmManagement,
    UserManagement,
    Login,
    Register,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Home,
        Route::Portfolio,
        Route::Admin,
        Route::Monitoring,
        Route::VmManagement,
        Route::UserManagement,
        Route::Login,
        Route::Register,
        Route::NotFound,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Portfolio => "/portfolio",
            Route::Admin => "/admin",
            Route::Monitoring => "/admin/monitoring",
            Route::VmManagement => "/admin/vms",
            Route::UserManagement => "/admin/users",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::NotFound => "/404",
        }
    }

    /// Resolve a path; anything unknown lands on [`Route::NotFound`].
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.split(['?', '#']).next().unwrap_or(path);
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Route::ALL
            .into_iter()
            .find(|r| r.path() == normalized)
            .unwrap_or(Route::NotFound)
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Portfolio | Route::NotFound => Access::Public,
            Route::Login | Route::Register => Access::AnonymousOnly,
            Route::Admin | Route::Monitoring | Route::VmManagement | Route::UserManagement => {
                Access::AdminOnly
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Current location of the console. The request pipeline holds a clone so
/// it can send the user to the login route when a session cannot be
/// refreshed.
#[derive(Clone)]
pub struct Navigator {
    current: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn navigate(&self, route: Route) {
        self.current.send_replace(route);
    }

    /// Replace the current location, logging where we came from.
    pub fn redirect(&self, route: Route) {
        let from = self.current.send_replace(route);
        if from != route {
            tracing::info!(from = %from, to = %route, "Redirecting");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(Route::from_path("/admin/vms/"), Route::VmManagement);
        assert_eq!(Route::from_path("/login?next=/admin"), Route::Login);
        assert_eq!(Route::from_path(""), Route::Home);
        assert_eq!(Route::from_path("/does-not-exist"), Route::NotFound);
    }

    #[test]
    fn test_admin_routes_are_admin_only() {
        for route in [
            Route::Admin,
            Route::Monitoring,
            Route::VmManagement,
            Route::UserManagement,
        ] {
            assert_eq!(route.access(), Access::AdminOnly);
        }
        assert_eq!(Route::Register.access(), Access::AnonymousOnly);
        assert_eq!(Route::Portfolio.access(), Access::Public);
    }

    #[test]
    fn test_navigator_redirect_notifies_subscribers() {
        let navigator = Navigator::default();
        let mut rx = navigator.subscribe();

        navigator.redirect(Route::Login);

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Route::Login);
        assert_eq!(navigator.current(), Route::Login);
    }
}
