use super::{Access, Route};
use crate::session::Session;

/// Outcome of checking a navigation against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still initializing or mid-login; show a waiting state.
    Pending,
    Render,
    Redirect(Route),
}

/// Decide whether `route` may be shown for `session`.
pub fn evaluate(route: Route, session: &Session) -> GuardDecision {
    if session.is_loading {
        return GuardDecision::Pending;
    }

    match route.access() {
        Access::Public => GuardDecision::Render,
        Access::AnonymousOnly if session.is_authenticated => GuardDecision::Redirect(Route::Home),
        Access::AnonymousOnly => GuardDecision::Render,
        Access::Authenticated | Access::AdminOnly if !session.is_authenticated => {
            GuardDecision::Redirect(Route::Login)
        }
        Access::AdminOnly if !session.is_admin => GuardDecision::Redirect(Route::Home),
        Access::Authenticated | Access::AdminOnly => GuardDecision::Render,
    }
}
