mod common;

use admin_console::routes::{GuardDecision, Route};
use admin_console::store::TokenStore;
use common::*;
use wiremock::MockServer;

#[tokio::test]
async fn navigation_waits_while_session_initializes() {
    let server = MockServer::start().await;
    let console = console(&server, TokenStore::in_memory());

    assert_eq!(console.navigate(Route::Admin), GuardDecision::Pending);
    assert_eq!(console.navigate(Route::Portfolio), GuardDecision::Pending);
    assert_eq!(console.navigator.current(), Route::Home);
}

#[tokio::test]
async fn anonymous_user_is_sent_to_login() {
    let server = MockServer::start().await;
    let console = console(&server, TokenStore::in_memory());
    console.session.initialize().await;

    assert_eq!(
        console.navigate(Route::Monitoring),
        GuardDecision::Redirect(Route::Login)
    );
    assert_eq!(console.navigator.current(), Route::Login);

    assert_eq!(console.navigate(Route::Portfolio), GuardDecision::Render);
    assert_eq!(console.navigator.current(), Route::Portfolio);

    assert_eq!(console.navigate(Route::Register), GuardDecision::Render);
}

#[tokio::test]
async fn non_admin_is_sent_home_from_admin_routes() {
    let server = MockServer::start().await;
    let console = signed_in(&server, "alice", false).await;

    for route in [
        Route::Admin,
        Route::Monitoring,
        Route::VmManagement,
        Route::UserManagement,
    ] {
        assert_eq!(console.navigate(route), GuardDecision::Redirect(Route::Home));
    }
    assert_eq!(console.navigator.current(), Route::Home);
}

#[tokio::test]
async fn admin_reaches_admin_routes() {
    let server = MockServer::start().await;
    let console = signed_in(&server, "root", true).await;

    assert_eq!(console.navigate(Route::VmManagement), GuardDecision::Render);
    assert_eq!(console.navigator.current(), Route::VmManagement);
}

#[tokio::test]
async fn signed_in_user_skips_login_and_register() {
    let server = MockServer::start().await;
    let console = signed_in(&server, "alice", false).await;

    assert_eq!(
        console.navigate(Route::Login),
        GuardDecision::Redirect(Route::Home)
    );
    assert_eq!(
        console.navigate(Route::Register),
        GuardDecision::Redirect(Route::Home)
    );
}

#[tokio::test]
async fn unknown_paths_render_not_found() {
    let server = MockServer::start().await;
    let console = console(&server, TokenStore::in_memory());
    console.session.initialize().await;

    let route = Route::from_path("/admin/unknown");
    assert_eq!(route, Route::NotFound);
    assert_eq!(console.navigate(route), GuardDecision::Render);
}

#[tokio::test]
async fn admin_loses_access_once_tokens_are_gone() {
    let server = MockServer::start().await;
    let console = signed_in(&server, "root", true).await;

    console.tokens.clear().unwrap();

    assert_eq!(
        console.navigate(Route::Admin),
        GuardDecision::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn admin_check_reads_the_cached_profile() {
    let server = MockServer::start().await;
    let console = signed_in(&server, "root", true).await;
    assert!(console.session.session().is_admin);

    let mut demoted = console.tokens.read_profile().unwrap();
    demoted.is_superuser = false;
    console.tokens.cache_profile(&demoted).unwrap();

    assert_eq!(
        console.navigate(Route::UserManagement),
        GuardDecision::Redirect(Route::Home)
    );
}
