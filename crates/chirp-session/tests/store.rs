//! Integration tests for the session store over a scripted backend.

use std::sync::Arc;

use chirp_pipeline::{ApiError, EndpointRefresher, RequestPipeline};
use chirp_protocol::{LoginPayload, RegisterPayload, Route, UserId, endpoints};
use chirp_session::{
    AuthApi, AvatarUpload, MemoryNavigator, Navigation, Navigator, ProfileUpdate, SessionCell,
    SessionPhase, SessionStore,
};
use chirp_transport::{Method, RequestDescriptor};
use chirp_transport::mock::{MockReply, MockTransport};

// =========================================================================
// Fixtures
// =========================================================================

type Store = SessionStore<MockTransport, EndpointRefresher<MockTransport>>;

const EXPIRED: &str = r#"{"status":"fail","code":"TOKEN_EXPIRED","message":"Access token expired"}"#;
const NO_REFRESH: &str = r#"{"status":"fail","code":"NO_REFRESH_TOKEN","message":"Please log in"}"#;

fn user_json(username: &str, email: &str, avatar: Option<&str>) -> String {
    let avatar = avatar
        .map(|url| format!(r#","avatar":"{url}""#))
        .unwrap_or_default();
    format!(
        r#"{{"status":"success","user":{{"_id":"u1","username":"{username}","email":"{email}"{avatar},"createdAt":"2024-05-01T10:00:00Z"}}}}"#
    )
}

fn ada() -> String {
    user_json("ada", "ada@example.com", None)
}

/// Wires a store the way the client facade does, starting at `path`.
fn setup(mock: &MockTransport, path: &str) -> (Store, Arc<MemoryNavigator>) {
    let navigator = Arc::new(MemoryNavigator::new(path));
    let nav: Arc<dyn Navigator> = navigator.clone();
    let cell = SessionCell::new();
    let pipeline = RequestPipeline::new(
        mock.clone(),
        EndpointRefresher::new(mock.clone()),
        cell.hooks(Arc::clone(&nav)),
    );
    let store = SessionStore::new(AuthApi::new(pipeline), cell, nav);
    (store, navigator)
}

async fn logged_in(mock: &MockTransport) -> (Store, Arc<MemoryNavigator>) {
    mock.respond(Method::Get, endpoints::REFRESH, 200, &ada());
    let (store, nav) = setup(mock, "/profile");
    assert_eq!(store.restore_session().await, SessionPhase::Authenticated);
    (store, nav)
}

fn login_payload() -> LoginPayload {
    LoginPayload {
        email: "ada@example.com".into(),
        password: "correct horse".into(),
    }
}

// =========================================================================
// restore_session
// =========================================================================

#[tokio::test]
async fn test_restore_session_with_valid_cookie_authenticates() {
    let mock = MockTransport::new();
    mock.respond(Method::Get, endpoints::REFRESH, 200, &ada());
    let (store, nav) = setup(&mock, "/");
    let mut rx = store.subscribe();
    assert_eq!(rx.borrow_and_update().phase(), SessionPhase::Restoring);

    let phase = store.restore_session().await;

    assert_eq!(phase, SessionPhase::Authenticated);
    let snapshot = store.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.user.unwrap().username, "ada");
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().phase(), SessionPhase::Authenticated);
    assert!(nav.history().is_empty());
}

#[tokio::test]
async fn test_restore_session_with_rejected_cookie_ends_unauthenticated() {
    let mock = MockTransport::new();
    mock.respond(Method::Get, endpoints::REFRESH, 401, NO_REFRESH);
    let (store, nav) = setup(&mock, "/profile");

    let phase = store.restore_session().await;

    assert_eq!(phase, SessionPhase::Unauthenticated);
    assert!(!store.snapshot().loading);
    assert_eq!(mock.call_count(endpoints::REFRESH), 1);
    // A 401 from the refresh endpoint is terminal for the pipeline.
    assert_eq!(nav.history(), [Navigation::HardRedirect(Route::Login)]);
}

#[tokio::test]
async fn test_restore_session_network_failure_ends_unauthenticated() {
    let mock = MockTransport::new();
    mock.push(Method::Get, endpoints::REFRESH, MockReply::NetworkDown);
    let (store, nav) = setup(&mock, "/");

    assert_eq!(store.restore_session().await, SessionPhase::Unauthenticated);
    assert!(!store.snapshot().loading);
    assert!(nav.history().is_empty());
}

#[tokio::test]
async fn test_restore_session_on_public_route_skips_network() {
    let mock = MockTransport::new();
    let (store, nav) = setup(&mock, "/login?next=%2Fprofile");

    assert_eq!(store.restore_session().await, SessionPhase::Unauthenticated);
    assert!(mock.calls().is_empty());
    assert!(!store.snapshot().loading);
    assert!(nav.history().is_empty());
}

// =========================================================================
// login / register
// =========================================================================

#[tokio::test]
async fn test_login_success_sets_user_and_navigates_home() {
    let mock = MockTransport::new();
    mock.respond(Method::Post, endpoints::LOGIN, 200, &ada());
    let (store, nav) = setup(&mock, "/login");

    let user = store.login(&login_payload()).await.unwrap();

    assert_eq!(user.username, "ada");
    assert!(store.is_authenticated());
    assert_eq!(nav.history(), [Navigation::Push(Route::Home)]);
}

#[tokio::test]
async fn test_login_failure_propagates_and_leaves_session_alone() {
    let mock = MockTransport::new();
    mock.respond(
        Method::Post,
        endpoints::LOGIN,
        400,
        r#"{"status":"fail","code":"INVALID_CREDENTIALS","message":"Invalid email or password"}"#,
    );
    let (store, nav) = setup(&mock, "/login");

    let err = store.login(&login_payload()).await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(!store.is_authenticated());
    assert!(nav.history().is_empty());
}

#[tokio::test]
async fn test_register_navigates_to_login_without_authenticating() {
    let mock = MockTransport::new();
    mock.respond(Method::Post, endpoints::REGISTER, 201, &ada());
    let (store, nav) = setup(&mock, "/register");

    let user = store
        .register(&RegisterPayload {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "correct horse".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.id, UserId::new("u1"));
    assert!(!store.is_authenticated());
    assert_eq!(nav.history(), [Navigation::Push(Route::Login)]);
}

#[tokio::test]
async fn test_register_conflict_propagates() {
    let mock = MockTransport::new();
    mock.respond(
        Method::Post,
        endpoints::REGISTER,
        409,
        r#"{"status":"fail","code":"USER_EXISTS","message":"Email already registered"}"#,
    );
    let (store, nav) = setup(&mock, "/register");

    let err = store
        .register(&RegisterPayload {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "pw".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Client { status: 409, .. }));
    assert!(nav.history().is_empty());
}

// =========================================================================
// logout
// =========================================================================

#[tokio::test]
async fn test_logout_clears_session() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.respond(Method::Post, endpoints::LOGOUT, 200, "");

    store.logout().await;

    assert!(!store.is_authenticated());
    assert_eq!(store.snapshot().phase(), SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn test_logout_network_failure_still_clears_session() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.push(Method::Post, endpoints::LOGOUT, MockReply::NetworkDown);

    store.logout().await;

    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_logout_server_error_still_clears_session() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.respond(Method::Post, endpoints::LOGOUT, 500, "");

    store.logout().await;

    assert!(!store.is_authenticated());
}

// =========================================================================
// update_profile / update_avatar
// =========================================================================

#[tokio::test]
async fn test_update_profile_changes_only_username() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.respond(
        Method::Put,
        endpoints::PROFILE,
        200,
        &user_json("new", "ada@example.com", None),
    );
    let before = store.current_user().unwrap();

    let update = ProfileUpdate::diff(&before, Some("new"), None).unwrap();
    store.update_profile(&update).await.unwrap();

    let after = store.current_user().unwrap();
    assert_eq!(after.username, "new");
    assert_eq!(after.id, before.id);
    assert_eq!(after.email, before.email);
    assert_eq!(after.avatar, before.avatar);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn test_update_profile_failure_keeps_previous_identity() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.respond(
        Method::Put,
        endpoints::PROFILE,
        409,
        r#"{"status":"fail","code":"USERNAME_TAKEN","message":"Username already taken"}"#,
    );
    let before = store.current_user().unwrap();

    let update = ProfileUpdate::diff(&before, Some("grace"), None).unwrap();
    let err = store.update_profile(&update).await.unwrap_err();

    assert_eq!(err.user_message(), "Username already taken");
    assert_eq!(store.current_user(), Some(before));
}

#[tokio::test]
async fn test_update_avatar_stores_returned_avatar() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.respond(
        Method::Put,
        endpoints::AVATAR,
        200,
        &user_json("ada", "ada@example.com", Some("https://cdn.example.com/u1.png")),
    );

    let upload = AvatarUpload::from_file_name("me.png", vec![0x89, b'P', b'N', b'G']).unwrap();
    store.update_avatar(&upload).await.unwrap();

    assert_eq!(
        store.current_user().unwrap().avatar.as_deref(),
        Some("https://cdn.example.com/u1.png")
    );
}

// =========================================================================
// Interaction with the pipeline
// =========================================================================

#[tokio::test]
async fn test_expired_session_is_renewed_transparently() {
    let mock = MockTransport::new();
    let (store, nav) = logged_in(&mock).await;
    mock.respond(Method::Put, endpoints::PROFILE, 401, EXPIRED);
    mock.respond(
        Method::Put,
        endpoints::PROFILE,
        200,
        &user_json("lovelace", "ada@example.com", None),
    );
    mock.respond(Method::Get, endpoints::REFRESH, 200, &ada());

    let update = ProfileUpdate::diff(&store.current_user().unwrap(), Some("lovelace"), None).unwrap();
    let user = store.update_profile(&update).await.unwrap();

    assert_eq!(user.username, "lovelace");
    assert_eq!(store.current_user().unwrap().username, "lovelace");
    assert_eq!(mock.call_count(endpoints::REFRESH), 2, "restore plus one renewal");
    assert!(nav.history().is_empty());
}

#[tokio::test]
async fn test_failed_renewal_clears_session_and_redirects_to_login() {
    let mock = MockTransport::new();
    let (store, nav) = logged_in(&mock).await;
    mock.respond(Method::Put, endpoints::PROFILE, 401, EXPIRED);
    mock.respond(Method::Get, endpoints::REFRESH, 401, NO_REFRESH);

    let update = ProfileUpdate::diff(&store.current_user().unwrap(), Some("lovelace"), None).unwrap();
    let err = store.update_profile(&update).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::SessionExpired {
            code: "NO_REFRESH_TOKEN".into(),
            message: "Please log in".into()
        }
    );
    assert!(!store.is_authenticated());
    assert_eq!(nav.history(), [Navigation::HardRedirect(Route::Login)]);
    assert_eq!(nav.current_path(), "/login");
}

#[tokio::test]
async fn test_refresh_settling_after_logout_does_not_restore_session() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.respond(Method::Get, "/posts", 401, EXPIRED);
    mock.respond(Method::Get, "/posts", 200, "[]");
    mock.respond(Method::Get, endpoints::REFRESH, 200, &ada());
    mock.respond(Method::Post, endpoints::LOGOUT, 200, "");
    mock.hold(endpoints::REFRESH);

    let pipeline = store.api().pipeline().clone();
    let request = tokio::spawn(async move { pipeline.execute(RequestDescriptor::get("/posts")).await });
    mock.wait_for_calls(endpoints::REFRESH, 2).await;

    store.logout().await;
    assert!(!store.is_authenticated());

    mock.release(endpoints::REFRESH);
    let response = request.await.unwrap().unwrap();

    assert_eq!(response.status, 200);
    assert!(!store.is_authenticated(), "renewal must not undo the logout");
    assert_eq!(store.snapshot().phase(), SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn test_renewal_after_logout_and_login_applies() {
    let mock = MockTransport::new();
    let (store, _nav) = logged_in(&mock).await;
    mock.respond(Method::Post, endpoints::LOGOUT, 200, "");
    mock.respond(Method::Post, endpoints::LOGIN, 200, &ada());
    store.logout().await;
    store.login(&login_payload()).await.unwrap();

    mock.respond(Method::Get, "/posts", 401, EXPIRED);
    mock.respond(Method::Get, "/posts", 200, "[]");
    mock.respond(
        Method::Get,
        endpoints::REFRESH,
        200,
        &user_json("renewed", "ada@example.com", None),
    );
    store
        .api()
        .pipeline()
        .execute(RequestDescriptor::get("/posts"))
        .await
        .unwrap();

    assert_eq!(store.current_user().unwrap().username, "renewed");
}

#[tokio::test]
async fn test_public_profile_rejects_id_that_escapes_its_segment() {
    let mock = MockTransport::new();
    let (store, _nav) = setup(&mock, "/");

    let err = store
        .api()
        .public_profile(&UserId::new(".."))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));

    mock.respond(
        Method::Get,
        "/users/..%2Fauth%2Flogout",
        200,
        r#"{"user":{"_id":"x","username":"grace","email":"grace@example.com","createdAt":"2024-06-01T09:00:00Z"}}"#,
    );
    store
        .api()
        .public_profile(&UserId::new("../auth/logout"))
        .await
        .unwrap();

    assert_eq!(mock.call_count(endpoints::LOGOUT), 0);
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_public_profile_decodes_user() {
    let mock = MockTransport::new();
    let (store, _nav) = setup(&mock, "/");
    mock.respond(
        Method::Get,
        "/users/u2",
        200,
        r#"{"user":{"_id":"u2","username":"grace","email":"grace@example.com","createdAt":"2024-06-01T09:00:00Z"}}"#,
    );

    let user = store.api().public_profile(&UserId::new("u2")).await.unwrap();

    assert_eq!(user.username, "grace");
    assert!(!store.is_authenticated(), "viewing a profile doesn't log in");
}
