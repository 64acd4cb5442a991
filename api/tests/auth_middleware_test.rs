//! Bearer authentication behaviour of the HTTP layer

mod common;

use std::sync::Arc;

use actix_web::{
    http::{header, StatusCode},
    test, web, App, HttpResponse,
};
use chrono::{Duration, Utc};
use gk_api::{
    middleware::{ActiveUser, AuthContext},
    AppState,
};
use gk_core::{
    domain::entities::{ClaimSet, TokenKind, User},
    repositories::InMemoryUserRepository,
};
use gk_shared::config::ServerConfig;
use serde_json::Value;

use common::{access_token, bearer, login, state, token_service, TestStore};

fn challenge(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    resp.headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|value| value.to_str().unwrap().to_string())
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_missing_header_is_challenged() {
    let (state, _) = state();
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/sessions").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(challenge(&resp), "Bearer realm=\"api\"");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_non_bearer_scheme_is_challenged() {
    let (state, _) = state();
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(challenge(&resp).starts_with("Bearer realm="));
}

#[actix_web::test]
async fn test_garbage_token_is_invalid() {
    let (state, _) = state();
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(challenge(&resp).contains("error=\"invalid_token\""));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_valid_access_token_reaches_handler() {
    let (state, _) = state();
    let token = access_token(&state, "user-1").await;
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["current"], true);
}

#[actix_web::test]
async fn test_refresh_token_is_not_an_access_token() {
    let (state, _) = state();
    let pair = login(&state, "user-1").await;
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(bearer(&pair.refresh_token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_revoked_token_is_rejected() {
    let (state, _) = state();
    let token = access_token(&state, "user-1").await;
    state.token_service.revoke(&token).await.unwrap();
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(challenge(&resp).contains("error=\"invalid_token\""));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "REVOKED_TOKEN");
}

#[actix_web::test]
async fn test_expired_token_is_rejected() {
    let (state, _) = state();
    let token = state
        .token_service
        .issue_at(
            &ClaimSet::new("user-1"),
            TokenKind::Access,
            Some(Duration::minutes(5)),
            Utc::now() - Duration::hours(1),
        )
        .await
        .unwrap();
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "EXPIRED_TOKEN");
}

#[actix_web::test]
async fn test_store_down_is_server_error_without_challenge() {
    let (state, store) = state();
    let token = access_token(&state, "user-1").await;
    store.take_down();
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "internal_error");
    assert!(!body.to_string().contains("db.internal"));
}

async fn whoami(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "sub": auth.user_id() }))
}

async fn active_only(ActiveUser(user): ActiveUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "username": user.username }))
}

fn user_app_state(store: &TestStore, users: &Arc<InMemoryUserRepository>) -> web::Data<AppState<TestStore>> {
    web::Data::new(AppState::new(token_service(store)).with_user_lookup(users.clone()))
}

#[actix_web::test]
async fn test_active_user_extractor() {
    let store = TestStore::default();
    let users = Arc::new(InMemoryUserRepository::new());
    users.insert(User::new("alice", "Alice")).await;
    let mut bob = User::new("bob", "Bob");
    bob.deactivate();
    users.insert(bob).await;

    let state = user_app_state(&store, &users);
    let alice = access_token(&state, "alice").await;
    let bob = access_token(&state, "bob").await;
    let ghost = access_token(&state, "ghost").await;

    let jwt = state.jwt_auth();
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/me", web::get().to(active_only).wrap(jwt.clone()))
            .route("/whoami", web::get().to(whoami).wrap(jwt)),
    )
    .await;

    let req = test::TestRequest::get().uri("/me").insert_header(bearer(&alice)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "Alice");

    // Disabled accounts still authenticate but fail the active check
    let req = test::TestRequest::get().uri("/whoami").insert_header(bearer(&bob)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/me").insert_header(bearer(&bob)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INACTIVE_USER");

    let req = test::TestRequest::get().uri("/whoami").insert_header(bearer(&ghost)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_custom_realm_in_challenge() {
    let store = TestStore::default();
    let state = web::Data::new(AppState::new(token_service(&store)).with_realm("billing"));
    let app = test::init_service(gk_api::create_app(state, &ServerConfig::default())).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/sessions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(challenge(&resp), "Bearer realm=\"billing\"");
}
