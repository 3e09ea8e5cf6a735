//! Register, login, session persistence and logout.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::ExposeSecret;

use taproom_integration_tests::MockBackend;
use taproom_storefront::cache::{KeyValueCache, MemoryCache};
use taproom_storefront::stores::session::keys;
use taproom_storefront::stores::{SessionError, SessionStore};

#[tokio::test]
async fn test_register_then_login_persists_session() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let cache = MemoryCache::new();

    SessionStore::register(&api, "Ana Rojas", "ana@example.cl", "secreto123")
        .await
        .unwrap();

    let mut session = SessionStore::new(Arc::new(cache.clone()));
    let user = session
        .login(&api, " ana@example.cl ", "secreto123")
        .await
        .unwrap();
    assert_eq!(user.name, "Ana Rojas");
    assert!(session.is_authenticated());
    assert_eq!(session.greeting_name(), "Ana");

    let cached_token = cache.get(keys::ACCESS_TOKEN).unwrap().unwrap();
    assert!(cached_token.starts_with("token-"));
    assert!(cache.get(keys::CURRENT_USER).unwrap().unwrap().contains("ana@example.cl"));

    // A new process picks the session back up from the cache.
    let restored = SessionStore::restore(Arc::new(cache.clone()));
    assert!(restored.is_authenticated());
    assert_eq!(restored.token().unwrap().expose_secret(), cached_token);
    assert_eq!(restored.user().unwrap().name, "Ana Rojas");
}

#[tokio::test]
async fn test_bad_credentials_leave_session_logged_out() {
    let backend = MockBackend::start().await;
    backend.add_account("Ana Rojas", "ana@example.cl", "secreto123");
    let api = backend.client();
    let cache = MemoryCache::new();
    let mut session = SessionStore::new(Arc::new(cache.clone()));

    let err = session
        .login(&api, "ana@example.cl", "incorrecta")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Credenciales inválidas");
    assert!(!session.is_authenticated());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_local_validation_sends_nothing() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let mut session = SessionStore::new(Arc::new(MemoryCache::new()));

    let err = session.login(&api, "   ", "secreto123").await.unwrap_err();
    assert!(matches!(err, SessionError::MissingFields));

    let err = SessionStore::register(&api, "Ana", "sin-arroba", "secreto123")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidEmail(_)));

    let err = SessionStore::register(&api, "Ana", "ana@example.cl", "corta")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::PasswordTooShort { min: 8 }));

    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_surfaces_backend_message() {
    let backend = MockBackend::start().await;
    backend.add_account("Ana Rojas", "ana@example.cl", "secreto123");
    let api = backend.client();

    let err = SessionStore::register(&api, "Ana", "ana@example.cl", "otraclave1")
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(_)));
    assert_eq!(err.to_string(), "Email ya registrado");
}

#[tokio::test]
async fn test_logout_wipes_cache() {
    let backend = MockBackend::start().await;
    backend.add_account("Ana Rojas", "ana@example.cl", "secreto123");
    let api = backend.client();
    let cache = MemoryCache::new();
    cache.set("unrelated", "value").unwrap();
    let mut session = SessionStore::new(Arc::new(cache.clone()));

    session.login(&api, "ana@example.cl", "secreto123").await.unwrap();
    session.logout();

    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert_eq!(session.greeting_name(), "Mi Cuenta");
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_orders_use_session_token() {
    let backend = MockBackend::start().await;
    backend.add_account("Ana Rojas", "ana@example.cl", "secreto123");
    let api = backend.client();
    let mut session = SessionStore::new(Arc::new(MemoryCache::new()));
    session.login(&api, "ana@example.cl", "secreto123").await.unwrap();

    let orders = api.my_orders(session.token()).await.unwrap();

    assert!(orders.is_empty());
    let request = &backend.requests_to("GET", "/api/orders/me")[0];
    let expected = format!("Bearer {}", session.token().unwrap().expose_secret());
    assert_eq!(request.authorization.as_deref(), Some(expected.as_str()));
}
