//! From cart to placed order.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use taproom_core::Price;
use taproom_integration_tests::MockBackend;
use taproom_storefront::api::ProductQuery;
use taproom_storefront::cache::{KeyValueCache, MemoryCache};
use taproom_storefront::checkout::{CheckoutFlow, CheckoutOutcome, CheckoutState};
use taproom_storefront::stores::session::keys;
use taproom_storefront::stores::{CartStore, CatalogStore, SessionStore};
use taproom_storefront::view::{NoticeKind, Section, ViewController};

/// A session restored from a cache holding token `token` for Ana.
fn cached_session(token: &str) -> SessionStore {
    let cache = MemoryCache::new();
    cache.set(keys::ACCESS_TOKEN, token).unwrap();
    cache
        .set(
            keys::CURRENT_USER,
            &json!({ "name": "Ana Rojas", "email": "ana@example.cl" }).to_string(),
        )
        .unwrap();
    SessionStore::restore(Arc::new(cache))
}

/// Two IPAs and one Stout from the demo catalog.
async fn filled_cart(backend: &MockBackend) -> CartStore {
    let mut catalog = CatalogStore::new();
    catalog
        .load(&backend.client(), ProductQuery::default())
        .await
        .unwrap();

    let mut cart = CartStore::new();
    let ipa = catalog.products()[0].clone();
    let stout = catalog.products()[1].clone();
    cart.add(ipa.clone());
    cart.add(stout);
    cart.add(ipa);
    cart
}

#[tokio::test]
async fn test_checkout_sends_bearer_token_and_clears_cart() {
    let backend = MockBackend::with_demo_catalog().await;
    backend.issue_token("ana@example.cl", "abc");
    let api = backend.client();
    let session = cached_session("abc");
    let mut cart = filled_cart(&backend).await;
    assert_eq!(cart.total(), Price::new(17_200));

    let mut flow = CheckoutFlow::new(Duration::ZERO);
    let outcome = flow
        .submit(&mut cart, &session, &api, Some("  Av. Providencia 123 ".to_string()))
        .await;

    let CheckoutOutcome::Placed(receipt) = outcome else {
        panic!("expected a placed order, got {outcome:?}");
    };
    assert_eq!(receipt.order_id.as_str().len(), 24);
    assert_eq!(flow.state(), CheckoutState::Succeeded);
    assert!(cart.is_empty());

    let requests = backend.requests_to("POST", "/api/checkout");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer abc"));

    let order = &backend.orders()[0];
    assert_eq!(order["user_email"], "ana@example.cl");
    assert_eq!(order["total_amount"], 17_200);
    assert_eq!(order["address"], "Av. Providencia 123");
    assert_eq!(order["items"][0]["name"], "IPA Artesanal");
    assert_eq!(order["items"].as_array().unwrap().len(), 3);
    assert_eq!(order["items"][0]["quantity"], 1);
    assert_eq!(order["items"][2]["name"], "IPA Artesanal");
}

#[tokio::test]
async fn test_login_token_is_sent_with_checkout() {
    let backend = MockBackend::with_demo_catalog().await;
    backend.add_account("Ana", "a@x.cl", "secreto123");
    backend.set_login_token("a@x.cl", "abc");
    let api = backend.client();
    let cache = MemoryCache::new();
    let mut session = SessionStore::new(Arc::new(cache.clone()));

    session.login(&api, "a@x.cl", "secreto123").await.unwrap();
    assert_eq!(cache.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("abc"));

    let mut cart = filled_cart(&backend).await;
    let mut flow = CheckoutFlow::new(Duration::ZERO);
    let outcome = flow.submit(&mut cart, &session, &api, None).await;

    assert!(matches!(outcome, CheckoutOutcome::Placed(_)));
    let request = &backend.requests_to("POST", "/api/checkout")[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer abc"));
    assert_eq!(backend.orders()[0]["user_email"], "a@x.cl");
}

#[tokio::test]
async fn test_blank_address_is_omitted() {
    let backend = MockBackend::with_demo_catalog().await;
    backend.issue_token("ana@example.cl", "abc");
    let api = backend.client();
    let session = cached_session("abc");
    let mut cart = filled_cart(&backend).await;

    let mut flow = CheckoutFlow::new(Duration::ZERO);
    let outcome = flow
        .submit(&mut cart, &session, &api, Some("   ".to_string()))
        .await;

    assert!(matches!(outcome, CheckoutOutcome::Placed(_)));
    assert!(backend.orders()[0].get("address").is_none());
}

#[tokio::test]
async fn test_empty_cart_makes_no_request() {
    let backend = MockBackend::start().await;
    backend.issue_token("ana@example.cl", "abc");
    let api = backend.client();
    let session = cached_session("abc");
    let mut cart = CartStore::new();

    let mut flow = CheckoutFlow::new(Duration::ZERO);
    let outcome = flow.submit(&mut cart, &session, &api, None).await;

    assert_eq!(outcome, CheckoutOutcome::EmptyCart);
    assert_eq!(flow.state(), CheckoutState::Failed);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_logged_out_checkout_makes_no_request_and_keeps_cart() {
    let backend = MockBackend::with_demo_catalog().await;
    let api = backend.client();
    let session = SessionStore::new(Arc::new(MemoryCache::new()));
    let mut cart = filled_cart(&backend).await;
    let before = backend.requests().len();

    let mut flow = CheckoutFlow::new(Duration::ZERO);
    let outcome = flow.submit(&mut cart, &session, &api, None).await;

    assert_eq!(outcome, CheckoutOutcome::AuthenticationRequired);
    assert_eq!(flow.state(), CheckoutState::Idle);
    assert_eq!(cart.count(), 3);
    assert_eq!(backend.requests().len(), before);
}

#[tokio::test]
async fn test_rejected_token_keeps_cart() {
    let backend = MockBackend::with_demo_catalog().await;
    let api = backend.client();
    let session = cached_session("stale");
    let mut cart = filled_cart(&backend).await;

    let mut flow = CheckoutFlow::new(Duration::ZERO);
    let outcome = flow.submit(&mut cart, &session, &api, None).await;

    let CheckoutOutcome::Rejected(failure) = outcome else {
        panic!("expected a rejection, got {outcome:?}");
    };
    assert!(failure.is_unauthorized());
    assert_eq!(flow.state(), CheckoutState::Failed);
    assert_eq!(cart.count(), 3);
    assert!(backend.orders().is_empty());

    // A failed attempt can be retried.
    backend.issue_token("ana@example.cl", "stale");
    let outcome = flow.submit(&mut cart, &session, &api, None).await;
    assert!(matches!(outcome, CheckoutOutcome::Placed(_)));
}

#[tokio::test]
async fn test_view_checkout_lands_on_order_history() {
    let backend = MockBackend::with_demo_catalog().await;
    backend.issue_token("ana@example.cl", "abc");
    let mut view = ViewController::new(backend.client(), cached_session("abc"), Duration::ZERO);
    view.start().await;

    let stout = view.catalog().products()[1].id.clone();
    view.add_to_cart(&stout);
    view.toggle_cart();
    assert!(view.cart_open());

    let notice = view.checkout(None).await.unwrap();

    assert_eq!(notice.kind, NoticeKind::Success);
    assert!(notice.text.starts_with("¡Pedido realizado! ID Pedido: "));
    assert_eq!(view.section(), Section::Orders);
    assert!(!view.cart_open());
    assert!(view.cart().is_empty());
    assert_eq!(view.orders().len(), 1);
    assert_eq!(view.orders()[0].total_amount, Price::new(6200));

    let orders_request = &backend.requests_to("GET", "/api/orders/me")[0];
    assert_eq!(orders_request.authorization.as_deref(), Some("Bearer abc"));
}

#[tokio::test]
async fn test_view_checkout_without_session_opens_login() {
    let backend = MockBackend::with_demo_catalog().await;
    let session = SessionStore::new(Arc::new(MemoryCache::new()));
    let mut view = ViewController::new(backend.client(), session, Duration::ZERO);
    view.start().await;

    let ipa = view.catalog().products()[0].id.clone();
    view.add_to_cart(&ipa);
    let notice = view.checkout(None).await.unwrap();

    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.text, "Debes iniciar sesión para comprar.");
    assert_eq!(view.section(), Section::Account);
    assert_eq!(view.cart().count(), 1);
    assert!(backend.requests_to("POST", "/api/checkout").is_empty());
}

#[tokio::test]
async fn test_checkout_pause_is_honored() {
    let backend = MockBackend::with_demo_catalog().await;
    backend.issue_token("ana@example.cl", "abc");
    let api = backend.client();
    let session = cached_session("abc");
    let mut cart = filled_cart(&backend).await;

    let mut flow = CheckoutFlow::new(Duration::from_millis(50));
    let started = std::time::Instant::now();
    let outcome = flow.submit(&mut cart, &session, &api, None).await;

    assert!(matches!(outcome, CheckoutOutcome::Placed(_)));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_corrupt_cached_profile_starts_logged_out() {
    let backend = MockBackend::with_demo_catalog().await;
    backend.issue_token("ana@example.cl", "abc");
    let cache = MemoryCache::new();
    cache.set(keys::ACCESS_TOKEN, "abc").unwrap();
    cache.set(keys::CURRENT_USER, "{not json").unwrap();

    let session = SessionStore::restore(Arc::new(cache.clone()));
    let mut view = ViewController::new(backend.client(), session, Duration::ZERO);
    view.start().await;
    assert!(!view.session().is_authenticated());

    let ipa = view.catalog().products()[0].id.clone();
    view.add_to_cart(&ipa);
    let notice = view.checkout(None).await.unwrap();

    assert_eq!(notice.text, "Debes iniciar sesión para comprar.");
    assert_eq!(view.section(), Section::Account);
    assert!(cache.get(keys::ACCESS_TOKEN).unwrap().is_none());
    assert!(backend.requests_to("POST", "/api/checkout").is_empty());
}
