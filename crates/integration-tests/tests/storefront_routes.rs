//! The storefront router driven in-process with `tower::ServiceExt`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use tower::ServiceExt;

use taproom_integration_tests::MockBackend;
use taproom_storefront::cache::{KeyValueCache, MemoryCache};
use taproom_storefront::routes;
use taproom_storefront::stores::session::keys;
use taproom_storefront::state::AppState;

const FORM: &str = "application/x-www-form-urlencoded";

async fn storefront(backend: &MockBackend) -> (Router, AppState) {
    let state = AppState::new(backend.storefront_config(), Arc::new(MemoryCache::new()));
    state.view().await.start().await;
    (routes::app(state.clone()), state)
}

async fn get(app: &Router, uri: &str, htmx: bool) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if htmx {
        request = request.header("HX-Request", "true");
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str, form: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, FORM)
        .header("HX-Request", "true")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let backend = MockBackend::start().await;
    let (app, _) = storefront(&backend).await;

    let response = get(&app, "/health", false).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_index_renders_shell_with_featured_beers() {
    let backend = MockBackend::with_demo_catalog().await;
    let (app, _) = storefront(&backend).await;

    let response = get(&app, "/", false).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains(r#"id="main""#));
    assert!(html.contains("IPA Artesanal"));
    assert!(html.contains("Mi Cuenta"));
    assert!(!html.contains("hx-swap-oob"));
}

#[tokio::test]
async fn test_section_switch_is_fragment_for_htmx_and_page_otherwise() {
    let backend = MockBackend::with_demo_catalog().await;
    let (app, _) = storefront(&backend).await;

    let fragment = body_text(get(&app, "/sections/catalog", true).await).await;
    assert!(!fragment.contains("<!DOCTYPE html>"));
    assert!(fragment.contains(r#"hx-swap-oob="true""#));
    assert!(fragment.contains("Lager Premium"));

    let page = body_text(get(&app, "/sections/catalog", false).await).await;
    assert!(page.contains("<!DOCTYPE html>"));
    assert!(page.contains("Lager Premium"));
}

#[tokio::test]
async fn test_unknown_section_is_not_found() {
    let backend = MockBackend::start().await;
    let (app, _) = storefront(&backend).await;

    let response = get(&app, "/sections/bodega", true).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_orders_without_session_redirects_to_account() {
    let backend = MockBackend::start().await;
    let (app, state) = storefront(&backend).await;

    let html = body_text(get(&app, "/sections/orders", true).await).await;

    assert!(html.contains("Inicia sesión para ver tus pedidos"));
    assert_eq!(state.view().await.section().as_str(), "account");
    assert!(backend.requests_to("GET", "/api/orders/me").is_empty());
}

#[tokio::test]
async fn test_add_to_cart_triggers_cart_update() {
    let backend = MockBackend::with_demo_catalog().await;
    let (app, state) = storefront(&backend).await;
    let id = state.view().await.catalog().products()[0].id.clone();

    let response = post(&app, "/cart/add", &format!("product_id={}", id.as_str())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Trigger"], "cart-updated");
    let html = body_text(response).await;
    assert!(html.contains("IPA Artesanal añadido al carrito"));
    assert!(html.contains(r#"<span id="cart-count" class="cart-count">1</span>"#));

    let response = post(&app, "/cart/remove", "index=0").await;
    assert_eq!(response.headers()["HX-Trigger"], "cart-updated");
    assert!(body_text(response).await.contains("Carrito vacío"));
}

#[tokio::test]
async fn test_add_unknown_product_shows_error() {
    let backend = MockBackend::with_demo_catalog().await;
    let (app, state) = storefront(&backend).await;

    let html = body_text(post(&app, "/cart/add", "product_id=nope").await).await;

    assert!(html.contains("Producto no disponible"));
    assert!(state.view().await.cart().is_empty());
}

#[tokio::test]
async fn test_filter_rejects_bad_price() {
    let backend = MockBackend::with_demo_catalog().await;
    let (app, _) = storefront(&backend).await;

    let response = post(&app, "/catalog/filter", "type=IPA&max_price=barata").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_filter_queries_backend() {
    let backend = MockBackend::with_demo_catalog().await;
    let (app, _) = storefront(&backend).await;

    let html = body_text(post(&app, "/catalog/filter", "type=Stout&max_price=").await).await;

    assert!(html.contains("Stout Imperial"));
    assert!(!html.contains("Lager Premium"));
    let requests = backend.requests_to("GET", "/api/products");
    assert_eq!(requests.last().unwrap().path, "/api/products?type=Stout");
}

#[tokio::test]
async fn test_login_checkout_logout() {
    let backend = MockBackend::with_demo_catalog().await;
    backend.add_account("Ana Rojas", "ana@example.cl", "secreto123");
    let (app, state) = storefront(&backend).await;

    let html = body_text(
        post(&app, "/auth/login", "email=ana%40example.cl&password=secreto123").await,
    )
    .await;
    assert!(html.contains("¡Bienvenido!"));
    assert!(html.contains("Hola, Ana"));

    let id = state.view().await.catalog().products()[1].id.clone();
    post(&app, "/cart/add", &format!("product_id={}", id.as_str())).await;

    let response = post(&app, "/checkout", "address=Av.+Providencia+123").await;
    assert_eq!(response.headers()["HX-Trigger"], "cart-updated");
    let html = body_text(response).await;
    assert!(html.contains("¡Pedido realizado! ID Pedido: "));
    assert_eq!(backend.orders().len(), 1);
    assert_eq!(backend.orders()[0]["address"], "Av. Providencia 123");

    let response = post(&app, "/auth/logout", "").await;
    assert_eq!(response.headers()["HX-Refresh"], "true");
    let view = state.view().await;
    assert!(!view.session().is_authenticated());
    assert_eq!(view.section().as_str(), "home");
}

#[tokio::test]
async fn test_login_failure_shows_backend_message() {
    let backend = MockBackend::start().await;
    let (app, state) = storefront(&backend).await;

    let html = body_text(
        post(&app, "/auth/login", "email=ana%40example.cl&password=incorrecta").await,
    )
    .await;

    assert!(html.contains("Credenciales inválidas"));
    assert!(!state.view().await.session().is_authenticated());
}

#[tokio::test]
async fn test_admin_create_and_delete() {
    let backend = MockBackend::start().await;
    let (app, state) = storefront(&backend).await;

    let html = body_text(
        post(
            &app,
            "/admin/products",
            "name=Porter+Nocturna&type=Porter&price=5900&description=Tostada&image=&alcohol=6.0",
        )
        .await,
    )
    .await;
    assert!(html.contains("Porter Nocturna"));
    assert_eq!(backend.product_names(), vec!["Porter Nocturna"]);

    let id = state.view().await.admin_products()[0].id.clone();
    let html = body_text(post(&app, &format!("/admin/products/{}/delete", id.as_str()), "").await).await;
    assert!(html.contains("Producto eliminado"));
    assert!(backend.product_names().is_empty());
}

#[tokio::test]
async fn test_admin_create_validates_locally() {
    let backend = MockBackend::start().await;
    let (app, _) = storefront(&backend).await;

    let html = body_text(post(&app, "/admin/products", "name=&type=IPA&price=0").await).await;

    assert!(html.contains("name is required"));
    assert!(backend.requests_to("POST", "/api/products").is_empty());
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let backend = MockBackend::start().await;
    let (app, _) = storefront(&backend).await;

    let response = get(&app, "/static/css/main.css", false).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(".cart-sidebar"));
}

#[tokio::test]
async fn test_corrupt_cached_session_shows_login_form() {
    let backend = MockBackend::start().await;
    let cache = MemoryCache::new();
    cache.set(keys::ACCESS_TOKEN, "abc").unwrap();
    cache.set(keys::CURRENT_USER, "{not json").unwrap();
    let state = AppState::new(backend.storefront_config(), Arc::new(cache));
    let app = routes::app(state.clone());

    let html = body_text(get(&app, "/sections/account", true).await).await;

    assert!(html.contains(r#"hx-post="/auth/login""#));
    assert!(!html.contains("Cerrar Sesión"));
    assert!(!state.view().await.session().is_authenticated());
}
