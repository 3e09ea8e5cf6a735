//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                             - Page shell
//! GET  /health                       - Health check
//! GET  /sections/{section}           - Switch section (HTMX update or full page)
//!
//! # Catalog (HTMX updates)
//! POST /catalog/search               - Free-text search
//! POST /catalog/filter               - Style / max price filter
//! POST /catalog/page                 - Previous / next page
//!
//! # Cart (HTMX updates, trigger cart-updated)
//! POST /cart/add                     - Append a product
//! POST /cart/remove                  - Remove a cart row by index
//! POST /cart/toggle                  - Open / close the sidebar
//! POST /checkout                     - Place the order
//!
//! # Account
//! POST /auth/tab                     - Login / register form switch
//! POST /auth/login                   - Login action
//! POST /auth/register                - Register action
//! POST /auth/logout                  - Logout action (HX-Refresh)
//!
//! # Admin
//! POST /admin/products               - Create product
//! POST /admin/products/{id}/delete   - Delete product
//!
//! GET  /static/*                     - Stylesheet
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod home;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/search", post(catalog::search))
        .route("/filter", post(catalog::filter))
        .route("/page", post(catalog::page))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/toggle", post(cart::toggle))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/tab", post(auth::tab))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create))
        .route("/products/{id}/delete", post(admin::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/sections/{section}", get(home::show_section))
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}

/// The complete application: routes, health check, static files and
/// request tracing, bound to `state`.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
