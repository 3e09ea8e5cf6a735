//! Integration tests for the Taproom storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p taproom-integration-tests
//! ```
//!
//! No external services are needed. Each test starts a [`MockBackend`] on
//! an ephemeral localhost port. It answers the seven REST endpoints the
//! storefront uses with the same JSON shapes and status codes as the real
//! shop backend, and records every request it receives.
//!
//! # Test Categories
//!
//! - `api_client` - Envelope and typed helpers against the mock
//! - `catalog_flow` - Loading, filtering and paging the catalog
//! - `session_flow` - Register, login, persistence and logout
//! - `checkout_flow` - Cart to order, including the requests sent
//! - `storefront_routes` - The axum router driven with `tower::ServiceExt`

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use taproom_core::{NewProduct, Price, Product, ProductId};
use taproom_storefront::api::ApiClient;
use taproom_storefront::config::{ApiConfig, StorefrontConfig};

/// One request as seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to the server root, including the query string.
    pub path: String,
    /// Raw `Authorization` header, if any.
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct Account {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct Backend {
    products: Vec<Product>,
    accounts: Vec<Account>,
    /// token -> email
    tokens: HashMap<String, String>,
    /// email -> token handed out on login instead of a generated one
    login_tokens: HashMap<String, String>,
    orders: Vec<Value>,
    requests: Vec<RecordedRequest>,
    products_failure: Option<String>,
    next_id: u64,
}

impl Backend {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    fn email_for(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.tokens.get(token).cloned()
    }
}

#[derive(Debug, Clone, Default)]
struct Shared(Arc<Mutex<Backend>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.0.lock().expect("mock backend state poisoned")
    }
}

/// In-process stand-in for the shop's REST backend, mounted under `/api`.
///
/// The server task is aborted when the value is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start an empty backend on `127.0.0.1:0`.
    pub async fn start() -> Self {
        let state = Shared::default();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        let app = router(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Start a backend holding the three demo beers.
    pub async fn with_demo_catalog() -> Self {
        let backend = Self::start().await;
        backend.add_product("IPA Artesanal", "IPA", 5500, "IPA con intenso aroma a lúpulo.");
        backend.add_product("Stout Imperial", "Stout", 6200, "Robusta con notas de café.");
        backend.add_product("Lager Premium", "Lager", 4800, "Suave y refrescante.");
        backend
    }

    /// Base URL the storefront should be configured with.
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).expect("valid mock URL")
    }

    /// A client pointed at this backend.
    pub fn client(&self) -> ApiClient {
        ApiClient::with_base_url(self.base_url())
    }

    /// Storefront configuration pointed at this backend, with no checkout pause.
    pub fn storefront_config(&self) -> StorefrontConfig {
        StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            api: ApiConfig {
                base_url: self.base_url(),
                checkout_delay: Duration::ZERO,
            },
            cache_path: PathBuf::from("unused-session.json"),
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static")),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Insert a product directly and return its id.
    pub fn add_product(&self, name: &str, beer_type: &str, price: u32, description: &str) -> ProductId {
        let mut backend = self.state.lock();
        let id = ProductId::new(backend.next_id());
        backend.products.push(Product {
            id: id.clone(),
            name: name.to_string(),
            beer_type: beer_type.to_string(),
            price: Price::new(price),
            description: description.to_string(),
            image: format!("https://img.example/{}.jpg", id.as_str()),
            alcohol: 5.0,
            rating: None,
            reviews: None,
        });
        id
    }

    /// Insert `count` generic products.
    pub fn add_many(&self, count: usize) {
        for i in 1..=count {
            self.add_product(&format!("Cerveza {i:02}"), "Ale", 3000, "");
        }
    }

    /// Create an account directly.
    pub fn add_account(&self, name: &str, email: &str, password: &str) {
        self.state.lock().accounts.push(Account {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    /// Accept `token` as a bearer token for `email`.
    pub fn issue_token(&self, email: &str, token: &str) {
        self.state
            .lock()
            .tokens
            .insert(token.to_string(), email.to_string());
    }

    /// Hand out `token` the next times `email` logs in.
    pub fn set_login_token(&self, email: &str, token: &str) {
        self.state
            .lock()
            .login_tokens
            .insert(email.to_string(), token.to_string());
    }

    /// Make `GET /products` answer 500 with `detail` until cleared.
    pub fn fail_products(&self, detail: Option<&str>) {
        self.state.lock().products_failure = detail.map(ToString::to_string);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests matching `method` whose path starts with `path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.starts_with(path))
            .collect()
    }

    /// Stored orders as the backend would return them.
    pub fn orders(&self) -> Vec<Value> {
        self.state.lock().orders.clone()
    }

    /// Names of the products currently stored.
    pub fn product_names(&self) -> Vec<String> {
        self.state
            .lock()
            .products
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", delete(delete_product))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/checkout", post(checkout))
        .route("/orders/me", get(my_orders));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let uri = request.uri();
    let entry = RecordedRequest {
        method: request.method().to_string(),
        path: uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };
    state.lock().requests.push(entry);
    next.run(request).await
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Products serialize with `_id`, like the document store behind the backend.
fn product_json(product: &Product) -> Value {
    let mut value = serde_json::to_value(product).unwrap_or(Value::Null);
    if let Some(object) = value.as_object_mut() {
        if let Some(id) = object.remove("id") {
            object.insert("_id".to_string(), id);
        }
    }
    value
}

#[derive(Debug, Deserialize)]
struct ProductFilter {
    search: Option<String>,
    #[serde(rename = "type")]
    beer_type: Option<String>,
    max_price: Option<u32>,
}

async fn list_products(State(state): State<Shared>, Query(filter): Query<ProductFilter>) -> Response {
    let backend = state.lock();
    if let Some(message) = &backend.products_failure {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, message);
    }

    let search = filter.search.map(|s| s.to_lowercase());
    let products: Vec<Value> = backend
        .products
        .iter()
        .filter(|p| filter.beer_type.as_ref().is_none_or(|t| &p.beer_type == t))
        .filter(|p| filter.max_price.is_none_or(|max| p.price.amount() <= max))
        .filter(|p| {
            search.as_ref().is_none_or(|s| {
                p.name.to_lowercase().contains(s) || p.description.to_lowercase().contains(s)
            })
        })
        .map(product_json)
        .collect();

    Json(products).into_response()
}

async fn create_product(State(state): State<Shared>, Json(product): Json<NewProduct>) -> Response {
    let mut backend = state.lock();
    let id = ProductId::new(backend.next_id());
    backend.products.push(Product {
        id: id.clone(),
        name: product.name,
        beer_type: product.beer_type,
        price: product.price,
        description: product.description,
        image: product.image,
        alcohol: product.alcohol,
        rating: None,
        reviews: None,
    });

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Producto creado", "id": id })),
    )
        .into_response()
}

async fn delete_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut backend = state.lock();
    let before = backend.products.len();
    backend.products.retain(|p| p.id.as_str() != id);

    if backend.products.len() == before {
        return detail(StatusCode::NOT_FOUND, "Producto no encontrado");
    }
    Json(json!({ "message": "Producto eliminado" })).into_response()
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut backend = state.lock();
    if backend.accounts.iter().any(|a| a.email == body.email) {
        return detail(StatusCode::BAD_REQUEST, "Email ya registrado");
    }
    backend.accounts.push(Account {
        name: body.name,
        email: body.email,
        password: body.password,
    });

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Usuario registrado exitosamente" })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut backend = state.lock();
    let Some(account) = backend
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password)
        .cloned()
    else {
        return detail(StatusCode::UNAUTHORIZED, "Credenciales inválidas");
    };

    let token = backend
        .login_tokens
        .get(&account.email)
        .cloned()
        .unwrap_or_else(|| format!("token-{}", backend.next_id()));
    backend.tokens.insert(token.clone(), account.email.clone());

    Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": { "name": account.name, "email": account.email },
    }))
    .into_response()
}

async fn checkout(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut backend = state.lock();
    if backend.email_for(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let id = backend.next_id();
    let mut order = body;
    if let Some(object) = order.as_object_mut() {
        object.insert("_id".to_string(), json!(id));
        object.insert("status".to_string(), json!("PAGADO"));
        object.insert(
            "created_at".to_string(),
            json!(format!("2024-05-01T18:{:02}:00.000000", backend.orders.len() % 60)),
        );
    }
    backend.orders.push(order);

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Orden creada exitosamente", "order_id": id })),
    )
        .into_response()
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = state.lock();
    let Some(email) = backend.email_for(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };

    let orders: Vec<&Value> = backend
        .orders
        .iter()
        .filter(|o| o.get("user_email").and_then(Value::as_str) == Some(email.as_str()))
        .collect();
    Json(orders).into_response()
}
