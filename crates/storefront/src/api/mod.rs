//! REST client for the shop backend.
//!
//! # Architecture
//!
//! - One `reqwest::Client`, one fixed base URL; endpoint paths are appended
//!   verbatim (`/products`, `/auth/login`, ...)
//! - Single attempt per call: no retries, no timeout, no backoff
//! - Every call yields an [`ApiResponse`] envelope, never a transport error.
//!   Unreachable backends and unreadable bodies are folded into the same
//!   `{ ok: false, status: 500, data: { detail } }` shape the UI already
//!   knows how to show
//! - Typed helpers turn the envelope into `Result<T, ApiFailure>`
//!
//! # Example
//!
//! ```rust,ignore
//! use taproom_storefront::api::{ApiClient, ProductQuery};
//!
//! let api = ApiClient::new(&config.api);
//! let beers = api.list_products(&ProductQuery::search("ipa")).await?;
//! ```

pub mod types;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use taproom_core::{NewProduct, Order, Product, ProductId};

use crate::config::ApiConfig;

pub use types::{
    CheckoutReceipt, CheckoutRequest, CreatedProduct, Credentials, LoginResponse, ProductQuery,
    Registration,
};

/// Detail reported when the backend cannot be reached or answers garbage.
pub const CONNECTION_ERROR_DETAIL: &str = "connection error";

/// Status reported for connection failures.
pub const CONNECTION_ERROR_STATUS: u16 = 500;

/// Uniform result of a backend call.
///
/// `data` is the decoded JSON body (`null` for an empty body).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    /// The envelope for a request that never produced a usable response.
    #[must_use]
    pub fn connection_error() -> Self {
        Self {
            ok: false,
            status: CONNECTION_ERROR_STATUS,
            data: json!({ "detail": CONNECTION_ERROR_DETAIL }),
        }
    }

    /// The backend's `detail` message, if the body carries one.
    ///
    /// Validation errors arrive as a list of objects with a `msg` field;
    /// those messages are joined with `"; "`.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self.data.get("detail")? {
            Value::String(message) => Some(message.clone()),
            Value::Array(errors) => {
                let messages: Vec<&str> = errors
                    .iter()
                    .filter_map(|e| e.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Split the envelope into the success payload or the failure detail.
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` for non-2xx responses, and for 2xx responses
    /// whose body does not match `T`.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiFailure> {
        if !self.ok {
            let detail = self
                .detail()
                .unwrap_or_else(|| format!("request failed with status {}", self.status));
            return Err(ApiFailure {
                status: self.status,
                detail,
            });
        }

        serde_json::from_value(self.data).map_err(|e| ApiFailure {
            status: self.status,
            detail: format!("unexpected response from server: {e}"),
        })
    }
}

/// The failure half of a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail} (status {status})")]
pub struct ApiFailure {
    /// HTTP status (500 for connection failures).
    pub status: u16,
    /// Message meant for the user, usually the backend's `detail`.
    pub detail: String,
}

impl ApiFailure {
    /// Whether this failure stands for an unreachable backend.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        self.status == CONNECTION_ERROR_STATUS && self.detail == CONNECTION_ERROR_DETAIL
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Shop backend REST client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the configured backend.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_base_url(config.base_url.clone())
    }

    /// Create a client for an explicit base URL.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// The base URL endpoints are appended to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for an endpoint path such as `/products?type=IPA`.
    fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }

    /// Issue one request against the backend.
    ///
    /// The body, when present, is sent as JSON. The bearer token is attached
    /// only when `token` is `Some`: authenticated endpoints pass the session
    /// token (which may itself be absent), anonymous ones pass `None`.
    #[instrument(skip(self, body, token), fields(authenticated = token.is_some()))]
    pub async fn request<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&SecretString>,
    ) -> ApiResponse
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self
            .client
            .request(method, self.endpoint_url(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Backend request failed");
                return ApiResponse::connection_error();
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, status = status.as_u16(), "Failed to read backend response");
                return ApiResponse::connection_error();
            }
        };

        let data = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, status = status.as_u16(), "Backend returned non-JSON body");
                    return ApiResponse::connection_error();
                }
            }
        };

        debug!(status = status.as_u16(), "Backend responded");

        ApiResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            data,
        }
    }

    /// Request without a body.
    async fn request_empty(
        &self,
        method: Method,
        endpoint: &str,
        token: Option<&SecretString>,
    ) -> ApiResponse {
        self.request::<()>(method, endpoint, None, token).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// `GET /products` with optional search and filter parameters.
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` if the backend is unreachable or rejects the query.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiFailure> {
        self.request_empty(Method::GET, &query.to_endpoint(), None)
            .await
            .into_result()
    }

    /// `POST /products`.
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` if the backend rejects the product.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<CreatedProduct, ApiFailure> {
        self.request(Method::POST, "/products", Some(product), None)
            .await
            .into_result()
    }

    /// `DELETE /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` if the backend refuses the deletion.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiFailure> {
        let endpoint = format!("/products/{}", urlencoding::encode(id.as_str()));
        self.request_empty(Method::DELETE, &endpoint, None)
            .await
            .into_result::<IgnoredAny>()
            .map(|_| ())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` with the backend's message (e.g. email taken).
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiFailure> {
        self.request(Method::POST, "/auth/register", Some(registration), None)
            .await
            .into_result::<IgnoredAny>()
            .map(|_| ())
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` with the backend's message (e.g. bad credentials).
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiFailure> {
        self.request(Method::POST, "/auth/login", Some(credentials), None)
            .await
            .into_result()
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// `POST /checkout` (authenticated).
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` if the backend rejects the order or the token.
    #[instrument(skip(self, order, token), fields(items = order.items.len()))]
    pub async fn checkout(
        &self,
        order: &CheckoutRequest,
        token: Option<&SecretString>,
    ) -> Result<CheckoutReceipt, ApiFailure> {
        self.request(Method::POST, "/checkout", Some(order), token)
            .await
            .into_result()
    }

    /// `GET /orders/me` (authenticated).
    ///
    /// # Errors
    ///
    /// Returns `ApiFailure` if the backend is unreachable or rejects the token.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: Option<&SecretString>) -> Result<Vec<Order>, ApiFailure> {
        self.request_empty(Method::GET, "/orders/me", token)
            .await
            .into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_base_url(Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let api = client("http://127.0.0.1:8000/api");
        assert_eq!(
            api.endpoint_url("/products?type=IPA"),
            "http://127.0.0.1:8000/api/products?type=IPA"
        );

        let api = client("http://127.0.0.1:8000/api/");
        assert_eq!(api.endpoint_url("orders/me"), "http://127.0.0.1:8000/api/orders/me");
    }

    #[test]
    fn test_connection_error_envelope() {
        let response = ApiResponse::connection_error();
        assert!(!response.ok);
        assert_eq!(response.status, 500);
        assert_eq!(response.detail().as_deref(), Some("connection error"));

        let failure = response.into_result::<Value>().unwrap_err();
        assert!(failure.is_connection_error());
    }

    #[test]
    fn test_detail_from_validation_errors() {
        let response = ApiResponse {
            ok: false,
            status: 422,
            data: json!({ "detail": [
                { "loc": ["body", "email"], "msg": "value is not a valid email address" },
                { "loc": ["body", "password"], "msg": "too short" }
            ]}),
        };
        assert_eq!(
            response.detail().as_deref(),
            Some("value is not a valid email address; too short")
        );
    }

    #[test]
    fn test_failure_without_detail_uses_status() {
        let response = ApiResponse {
            ok: false,
            status: 404,
            data: Value::Null,
        };
        let failure = response.into_result::<Value>().unwrap_err();
        assert_eq!(failure.detail, "request failed with status 404");
        assert!(!failure.is_connection_error());
    }

    #[test]
    fn test_success_with_wrong_shape_is_a_failure() {
        let response = ApiResponse {
            ok: true,
            status: 200,
            data: json!({ "unexpected": true }),
        };
        let failure = response.into_result::<Vec<Product>>().unwrap_err();
        assert_eq!(failure.status, 200);
        assert!(failure.detail.starts_with("unexpected response from server"));
    }

    #[test]
    fn test_failure_display() {
        let failure = ApiFailure {
            status: 401,
            detail: "Credenciales inválidas".to_string(),
        };
        assert!(failure.is_unauthorized());
        assert_eq!(failure.to_string(), "Credenciales inválidas (status 401)");
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_envelope() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = client("http://127.0.0.1:9/api");
        let response = api.request_empty(Method::GET, "/products", None).await;
        assert_eq!(response, ApiResponse::connection_error());
    }
}
