//! Request and response payloads of the shop backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use taproom_core::{OrderId, OrderItem, Price, ProductId, UserProfile};

/// Search and filter parameters for `GET /products`.
///
/// Empty fields are omitted from the query string, so the default value
/// lists the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub beer_type: Option<String>,
    pub max_price: Option<Price>,
}

impl ProductQuery {
    /// A free-text search query.
    #[must_use]
    pub fn search(term: &str) -> Self {
        Self {
            search: non_blank(term),
            ..Self::default()
        }
    }

    /// A style and/or price filter.
    #[must_use]
    pub fn filter(beer_type: &str, max_price: Option<Price>) -> Self {
        Self {
            beer_type: non_blank(beer_type),
            max_price: max_price.filter(|p| *p != Price::ZERO),
            ..Self::default()
        }
    }

    /// Whether the query lists the unfiltered catalog.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.search.is_none() && self.beer_type.is_none() && self.max_price.is_none()
    }

    /// Endpoint path including the encoded query string.
    #[must_use]
    pub fn to_endpoint(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(search) = &self.search {
            query.append_pair("search", search);
        }
        if let Some(beer_type) = &self.beer_type {
            query.append_pair("type", beer_type);
        }
        if let Some(max_price) = self.max_price {
            query.append_pair("max_price", &max_price.amount().to_string());
        }

        let query = query.finish();
        if query.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?{query}")
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful `POST /auth/login` response.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserProfile,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Body of `POST /checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub user_email: String,
    pub total_amount: Price,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Successful `POST /checkout` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful `POST /products` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedProduct {
    pub id: ProductId,
    #[serde(default)]
    pub message: Option<String>,
}
