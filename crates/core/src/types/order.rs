//! Order records.
//!
//! Orders are created server-side by `POST /checkout`; the client only reads
//! the ones that belong to the current session via `GET /orders/me`.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::{OrderId, Price, ProductId};

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price at the time of purchase.
    pub price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// Payment status recorded by the backend.
///
/// The backend marks every order it stores as paid; anything it might add
/// later deserializes as [`OrderStatus::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "PAGADO")]
    Paid,
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "CANCELADO")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Label shown in the order history.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Pagado",
            Self::Pending => "Pendiente",
            Self::Cancelled => "Cancelado",
            Self::Unknown => "Desconocido",
        }
    }
}

/// A stored order, as returned by `GET /orders/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(alias = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Accept both naive ISO timestamps (what the backend writes) and RFC 3339
/// timestamps with an offset. Unparseable values become `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.naive_utc())
            .or_else(|_| s.parse::<NaiveDateTime>())
            .ok()
    }))
}
