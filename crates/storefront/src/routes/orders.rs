//! Order history display data.
//!
//! Orders are fetched when the section is entered (see
//! [`crate::view::ViewController::show`]) and after a successful checkout;
//! there is no handler of its own.

use taproom_core::Order;

use crate::view::ViewController;

/// Order line display data.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub line_price: String,
}

/// Order card display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status: &'static str,
    pub created_at: Option<String>,
    pub address: Option<String>,
    pub items: Vec<OrderItemView>,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order
                .id
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            status: order.status.label(),
            created_at: order
                .created_at
                .map(|at| at.format("%d-%m-%Y %H:%M").to_string()),
            address: order.address.clone(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    line_price: item.line_total().to_string(),
                })
                .collect(),
            total: order.total_amount.to_string(),
        }
    }
}

/// Orders section display data. Newest first.
#[derive(Clone)]
pub struct OrdersView {
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
}

impl OrdersView {
    #[must_use]
    pub fn from_view(view: &ViewController) -> Self {
        let mut orders: Vec<&Order> = view.orders().iter().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            orders: orders.into_iter().map(OrderView::from).collect(),
            error: view.orders_error().map(str::to_string),
        }
    }
}
