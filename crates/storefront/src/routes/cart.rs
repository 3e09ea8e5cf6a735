//! Cart route handlers.
//!
//! Every cart change answers with the page update and an `HX-Trigger:
//! cart-updated` header so other widgets can react.

use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use taproom_core::{Product, ProductId};

use crate::error::Result;
use crate::routes::home::render_update;
use crate::state::AppState;
use crate::view::ViewController;

/// Cart row display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub index: usize,
    pub name: String,
    pub beer_type: String,
    pub price: String,
}

impl CartItemView {
    fn new(index: usize, product: &Product) -> Self {
        Self {
            index,
            name: product.name.clone(),
            beer_type: product.beer_type.clone(),
            price: product.price.to_string(),
        }
    }
}

/// Cart sidebar display data.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
    pub open: bool,
}

impl CartView {
    #[must_use]
    pub fn from_view(view: &ViewController) -> Self {
        let cart = view.cart();
        Self {
            items: cart
                .items()
                .iter()
                .enumerate()
                .map(|(index, product)| CartItemView::new(index, product))
                .collect(),
            total: cart.total().to_string(),
            item_count: cart.count(),
            open: view.cart_open(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub index: usize,
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub address: Option<String>,
}

fn cart_updated(body: impl IntoResponse) -> Response {
    (AppendHeaders([("HX-Trigger", "cart-updated")]), body).into_response()
}

/// Append a product to the cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let mut view = state.view().await;
    let notice = view.add_to_cart(&ProductId::new(form.product_id));
    Ok(cart_updated(render_update(&view, notice)?))
}

/// Remove a cart row.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut view = state.view().await;
    let notice = view.remove_from_cart(form.index);
    Ok(cart_updated(render_update(&view, notice)?))
}

/// Open or close the sidebar.
#[instrument(skip(state))]
pub async fn toggle(State(state): State<AppState>) -> Result<Response> {
    let mut view = state.view().await;
    let notice = view.toggle_cart();
    Ok(render_update(&view, notice)?.into_response())
}

/// Place the order.
///
/// Holds the controller for the whole submission, so a second click waits
/// and then finds the cart already emptied.
#[instrument(skip(state, form))]
pub async fn checkout(
    State(state): State<AppState>,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut view = state.view().await;
    let notice = view.checkout(form.address).await;
    Ok(cart_updated(render_update(&view, notice)?))
}
