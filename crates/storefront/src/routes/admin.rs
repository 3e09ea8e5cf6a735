//! Admin product management handlers.
//!
//! The backend does not protect these endpoints, and neither does the
//! storefront: the section is a local operator convenience.

use axum::{
    Form,
    extract::{Path, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use taproom_core::{NewProduct, Price, ProductId};

use crate::error::Result;
use crate::routes::catalog::{BEER_TYPES, ProductView};
use crate::routes::home::render_update;
use crate::state::AppState;
use crate::view::ViewController;

/// Admin table row.
#[derive(Clone)]
pub struct AdminRowView {
    pub product: ProductView,
    pub delete_path: String,
}

/// Admin section display data.
#[derive(Clone)]
pub struct AdminView {
    pub rows: Vec<AdminRowView>,
    pub error: Option<String>,
    pub beer_types: Vec<&'static str>,
}

impl AdminView {
    #[must_use]
    pub fn from_view(view: &ViewController) -> Self {
        Self {
            rows: view
                .admin_products()
                .iter()
                .map(|product| AdminRowView {
                    delete_path: format!(
                        "/admin/products/{}/delete",
                        urlencoding::encode(product.id.as_str())
                    ),
                    product: ProductView::from(product),
                })
                .collect(),
            error: view.admin_error().map(str::to_string),
            beer_types: BEER_TYPES.to_vec(),
        }
    }
}

/// New product form data.
#[derive(Debug, Deserialize)]
pub struct NewProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub beer_type: String,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub alcohol: f32,
}

impl From<NewProductForm> for NewProduct {
    fn from(form: NewProductForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            beer_type: form.beer_type.trim().to_string(),
            price: Price::new(form.price),
            description: form.description.trim().to_string(),
            image: form.image.trim().to_string(),
            alcohol: form.alcohol,
        }
    }
}

/// Create a product.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<NewProductForm>,
) -> Result<Html<String>> {
    let product = NewProduct::from(form);

    let mut view = state.view().await;
    let notice = view.create_product(&product).await;
    render_update(&view, notice)
}

/// Delete a product.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    let mut view = state.view().await;
    let notice = view.delete_product(&ProductId::new(id)).await;
    render_update(&view, notice)
}
