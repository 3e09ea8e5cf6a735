//! Catalog route handlers: search, filters and pagination.

use axum::{Form, extract::State, response::Html};
use serde::Deserialize;
use tracing::instrument;

use taproom_core::{Price, Product};

use crate::error::{AppError, Result};
use crate::routes::home::render_update;
use crate::state::AppState;
use crate::stores::CatalogStore;

/// Beer styles offered in the filter dropdown.
pub const BEER_TYPES: [&str; 5] = ["IPA", "Stout", "Lager", "Porter", "Ale"];

/// Product card display data.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub beer_type: String,
    pub alcohol: f32,
    pub description: String,
    pub image: String,
    pub price: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            beer_type: product.beer_type.clone(),
            alcohol: product.alcohol,
            description: product.description.clone(),
            image: product.image.clone(),
            price: product.price.to_string(),
        }
    }
}

/// Style dropdown option.
#[derive(Clone)]
pub struct TypeOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Catalog grid display data.
#[derive(Clone)]
pub struct CatalogView {
    pub products: Vec<ProductView>,
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub error: Option<String>,
    pub search: String,
    pub max_price: String,
    pub beer_types: Vec<TypeOption>,
}

impl From<&CatalogStore> for CatalogView {
    fn from(catalog: &CatalogStore) -> Self {
        let query = catalog.query();
        let page = catalog.page();
        let total_pages = catalog.total_pages();
        let selected_type = query.beer_type.clone().unwrap_or_default();

        Self {
            products: catalog.visible().iter().map(ProductView::from).collect(),
            page,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
            error: catalog.error().map(str::to_string),
            search: query.search.clone().unwrap_or_default(),
            max_price: query
                .max_price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            beer_types: BEER_TYPES
                .into_iter()
                .map(|value| TypeOption {
                    value,
                    selected: selected_type.eq_ignore_ascii_case(value),
                })
                .collect(),
        }
    }
}

/// Search form data.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

/// Filter form data. Blank fields mean "any".
#[derive(Debug, Deserialize)]
pub struct FilterForm {
    #[serde(rename = "type", default)]
    pub beer_type: String,
    #[serde(default)]
    pub max_price: String,
}

/// Pagination form data.
#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub delta: i64,
}

fn parse_max_price(raw: &str) -> Result<Option<Price>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(|amount| Some(Price::new(amount)))
        .map_err(|_| AppError::BadRequest(format!("invalid max_price: {raw}")))
}

/// Free-text search.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>> {
    let mut view = state.view().await;
    let notice = view.search(&form.search).await;
    render_update(&view, notice)
}

/// Style and price filter.
#[instrument(skip(state))]
pub async fn filter(
    State(state): State<AppState>,
    Form(form): Form<FilterForm>,
) -> Result<Html<String>> {
    let max_price = parse_max_price(&form.max_price)?;

    let mut view = state.view().await;
    let notice = view.apply_filters(&form.beer_type, max_price).await;
    render_update(&view, notice)
}

/// Previous/next page.
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    Form(form): Form<PageForm>,
) -> Result<Html<String>> {
    let mut view = state.view().await;
    let notice = view.change_page(form.delta);
    render_update(&view, notice)
}
