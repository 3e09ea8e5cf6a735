//! Catalog store: the fetched product list and its paginated view.
//!
//! Filtering and search happen on the backend through query parameters; the
//! only local computation is slicing the current page out of the result.

use std::ops::Range;

use tracing::{info, warn};

use taproom_core::{Product, ProductId};

use crate::api::{ApiClient, ApiFailure, ProductQuery};

/// Products per catalog page.
pub const PAGE_SIZE: usize = 6;

/// Number of pages needed for `total` items (at least one).
#[must_use]
pub const fn total_pages(total: usize, page_size: usize) -> usize {
    if total == 0 || page_size == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

/// Clamp `page` into `[1, total_pages]` and return it with its item window.
///
/// The window is `[(page-1)*size, page*size)` cut at `total`.
#[must_use]
pub fn page_window(total: usize, page: usize, page_size: usize) -> (usize, Range<usize>) {
    let page = page.clamp(1, total_pages(total, page_size));
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    (page, start..end)
}

/// Product list plus the visible page.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    products: Vec<Product>,
    filtered: Vec<Product>,
    page: usize,
    page_size: usize,
    query: ProductQuery,
    error: Option<String>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// An empty catalog on page 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
            filtered: Vec::new(),
            page: 1,
            page_size: PAGE_SIZE,
            query: ProductQuery {
                search: None,
                beer_type: None,
                max_price: None,
            },
            error: None,
        }
    }

    /// Fetch the catalog for `query`, replacing the list and resetting to page 1.
    ///
    /// On failure the previous products are dropped and the failure detail is
    /// kept for the inline error placeholder.
    ///
    /// # Errors
    ///
    /// Returns the `ApiFailure` so the caller can also raise a notice.
    pub async fn load(&mut self, api: &ApiClient, query: ProductQuery) -> Result<usize, ApiFailure> {
        let result = api.list_products(&query).await;
        self.query = query;

        match result {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                self.replace(products);
                Ok(self.filtered.len())
            }
            Err(failure) => {
                warn!(status = failure.status, detail = %failure.detail, "Catalog load failed");
                self.fail(&failure.detail);
                Err(failure)
            }
        }
    }

    /// Reload with the last query used.
    ///
    /// # Errors
    ///
    /// See [`CatalogStore::load`].
    pub async fn reload(&mut self, api: &ApiClient) -> Result<usize, ApiFailure> {
        let query = self.query.clone();
        self.load(api, query).await
    }

    /// Replace the product list wholesale.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.filtered.clone_from(&products);
        self.products = products;
        self.page = 1;
        self.error = None;
    }

    /// Record a failed load.
    pub fn fail(&mut self, detail: &str) {
        self.products.clear();
        self.filtered.clear();
        self.page = 1;
        self.error = Some(detail.to_string());
    }

    /// Move to `page` (clamped) and return its products.
    pub fn paginate(&mut self, page: usize) -> &[Product] {
        let (page, window) = page_window(self.filtered.len(), page, self.page_size);
        self.page = page;
        self.filtered.get(window).unwrap_or_default()
    }

    /// Step the page by `delta` (the previous/next buttons), clamped.
    pub fn change_page(&mut self, delta: i64) -> &[Product] {
        let target = i64::try_from(self.page)
            .unwrap_or(i64::MAX)
            .saturating_add(delta)
            .max(1);
        self.paginate(usize::try_from(target).unwrap_or(usize::MAX))
    }

    /// Products on the current page.
    #[must_use]
    pub fn visible(&self) -> &[Product] {
        let (_, window) = page_window(self.filtered.len(), self.page, self.page_size);
        self.filtered.get(window).unwrap_or_default()
    }

    /// Current page, 1-based.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Number of pages for the filtered list.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size)
    }

    /// Every product from the last successful load.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products matching the current query.
    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Look up a loaded product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// The query of the last load.
    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Detail of the last failed load, if the last load failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
