//! Cart store.
//!
//! An ordered list of products. Every add appends a row, even for a product
//! already in the cart, and rows are removed by position.

use taproom_core::{OrderItem, Price, Product};

/// In-memory cart, ordered by add.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    items: Vec<Product>,
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append `product` and return the index of its row, always the last one.
    pub fn add(&mut self, product: Product) -> usize {
        self.items.push(product);
        self.items.len() - 1
    }

    /// Remove the row at `index`.
    ///
    /// An index outside the cart is ignored; returns whether anything changed.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }

    /// Sum of every row's price.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(|p| p.price).sum()
    }

    /// Number of rows in the cart.
    #[must_use]
    pub fn count(&self) -> u32 {
        u32::try_from(self.items.len()).unwrap_or(u32::MAX)
    }

    /// Empty the cart. Called only once the backend has accepted an order.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cart rows in display order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Rows as order payload items, one unit each.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .map(|product| OrderItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity: 1,
            })
            .collect()
    }
}
