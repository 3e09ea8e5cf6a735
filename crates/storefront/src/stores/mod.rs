//! Client-side state: catalog, cart and session.

pub mod cart;
pub mod catalog;
pub mod session;

pub use cart::CartStore;
pub use catalog::{CatalogStore, PAGE_SIZE};
pub use session::{SessionError, SessionStore};
