//! Core types for Taproom.
//!
//! This module provides type-safe wrappers for the shop's domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderItem, OrderStatus};
pub use price::Price;
pub use product::{NewProduct, Product};
pub use user::UserProfile;
