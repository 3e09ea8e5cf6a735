//! Taproom storefront library.
//!
//! Client for the craft beer shop backend: the REST client, the catalog,
//! cart and session stores, the checkout flow and the view controller that
//! ties them together, plus the axum routes that serve them as HTMX
//! fragments.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod checkout;
pub mod config;
pub mod error;
pub mod filters;
pub mod routes;
pub mod state;
pub mod stores;
pub mod view;
