//! Taproom Core - Shared domain types.
//!
//! This crate provides the types shared by every Taproom component:
//! - `storefront` - Local HTMX storefront talking to the shop backend
//! - `cli` - Operator commands (catalog seeding, order lookup)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. Everything here mirrors the JSON shapes of the shop's REST
//! backend so the same structs serve both request payloads and responses.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices and emails, plus the
//!   product, order and user records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
