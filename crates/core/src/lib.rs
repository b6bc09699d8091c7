//! Product Catalog Core - Shared types library.
//!
//! This crate provides common types used across all product catalog components:
//! - `web` - The catalog web application (auth, admin, products, profile)
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles and sign-in status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
