//! Product Catalog - role-based product catalog web application.
//!
//! # Architecture
//!
//! - Axum web framework answering with JSON bodies and redirects
//! - `PostgreSQL` via sqlx for accounts, roles and products
//! - In-memory stores for tests and local experiments
//! - Cookie sessions via tower-sessions, stored in `PostgreSQL`
//!
//! # Roles
//!
//! - `User` - browse the product listing
//! - `Admin` - create, edit and remove products
//! - `SuperAdmin` - manage accounts and their roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
