//! Bewear Core - Shared domain types.
//!
//! This crate provides common types used across all Bewear components:
//! - `storefront` - Public-facing e-commerce API
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, money, quantities, emails, order status, slugs and
//!   shipping address validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
