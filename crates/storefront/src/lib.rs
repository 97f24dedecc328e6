//! Bewear Storefront library.
//!
//! JSON API for the Bewear clothing store: catalog browsing, password
//! accounts, carts, shipping addresses and checkout. The binary in
//! `main.rs` only wires configuration, telemetry and the listener around
//! [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
