//! Core types for Bewear.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod money;
pub mod quantity;
pub mod slug;
pub mod status;

pub use address::{
    Country, CountryError, PhoneError, US_STATES, is_us_state_code, is_valid_us_zip, validate_phone,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{CurrencyCode, Money, MoneyError};
pub use quantity::{Quantity, QuantityError};
pub use slug::slugify;
pub use status::OrderStatus;
