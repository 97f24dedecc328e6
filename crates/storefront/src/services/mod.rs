//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `catalog` - Cached category, product and variant reads
//! - `cart` - Cart lines and shipping address binding
//! - `addresses` - Shipping address validation and storage
//! - `orders` - Checkout and order history

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

pub use addresses::{AddressError, AddressInput, AddressService};
pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService, Decrease};
pub use catalog::CatalogService;
pub use orders::{OrderError, OrderService};
