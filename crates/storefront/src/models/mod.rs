//! Domain models for storefront.
//!
//! These are validated domain objects; the `db` module maps database rows
//! into them.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use address::{AddressDetails, NewShippingAddress, ShippingAddress};
pub use cart::{Cart, CartDetails, CartLine, OwnedCartItem};
pub use catalog::{Category, CategoryPage, Product, ProductWithVariants, Variant, VariantPage};
pub use order::{DraftError, Order, OrderDraft, OrderDraftItem, OrderItem, OrderWithItems};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
