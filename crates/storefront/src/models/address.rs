//! Shipping address domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bewear_core::{AddressId, Country, Email, UserId};

/// A saved shipping address belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub id: AddressId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub details: AddressDetails,
    pub created_at: DateTime<Utc>,
}

/// The address fields themselves.
///
/// Orders keep their own copy of these fields so that an order's delivery
/// address survives edits or deletion of the saved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressDetails {
    pub recipient_name: String,
    pub phone: String,
    pub email: String,
    pub document: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Country display name, e.g. "United States".
    pub country: String,
}

/// A validated address ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShippingAddress {
    pub recipient_name: String,
    pub phone: String,
    pub email: Email,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: Country,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn address(user_id: UserId) -> ShippingAddress {
        ShippingAddress {
            id: AddressId::generate(),
            user_id,
            details: AddressDetails {
                recipient_name: "Jane Doe".to_string(),
                phone: "+1 (415) 555-2671".to_string(),
                email: "jane@example.com".to_string(),
                document: String::new(),
                street: "Market St".to_string(),
                number: "1355".to_string(),
                complement: Some("Suite 900".to_string()),
                neighborhood: "SoMa".to_string(),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                zip_code: "94103".to_string(),
                country: "United States".to_string(),
            },
            created_at: Utc::now(),
        }
    }
}
