//! Shipping address service.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use bewear_core::{Country, Email, UserId, is_us_state_code, is_valid_us_zip, validate_phone};

use crate::db::{AddressRepository, RepositoryError};
use crate::models::address::{NewShippingAddress, ShippingAddress};

/// Minimum postal code length for any country.
const MIN_ZIP_LENGTH: usize = 5;

/// Errors from address operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// A field failed validation.
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AddressError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Address fields as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    pub recipient_name: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// ISO country code, `US` when omitted.
    #[serde(default)]
    pub country: Option<String>,
}

impl AddressInput {
    /// Trim and validate every field.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Invalid` naming the first field that fails.
    pub fn validate(self) -> Result<NewShippingAddress, AddressError> {
        let country = match self.country.as_deref().map(str::trim) {
            None | Some("") => Country::default(),
            Some(code) => code
                .parse::<Country>()
                .map_err(|e| AddressError::invalid("country", e.to_string()))?,
        };

        let recipient_name = required("recipient_name", &self.recipient_name)?;
        let phone = required("phone", &self.phone)?;
        validate_phone(country, &phone).map_err(|e| AddressError::invalid("phone", e.to_string()))?;

        let email =
            Email::parse(&self.email).map_err(|e| AddressError::invalid("email", e.to_string()))?;

        let street = required("street", &self.street)?;
        let number = required("number", &self.number)?;
        let complement = self
            .complement
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        let neighborhood = required("neighborhood", &self.neighborhood)?;
        let city = required("city", &self.city)?;

        let state = self.state.trim().to_uppercase();
        if state.chars().count() != 2 {
            return Err(AddressError::invalid("state", "state must be 2 letters"));
        }
        if country == Country::US && !is_us_state_code(&state) {
            return Err(AddressError::invalid("state", "unknown US state code"));
        }

        let zip_code = self.zip_code.trim().to_owned();
        if zip_code.chars().count() < MIN_ZIP_LENGTH {
            return Err(AddressError::invalid(
                "zip_code",
                format!("zip code must be at least {MIN_ZIP_LENGTH} characters"),
            ));
        }
        if country == Country::US && !is_valid_us_zip(&zip_code) {
            return Err(AddressError::invalid(
                "zip_code",
                "zip code must look like 12345 or 12345-6789",
            ));
        }

        Ok(NewShippingAddress {
            recipient_name,
            phone,
            email,
            street,
            number,
            complement,
            neighborhood,
            city,
            state,
            zip_code,
            country,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, AddressError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AddressError::invalid(field, "is required"));
    }
    Ok(value.to_owned())
}

/// Shipping address service.
pub struct AddressService<'a> {
    addresses: AddressRepository<'a>,
}

impl<'a> AddressService<'a> {
    /// Create a new address service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            addresses: AddressRepository::new(pool),
        }
    }

    /// Validate and save a new address for the user.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Invalid` if validation fails.
    /// Returns `AddressError::Repository` if the insert fails.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: UserId,
        input: AddressInput,
    ) -> Result<ShippingAddress, AddressError> {
        let address = input.validate()?;
        let saved = self.addresses.create(user_id, &address).await?;

        tracing::info!(address_id = %saved.id, "Shipping address created");
        Ok(saved)
    }

    /// The user's saved addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<ShippingAddress>, AddressError> {
        Ok(self.addresses.list_for_user(user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn us_input() -> AddressInput {
        AddressInput {
            recipient_name: "  Jane Doe ".to_string(),
            phone: "+1 (415) 555-2671".to_string(),
            email: "jane@example.com".to_string(),
            street: "Market St".to_string(),
            number: "1355".to_string(),
            complement: Some("   ".to_string()),
            neighborhood: "SoMa".to_string(),
            city: "San Francisco".to_string(),
            state: "ca".to_string(),
            zip_code: "94103".to_string(),
            country: None,
        }
    }

    fn field_of(err: AddressError) -> &'static str {
        match err {
            AddressError::Invalid { field, .. } => field,
            AddressError::Repository(e) => panic!("unexpected repository error: {e}"),
        }
    }

    #[test]
    fn test_valid_us_address() {
        let address = us_input().validate().unwrap();
        assert_eq!(address.recipient_name, "Jane Doe");
        assert_eq!(address.state, "CA");
        assert_eq!(address.country, Country::US);
        assert_eq!(address.complement, None);
    }

    #[test]
    fn test_blank_required_field() {
        let input = AddressInput {
            city: "  ".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(input.validate().unwrap_err()), "city");
    }

    #[test]
    fn test_us_rules() {
        let bad_state = AddressInput {
            state: "XX".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(bad_state.validate().unwrap_err()), "state");

        let bad_zip = AddressInput {
            zip_code: "9410A".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(bad_zip.validate().unwrap_err()), "zip_code");

        let bad_phone = AddressInput {
            phone: "555-2671".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(bad_phone.validate().unwrap_err()), "phone");
    }

    #[test]
    fn test_brazil_address() {
        let input = AddressInput {
            phone: "+55 11 91234-5678".to_string(),
            state: "SP".to_string(),
            zip_code: "01310-100".to_string(),
            country: Some("br".to_string()),
            ..us_input()
        };
        let address = input.validate().unwrap();
        assert_eq!(address.country, Country::BR);

        let us_phone = AddressInput {
            country: Some("BR".to_string()),
            state: "SP".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(us_phone.validate().unwrap_err()), "phone");
    }

    #[test]
    fn test_state_and_zip_length() {
        let long_state = AddressInput {
            state: "CAL".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(long_state.validate().unwrap_err()), "state");

        let short_zip = AddressInput {
            zip_code: "123".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(short_zip.validate().unwrap_err()), "zip_code");
    }

    #[test]
    fn test_unknown_country() {
        let input = AddressInput {
            country: Some("DE".to_string()),
            ..us_input()
        };
        assert_eq!(field_of(input.validate().unwrap_err()), "country");
    }

    #[test]
    fn test_invalid_email() {
        let input = AddressInput {
            email: "not-an-email".to_string(),
            ..us_input()
        };
        assert_eq!(field_of(input.validate().unwrap_err()), "email");
    }
}
