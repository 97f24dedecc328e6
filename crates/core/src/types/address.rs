//! Shipping address field rules.
//!
//! Pure validation helpers shared by the storefront address service and the
//! CLI. Only the United States and Brazil are supported as shipping countries.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static US_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("static zip pattern is valid"));

/// Error returned for an unknown country code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported country: {0}")]
pub struct CountryError(pub String);

/// Error returned when a phone number does not match its country's format.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Invalid US phone. Expected +1 (AAA) NNN-NNNN")]
    InvalidUs,
    #[error("Invalid BR phone. Expected +55 (AA) #####-####")]
    InvalidBr,
}

/// Shipping country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Country {
    #[default]
    US,
    BR,
}

impl Country {
    /// ISO 3166 alpha-2 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::US => "US",
            Self::BR => "BR",
        }
    }

    /// Name stored on addresses and orders.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::US => "United States",
            Self::BR => "Brazil",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Country {
    type Err = CountryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::US),
            "BR" => Ok(Self::BR),
            other => Err(CountryError(other.to_owned())),
        }
    }
}

/// Validate a phone number for `country`.
///
/// Formatting characters are ignored; only the digits are checked. A US
/// number is `1` followed by ten digits, a Brazilian one `55` followed by
/// eleven.
///
/// # Errors
///
/// Returns the country-specific [`PhoneError`] when the digits don't match.
pub fn validate_phone(country: Country, raw: &str) -> Result<(), PhoneError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    match country {
        Country::US => {
            if digits.len() == 11 && digits.starts_with('1') {
                Ok(())
            } else {
                Err(PhoneError::InvalidUs)
            }
        }
        Country::BR => {
            if digits.len() == 13 && digits.starts_with("55") {
                Ok(())
            } else {
                Err(PhoneError::InvalidBr)
            }
        }
    }
}

/// Whether `zip` is a five-digit US ZIP or ZIP+4.
#[must_use]
pub fn is_valid_us_zip(zip: &str) -> bool {
    US_ZIP.is_match(zip)
}

/// US state codes and names.
pub const US_STATES: [(&str, &str); 50] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Whether `code` is one of the fifty US state codes (case-insensitive).
#[must_use]
pub fn is_us_state_code(code: &str) -> bool {
    US_STATES
        .iter()
        .any(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_country_from_code() {
        assert_eq!("us".parse::<Country>().unwrap(), Country::US);
        assert_eq!("BR".parse::<Country>().unwrap(), Country::BR);
        assert!("CA".parse::<Country>().is_err());
        assert_eq!(Country::US.display_name(), "United States");
        assert_eq!(Country::BR.to_string(), "Brazil");
    }

    #[test]
    fn test_us_phone() {
        assert!(validate_phone(Country::US, "+1 (415) 555-2671").is_ok());
        assert!(validate_phone(Country::US, "14155552671").is_ok());
        assert_eq!(
            validate_phone(Country::US, "(415) 555-2671"),
            Err(PhoneError::InvalidUs)
        );
    }

    #[test]
    fn test_br_phone() {
        assert!(validate_phone(Country::BR, "+55 (11) 91234-5678").is_ok());
        assert_eq!(
            validate_phone(Country::BR, "+55 (11) 1234-5678"),
            Err(PhoneError::InvalidBr)
        );
    }

    #[test]
    fn test_us_zip() {
        assert!(is_valid_us_zip("94103"));
        assert!(is_valid_us_zip("94103-1234"));
        assert!(!is_valid_us_zip("9410"));
        assert!(!is_valid_us_zip("94103-12"));
        assert!(!is_valid_us_zip("ABCDE"));
    }

    #[test]
    fn test_state_codes() {
        assert!(is_us_state_code("CA"));
        assert!(is_us_state_code("ny"));
        assert!(!is_us_state_code("XX"));
        assert!(!is_us_state_code("SP"));
    }
}
