//! Addresses
//!
//! Shipping and billing addresses are validated field by field so the form can show
//! every problem at once.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Recipient name
    pub full_name: String,

    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// State, also used to pick the tax rate
    pub state: String,

    /// Six-digit postal code
    pub pincode: String,

    /// Contact number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Fields of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    /// Recipient name
    FullName,

    /// Street address
    Address,

    /// City
    City,

    /// State
    State,

    /// Postal code
    Pincode,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressField::FullName => "Full name",
            AddressField::Address => "Address",
            AddressField::City => "City",
            AddressField::State => "State",
            AddressField::Pincode => "Pincode",
        })
    }
}

/// A problem with one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field
    pub field: AddressField,

    /// Message to show next to it
    pub message: String,
}

/// An address failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct AddressError {
    errors: Vec<FieldError>,
}

impl AddressError {
    /// Every field problem, in form order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The message for `field`, if it is invalid.
    pub fn message_for(&self, field: AddressField) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid address: ")?;

        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(&error.message)?;
        }

        Ok(())
    }
}

/// Whether `pincode` is exactly six ASCII digits.
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

impl Address {
    /// Check every required field.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] listing each missing or malformed field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let mut errors = Vec::new();

        for (field, value) in [
            (AddressField::FullName, &self.full_name),
            (AddressField::Address, &self.address),
            (AddressField::City, &self.city),
            (AddressField::State, &self.state),
            (AddressField::Pincode, &self.pincode),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    message: format!("{field} is required"),
                });
            }
        }

        if !self.pincode.trim().is_empty() && !is_valid_pincode(self.pincode.trim()) {
            errors.push(FieldError {
                field: AddressField::Pincode,
                message: "Pincode must be 6 digits".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AddressError { errors })
        }
    }
}
