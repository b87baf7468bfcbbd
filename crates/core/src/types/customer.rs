//! Customer records and the request/response bodies built around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};
use super::id::CustomerId;

/// Fields that must be present (and non-blank) when creating a customer,
/// in the order they are reported when missing.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "email", "phone", "address", "country"];

/// A stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub region: Option<String>,
    #[serde(rename = "postalZip")]
    pub postal_zip: Option<String>,
    /// Single optional number; whether this is meant to be a range is
    /// still an open product question.
    pub numberrange: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Apply a partial update: every supplied field overwrites, every
    /// omitted field keeps its value. `updated_at` is set to `now`.
    pub fn apply(&mut self, patch: CustomerPatch, now: DateTime<Utc>) {
        let CustomerPatch {
            name,
            email,
            phone,
            address,
            country,
            region,
            postal_zip,
            numberrange,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(country) = country {
            self.country = country;
        }
        if region.is_some() {
            self.region = region;
        }
        if postal_zip.is_some() {
            self.postal_zip = postal_zip;
        }
        if numberrange.is_some() {
            self.numberrange = numberrange;
        }
        self.updated_at = now;
    }
}

/// Errors raised while validating a [`CustomerPayload`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields are missing or blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    /// The email does not have a `local@domain.tld` shape.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Raw JSON body accepted by create and update.
///
/// Every field is optional at this layer so that a missing field is
/// reported as a validation failure listing the field rather than as a
/// generic deserialization error. `null` and absent are treated the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(
        default,
        rename = "postalZip",
        skip_serializing_if = "Option::is_none"
    )]
    pub postal_zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numberrange: Option<i64>,
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl CustomerPayload {
    fn required(&self) -> [(&'static str, Option<&String>); 5] {
        [
            ("name", self.name.as_ref()),
            ("email", self.email.as_ref()),
            ("phone", self.phone.as_ref()),
            ("address", self.address.as_ref()),
            ("country", self.country.as_ref()),
        ]
    }

    /// Required fields that are absent, null or blank, in report order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<String> {
        self.required()
            .into_iter()
            .filter(|(_, value)| is_blank(*value))
            .map(|(field, _)| field.to_owned())
            .collect()
    }

    /// Required fields that were supplied but are blank.
    ///
    /// Omitted fields are fine on update; an explicit empty string would
    /// erase a value that must never be empty.
    #[must_use]
    pub fn blank_supplied(&self) -> Vec<String> {
        self.required()
            .into_iter()
            .filter(|(_, value)| (*value).is_some_and(|v| v.trim().is_empty()))
            .map(|(field, _)| field.to_owned())
            .collect()
    }

    /// Validate the payload for creation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] first if any required field
    /// is missing, then [`ValidationError::InvalidEmail`] if the email is
    /// malformed.
    pub fn into_new_customer(self) -> Result<NewCustomer, ValidationError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let Self {
            name: Some(name),
            email: Some(email),
            phone: Some(phone),
            address: Some(address),
            country: Some(country),
            region,
            postal_zip,
            numberrange,
        } = self
        else {
            return Err(ValidationError::MissingFields(
                REQUIRED_FIELDS.iter().map(|f| (*f).to_owned()).collect(),
            ));
        };

        Ok(NewCustomer {
            name,
            email: Email::parse(&email)?,
            phone,
            address,
            country,
            region,
            postal_zip,
            numberrange,
        })
    }

    /// Validate the payload as a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] if an email is supplied and
    /// malformed, or [`ValidationError::MissingFields`] if a required field
    /// is supplied blank.
    pub fn into_patch(self) -> Result<CustomerPatch, ValidationError> {
        let email = self.email.as_deref().map(Email::parse).transpose()?;

        let blank = self.blank_supplied();
        if !blank.is_empty() {
            return Err(ValidationError::MissingFields(blank));
        }

        Ok(CustomerPatch {
            name: self.name,
            email,
            phone: self.phone,
            address: self.address,
            country: self.country,
            region: self.region,
            postal_zip: self.postal_zip,
            numberrange: self.numberrange,
        })
    }
}

/// A validated customer ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub region: Option<String>,
    #[serde(rename = "postalZip")]
    pub postal_zip: Option<String>,
    pub numberrange: Option<i64>,
}

impl NewCustomer {
    /// Materialize the record a store would hold after inserting this customer.
    #[must_use]
    pub fn into_customer(self, id: CustomerId, now: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            country: self.country,
            region: self.region,
            postal_zip: self.postal_zip,
            numberrange: self.numberrange,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated partial update. `None` means "keep the stored value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "postalZip", skip_serializing_if = "Option::is_none")]
    pub postal_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numberrange: Option<i64>,
}

impl CustomerPatch {
    /// True when the patch would change nothing but `updated_at`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.country.is_none()
            && self.region.is_none()
            && self.postal_zip.is_none()
            && self.numberrange.is_none()
    }
}

/// Response body of a successful create: only the new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedCustomer {
    pub id: CustomerId,
}

/// Response body of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedCustomer {
    pub message: String,
    #[serde(rename = "deletedId")]
    pub deleted_id: CustomerId,
}

impl DeletedCustomer {
    /// The standard confirmation for a deleted customer.
    #[must_use]
    pub fn new(deleted_id: CustomerId) -> Self {
        Self {
            message: "Customer deleted successfully".to_owned(),
            deleted_id,
        }
    }
}
