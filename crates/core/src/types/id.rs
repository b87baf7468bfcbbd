//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Error returned when a path segment is not a valid entity ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    /// The input is not an integer.
    #[error("'{0}' is not an integer")]
    NotAnInteger(String),
    /// The input is zero or negative.
    #[error("id must be positive, got {0}")]
    NotPositive(i64),
}

/// Parse a positive `i32` from a path segment.
///
/// Leading and trailing whitespace is ignored. Anything else that is not a
/// plain base-10 integer (e.g. `abc`, `12abc`, `1.5`) is rejected.
///
/// # Errors
///
/// Returns [`IdParseError`] if the input is not an integer or is not positive.
pub fn parse_positive_id(s: &str) -> Result<i32, IdParseError> {
    let trimmed = s.trim();
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| IdParseError::NotAnInteger(trimmed.to_owned()))?;

    if value <= 0 {
        return Err(IdParseError::NotPositive(value));
    }

    i32::try_from(value).map_err(|_| IdParseError::NotAnInteger(trimmed.to_owned()))
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `FromStr` accepting positive integers only
/// - `From<i32>` and `Into<i32>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use customers_core::define_id;
/// define_id!(InvoiceId);
/// define_id!(NoteId);
///
/// let invoice_id = InvoiceId::new(1);
/// let note_id = NoteId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: InvoiceId = note_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::types::id::parse_positive_id(s).map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(CustomerId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("42"), Ok(42));
        assert_eq!(parse_positive_id(" 7 "), Ok(7));
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        assert!(matches!(
            parse_positive_id("abc"),
            Err(IdParseError::NotAnInteger(_))
        ));
        assert!(matches!(
            parse_positive_id("12abc"),
            Err(IdParseError::NotAnInteger(_))
        ));
        assert!(matches!(
            parse_positive_id("1.5"),
            Err(IdParseError::NotAnInteger(_))
        ));
        assert!(matches!(
            parse_positive_id(""),
            Err(IdParseError::NotAnInteger(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert_eq!(parse_positive_id("0"), Err(IdParseError::NotPositive(0)));
        assert_eq!(parse_positive_id("-3"), Err(IdParseError::NotPositive(-3)));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(parse_positive_id("99999999999").is_err());
    }

    #[test]
    fn test_customer_id_from_str() {
        let id: CustomerId = "15".parse().unwrap();
        assert_eq!(id, CustomerId::new(15));
        assert!("x".parse::<CustomerId>().is_err());
    }

    #[test]
    fn test_customer_id_serde_transparent() {
        let json = serde_json::to_string(&CustomerId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
