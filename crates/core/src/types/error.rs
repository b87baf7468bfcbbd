//! The `{error: {message, code}}` envelope shared by server and client.

use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in every error response.
///
/// Numeric codes group by status: 1xx malformed input, 2xx conflict,
/// 3xx not found, 500 internal. The router's fallback uses the string code
/// `"NOT_FOUND"` instead of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCode", into = "RawCode")]
pub enum ErrorCode {
    /// 100 - id (or body) could not be parsed.
    InvalidInput,
    /// 101 - email fails format validation.
    InvalidEmail,
    /// 102 - one or more required fields missing.
    MissingRequiredFields,
    /// 200 - email already in use by another record.
    DuplicateEmail,
    /// 300 - no record for the id or name.
    NotFound,
    /// 500 - unexpected failure.
    ServerError,
    /// `"NOT_FOUND"` - no route matched the request.
    RouteNotFound,
}

impl ErrorCode {
    /// The numeric code, or `None` for [`ErrorCode::RouteNotFound`].
    #[must_use]
    pub const fn as_number(self) -> Option<u16> {
        match self {
            Self::InvalidInput => Some(100),
            Self::InvalidEmail => Some(101),
            Self::MissingRequiredFields => Some(102),
            Self::DuplicateEmail => Some(200),
            Self::NotFound => Some(300),
            Self::ServerError => Some(500),
            Self::RouteNotFound => None,
        }
    }

    /// The HTTP status code that accompanies this error code.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidEmail | Self::MissingRequiredFields => 400,
            Self::DuplicateEmail => 409,
            Self::NotFound | Self::RouteNotFound => 404,
            Self::ServerError => 500,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u16),
    Text(String),
}

impl From<ErrorCode> for RawCode {
    fn from(code: ErrorCode) -> Self {
        code.as_number()
            .map_or_else(|| Self::Text("NOT_FOUND".to_owned()), Self::Number)
    }
}

impl TryFrom<RawCode> for ErrorCode {
    type Error = String;

    fn try_from(raw: RawCode) -> Result<Self, Self::Error> {
        match raw {
            RawCode::Number(100) => Ok(Self::InvalidInput),
            RawCode::Number(101) => Ok(Self::InvalidEmail),
            RawCode::Number(102) => Ok(Self::MissingRequiredFields),
            RawCode::Number(200) => Ok(Self::DuplicateEmail),
            RawCode::Number(300) => Ok(Self::NotFound),
            RawCode::Number(500) => Ok(Self::ServerError),
            RawCode::Text(text) if text == "NOT_FOUND" => Ok(Self::RouteNotFound),
            RawCode::Number(n) => Err(format!("unknown error code {n}")),
            RawCode::Text(text) => Err(format!("unknown error code {text:?}")),
        }
    }
}

/// Inner object of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    pub code: ErrorCode,
    /// Names of the missing fields, only present for code 102.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// An error response body: `{"error": {"message": ..., "code": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

impl ApiErrorBody {
    /// Build an error body without a field list.
    #[must_use]
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            error: ApiErrorDetail {
                message: message.into(),
                code,
                fields: None,
            },
        }
    }

    /// Attach the list of offending fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.error.fields = Some(fields);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_codes_serialize_as_numbers() {
        let body = ApiErrorBody::new("Invalid customer ID", ErrorCode::InvalidInput);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":{"message":"Invalid customer ID","code":100}}"#
        );
    }

    #[test]
    fn test_route_not_found_serializes_as_text() {
        let body = ApiErrorBody::new("Route not found", ErrorCode::RouteNotFound);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":{"message":"Route not found","code":"NOT_FOUND"}}"#
        );
    }

    #[test]
    fn test_fields_are_included_when_present() {
        let body = ApiErrorBody::new("Missing required fields", ErrorCode::MissingRequiredFields)
            .with_fields(vec!["name".to_owned()]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["code"], 102);
        assert_eq!(value["error"]["fields"][0], "name");
    }

    #[test]
    fn test_deserialize_both_code_kinds() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":{"message":"x","code":200}}"#).unwrap();
        assert_eq!(body.error.code, ErrorCode::DuplicateEmail);

        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":{"message":"x","code":"NOT_FOUND"}}"#).unwrap();
        assert_eq!(body.error.code, ErrorCode::RouteNotFound);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let result: Result<ApiErrorBody, _> =
            serde_json::from_str(r#"{"error":{"message":"x","code":999}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::MissingRequiredFields.http_status(), 400);
        assert_eq!(ErrorCode::DuplicateEmail.http_status(), 409);
        assert_eq!(ErrorCode::NotFound.http_status(), 404);
        assert_eq!(ErrorCode::ServerError.http_status(), 500);
    }
}
