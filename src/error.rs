//! Error types for the gateway SDK

use serde_json::{Map, Value};
use thiserror::Error;

/// Result type using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Field-level or raw error payload returned by the gateway on a rejected write
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetails {
    /// `{"fields": {"name": "message", ...}}` shaped bodies
    Fields(Map<String, Value>),
    /// Any other body, kept as returned
    Raw(Value),
}

impl ErrorDetails {
    /// Extract the `fields` object of an error body, falling back to the whole body
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut map) => match map.remove("fields") {
                Some(Value::Object(fields)) if !fields.is_empty() => Self::Fields(fields),
                Some(other) => {
                    map.insert("fields".to_string(), other);
                    Self::Raw(Value::Object(map))
                }
                None => Self::Raw(Value::Object(map)),
            },
            other => Self::Raw(other),
        }
    }

    /// Message for a single field, if the gateway reported one
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Fields(fields) => fields.get(name),
            Self::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fields(fields) => {
                let mut first = true;
                for (name, message) in fields {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    match message {
                        Value::String(s) => write!(f, "{}: {}", name, s)?,
                        other => write!(f, "{}: {}", name, other)?,
                    }
                }
                Ok(())
            }
            Self::Raw(body) => write!(f, "{}", body),
        }
    }
}

/// Errors that can occur when talking to the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Address input could not be parsed or composed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Operation requires an `id` the resource does not have yet
    #[error("'id' is not set on this {type_name} resource, save it before this operation")]
    UnsavedResource { type_name: &'static str },

    /// The owning resource was dropped, so no endpoint can be derived
    #[error("parent of this {type_name} resource is no longer alive")]
    ParentDropped { type_name: &'static str },

    /// Gateway rejected a create or update
    #[error("gateway rejected the write [{status}]: {details}")]
    Validation { status: u16, details: ErrorDetails },

    /// Gateway rejected a delete
    #[error("gateway rejected the delete [{status}]: {body}")]
    Deletion { status: u16, body: Value },

    /// Non-2xx response outside of save/delete
    #[error("gateway request failed [{status}]: {body}")]
    Http { status: u16, body: Value },

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response or representation could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Validation { status, .. }
            | Error::Deletion { status, .. }
            | Error::Http { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the gateway answered 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Turn a raw HTTP failure into a validation error, leaving other errors untouched
    pub(crate) fn into_validation(self) -> Self {
        match self {
            Error::Http { status, body } => Error::Validation {
                status,
                details: ErrorDetails::from_body(body),
            },
            other => other,
        }
    }

    /// Turn a raw HTTP failure into a deletion error, leaving other errors untouched
    pub(crate) fn into_deletion(self) -> Self {
        match self {
            Error::Http { status, body } => Error::Deletion { status, body },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_are_extracted() {
        let details = ErrorDetails::from_body(json!({
            "message": "schema violation",
            "fields": {"host": "required field missing"}
        }));

        assert_eq!(details.field("host"), Some(&json!("required field missing")));
        assert_eq!(details.to_string(), "host: required field missing");
    }

    #[test]
    fn test_raw_body_kept_without_fields() {
        let body = json!({"message": "An unexpected error occurred"});
        let details = ErrorDetails::from_body(body.clone());

        assert_eq!(details, ErrorDetails::Raw(body));
        assert!(details.field("message").is_none());
    }

    #[test]
    fn test_non_object_fields_fall_back_to_raw() {
        let body = json!({"fields": "nope"});
        assert_eq!(ErrorDetails::from_body(body.clone()), ErrorDetails::Raw(body));
    }

    #[test]
    fn test_http_error_mapping() {
        let err = Error::Http {
            status: 400,
            body: json!({"fields": {"port": "expected an integer"}}),
        }
        .into_validation();

        match err {
            Error::Validation { status, details } => {
                assert_eq!(status, 400);
                assert_eq!(details.field("port"), Some(&json!("expected an integer")));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Error::Http {
            status: 409,
            body: json!({"message": "in use"}),
        }
        .into_deletion();
        assert!(matches!(err, Error::Deletion { status: 409, .. }));
    }

    #[test]
    fn test_unrelated_errors_pass_through() {
        let err = Error::UnsavedResource { type_name: "service" }.into_validation();
        assert!(matches!(err, Error::UnsavedResource { .. }));
        assert!(err.status().is_none());
        assert!(err.to_string().contains("service"));
    }

    #[test]
    fn test_not_found() {
        let err = Error::Http {
            status: 404,
            body: json!({"message": "Not found"}),
        };
        assert!(err.is_not_found());
    }
}
