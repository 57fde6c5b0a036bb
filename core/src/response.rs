//! Response status checking and envelope unwrapping.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::http::HttpResponse;

/// How an operation extracts its result from a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwrap {
    /// The whole decoded body.
    Body,
    /// One top-level field of the body. A missing field yields `null`.
    BodyItem(&'static str),
    /// The body, or the given value when the body is absent or empty.
    BodyDefault(Value),
    /// Nothing.
    Empty,
}

impl Unwrap {
    /// `BodyDefault([])`, the policy of list operations.
    pub fn empty_list() -> Self {
        Unwrap::BodyDefault(Value::Array(Vec::new()))
    }

    pub fn apply(&self, response: &HttpResponse) -> Result<Value, TransportError> {
        check_status(response)?;
        match self {
            Unwrap::Empty => Ok(Value::Null),
            Unwrap::Body => decode_body(&response.body),
            Unwrap::BodyItem(key) => {
                let mut body = decode_body(&response.body)?;
                Ok(body.get_mut(*key).map(Value::take).unwrap_or(Value::Null))
            }
            Unwrap::BodyDefault(default) => {
                let body = decode_body(&response.body)?;
                if is_empty(&body) {
                    Ok(default.clone())
                } else {
                    Ok(body)
                }
            }
        }
    }
}

/// Map non-2xx responses to `TransportError::Status`.
pub fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}

pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
}

fn decode_body(body: &str) -> Result<Value, TransportError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
