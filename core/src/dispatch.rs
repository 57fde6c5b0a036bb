//! The request pipeline shared by every resource client.
//!
//! # Design
//! A call moves through four steps: the options record is serialized and
//! checked against the operation's rules (`prepare`), the resulting
//! `OperationRequest` is bound to the base URL, the transport executes it
//! once, and the operation's `Unwrap` policy extracts the result. Nothing is
//! retried and nothing is cached between calls.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::error::ApiError;
use crate::http::Transport;
use crate::request::{OperationRequest, RequestBuilder};
use crate::response::{decode, Unwrap};
use crate::validate::{validate, Rule};

/// Serialize `options` and run `rules` over it.
///
/// Returns the validated JSON form, including any defaulted fields, which
/// callers read path, query and body values from.
pub fn prepare<O: Serialize + ?Sized>(
    operation: &'static str,
    rules: &[Rule],
    options: &O,
) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(options).map_err(|e| ApiError::Serialization(e.to_string()))?;
    debug!(operation, options = %value, "preparing request");
    if let Err(err) = validate(operation, rules, &mut value) {
        debug!(operation, error = %err, "rejected before dispatch");
        return Err(err.into());
    }
    Ok(value)
}

/// A request builder paired with the transport that executes its output.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    builder: RequestBuilder,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Result<Self, ConfigError> {
        Ok(Self {
            builder: RequestBuilder::new(config)?,
            transport,
        })
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `op` and decode the unwrapped result into `R`.
    pub fn call<R: DeserializeOwned>(&self, op: OperationRequest, unwrap: Unwrap) -> Result<R, ApiError> {
        let value = self.execute(&op, &unwrap)?;
        Ok(decode(value)?)
    }

    /// Execute `op`, discarding the body.
    pub fn call_empty(&self, op: OperationRequest) -> Result<(), ApiError> {
        self.execute(&op, &Unwrap::Empty).map(drop)
    }

    fn execute(&self, op: &OperationRequest, unwrap: &Unwrap) -> Result<Value, ApiError> {
        let request = self.builder.build(op)?;
        debug!(operation = op.name, method = %request.method, url = %request.url, "dispatching request");

        let response = self.transport.execute(&request).map_err(|err| {
            warn!(operation = op.name, url = %request.url, error = %err, "transport failed");
            err
        })?;

        unwrap.apply(&response).map_err(|err| {
            warn!(operation = op.name, status = response.status, error = %err, "request failed");
            ApiError::from(err)
        })
    }
}
