//! Operation descriptors and the request builder.
//!
//! # Design
//! Resource clients describe each call as an `OperationRequest`: a name for
//! tracing, a method, a path template with `{param}` segments, the parameter
//! values and an optional JSON body. `RequestBuilder` turns that into a
//! concrete `HttpRequest` against the configured base URL. Building is a pure
//! transform with no I/O.

use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, ConfigError};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::validate::lookup;

pub const JSON: &str = "application/json";

/// One logical API call, before it is bound to a base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub name: &'static str,
    pub method: HttpMethod,
    pub template: &'static str,
    pub path_params: Vec<(&'static str, String)>,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl OperationRequest {
    pub fn new(name: &'static str, method: HttpMethod, template: &'static str) -> Self {
        Self {
            name,
            method,
            template,
            path_params: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn path_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path_params.push((name, value.into()));
        self
    }

    /// Bind `{name}` to the scalar at `field` in `options`, if there is one.
    pub fn path_param_from(self, name: &'static str, options: &Value, field: &str) -> Self {
        match lookup(options, field).and_then(scalar) {
            Some(value) => self.path_param(name, value),
            None => self,
        }
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Forward the scalar at `field` in `options` as query parameter `key`.
    /// Absent fields are skipped.
    pub fn query_from(self, key: &'static str, options: &Value, field: &str) -> Self {
        match lookup(options, field).and_then(scalar) {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// String form of a JSON scalar as sent on the wire. Booleans become the
/// literals `"true"` and `"false"`.
pub fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Binds operation requests to one base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base: Url,
}

impl RequestBuilder {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base: config.parsed_base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn build(&self, op: &OperationRequest) -> Result<HttpRequest, ApiError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ConfigError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: "not a hierarchical url".to_string(),
            })?;
            segments.pop_if_empty();
            for segment in op.template.split('/').filter(|s| !s.is_empty()) {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => {
                        let value = op
                            .path_params
                            .iter()
                            .find(|(key, value)| *key == name && !value.is_empty())
                            .map(|(_, value)| value.as_str())
                            .ok_or_else(|| ApiError::MissingParameter {
                                template: op.template.to_string(),
                                name: name.to_string(),
                            })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        let mut pairs = op.query.iter().filter(|(_, value)| !value.is_empty()).peekable();
        if pairs.peek().is_some() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }

        let mut headers = vec![("accept".to_string(), JSON.to_string())];
        let body = match &op.body {
            Some(body) => {
                headers.push(("content-type".to_string(), JSON.to_string()));
                Some(serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: op.method,
            url: url.to_string(),
            headers,
            body,
        })
    }
}
