//! Blocking clients for the Chronos and Marathon HTTP APIs.
//!
//! # Overview
//! Every operation validates its arguments, builds one `HttpRequest`, hands
//! it to a `Transport`, and unwraps the JSON response into a typed result.
//! Scheduling, placement and event delivery all happen server side; this
//! crate only requests and observes them.
//!
//! # Design
//! - `Chronos` and `Marathon` own a `ClientConfig` and a `Dispatcher`; the
//!   resource clients (`jobs()`, `apps()`, ...) borrow it.
//! - Arguments are options records with optional fields, checked by
//!   declarative rule lists before anything is built. Records addressed by a
//!   single identifier convert from `&str`, so `apps().get("web")` and
//!   `apps().get(AppRef { id: Some("web".into()) })` are the same call.
//! - The transport is a trait. `UreqTransport` (feature `ureq`, on by
//!   default) is the stock implementation; `testing::RecordingTransport`
//!   replays canned responses.

pub mod chronos;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod marathon;
pub mod request;
pub mod response;
pub mod testing;
pub mod validate;

#[cfg(feature = "ureq")]
mod ureq_transport;

pub use chronos::Chronos;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use marathon::Marathon;
pub use request::{OperationRequest, RequestBuilder};
pub use response::Unwrap;
#[cfg(feature = "ureq")]
pub use ureq_transport::UreqTransport;
