//! Client for the Marathon v2 API.
//!
//! ```no_run
//! use mesos_client::marathon::{AppDefinition, Marathon};
//! use mesos_client::ClientConfig;
//!
//! let marathon = Marathon::new(ClientConfig::marathon())?;
//! marathon
//!     .apps()
//!     .create(&AppDefinition::new("sleeper").cmd("sleep 300").resources(0.1, 16.0, 1))?;
//! for task in marathon.apps().tasks("sleeper")? {
//!     println!("{} on {}", task.id, task.host);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod apps;
mod event_subscriptions;
pub mod types;

pub use apps::Apps;
pub use event_subscriptions::EventSubscriptions;
pub use types::{App, AppDefinition, AppQuery, AppRef, AppUpdate, AppVersion, CallbackUrl, Container, KillTasks, Task};

use crate::config::{ClientConfig, ConfigError};
use crate::dispatch::Dispatcher;
use crate::error::ApiError;
use crate::http::{HttpMethod, Transport};
use crate::request::OperationRequest;
use crate::response::Unwrap;

/// A Marathon endpoint.
#[derive(Debug, Clone)]
pub struct Marathon<T> {
    config: ClientConfig,
    dispatcher: Dispatcher<T>,
}

#[cfg(feature = "ureq")]
impl Marathon<crate::UreqTransport> {
    /// Client over a ureq agent honouring the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = crate::UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Marathon<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ConfigError> {
        let dispatcher = Dispatcher::new(&config, transport)?;
        Ok(Self { config, dispatcher })
    }

    pub fn apps(&self) -> Apps<'_, T> {
        Apps::new(&self.dispatcher)
    }

    pub fn event_subscriptions(&self) -> EventSubscriptions<'_, T> {
        EventSubscriptions::new(&self.dispatcher)
    }

    /// Tasks of every running application.
    pub fn tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.dispatcher.call(
            OperationRequest::new("tasks", HttpMethod::Get, "/tasks"),
            Unwrap::BodyItem("tasks"),
        )
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }
}
