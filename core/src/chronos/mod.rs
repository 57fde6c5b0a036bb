//! Client for the Chronos scheduler API.
//!
//! ```no_run
//! use mesos_client::chronos::{Chronos, NewJob};
//! use mesos_client::ClientConfig;
//!
//! let chronos = Chronos::new(ClientConfig::chronos().with_host("10.141.141.10"))?;
//! chronos.jobs().create(
//!     &NewJob::new("backup", "R/2014-01-01T00:00:00Z/PT24H", "/usr/bin/backup")
//!         .epsilon("PT15M")
//!         .owner("ops@example.org"),
//! )?;
//! for job in chronos.jobs().list()? {
//!     println!("{} disabled={}", job.name, job.disabled);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod jobs;
mod tasks;
pub mod types;

pub use jobs::Jobs;
pub use tasks::Tasks;
pub use types::{Job, JobRef, JobSearch, NewJob, StatsQuery, TaskKill, TaskStatus};

use crate::config::{ClientConfig, ConfigError};
use crate::dispatch::Dispatcher;
use crate::http::Transport;

/// A Chronos scheduler endpoint.
#[derive(Debug, Clone)]
pub struct Chronos<T> {
    config: ClientConfig,
    dispatcher: Dispatcher<T>,
}

#[cfg(feature = "ureq")]
impl Chronos<crate::UreqTransport> {
    /// Client over a ureq agent honouring the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = crate::UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Chronos<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ConfigError> {
        let dispatcher = Dispatcher::new(&config, transport)?;
        Ok(Self { config, dispatcher })
    }

    pub fn jobs(&self) -> Jobs<'_, T> {
        Jobs::new(&self.dispatcher)
    }

    pub fn tasks(&self) -> Tasks<'_, T> {
        Tasks::new(&self.dispatcher)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    #[test]
    fn custom_base_path_and_scheme() {
        let config = ClientConfig::chronos()
            .with_secure(true)
            .with_host("chronos.local")
            .with_port(8443)
            .with_base_path("/");
        let chronos = Chronos::with_transport(config, RecordingTransport::new()).unwrap();
        chronos.jobs().list().unwrap();
        assert_eq!(
            chronos.transport().last_request().unwrap().url,
            "https://chronos.local:8443/jobs"
        );
    }
}
