//! Chronos DTOs.
//!
//! `Job` is what the scheduler reports. The remaining types are options
//! records: every field is optional so that a record can be validated as a
//! whole before anything is sent, and each record that is addressed by a
//! single identifier converts from a bare string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A job as reported by `GET /jobs` and `GET /jobs/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub name: String,
    /// Empty for dependent jobs.
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(rename = "async", default)]
    pub is_async: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Fields this crate does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `POST /iso8601`.
///
/// `name`, `schedule`, `command`, `epsilon` and `owner` are required;
/// `async` is sent as `false` when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ISO-8601 repeating interval, e.g. `R10/2012-10-01T05:52:00Z/PT2S`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// ISO-8601 duration the job may start late by, e.g. `PT15M`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
}

impl NewJob {
    pub fn new(name: impl Into<String>, schedule: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            schedule: Some(schedule.into()),
            command: Some(command.into()),
            ..Self::default()
        }
    }

    pub fn epsilon(mut self, epsilon: impl Into<String>) -> Self {
        self.epsilon = Some(epsilon.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn is_async(mut self, is_async: bool) -> Self {
        self.is_async = Some(is_async);
        self
    }
}

/// Addresses one job by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&str> for JobRef {
    fn from(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }
}

impl From<String> for JobRef {
    fn from(name: String) -> Self {
        Self { name: Some(name) }
    }
}

/// Statistics for one job, or for all jobs at one percentile. Exactly one
/// of the two must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<String>,
}

impl StatsQuery {
    pub fn job(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            percentile: None,
        }
    }

    /// e.g. `"mean"`, `"median"`, `"99thPercentile"`.
    pub fn percentile(percentile: impl Into<String>) -> Self {
        Self {
            name: None,
            percentile: Some(percentile.into()),
        }
    }
}

impl From<&str> for StatsQuery {
    fn from(name: &str) -> Self {
        Self::job(name)
    }
}

impl From<String> for StatsQuery {
    fn from(name: String) -> Self {
        Self::job(name)
    }
}

/// Filters for `GET /jobs/search`. Unset filters are not sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl JobSearch {
    pub fn any(mut self, any: impl Into<String>) -> Self {
        self.any = Some(any.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// A bare string searches by job name.
impl From<&str> for JobSearch {
    fn from(name: &str) -> Self {
        Self::default().name(name)
    }
}

impl From<String> for JobSearch {
    fn from(name: String) -> Self {
        Self::default().name(name)
    }
}

/// Payload of `PUT /task/{id}`. `statusCode` 0 marks success, anything
/// else failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i32>,
}

impl TaskStatus {
    pub fn new(id: impl Into<String>, status_code: i32) -> Self {
        Self {
            id: Some(id.into()),
            status_code: Some(status_code),
        }
    }
}

/// Kills every running task of one job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskKill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

impl From<&str> for TaskKill {
    fn from(job: &str) -> Self {
        Self {
            job: Some(job.to_string()),
        }
    }
}

impl From<String> for TaskKill {
    fn from(job: String) -> Self {
        Self { job: Some(job) }
    }
}
