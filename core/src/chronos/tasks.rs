//! Chronos task operations: status reports from asynchronous jobs and kills.

use serde_json::json;

use crate::chronos::types::{TaskKill, TaskStatus};
use crate::dispatch::{prepare, Dispatcher};
use crate::error::ApiError;
use crate::http::{HttpMethod, Transport};
use crate::request::OperationRequest;
use crate::validate::{lookup, Rule};

const UPDATE_RULES: &[Rule] = &[Rule::Required("id"), Rule::Required("statusCode")];

const KILL_RULES: &[Rule] = &[Rule::Required("job")];

/// Task operations of one Chronos scheduler.
#[derive(Debug)]
pub struct Tasks<'a, T> {
    dispatcher: &'a Dispatcher<T>,
}

impl<'a, T: Transport> Tasks<'a, T> {
    pub(crate) fn new(dispatcher: &'a Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// Report the outcome of an asynchronous task.
    pub fn update(&self, status: &TaskStatus) -> Result<(), ApiError> {
        let options = prepare("tasks.update", UPDATE_RULES, status)?;
        let status_code = lookup(&options, "statusCode").cloned().unwrap_or_default();
        self.dispatcher.call_empty(
            OperationRequest::new("tasks.update", HttpMethod::Put, "/task/{id}")
                .path_param_from("id", &options, "id")
                .body(json!({ "statusCode": status_code })),
        )
    }

    /// Kill all running tasks of a job.
    pub fn kill(&self, job: impl Into<TaskKill>) -> Result<(), ApiError> {
        let job: TaskKill = job.into();
        let options = prepare("tasks.kill", KILL_RULES, &job)?;
        self.dispatcher.call_empty(
            OperationRequest::new("tasks.kill", HttpMethod::Delete, "/task/kill/{job}")
                .path_param_from("job", &options, "job"),
        )
    }
}
