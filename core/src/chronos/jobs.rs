//! Chronos job operations.
//!
//! # Design
//! Jobs are addressed by name. `create` goes through the ISO 8601 endpoint,
//! so `schedule` is a repeating interval such as `R/2014-03-01T02:00:00Z/P1D`
//! and `epsilon` a duration. Stats pick their endpoint from whichever of
//! `name` or `percentile` is set.

use serde_json::Value;

use crate::chronos::types::{Job, JobRef, JobSearch, NewJob, StatsQuery};
use crate::dispatch::{prepare, Dispatcher};
use crate::error::ApiError;
use crate::http::{HttpMethod, Transport};
use crate::request::OperationRequest;
use crate::response::Unwrap;
use crate::validate::{is_present, is_truthy, lookup, Literal, Rule};

const CREATE_RULES: &[Rule] = &[
    Rule::Required("name"),
    Rule::Required("schedule"),
    Rule::Required("command"),
    Rule::Required("epsilon"),
    Rule::Required("owner"),
    Rule::Default("async", Literal::Bool(false)),
];

const NAME_RULES: &[Rule] = &[Rule::Required("name")];

const STATS_RULES: &[Rule] = &[
    Rule::OneOf(&["name", "percentile"]),
    Rule::Exclusive("name", "percentile"),
];

/// Job operations of one Chronos scheduler.
#[derive(Debug)]
pub struct Jobs<'a, T> {
    dispatcher: &'a Dispatcher<T>,
}

impl<'a, T: Transport> Jobs<'a, T> {
    pub(crate) fn new(dispatcher: &'a Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// All jobs. An empty response is an empty list.
    pub fn list(&self) -> Result<Vec<Job>, ApiError> {
        self.dispatcher.call(
            OperationRequest::new("jobs.list", HttpMethod::Get, "/jobs"),
            Unwrap::empty_list(),
        )
    }

    /// Register a scheduled job.
    pub fn create(&self, job: &NewJob) -> Result<(), ApiError> {
        let options = prepare("jobs.create", CREATE_RULES, job)?;
        self.dispatcher
            .call_empty(OperationRequest::new("jobs.create", HttpMethod::Post, "/iso8601").body(options))
    }

    pub fn destroy(&self, job: impl Into<JobRef>) -> Result<(), ApiError> {
        let job: JobRef = job.into();
        let options = prepare("jobs.destroy", NAME_RULES, &job)?;
        self.dispatcher.call_empty(
            OperationRequest::new("jobs.destroy", HttpMethod::Delete, "/job/{name}")
                .path_param_from("name", &options, "name"),
        )
    }

    /// Run a job now, outside its schedule.
    pub fn start(&self, job: impl Into<JobRef>) -> Result<(), ApiError> {
        let job: JobRef = job.into();
        let options = prepare("jobs.start", NAME_RULES, &job)?;
        self.dispatcher.call_empty(
            OperationRequest::new("jobs.start", HttpMethod::Put, "/job/{name}")
                .path_param_from("name", &options, "name"),
        )
    }

    /// Run-time statistics of one job, or of all jobs at one percentile.
    pub fn stats(&self, query: impl Into<StatsQuery>) -> Result<Value, ApiError> {
        let query: StatsQuery = query.into();
        let options = prepare("jobs.stats", STATS_RULES, &query)?;
        let op = if is_present(lookup(&options, "name")) {
            OperationRequest::new("jobs.stats", HttpMethod::Get, "/job/stat/{name}")
                .path_param_from("name", &options, "name")
        } else {
            OperationRequest::new("jobs.stats", HttpMethod::Get, "/stats/{percentile}")
                .path_param_from("percentile", &options, "percentile")
        };
        self.dispatcher.call(op, Unwrap::Body)
    }

    /// Only present filters are forwarded; a `limit` or `offset` of `0`
    /// counts as unset.
    pub fn search(&self, filters: impl Into<JobSearch>) -> Result<Vec<Job>, ApiError> {
        let filters: JobSearch = filters.into();
        let options = prepare("jobs.search", &[], &filters)?;
        let mut op = OperationRequest::new("jobs.search", HttpMethod::Get, "/jobs/search")
            .query_from("any", &options, "any")
            .query_from("name", &options, "name")
            .query_from("command", &options, "command");
        for paging in ["limit", "offset"] {
            if is_truthy(lookup(&options, paging)) {
                op = op.query_from(paging, &options, paging);
            }
        }
        self.dispatcher.call(op, Unwrap::Body)
    }
}
