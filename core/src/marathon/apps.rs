//! Marathon application operations.
//!
//! # Design
//! Every call except `create` and the listings addresses one app by id. The
//! id is sent as a single path segment, so group ids such as `group/web`
//! arrive percent-encoded. Marathon wraps most responses in an envelope
//! (`{"app": ..}`, `{"tasks": [..]}`); each operation names the key it
//! unwraps.

use serde_json::Value;

use crate::dispatch::{prepare, Dispatcher};
use crate::error::ApiError;
use crate::http::{HttpMethod, Transport};
use crate::marathon::types::{App, AppDefinition, AppQuery, AppRef, AppUpdate, AppVersion, KillTasks, Task};
use crate::request::OperationRequest;
use crate::response::Unwrap;
use crate::validate::{is_present, lookup, Rule};

const CREATE_RULES: &[Rule] = &[
    Rule::Required("id"),
    Rule::Truthy("cpus"),
    Rule::Truthy("mem"),
    Rule::Truthy("instances"),
    Rule::OneOf(&["cmd", "args", "executor", "container.image"]),
    Rule::Exclusive("cmd", "args"),
];

const ID_RULES: &[Rule] = &[Rule::Required("id")];

const VERSION_RULES: &[Rule] = &[Rule::Required("id"), Rule::Required("version")];

const KILL_RULES: &[Rule] = &[Rule::Required("id"), Rule::Exclusive("task", "host")];

/// Application operations of one Marathon instance.
#[derive(Debug)]
pub struct Apps<'a, T> {
    dispatcher: &'a Dispatcher<T>,
}

impl<'a, T: Transport> Apps<'a, T> {
    pub(crate) fn new(dispatcher: &'a Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// Create and start a new application.
    pub fn create(&self, app: &AppDefinition) -> Result<(), ApiError> {
        let options = prepare("apps.create", CREATE_RULES, app)?;
        self.dispatcher
            .call_empty(OperationRequest::new("apps.create", HttpMethod::Post, "/apps").body(options))
    }

    /// All running applications.
    pub fn list(&self) -> Result<Vec<App>, ApiError> {
        self.list_matching(AppQuery::default())
    }

    /// Running applications whose command contains `query.cmd`.
    pub fn list_matching(&self, query: impl Into<AppQuery>) -> Result<Vec<App>, ApiError> {
        let query: AppQuery = query.into();
        let options = prepare("apps.list", &[], &query)?;
        self.dispatcher.call(
            OperationRequest::new("apps.list", HttpMethod::Get, "/apps").query_from("cmd", &options, "cmd"),
            Unwrap::BodyItem("apps"),
        )
    }

    pub fn get(&self, app: impl Into<AppRef>) -> Result<App, ApiError> {
        let options = self.by_id("apps.get", app)?;
        self.dispatcher.call(
            OperationRequest::new("apps.get", HttpMethod::Get, "/apps/{id}").path_param_from("id", &options, "id"),
            Unwrap::BodyItem("app"),
        )
    }

    /// Version identifiers of an application, newest first.
    pub fn versions(&self, app: impl Into<AppRef>) -> Result<Vec<String>, ApiError> {
        let options = self.by_id("apps.versions", app)?;
        self.dispatcher.call(
            OperationRequest::new("apps.versions", HttpMethod::Get, "/apps/{id}/versions")
                .path_param_from("id", &options, "id"),
            Unwrap::BodyItem("versions"),
        )
    }

    /// The configuration of an application at one version.
    pub fn version(&self, version: impl Into<AppVersion>) -> Result<App, ApiError> {
        let version: AppVersion = version.into();
        let options = prepare("apps.version", VERSION_RULES, &version)?;
        self.dispatcher.call(
            OperationRequest::new("apps.version", HttpMethod::Get, "/apps/{id}/versions/{version}")
                .path_param_from("id", &options, "id")
                .path_param_from("version", &options, "version"),
            Unwrap::Body,
        )
    }

    /// Change parameters of a running application.
    pub fn update(&self, update: &AppUpdate) -> Result<(), ApiError> {
        let mut options = prepare("apps.update", ID_RULES, update)?;
        let mut body = options.get_mut("changes").map(Value::take).unwrap_or_default();
        if let (Value::Object(map), Some(id)) = (&mut body, lookup(&options, "id")) {
            if !is_present(map.get("id")) {
                map.insert("id".to_string(), id.clone());
            }
        }
        self.dispatcher.call_empty(
            OperationRequest::new("apps.update", HttpMethod::Put, "/apps/{id}")
                .path_param_from("id", &options, "id")
                .query_from("force", &options, "force")
                .body(body),
        )
    }

    /// Destroy an application and all data about it.
    pub fn destroy(&self, app: impl Into<AppRef>) -> Result<(), ApiError> {
        let options = self.by_id("apps.destroy", app)?;
        self.dispatcher.call_empty(
            OperationRequest::new("apps.destroy", HttpMethod::Delete, "/apps/{id}").path_param_from("id", &options, "id"),
        )
    }

    /// Running tasks of an application.
    pub fn tasks(&self, app: impl Into<AppRef>) -> Result<Vec<Task>, ApiError> {
        let options = self.by_id("apps.tasks", app)?;
        self.dispatcher.call(
            OperationRequest::new("apps.tasks", HttpMethod::Get, "/apps/{id}/tasks")
                .path_param_from("id", &options, "id"),
            Unwrap::BodyItem("tasks"),
        )
    }

    /// Kill tasks of an application and return the killed tasks.
    pub fn kill(&self, kill: impl Into<KillTasks>) -> Result<Vec<Task>, ApiError> {
        let kill: KillTasks = kill.into();
        let options = prepare("apps.kill", KILL_RULES, &kill)?;

        if is_present(lookup(&options, "task")) {
            let op = OperationRequest::new("apps.kill", HttpMethod::Delete, "/apps/{id}/tasks/{task}")
                .path_param_from("id", &options, "id")
                .path_param_from("task", &options, "task")
                .query_from("scale", &options, "scale");
            let task: Task = self.dispatcher.call(op, Unwrap::BodyItem("task"))?;
            return Ok(vec![task]);
        }

        self.dispatcher.call(
            OperationRequest::new("apps.kill", HttpMethod::Delete, "/apps/{id}/tasks")
                .path_param_from("id", &options, "id")
                .query_from("host", &options, "host")
                .query_from("scale", &options, "scale"),
            Unwrap::BodyItem("tasks"),
        )
    }

    fn by_id(&self, operation: &'static str, app: impl Into<AppRef>) -> Result<Value, ApiError> {
        let app: AppRef = app.into();
        prepare(operation, ID_RULES, &app)
    }
}
