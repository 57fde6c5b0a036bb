//! Marathon DTOs and options records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Executor image and its options, e.g. `docker:///libmesos/ubuntu`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Container {
    pub fn image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            options: Vec::new(),
        }
    }
}

/// An application as reported by Marathon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub cpus: f64,
    #[serde(default)]
    pub mem: f64,
    #[serde(default)]
    pub instances: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    #[serde(default)]
    pub uris: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub ports: Vec<u32>,
    #[serde(default)]
    pub constraints: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_running: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_staged: Option<u32>,
    /// Fields this crate does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A running task of an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub ports: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An application definition, as sent by `apps.create` and as the changed
/// fields of `apps.update`. Unset fields are not sent.
///
/// Creation requires `id`, `cpus`, `mem`, `instances` and one of `cmd`,
/// `args`, `executor` or `container.image`; `cmd` and `args` exclude each
/// other.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<Vec<String>>>,
    /// Passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = Some(cmd.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn executor(mut self, executor: impl Into<String>) -> Self {
        self.executor = Some(executor.into());
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// cpus, mem (MB) and instance count in one call.
    pub fn resources(mut self, cpus: f64, mem: f64, instances: u32) -> Self {
        self.cpus = Some(cpus);
        self.mem = Some(mem);
        self.instances = Some(instances);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.get_or_insert_with(BTreeMap::new).insert(key.into(), value.into());
        self
    }
}

/// Addresses one application by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl From<&str> for AppRef {
    fn from(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
        }
    }
}

impl From<String> for AppRef {
    fn from(id: String) -> Self {
        Self { id: Some(id) }
    }
}

/// One historical version of an application.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for AppVersion {
    fn from((id, version): (A, B)) -> Self {
        Self {
            id: Some(id.into()),
            version: Some(version.into()),
        }
    }
}

/// Filter for `GET /apps`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppQuery {
    /// Substring of the application command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

impl From<&str> for AppQuery {
    fn from(cmd: &str) -> Self {
        Self {
            cmd: Some(cmd.to_string()),
        }
    }
}

impl From<String> for AppQuery {
    fn from(cmd: String) -> Self {
        Self { cmd: Some(cmd) }
    }
}

/// Changes applied by `PUT /apps/{id}`. They only affect tasks started
/// afterwards; running tasks are not restarted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sent as the `force` query parameter, never in the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    pub changes: AppDefinition,
}

impl AppUpdate {
    pub fn new(id: impl Into<String>, changes: AppDefinition) -> Self {
        Self {
            id: Some(id.into()),
            force: None,
            changes,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }
}

/// Selects tasks of one application to kill: a single `task`, every task on
/// one `host`, or all of them. `scale` also lowers the instance count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KillTasks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<bool>,
}

impl KillTasks {
    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn scale(mut self, scale: bool) -> Self {
        self.scale = Some(scale);
        self
    }
}

impl From<&str> for KillTasks {
    fn from(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }
}

impl From<String> for KillTasks {
    fn from(id: String) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// An event subscriber endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallbackUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&str> for CallbackUrl {
    fn from(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
        }
    }
}

impl From<String> for CallbackUrl {
    fn from(url: String) -> Self {
        Self { url: Some(url) }
    }
}
