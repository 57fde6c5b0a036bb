//! In-memory stand-in for the Chronos and Marathon HTTP APIs.
//!
//! Chronos is served under `/scheduler`, Marathon under `/v2`. State lives in
//! one `RwLock` and is lost when the router is dropped. Nothing is actually
//! scheduled: Marathon tasks appear as soon as an app is created and events
//! are never delivered to subscribers.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const PERCENTILES: &[&str] = &[
    "mean",
    "median",
    "75thPercentile",
    "95thPercentile",
    "98thPercentile",
    "99thPercentile",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub epsilon: String,
    pub owner: String,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub disabled: bool,
    pub success_count: u64,
    pub error_count: u64,
    pub last_success: String,
    pub last_error: String,
}

#[derive(Deserialize)]
pub struct CreateJob {
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub epsilon: String,
    pub owner: String,
    #[serde(rename = "async", default)]
    pub is_async: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub status_code: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub app_id: String,
    pub host: String,
    pub ports: Vec<u32>,
    pub version: String,
    pub staged_at: String,
    pub started_at: String,
}

#[derive(Debug, Default)]
struct AppRecord {
    /// Oldest first; the last entry is the current definition.
    versions: Vec<(String, Map<String, Value>)>,
    tasks: Vec<Task>,
}

impl AppRecord {
    fn current(&self) -> Option<&(String, Map<String, Value>)> {
        self.versions.last()
    }

    fn instances(&self) -> usize {
        self.current()
            .and_then(|(_, def)| def.get("instances"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    }

    fn view(&self) -> Value {
        let Some((version, def)) = self.current() else {
            return Value::Null;
        };
        let mut view = def.clone();
        view.insert("version".to_string(), json!(version));
        view.insert("tasksRunning".to_string(), json!(self.tasks.len()));
        view.insert("tasksStaged".to_string(), json!(0));
        Value::Object(view)
    }
}

#[derive(Debug, Default)]
pub struct Store {
    jobs: BTreeMap<String, Job>,
    apps: BTreeMap<String, AppRecord>,
    callback_urls: Vec<String>,
    clock: u64,
}

impl Store {
    fn tick(&mut self) -> String {
        self.clock += 1;
        let t = self.clock;
        format!("2014-03-01T{:02}:{:02}:{:02}.000Z", t / 3600 % 24, t / 60 % 60, t % 60)
    }

    /// Start or stop tasks until `app` runs its configured instance count.
    fn reconcile(&mut self, id: &str) {
        let stamp = self.tick();
        let clock = self.clock;
        let Some(app) = self.apps.get_mut(id) else {
            return;
        };
        let wanted = app.instances();
        let version = app.current().map(|(v, _)| v.clone()).unwrap_or_default();
        app.tasks.truncate(wanted);
        while app.tasks.len() < wanted {
            let port = 31000 + ((clock as usize + app.tasks.len()) % 1000) as u32;
            app.tasks.push(Task {
                id: format!("{id}.{}", Uuid::new_v4()),
                app_id: id.to_string(),
                host: "localhost".to_string(),
                ports: vec![port],
                version: version.clone(),
                staged_at: stamp.clone(),
                started_at: stamp.clone(),
            });
        }
    }

    fn push_version(&mut self, id: &str, def: Map<String, Value>) -> Option<String> {
        let version = self.tick();
        let app = self.apps.get_mut(id)?;
        app.versions.push((version.clone(), def));
        Some(version)
    }
}

pub type Db = Arc<RwLock<Store>>;

type Reply<T> = Result<T, (StatusCode, Json<Value>)>;

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message.into() })))
}

fn app_not_found(id: &str) -> (StatusCode, Json<Value>) {
    error(StatusCode::NOT_FOUND, format!("App '{id}' does not exist"))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .nest("/scheduler", chronos_routes())
        .nest("/v2", marathon_routes())
        .with_state(db)
}

fn chronos_routes() -> Router<Db> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/search", get(search_jobs))
        .route("/iso8601", post(create_job))
        .route("/job/{name}", put(start_job).delete(delete_job))
        .route("/job/stat/{name}", get(job_stats))
        .route("/stats/{percentile}", get(percentile_stats))
        .route("/task/{id}", put(update_task))
        .route("/task/kill/{job}", delete(kill_job_tasks))
}

fn marathon_routes() -> Router<Db> {
    Router::new()
        .route("/apps", get(list_apps).post(create_app))
        .route("/apps/{id}", get(get_app).put(update_app).delete(delete_app))
        .route("/apps/{id}/versions", get(app_versions))
        .route("/apps/{id}/versions/{version}", get(app_version))
        .route("/apps/{id}/tasks", get(app_tasks).delete(kill_app_tasks))
        .route("/apps/{id}/tasks/{task}", delete(kill_app_task))
        .route("/tasks", get(all_tasks))
        .route(
            "/eventSubscriptions",
            get(list_subscriptions).post(subscribe).delete(unsubscribe),
        )
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Chronos
// ---------------------------------------------------------------------------

async fn list_jobs(State(db): State<Db>) -> Json<Vec<Job>> {
    let store = db.read().await;
    Json(store.jobs.values().cloned().collect())
}

async fn create_job(State(db): State<Db>, Json(input): Json<CreateJob>) -> StatusCode {
    let job = Job {
        name: input.name,
        schedule: input.schedule,
        command: input.command,
        epsilon: input.epsilon,
        owner: input.owner,
        is_async: input.is_async,
        disabled: false,
        success_count: 0,
        error_count: 0,
        last_success: String::new(),
        last_error: String::new(),
    };
    info!(job = %job.name, "chronos job created");
    db.write().await.jobs.insert(job.name.clone(), job);
    StatusCode::NO_CONTENT
}

async fn delete_job(State(db): State<Db>, Path(name): Path<String>) -> StatusCode {
    match db.write().await.jobs.remove(&name) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn start_job(State(db): State<Db>, Path(name): Path<String>) -> StatusCode {
    let mut store = db.write().await;
    let stamp = store.tick();
    match store.jobs.get_mut(&name) {
        Some(job) => {
            job.success_count += 1;
            job.last_success = stamp;
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn job_stats(State(db): State<Db>, Path(name): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let job = store.jobs.get(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "histogram": {
            "75thPercentile": 0.0,
            "95thPercentile": 0.0,
            "98thPercentile": 0.0,
            "99thPercentile": 0.0,
            "median": 0.0,
            "mean": 0.0,
            "count": job.success_count + job.error_count,
        },
        "taskStatHistory": [],
    })))
}

async fn percentile_stats(
    State(db): State<Db>,
    Path(percentile): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    if !PERCENTILES.contains(&percentile.as_str()) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let store = db.read().await;
    let rows: Vec<Value> = store
        .jobs
        .keys()
        .map(|name| json!({ "jobNameLabel": name, "time": 0.0 }))
        .collect();
    Ok(Json(Value::Array(rows)))
}

#[derive(Deserialize, Default)]
pub struct SearchParams {
    pub any: Option<String>,
    pub name: Option<String>,
    pub command: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

async fn search_jobs(State(db): State<Db>, Query(params): Query<SearchParams>) -> Json<Vec<Job>> {
    let store = db.read().await;
    let contains = |haystack: &str, needle: &Option<String>| {
        needle.as_ref().map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
    };
    let found = store
        .jobs
        .values()
        .filter(|job| contains(&job.name, &params.name))
        .filter(|job| contains(&job.command, &params.command))
        .filter(|job| {
            params.any.is_none()
                || contains(&job.name, &params.any)
                || contains(&job.command, &params.any)
                || contains(&job.owner, &params.any)
        })
        .skip(params.offset.unwrap_or(0))
        .take(params.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    Json(found)
}

/// Chronos task ids look like `ct:<millis>:<attempt>:<job>:`.
fn job_of_task(id: &str) -> Option<&str> {
    let mut parts = id.split(':');
    if parts.next()? != "ct" {
        return None;
    }
    parts.nth(2).filter(|job| !job.is_empty())
}

async fn update_task(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> StatusCode {
    let Some(name) = job_of_task(&id) else {
        return StatusCode::BAD_REQUEST;
    };
    let mut store = db.write().await;
    let stamp = store.tick();
    let Some(job) = store.jobs.get_mut(name) else {
        return StatusCode::NOT_FOUND;
    };
    if update.status_code == 0 {
        job.success_count += 1;
        job.last_success = stamp;
    } else {
        job.error_count += 1;
        job.last_error = stamp;
    }
    StatusCode::NO_CONTENT
}

async fn kill_job_tasks(State(db): State<Db>, Path(job): Path<String>) -> StatusCode {
    if db.read().await.jobs.contains_key(&job) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// ---------------------------------------------------------------------------
// Marathon
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
pub struct AppsParams {
    pub cmd: Option<String>,
}

async fn create_app(State(db): State<Db>, Json(def): Json<Map<String, Value>>) -> Reply<(StatusCode, Json<Value>)> {
    let Some(id) = def.get("id").and_then(Value::as_str).map(str::to_string) else {
        return Err(error(StatusCode::BAD_REQUEST, "id required"));
    };
    let mut store = db.write().await;
    if store.apps.contains_key(&id) {
        return Err(error(
            StatusCode::CONFLICT,
            format!("An app with id [{id}] already exists."),
        ));
    }
    store.apps.insert(id.clone(), AppRecord::default());
    store.push_version(&id, def);
    store.reconcile(&id);
    info!(app = %id, "marathon app created");
    let view = store.apps.get(&id).map(AppRecord::view).unwrap_or_default();
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_apps(State(db): State<Db>, Query(params): Query<AppsParams>) -> Json<Value> {
    let store = db.read().await;
    let apps: Vec<Value> = store
        .apps
        .values()
        .filter(|app| match &params.cmd {
            Some(cmd) => app
                .current()
                .and_then(|(_, def)| def.get("cmd"))
                .and_then(Value::as_str)
                .is_some_and(|c| c.contains(cmd.as_str())),
            None => true,
        })
        .map(AppRecord::view)
        .collect();
    Json(json!({ "apps": apps }))
}

async fn get_app(State(db): State<Db>, Path(id): Path<String>) -> Reply<Json<Value>> {
    let store = db.read().await;
    let app = store.apps.get(&id).ok_or_else(|| app_not_found(&id))?;
    Ok(Json(json!({ "app": app.view() })))
}

async fn app_versions(State(db): State<Db>, Path(id): Path<String>) -> Reply<Json<Value>> {
    let store = db.read().await;
    let app = store.apps.get(&id).ok_or_else(|| app_not_found(&id))?;
    let versions: Vec<&str> = app.versions.iter().rev().map(|(v, _)| v.as_str()).collect();
    Ok(Json(json!({ "versions": versions })))
}

async fn app_version(
    State(db): State<Db>,
    Path((id, version)): Path<(String, String)>,
) -> Reply<Json<Value>> {
    let store = db.read().await;
    let app = store.apps.get(&id).ok_or_else(|| app_not_found(&id))?;
    let (v, def) = app
        .versions
        .iter()
        .find(|(v, _)| *v == version)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("App '{id}' does not exist in version {version}")))?;
    let mut def = def.clone();
    def.insert("version".to_string(), json!(v));
    Ok(Json(Value::Object(def)))
}

#[derive(Deserialize, Default)]
pub struct UpdateParams {
    pub force: Option<String>,
}

async fn update_app(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<UpdateParams>,
    Json(changes): Json<Map<String, Value>>,
) -> Reply<Json<Value>> {
    let mut store = db.write().await;
    let app = store.apps.get(&id).ok_or_else(|| app_not_found(&id))?;
    let mut def = app.current().map(|(_, def)| def.clone()).unwrap_or_default();
    for (key, value) in changes {
        if key != "id" {
            def.insert(key, value);
        }
    }
    let version = store.push_version(&id, def).unwrap_or_default();
    store.reconcile(&id);
    info!(app = %id, force = params.force.as_deref() == Some("true"), "marathon app updated");
    Ok(Json(json!({ "deploymentId": Uuid::new_v4(), "version": version })))
}

async fn delete_app(State(db): State<Db>, Path(id): Path<String>) -> Reply<Json<Value>> {
    let mut store = db.write().await;
    store.apps.remove(&id).ok_or_else(|| app_not_found(&id))?;
    let version = store.tick();
    info!(app = %id, "marathon app destroyed");
    Ok(Json(json!({ "deploymentId": Uuid::new_v4(), "version": version })))
}

async fn app_tasks(State(db): State<Db>, Path(id): Path<String>) -> Reply<Json<Value>> {
    let store = db.read().await;
    let app = store.apps.get(&id).ok_or_else(|| app_not_found(&id))?;
    Ok(Json(json!({ "tasks": app.tasks })))
}

#[derive(Deserialize, Default)]
pub struct KillParams {
    pub host: Option<String>,
    pub scale: Option<String>,
}

/// Remove the selected tasks. With `scale=true` the instance count drops by
/// the number killed; otherwise replacements are started.
fn kill(store: &mut Store, id: &str, select: impl Fn(&Task) -> bool, scale: bool) -> Option<Vec<Task>> {
    let app = store.apps.get_mut(id)?;
    let (killed, kept): (Vec<Task>, Vec<Task>) = app.tasks.drain(..).partition(|t| select(t));
    app.tasks = kept;
    if scale && !killed.is_empty() {
        let mut def = app.current().map(|(_, def)| def.clone()).unwrap_or_default();
        let instances = app.instances().saturating_sub(killed.len());
        def.insert("instances".to_string(), json!(instances));
        store.push_version(id, def);
    }
    store.reconcile(id);
    Some(killed)
}

async fn kill_app_tasks(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<KillParams>,
) -> Reply<Json<Value>> {
    let scale = params.scale.as_deref() == Some("true");
    let mut store = db.write().await;
    let host = params.host;
    let killed = kill(
        &mut store,
        &id,
        |t| host.as_ref().map_or(true, |h| &t.host == h),
        scale,
    )
    .ok_or_else(|| app_not_found(&id))?;
    Ok(Json(json!({ "tasks": killed })))
}

async fn kill_app_task(
    State(db): State<Db>,
    Path((id, task)): Path<(String, String)>,
    Query(params): Query<KillParams>,
) -> Reply<Json<Value>> {
    let scale = params.scale.as_deref() == Some("true");
    let mut store = db.write().await;
    let mut killed = kill(&mut store, &id, |t| t.id == task, scale).ok_or_else(|| app_not_found(&id))?;
    let task = killed
        .pop()
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Task '{task}' does not exist")))?;
    Ok(Json(json!({ "task": task })))
}

async fn all_tasks(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let tasks: Vec<&Task> = store.apps.values().flat_map(|app| app.tasks.iter()).collect();
    Json(json!({ "tasks": tasks }))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallbackParams {
    pub callback_url: Option<String>,
}

async fn subscribe(State(db): State<Db>, Query(params): Query<CallbackParams>) -> Reply<Json<Value>> {
    let url = params
        .callback_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "callbackUrl required"))?;
    let mut store = db.write().await;
    if !store.callback_urls.contains(&url) {
        store.callback_urls.push(url.clone());
    }
    Ok(Json(json!({
        "callbackUrl": url,
        "clientIp": "127.0.0.1",
        "eventType": "subscribe_event",
    })))
}

async fn list_subscriptions(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    Json(json!({ "callbackUrls": store.callback_urls }))
}

async fn unsubscribe(State(db): State<Db>, Query(params): Query<CallbackParams>) -> Reply<Json<Value>> {
    let url = params
        .callback_url
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "callbackUrl required"))?;
    db.write().await.callback_urls.retain(|u| *u != url);
    Ok(Json(json!({
        "callbackUrl": url,
        "clientIp": "127.0.0.1",
        "eventType": "unsubscribe_event",
    })))
}
