//! Drive both clients through the JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation and its input, the request it must produce,
//! a simulated response, and either the unwrapped result or the error it must
//! fail with. Comparing parsed JSON (not raw strings) avoids false negatives
//! from field-ordering differences.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use mesos_client::chronos::types::{JobSearch, JobRef, NewJob, StatsQuery, TaskKill, TaskStatus};
use mesos_client::marathon::types::{
    App, AppDefinition, AppQuery, AppRef, AppUpdate, AppVersion, CallbackUrl, KillTasks, Task,
};
use mesos_client::testing::RecordingTransport;
use mesos_client::{ApiError, Chronos, ClientConfig, HttpMethod, Marathon, TransportError};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Operations accept either a bare identifier or the full options record.
fn record<R: DeserializeOwned + From<String>>(input: &Value) -> R {
    match input {
        Value::String(s) => R::from(s.clone()),
        other => serde_json::from_value(other.clone()).unwrap(),
    }
}

fn options<R: DeserializeOwned>(input: &Value) -> R {
    serde_json::from_value(input.clone()).unwrap()
}

fn to_json<S: serde::Serialize>(value: S) -> Value {
    serde_json::to_value(value).unwrap()
}

fn task_ids(tasks: Vec<Task>) -> Value {
    to_json(tasks.into_iter().map(|t| t.id).collect::<Vec<_>>())
}

fn app_summary(app: App) -> Value {
    json!({ "id": app.id, "instances": app.instances })
}

fn run_chronos(c: &Chronos<RecordingTransport>, operation: &str, input: &Value) -> Result<Value, ApiError> {
    let jobs = c.jobs();
    let names = |found: Vec<mesos_client::chronos::types::Job>| {
        to_json(found.into_iter().map(|j| j.name).collect::<Vec<_>>())
    };
    Ok(match operation {
        "jobs.list" => names(jobs.list()?),
        "jobs.create" => to_json(jobs.create(&options::<NewJob>(input))?),
        "jobs.destroy" => to_json(jobs.destroy(record::<JobRef>(input))?),
        "jobs.start" => to_json(jobs.start(record::<JobRef>(input))?),
        "jobs.stats" => jobs.stats(record::<StatsQuery>(input))?,
        "jobs.search" => names(jobs.search(record::<JobSearch>(input))?),
        "tasks.update" => to_json(c.tasks().update(&options::<TaskStatus>(input))?),
        "tasks.kill" => to_json(c.tasks().kill(record::<TaskKill>(input))?),
        other => panic!("unknown chronos operation: {other}"),
    })
}

fn run_marathon(m: &Marathon<RecordingTransport>, operation: &str, input: &Value) -> Result<Value, ApiError> {
    let apps = m.apps();
    let ids = |found: Vec<App>| to_json(found.into_iter().map(|a| a.id).collect::<Vec<_>>());
    Ok(match operation {
        "apps.create" => to_json(apps.create(&options::<AppDefinition>(input))?),
        "apps.list" if input.is_null() => ids(apps.list()?),
        "apps.list" => ids(apps.list_matching(record::<AppQuery>(input))?),
        "apps.get" => app_summary(apps.get(record::<AppRef>(input))?),
        "apps.versions" => to_json(apps.versions(record::<AppRef>(input))?),
        "apps.version" => app_summary(apps.version(options::<AppVersion>(input))?),
        "apps.update" => to_json(apps.update(&options::<AppUpdate>(input))?),
        "apps.destroy" => to_json(apps.destroy(record::<AppRef>(input))?),
        "apps.tasks" => task_ids(apps.tasks(record::<AppRef>(input))?),
        "apps.kill" => task_ids(apps.kill(record::<KillTasks>(input))?),
        "tasks" => task_ids(m.tasks()?),
        "eventSubscriptions.register" => to_json(m.event_subscriptions().register(record::<CallbackUrl>(input))?),
        "eventSubscriptions.list" => to_json(m.event_subscriptions().list()?),
        "eventSubscriptions.unregister" => {
            to_json(m.event_subscriptions().unregister(record::<CallbackUrl>(input))?)
        }
        other => panic!("unknown marathon operation: {other}"),
    })
}

/// Check one case against what the transport recorded and what the call
/// returned.
fn check_case(
    case: &Value,
    base_url: &str,
    transport: &RecordingTransport,
    result: Result<Value, ApiError>,
) {
    let name = case["name"].as_str().unwrap();
    let expected_req = &case["expected_request"];
    let sent = transport.requests();

    // Verify build
    if expected_req.is_null() {
        assert!(sent.is_empty(), "{name}: no request expected, got {sent:?}");
    } else {
        assert_eq!(sent.len(), 1, "{name}: exactly one request");
        let req = &sent[0];
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{base_url}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match &expected_req["body"] {
            Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
            expected => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected, "{name}: body");
            }
        }
    }

    // Verify unwrap
    match case.get("expected_error") {
        None => assert_eq!(result.unwrap(), case["expected_result"], "{name}: result"),
        Some(expected) => {
            let err = result.unwrap_err();
            if let Some(message) = expected.get("validation") {
                match &err {
                    ApiError::Validation(v) => assert_eq!(v.to_string(), message.as_str().unwrap(), "{name}"),
                    other => panic!("{name}: expected validation error, got {other:?}"),
                }
            } else if let Some(status) = expected.get("status") {
                assert_eq!(err.status(), status.as_u64().map(|s| s as u16), "{name}: status");
            } else if expected.get("decode").is_some() {
                assert!(
                    matches!(err, ApiError::Transport(TransportError::Decode(_))),
                    "{name}: expected decode error, got {err:?}"
                );
            } else {
                panic!("{name}: unknown expected_error {expected}");
            }
        }
    }
}

fn queue_response(transport: &RecordingTransport, case: &Value) {
    if let Some(sim) = case.get("simulated_response") {
        transport.respond(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap());
    }
}

#[test]
fn chronos_test_vectors() {
    let raw = include_str!("../../test-vectors/chronos.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let c = Chronos::with_transport(ClientConfig::chronos(), RecordingTransport::new()).unwrap();
        assert_eq!(c.config().base_url(), base_url);
        queue_response(c.transport(), case);

        let result = run_chronos(&c, case["operation"].as_str().unwrap(), &case["input"]);
        check_case(case, base_url, c.transport(), result);
    }
}

#[test]
fn marathon_test_vectors() {
    let raw = include_str!("../../test-vectors/marathon.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let m = Marathon::with_transport(ClientConfig::marathon(), RecordingTransport::new()).unwrap();
        assert_eq!(m.config().base_url(), base_url);
        queue_response(m.transport(), case);

        let result = run_marathon(&m, case["operation"].as_str().unwrap(), &case["input"]);
        check_case(case, base_url, m.transport(), result);
    }
}
