//! Lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives both clients over
//! real HTTP with the stock ureq transport. Checks that request building,
//! status interpretation and response unwrapping agree with an actual server.

use std::net::SocketAddr;
use std::time::Duration;

use mesos_client::chronos::types::{JobSearch, NewJob, StatsQuery, TaskStatus};
use mesos_client::marathon::types::{AppDefinition, AppQuery, AppUpdate, AppVersion, KillTasks};
use mesos_client::{ApiError, Chronos, ClientConfig, Marathon, TransportError};

fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mesos_mock_server::run(listener).await
        })
    });

    // Give the server a moment to start accepting connections.
    std::thread::sleep(Duration::from_millis(50));
    addr
}

fn chronos(addr: SocketAddr) -> Chronos<mesos_client::UreqTransport> {
    let config = ClientConfig::chronos()
        .with_base_url(format!("http://{addr}/scheduler"))
        .with_timeout(Duration::from_secs(5));
    Chronos::new(config).unwrap()
}

fn marathon(addr: SocketAddr) -> Marathon<mesos_client::UreqTransport> {
    let config = ClientConfig::marathon()
        .with_base_url(format!("http://{addr}/v2"))
        .with_timeout(Duration::from_secs(5));
    Marathon::new(config).unwrap()
}

#[test]
fn chronos_job_lifecycle() {
    let chronos = chronos(spawn_server());
    let jobs = chronos.jobs();

    assert!(jobs.list().unwrap().is_empty());

    let job = NewJob::new("nightly", "R/2014-03-01T02:00:00Z/P1D", "backup.sh")
        .epsilon("PT15M")
        .owner("ops@example.org");
    jobs.create(&job).unwrap();

    let listed = jobs.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "nightly");
    assert_eq!(listed[0].command, "backup.sh");
    assert!(!listed[0].is_async);

    jobs.start("nightly").unwrap();
    chronos
        .tasks()
        .update(&TaskStatus::new("ct:1393632000000:0:nightly:", 1))
        .unwrap();

    let stats = jobs.stats("nightly").unwrap();
    assert_eq!(stats["histogram"]["count"], 2);
    let stats = jobs.stats(StatsQuery::percentile("99thPercentile")).unwrap();
    assert_eq!(stats[0]["jobNameLabel"], "nightly");

    let found = jobs.search(JobSearch::default().command("backup")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].success_count, Some(1));
    assert_eq!(found[0].error_count, Some(1));
    assert!(jobs.search("weekly").unwrap().is_empty());

    chronos.tasks().kill("nightly").unwrap();
    jobs.destroy("nightly").unwrap();
    assert!(jobs.list().unwrap().is_empty());

    let err = jobs.start("nightly").unwrap_err();
    assert!(err.is_not_found(), "expected 404, got {err:?}");
}

#[test]
fn chronos_rejects_unknown_percentile() {
    let chronos = chronos(spawn_server());
    let err = chronos.jobs().stats(StatsQuery::percentile("42ndPercentile")).unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[test]
fn marathon_app_lifecycle() {
    let marathon = marathon(spawn_server());
    let apps = marathon.apps();

    let web = AppDefinition::new("web")
        .cmd("python -m http.server")
        .resources(0.1, 32.0, 2)
        .env("MODE", "test");
    apps.create(&web).unwrap();

    let err = apps.create(&web).unwrap_err();
    assert_eq!(err.status(), Some(409));

    let all = apps.list().unwrap();
    assert_eq!(all.len(), 1);
    assert!(apps.list_matching(AppQuery::from("nginx")).unwrap().is_empty());

    let app = apps.get("web").unwrap();
    assert_eq!(app.id, "web");
    assert_eq!(app.instances, 2);
    assert_eq!(app.env.get("MODE").map(String::as_str), Some("test"));

    let tasks = apps.tasks("web").unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.app_id == "web"));

    let changes = AppDefinition::default().cmd("sleep 60").resources(0.1, 32.0, 3);
    apps.update(&AppUpdate::new("web", changes).force(true)).unwrap();

    let app = apps.get("web").unwrap();
    assert_eq!(app.cmd.as_deref(), Some("sleep 60"));
    assert_eq!(app.instances, 3);

    let versions = apps.versions("web").unwrap();
    assert_eq!(versions.len(), 2);
    let first = apps.version(("web", versions[1].as_str())).unwrap();
    assert_eq!(first.cmd.as_deref(), Some("python -m http.server"));
    assert_eq!(first.instances, 2);

    assert_eq!(marathon.tasks().unwrap().len(), 3);

    let victim = apps.tasks("web").unwrap()[0].id.clone();
    let killed = apps.kill(KillTasks::from("web").task(victim.as_str()).scale(true)).unwrap();
    assert_eq!(killed.len(), 1);
    assert_eq!(killed[0].id, victim);
    assert_eq!(apps.get("web").unwrap().instances, 2);

    let killed = apps.kill(KillTasks::from("web").host("localhost")).unwrap();
    assert_eq!(killed.len(), 2);
    assert_eq!(apps.tasks("web").unwrap().len(), 2);

    apps.destroy("web").unwrap();
    let err = apps.get("web").unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        ApiError::Transport(TransportError::Status { ref body, .. }) if body.contains("does not exist")
    ));

    let err = apps.version(AppVersion::from(("web", "2014-03-01T00:00:01.000Z"))).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn marathon_event_subscriptions() {
    let marathon = marathon(spawn_server());
    let subscriptions = marathon.event_subscriptions();

    assert!(subscriptions.list().unwrap().is_empty());

    subscriptions.register("http://10.0.0.1:8088/callback").unwrap();
    subscriptions.register("http://10.0.0.1:8088/callback").unwrap();
    assert_eq!(subscriptions.list().unwrap(), vec!["http://10.0.0.1:8088/callback".to_string()]);

    subscriptions.unregister("http://10.0.0.1:8088/callback").unwrap();
    assert!(subscriptions.list().unwrap().is_empty());
}

#[test]
fn configured_timeout_reaches_transport() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept and hold connections without ever answering.
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    let config = ClientConfig::marathon()
        .with_base_url(format!("http://{addr}/v2"))
        .with_timeout(Duration::from_millis(200));
    let marathon = Marathon::new(config).unwrap();

    let started = std::time::Instant::now();
    let err = marathon.apps().list().unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Timeout)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn connection_refused_is_transport_io() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = chronos(addr).jobs().list().unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Io(_))), "got {err:?}");
}
