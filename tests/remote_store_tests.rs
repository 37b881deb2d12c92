use std::net::TcpListener as StdListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use tasklane::{Mode, NewTask, Outcome, RemoteStore, Task, TaskSession, TaskStore};

/// In-process stand-in for the task API.
#[derive(Clone, Default)]
struct Upstream {
    tasks: Arc<Mutex<Vec<Task>>>,
    failure: Arc<Mutex<Option<(StatusCode, String)>>>,
    created: Arc<Mutex<usize>>,
    /// Id handed back for created tasks instead of a fresh `srv-N`.
    assigned_id: Arc<Mutex<Option<String>>>,
}

impl Upstream {
    fn with_tasks(tasks: Vec<Task>) -> Self {
        let upstream = Upstream::default();
        *upstream.tasks.lock().unwrap() = tasks;
        upstream
    }

    fn fail_with(&self, status: StatusCode, body: &str) {
        *self.failure.lock().unwrap() = Some((status, body.to_string()));
    }

    fn assign_id(&self, id: &str) {
        *self.assigned_id.lock().unwrap() = Some(id.to_string());
    }

    fn snapshot(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<Response> {
        self.failure
            .lock()
            .unwrap()
            .clone()
            .map(|(status, body)| (status, body).into_response())
    }
}

async fn list_tasks(State(up): State<Upstream>) -> Response {
    if let Some(resp) = up.failure() {
        return resp;
    }
    let tasks = up.snapshot();
    // Mirrors a server that encodes an empty collection as `null`.
    if tasks.is_empty() {
        return Json(None::<Vec<Task>>).into_response();
    }
    Json(tasks).into_response()
}

async fn create_task(State(up): State<Upstream>, Json(mut task): Json<Task>) -> Response {
    if let Some(resp) = up.failure() {
        return resp;
    }
    assert!(task.id.is_empty(), "client should not send an id");
    let mut created = up.created.lock().unwrap();
    *created += 1;
    task.id = match up.assigned_id.lock().unwrap().clone() {
        Some(id) => id,
        None => format!("srv-{}", created),
    };
    up.tasks.lock().unwrap().push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn update_task(
    State(up): State<Upstream>,
    Path(id): Path<String>,
    Json(task): Json<Task>,
) -> Response {
    if let Some(resp) = up.failure() {
        return resp;
    }
    let mut tasks = up.tasks.lock().unwrap();
    match tasks.iter_mut().find(|t| t.id == id) {
        Some(slot) => {
            *slot = task.clone();
            Json(task).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Failed to update task"}"#,
        )
            .into_response(),
    }
}

/// Serves `upstream` on a background runtime and returns its base URL.
fn serve(upstream: Upstream) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            let app = Router::new()
                .route("/tasks", get(list_tasks).post(create_task))
                .route("/tasks/:id", put(update_task))
                .with_state(upstream);
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn store_for(upstream: &Upstream) -> RemoteStore {
    RemoteStore::new(&serve(upstream.clone()), Duration::from_secs(5)).unwrap()
}

fn buy_milk() -> Task {
    Task {
        id: "t1".into(),
        title: "Buy milk".into(),
        description: String::new(),
        due_date: None,
        completed: false,
        is_archived: false,
    }
}

#[test]
fn loads_tasks_from_upstream() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    let session = TaskSession::open(store_for(&upstream));

    assert_eq!(session.mode(), Mode::Server);
    assert_eq!(session.tasks(), &[buy_milk()]);
    assert_eq!(session.error(), None);
}

#[test]
fn null_collection_loads_as_empty() {
    let upstream = Upstream::default();
    let session = TaskSession::open(store_for(&upstream));
    assert!(session.tasks().is_empty());
    assert_eq!(session.error(), None);
}

#[test]
fn failed_load_reports_upstream_message() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    upstream.fail_with(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"database unavailable"}"#);

    let session = TaskSession::open(store_for(&upstream));

    assert!(session.tasks().is_empty());
    assert_eq!(session.error(), Some("upstream returned 500: database unavailable"));
}

#[test]
fn reload_failure_keeps_the_current_list() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    let mut session = TaskSession::open(store_for(&upstream));

    upstream.fail_with(StatusCode::BAD_GATEWAY, "upstream down");
    assert_eq!(session.reload(), Outcome::Failed);

    assert_eq!(session.tasks(), &[buy_milk()]);
    assert_eq!(session.error(), Some("upstream returned 502: upstream down"));
}

#[test]
fn add_uses_the_server_assigned_id() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    let mut session = TaskSession::open(store_for(&upstream));

    assert_eq!(session.add(NewTask::new("Walk dog")), Outcome::Applied);

    assert_eq!(session.tasks().len(), 2);
    assert_eq!(session.tasks()[1].id, "srv-1");
    assert_eq!(upstream.snapshot(), session.tasks());
}

#[test]
fn created_task_without_an_id_is_not_added() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    upstream.assign_id("");
    let mut session = TaskSession::open(store_for(&upstream));

    assert_eq!(session.add(NewTask::new("Walk dog")), Outcome::Failed);

    assert_eq!(session.tasks(), &[buy_milk()]);
    assert!(session.error().unwrap().starts_with("upstream returned an unusable task"));
}

#[test]
fn created_task_reusing_an_id_is_not_added() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    upstream.assign_id("t1");
    let mut session = TaskSession::open(store_for(&upstream));

    assert_eq!(session.add(NewTask::new("Walk dog")), Outcome::Failed);

    assert_eq!(session.tasks(), &[buy_milk()]);
    assert!(session.error().unwrap().contains("reuses id 't1'"));
    assert_eq!(session.toggle_complete("t1"), Outcome::Applied);
    assert!(session.get("t1").unwrap().completed);
}

#[test]
fn toggle_and_archive_go_through_put() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    let mut session = TaskSession::open(store_for(&upstream));

    assert_eq!(session.toggle_complete("t1"), Outcome::Applied);
    assert!(upstream.snapshot()[0].completed);

    assert_eq!(session.archive("t1"), Outcome::Applied);
    let stored = upstream.snapshot();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_archived);
    assert!(session.visible().is_empty());
}

#[test]
fn failed_update_leaves_local_state_alone() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    let mut session = TaskSession::open(store_for(&upstream));
    upstream.fail_with(StatusCode::BAD_REQUEST, "title: required");

    assert_eq!(session.toggle_complete("t1"), Outcome::Failed);

    assert_eq!(session.get("t1"), Some(&buy_milk()));
    assert_eq!(session.error(), Some("upstream returned 400: title: required"));
}

#[test]
fn hard_remove_is_not_available_in_server_mode() {
    let upstream = Upstream::with_tasks(vec![buy_milk()]);
    let mut session = TaskSession::open(store_for(&upstream));

    assert_eq!(session.hard_remove("t1"), Outcome::Failed);

    assert_eq!(session.tasks(), &[buy_milk()]);
    assert!(session.error().unwrap().contains("not supported"));
    assert_eq!(upstream.snapshot(), vec![buy_milk()]);
}

#[test]
fn replace_all_is_unsupported() {
    let upstream = Upstream::default();
    let mut store = store_for(&upstream);
    assert!(store.replace_all(&[buy_milk()]).is_err());
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let port = {
        let listener = StdListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let store = RemoteStore::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();

    let session = TaskSession::open(store);

    assert!(session.tasks().is_empty());
    assert!(session.error().unwrap().starts_with("request failed"));
}
