//! Server mode store backed by an HTTP task API.
//!
//! The upstream exposes `GET /tasks`, `POST /tasks` and `PUT /tasks/{id}`.
//! There is no delete endpoint; archiving is an update.

use std::time::Duration;
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::Deserialize;
use crate::error::{Result, TaskError};
use crate::models::Task;
use crate::storage::{Mode, TaskStore};

pub struct RemoteStore {
    client: Client,
    tasks_url: Url,
}

impl RemoteStore {
    /// Creates a store for the API at `base_url`.
    ///
    /// `base_url` may point at the server root or directly at its `/tasks` collection.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let tasks_url = collection_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, tasks_url })
    }

    pub fn tasks_url(&self) -> &Url {
        &self.tasks_url
    }

    fn task_url(&self, id: &str) -> Result<Url> {
        let mut url = self.tasks_url.clone();
        url.path_segments_mut()
            .map_err(|_| TaskError::Config(format!("cannot address tasks under {}", self.tasks_url)))?
            .push(id);
        Ok(url)
    }
}

impl TaskStore for RemoteStore {
    fn mode(&self) -> Mode {
        Mode::Server
    }

    fn load(&mut self) -> Result<Vec<Task>> {
        tracing::debug!(url = %self.tasks_url, "fetching tasks");
        let resp = check(self.client.get(self.tasks_url.clone()).send()?)?;
        // An empty collection may come back as `null`.
        let tasks: Option<Vec<Task>> = resp.json()?;
        Ok(tasks.unwrap_or_default())
    }

    fn replace_all(&mut self, _tasks: &[Task]) -> Result<()> {
        Err(TaskError::Unsupported("replacing all tasks"))
    }

    fn create(&mut self, current: &[Task], mut task: Task) -> Result<Task> {
        task.id.clear();
        let resp = check(self.client.post(self.tasks_url.clone()).json(&task).send()?)?;
        let created: Task = resp.json()?;
        check_assigned_id(current, &created)?;
        tracing::info!(id = %created.id, "created task upstream");
        Ok(created)
    }

    fn update(&mut self, _current: &[Task], task: Task) -> Result<Task> {
        let url = self.task_url(&task.id)?;
        let resp = check(self.client.put(url).json(&task).send()?)?;
        let updated: Task = resp.json()?;
        tracing::info!(id = %updated.id, "updated task upstream");
        Ok(updated)
    }

    fn remove(&mut self, _current: &[Task], _id: &str) -> Result<()> {
        Err(TaskError::Unsupported("removing tasks"))
    }
}

/// The upstream must hand back a fresh, non-empty id for a created task.
fn check_assigned_id(current: &[Task], created: &Task) -> Result<()> {
    if created.id.trim().is_empty() {
        return Err(TaskError::BadResponse("created task has no id".into()));
    }
    if current.iter().any(|t| t.id == created.id) {
        return Err(TaskError::BadResponse(format!(
            "created task reuses id '{}'",
            created.id
        )));
    }
    Ok(())
}

/// Resolves the tasks collection URL from a configured base URL.
pub fn collection_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let full = if trimmed.ends_with("/tasks") {
        trimmed.to_string()
    } else {
        format!("{}/tasks", trimmed)
    };
    let url = Url::parse(&full)
        .map_err(|e| TaskError::Config(format!("invalid API URL '{}': {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(TaskError::Config(format!("invalid API URL '{}'", base_url)));
    }
    Ok(url)
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turns a non-2xx response into [`TaskError::Status`].
fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().unwrap_or_default();
    let message = error_message(&text);
    tracing::warn!(status = status.as_u16(), %message, "upstream rejected request");
    Err(TaskError::Status {
        status: status.as_u16(),
        message,
    })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.trim().to_string(),
    }
}
