//! The task lifecycle: one owned list of tasks, written through a store.
//!
//! A session is opened over a [`TaskStore`], performs the initial load, and
//! exposes add / update / toggle / archive / hard-remove. Lookup misses and
//! empty titles are silent no-ops. Store failures land in a single error slot
//! for the presentation layer to display; nothing is retried.
//!
//! Until a load succeeds the session refuses to write, so a store it could not
//! read is never overwritten with a partial list.
//!
//! Operations are not coordinated with other writers. Two sessions over the
//! same file each write their whole list, so the last write wins.

use crate::error::TaskError;
use crate::models::{NewTask, Task};
use crate::storage::{Mode, TaskStore};

/// Result of a task operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The change was persisted and applied to the in-memory list.
    Applied,
    /// Validation failed (empty title); nothing changed.
    Rejected,
    /// No task with the given id; nothing changed.
    NotFound,
    /// The store failed; see [`TaskSession::error`].
    Failed,
}

pub struct TaskSession<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
    /// Whether `tasks` reflects a successful load.
    loaded: bool,
    error: Option<String>,
}

impl<S: TaskStore> TaskSession<S> {
    /// Opens a session and loads the current tasks.
    ///
    /// A failed load leaves the list empty and records the error.
    pub fn open(store: S) -> Self {
        let mut session = TaskSession {
            store,
            tasks: Vec::new(),
            loaded: false,
            error: None,
        };
        session.reload();
        session
    }

    /// Ends the session, handing back the store.
    pub fn close(self) -> S {
        self.store
    }

    /// Re-reads tasks from the store. The list is kept as-is on failure.
    pub fn reload(&mut self) -> Outcome {
        match self.store.load() {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "loaded tasks");
                self.tasks = tasks;
                self.loaded = true;
                Outcome::Applied
            }
            Err(e) => self.fail("load tasks", e),
        }
    }

    pub fn mode(&self) -> Mode {
        self.store.mode()
    }

    /// Whether a load has succeeded. Writes are refused until it has.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All tasks, archived ones included, in store order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks shown in the default view.
    pub fn visible(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_visible()).collect()
    }

    pub fn archived(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_archived).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Last store error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Creates a task and appends it to the list.
    pub fn add(&mut self, new_task: NewTask) -> Outcome {
        if new_task.title.trim().is_empty() {
            return Outcome::Rejected;
        }
        if !self.loaded {
            return self.fail("add task", TaskError::NotLoaded);
        }
        let task = new_task.into_task();
        match self.store.create(&self.tasks, task) {
            Ok(created) => {
                tracing::info!(id = %created.id, "task added");
                self.tasks.push(created);
                Outcome::Applied
            }
            Err(e) => self.fail("add task", e),
        }
    }

    /// Replaces the task with the same id, keeping its position.
    ///
    /// A blank title is rejected.
    pub fn update(&mut self, task: Task) -> Outcome {
        if task.title.trim().is_empty() {
            return Outcome::Rejected;
        }
        self.write_update(task)
    }

    fn write_update(&mut self, task: Task) -> Outcome {
        if !self.loaded {
            return self.fail("update task", TaskError::NotLoaded);
        }
        let Some(index) = self.position(&task.id) else {
            tracing::warn!(id = %task.id, "update for unknown task ignored");
            return Outcome::NotFound;
        };
        let mut pending = self.tasks.clone();
        pending[index] = task.clone();
        match self.store.update(&pending, task) {
            Ok(stored) => {
                self.tasks[index] = stored;
                Outcome::Applied
            }
            Err(e) => self.fail("update task", e),
        }
    }

    /// Flips the completion flag.
    pub fn toggle_complete(&mut self, id: &str) -> Outcome {
        self.modify(id, |t| t.completed = !t.completed)
    }

    /// Flips the archive flag. This is the user-facing "delete"; the record stays.
    pub fn archive(&mut self, id: &str) -> Outcome {
        self.modify(id, |t| t.is_archived = !t.is_archived)
    }

    /// Removes a task from storage entirely. Only demo stores support this.
    pub fn hard_remove(&mut self, id: &str) -> Outcome {
        if self.position(id).is_none() {
            tracing::warn!(%id, "remove for unknown task ignored");
            return Outcome::NotFound;
        }
        if !self.loaded {
            return self.fail("remove task", TaskError::NotLoaded);
        }
        match self.store.remove(&self.tasks, id) {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                tracing::info!(%id, "task removed");
                Outcome::Applied
            }
            Err(e) => self.fail("remove task", e),
        }
    }

    fn modify(&mut self, id: &str, change: impl FnOnce(&mut Task)) -> Outcome {
        let Some(index) = self.position(id) else {
            tracing::warn!(%id, "task not found");
            return Outcome::NotFound;
        };
        let mut task = self.tasks[index].clone();
        change(&mut task);
        self.write_update(task)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn fail(&mut self, action: &str, err: TaskError) -> Outcome {
        tracing::error!(error = %err, "failed to {}", action);
        self.error = Some(err.to_string());
        Outcome::Failed
    }
}
