use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use chrono::Utc;
use crate::error::Result;
use crate::models::Task;
use crate::seed::seed_tasks;

/// Which persistence path a store implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Local JSON file, seeded with demo data.
    Demo,
    /// Remote HTTP task API.
    Server,
}

/// Persistence behind a [`crate::session::TaskSession`].
///
/// Mutating calls receive the caller's current in-memory list so that file
/// backed stores can write the whole collection back; remote stores ignore it.
pub trait TaskStore {
    fn mode(&self) -> Mode;

    /// Returns the current ordered sequence of tasks.
    fn load(&mut self) -> Result<Vec<Task>>;

    /// Persists `tasks` as the complete state.
    fn replace_all(&mut self, tasks: &[Task]) -> Result<()>;

    /// Stores a new task after `current` and returns it with its assigned id.
    fn create(&mut self, current: &[Task], task: Task) -> Result<Task>;

    /// Stores a full replacement for the task with the same id.
    fn update(&mut self, current: &[Task], task: Task) -> Result<Task>;

    /// Physically removes a task.
    fn remove(&mut self, current: &[Task], id: &str) -> Result<()>;
}

/// Demo mode store: one JSON file holding the task array.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites storage with the seed dataset and returns it.
    pub fn reset(&mut self) -> Result<Vec<Task>> {
        let seed = seed_tasks();
        self.write_tasks(&seed)?;
        tracing::info!(path = %self.path.display(), "seeded task storage");
        Ok(seed)
    }

    /// Reads the raw file bytes, `None` when the file does not exist.
    ///
    /// Content is not checked here; bytes that are not valid UTF-8 are a
    /// decode failure for [`TaskStore::load`], not an I/O error.
    fn read_raw(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let s = serde_json::to_string_pretty(tasks)?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }
}

impl TaskStore for LocalStore {
    fn mode(&self) -> Mode {
        Mode::Demo
    }

    /// Falls back to the seed dataset when the file is missing, empty or corrupt.
    fn load(&mut self) -> Result<Vec<Task>> {
        let raw = match self.read_raw()? {
            Some(raw) if !raw.iter().all(u8::is_ascii_whitespace) => raw,
            _ => return self.reset(),
        };
        match serde_json::from_slice::<Vec<Task>>(&raw) {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "stored tasks are unreadable, reseeding");
                self.reset()
            }
        }
    }

    fn replace_all(&mut self, tasks: &[Task]) -> Result<()> {
        self.write_tasks(tasks)
    }

    fn create(&mut self, current: &[Task], mut task: Task) -> Result<Task> {
        task.id = next_id(current);
        task.completed = false;
        let mut tasks = current.to_vec();
        tasks.push(task.clone());
        self.write_tasks(&tasks)?;
        Ok(task)
    }

    fn update(&mut self, current: &[Task], task: Task) -> Result<Task> {
        let tasks: Vec<Task> = current
            .iter()
            .map(|t| if t.id == task.id { task.clone() } else { t.clone() })
            .collect();
        self.write_tasks(&tasks)?;
        Ok(task)
    }

    fn remove(&mut self, current: &[Task], id: &str) -> Result<()> {
        let tasks: Vec<Task> = current.iter().filter(|t| t.id != id).cloned().collect();
        self.write_tasks(&tasks)
    }
}

/// Client-side id: `task-<epoch millis>`, suffixed when it collides.
fn next_id(current: &[Task]) -> String {
    let base = format!("task-{}", Utc::now().timestamp_millis());
    let taken = |id: &str| current.iter().any(|t| t.id == id);
    if !taken(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
