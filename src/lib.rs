pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod remote;
pub mod seed;
pub mod session;
pub mod storage;
pub mod tui;

pub use error::{Result, TaskError};
pub use models::{DueDate, NewTask, Task};
pub use remote::RemoteStore;
pub use session::{Outcome, TaskSession};
pub use storage::{LocalStore, Mode, TaskStore};
