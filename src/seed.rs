use chrono::{TimeZone, Utc};
use crate::models::{DueDate, Task};

/// The fixed dataset written to demo storage on first use or after corruption.
pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "task-1".into(),
            title: "Try out tasklane".into(),
            description: "Add a task, tick it off, then archive it.".into(),
            due_date: None,
            completed: false,
            is_archived: false,
        },
        Task {
            id: "task-2".into(),
            title: "Plan the week".into(),
            description: String::new(),
            due_date: Utc
                .with_ymd_and_hms(2025, 1, 6, 9, 0, 0)
                .single()
                .map(DueDate::at),
            completed: false,
            is_archived: false,
        },
        Task {
            id: "task-3".into(),
            title: "Read the README".into(),
            description: "Demo mode keeps everything in a local JSON file.".into(),
            due_date: None,
            completed: true,
            is_archived: false,
        },
    ]
}
