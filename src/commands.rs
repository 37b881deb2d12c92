use std::io::{self, Write};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crate::error::Result;
use crate::models::{parse_due_date, NewTask, Task};
use crate::session::{Outcome, TaskSession};
use crate::storage::{LocalStore, TaskStore};

/// Prints the result of an operation unless `silent`.
fn report<S: TaskStore>(session: &TaskSession<S>, outcome: Outcome, id: &str, done: &str, silent: bool) {
    if silent {
        return;
    }
    match outcome {
        Outcome::Applied => println!("{}", done),
        Outcome::Rejected => eprintln!("Task title must not be empty."),
        Outcome::NotFound => eprintln!("Task {} not found.", id),
        Outcome::Failed => eprintln!("Error: {}", session.error().unwrap_or("unknown error")),
    }
}

/// Adds a new task.
pub fn cmd_add<S: TaskStore>(session: &mut TaskSession<S>, title: String, description: Option<String>, due: Option<String>, silent: bool) -> Outcome {
    let due_date = match parse_due_date(due.as_deref().unwrap_or_default()) {
        Ok(d) => d,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return Outcome::Rejected;
        }
    };
    let new_task = NewTask::new(title)
        .with_description(description.unwrap_or_default())
        .with_due_date(due_date);
    let outcome = session.add(new_task);
    let id = match (outcome, session.tasks().last()) {
        (Outcome::Applied, Some(t)) => t.id.clone(),
        _ => String::new(),
    };
    report(session, outcome, &id, &format!("Task added (id = {})", id), silent);
    outcome
}

/// Flips a task between done and pending.
pub fn cmd_complete<S: TaskStore>(session: &mut TaskSession<S>, id: &str, silent: bool) -> Outcome {
    let outcome = session.toggle_complete(id);
    let state = match session.get(id) {
        Some(t) if t.completed => "complete",
        _ => "pending",
    };
    report(session, outcome, id, &format!("Task {} marked as {}.", id, state), silent);
    outcome
}

/// Archives a task, or restores it if it is already archived.
pub fn cmd_delete<S: TaskStore>(session: &mut TaskSession<S>, id: &str, silent: bool) -> Outcome {
    let outcome = session.archive(id);
    let msg = match session.get(id) {
        Some(t) if t.is_archived => format!("Task {} archived.", id),
        _ => format!("Task {} restored.", id),
    };
    report(session, outcome, id, &msg, silent);
    outcome
}

/// Removes a task from storage for good.
pub fn cmd_remove<S: TaskStore>(session: &mut TaskSession<S>, id: &str, silent: bool) -> Outcome {
    let outcome = session.hard_remove(id);
    report(session, outcome, id, &format!("Task {} removed.", id), silent);
    outcome
}

/// Edits an existing task's details.
///
/// An empty `due` clears the due date, as does `clear_due`.
pub fn cmd_edit<S: TaskStore>(session: &mut TaskSession<S>, id: &str, title: Option<String>, description: Option<String>, due: Option<String>, clear_due: bool, silent: bool) -> Outcome {
    let Some(mut task) = session.get(id).cloned() else {
        tracing::warn!(%id, "edit for unknown task ignored");
        report(session, Outcome::NotFound, id, "", silent);
        return Outcome::NotFound;
    };
    if let Some(t) = title { task.title = t; }
    if let Some(d) = description { task.description = d; }
    if clear_due {
        task.due_date = None;
    } else if let Some(d) = due {
        match parse_due_date(&d) {
            Ok(date) => task.due_date = date,
            Err(e) => {
                if !silent { eprintln!("{}", e); }
                return Outcome::Rejected;
            }
        }
    }
    let outcome = session.update(task);
    report(session, outcome, id, &format!("Task {} updated.", id), silent);
    outcome
}

/// Prints a single task with its description.
pub fn cmd_show<S: TaskStore>(session: &TaskSession<S>, id: &str) {
    let Some(t) = session.get(id) else {
        eprintln!("Task {} not found.", id);
        return;
    };
    println!("{}", t.title);
    println!("  id:       {}", t.id);
    println!("  due:      {}", format_due(t));
    println!("  status:   {}", status_label(t));
    if !t.description.is_empty() {
        println!();
        println!("{}", t.description);
    }
}

/// Lists tasks in a formatted table, in store order.
///
/// Archived tasks are hidden unless `all`; `archived_only` shows just those.
pub fn cmd_list<S: TaskStore>(session: &TaskSession<S>, all: bool, archived_only: bool) {
    if let Some(err) = session.error() {
        eprintln!("Error: {}", err);
    }
    let tasks: Vec<&Task> = if archived_only {
        session.archived()
    } else if all {
        session.tasks().iter().collect()
    } else {
        session.visible()
    };
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let status_color = if t.is_archived {
            Color::Grey
        } else if t.completed {
            Color::Green
        } else {
            Color::Yellow
        };
        let title = if t.completed {
            Cell::new(&t.title).add_attribute(Attribute::CrossedOut)
        } else {
            Cell::new(&t.title)
        };
        table.add_row(vec![
            Cell::new(&t.id),
            title,
            Cell::new(format_due(t)),
            Cell::new(status_label(t)).fg(status_color),
        ]);
    }

    println!("{table}");
}

/// Resets demo storage to the seed dataset.
///
/// Declining the prompt is not an error; a failed write is.
pub fn cmd_reset(store: &mut LocalStore, force: bool) -> Result<()> {
    if !force {
        print!("Replace all tasks in {} with the demo data? This cannot be undone. [y/N] ", store.path().display());
        let _ = io::stdout().flush();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    let tasks = store.reset()?;
    println!("Storage reset to {} demo tasks.", tasks.len());
    Ok(())
}

pub fn format_due(t: &Task) -> String {
    t.due_date.map(|d| d.date().to_string()).unwrap_or_default()
}

pub fn status_label(t: &Task) -> &'static str {
    match (t.is_archived, t.completed) {
        (true, _) => "Archived",
        (false, true) => "Done",
        (false, false) => "Pending",
    }
}
