use ratatui::widgets::TableState;
use crate::models::{parse_due_date, NewTask, Task};
use crate::session::{Outcome, TaskSession};
use crate::storage::{Mode, TaskStore};

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

#[derive(Debug, PartialEq)]
pub enum InputField {
    None,
    Title,
    Description,
    Due,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub description: String,
    pub step: usize, // 0: Title, 1: Description, 2: Due
}

pub struct App<S: TaskStore> {
    pub session: TaskSession<S>,
    /// Tasks currently on screen, in store order.
    pub rows: Vec<Task>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<String>,
    pub add_state: AddState,
    pub show_archived: bool,
    /// Feedback for input the session never sees, e.g. a bad date.
    pub notice: Option<String>,
}

impl<S: TaskStore> App<S> {
    /// Creates the app over an already opened session.
    pub fn new(session: TaskSession<S>) -> App<S> {
        let mut app = App {
            session,
            rows: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            show_archived: false,
            notice: None,
        };
        app.refresh();
        app
    }

    /// Selects the next row.
    pub fn next(&mut self) {
        if self.rows.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row.
    pub fn previous(&mut self) {
        if self.rows.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.rows.get(i))
    }

    fn selected_id(&self) -> Option<String> {
        self.selected().map(|t| t.id.clone())
    }

    /// Toggles completion of the selected task.
    pub fn complete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.session.toggle_complete(&id);
            self.refresh();
        }
    }

    /// Archives (or restores) the selected task.
    pub fn archive_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.session.archive(&id);
            self.refresh();
        }
    }

    /// Permanently removes the selected task. Demo mode only.
    pub fn remove_selected(&mut self) {
        if self.session.mode() != Mode::Demo {
            self.notice = Some("Tasks can only be removed in demo mode.".into());
            return;
        }
        if let Some(id) = self.selected_id() {
            self.session.hard_remove(&id);
            self.refresh();
        }
    }

    /// Reloads tasks from the store.
    pub fn reload(&mut self) {
        self.session.reload();
        self.refresh();
    }

    /// Rebuilds the visible rows from the session and keeps the selection in range.
    pub fn refresh(&mut self) {
        self.rows = self
            .session
            .tasks()
            .iter()
            .filter(|t| self.show_archived || t.is_visible())
            .cloned()
            .collect();

        if self.rows.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.rows.len() {
                self.state.select(Some(self.rows.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Toggles the visibility of archived tasks.
    pub fn toggle_archived(&mut self) {
        self.show_archived = !self.show_archived;
        self.refresh();
    }

    /// Clears the error slot and any notice.
    pub fn dismiss_error(&mut self) {
        self.session.clear_error();
        self.notice = None;
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a field of the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        let Some(t) = self.selected() else { return; };
        let id = t.id.clone();
        let prefill = match field {
            InputField::Title => t.title.clone(),
            InputField::Description => t.description.clone(),
            InputField::Due => t.due_date.map(|d| d.date().to_string()).unwrap_or_default(),
            InputField::None => String::new(),
        };
        self.target_id = Some(id);
        self.input_mode = InputMode::Editing;
        self.input_field = field;
        self.input_buffer = prefill;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles Enter based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    fn handle_adding_input(&mut self) {
        match self.add_state.step {
            0 => { // Title
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.title = self.input_buffer.clone();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => { // Description
                self.add_state.description = self.input_buffer.clone();
                self.add_state.step += 1;
                self.input_buffer.clear();
            }
            2 => { // Due
                let due = match parse_due_date(&self.input_buffer) {
                    Ok(d) => d,
                    Err(e) => {
                        self.notice = Some(e);
                        return;
                    }
                };
                let new_task = NewTask::new(self.add_state.title.clone())
                    .with_description(self.add_state.description.clone())
                    .with_due_date(due);
                if self.session.add(new_task) == Outcome::Applied {
                    self.notice = None;
                }
                self.cancel_input();
                self.refresh();
                if !self.rows.is_empty() {
                    self.state.select(Some(self.rows.len() - 1));
                }
            }
            _ => {}
        }
    }

    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_id.take() else {
            self.cancel_input();
            return;
        };
        let Some(mut task) = self.session.get(&id).cloned() else {
            self.cancel_input();
            return;
        };
        match self.input_field {
            InputField::Title => task.title = self.input_buffer.clone(),
            InputField::Description => task.description = self.input_buffer.clone(),
            InputField::Due => match parse_due_date(&self.input_buffer) {
                Ok(d) => task.due_date = d,
                Err(e) => {
                    self.notice = Some(e);
                    self.target_id = Some(id);
                    return;
                }
            },
            InputField::None => {}
        }
        if self.session.update(task) == Outcome::Rejected {
            self.notice = Some("Title must not be empty.".into());
        }
        self.cancel_input();
        self.refresh();
    }
}
