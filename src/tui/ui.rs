use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::commands::{format_due, status_label};
use crate::storage::{Mode, TaskStore};
use super::app::{App, InputField, InputMode};

pub fn ui<S: TaskStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Status
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|t| {
            let style = if t.is_archived {
                Style::default().fg(Color::DarkGray)
            } else if t.completed {
                Style::default().fg(Color::Green).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                Cell::from(t.title.clone()),
                Cell::from(format_due(t)),
                Cell::from(status_label(t)),
            ]).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let mode = match app.session.mode() {
        Mode::Demo => "demo",
        Mode::Server => "server",
    };
    let view = if app.show_archived { "all tasks" } else { "tasks" };
    let title = format!("tasklane [{}] - {}", mode, view);

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Title", "Due", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.state);

    let (status_text, status_style) = match (app.session.error(), &app.notice) {
        (Some(err), _) => (format!("Error: {}", err), Style::default().fg(Color::Red)),
        (None, Some(notice)) => (notice.clone(), Style::default().fg(Color::Yellow)),
        (None, None) => match app.selected() {
            Some(t) if !t.description.is_empty() => (t.description.clone(), Style::default().fg(Color::Gray)),
            _ => (String::new(), Style::default()),
        },
    };
    let status = Paragraph::new(status_text)
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | Space: Done | d: Archive | x: Remove | n: Title | e: Desc | t: Due | v: Archived | r: Reload | Esc: Dismiss",
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    // Render Input Box if needed
    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Title",
            1 => "Add Task: Enter Description (Optional)",
            2 => "Add Task: Enter Due Date (YYYY-MM-DD, Optional)",
            _ => "Add Task",
        },
        InputMode::Editing => match app.input_field {
            InputField::Title => "Edit Title",
            InputField::Description => "Edit Description",
            InputField::Due => "Edit Due Date (YYYY-MM-DD, empty to clear)",
            InputField::None => "Edit",
        },
        InputMode::Normal => return,
    };

    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
    f.render_widget(Clear, area);

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
