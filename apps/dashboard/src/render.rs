//! Plain-text rendering of the dashboard for the terminal.

use std::fmt::Write as _;

use client_core::{ActionDispatcher, DisplayRow, Draft, ViewModel};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Assigned Task")]
    task: String,
}

impl From<DisplayRow<'_>> for AssignmentRow {
    fn from(row: DisplayRow<'_>) -> Self {
        let task = match row.task_description {
            Some(description) => format!("{} ({description})", row.task_label),
            None => row.task_label.to_string(),
        };
        Self {
            student: row.participant.to_string(),
            task,
        }
    }
}

pub fn render_view(view: &ViewModel) -> String {
    let mut out = String::from("Tasks are automatically reassigned every Saturday");
    if view.is_reassignment_day() {
        out.push_str("  [It's Saturday!]");
    }
    out.push('\n');

    if !view.has_synced() {
        out.push_str("(no data loaded yet)\n");
        return out;
    }
    if view.is_empty() {
        out.push_str("(no assignments)\n");
        return out;
    }

    let mut table = Table::new(view.rows().map(AssignmentRow::from));
    table.with(Style::psql());
    let _ = writeln!(out, "{table}");
    out
}

pub fn render_status(dispatcher: &ActionDispatcher) -> String {
    let gate = dispatcher.gate();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "logged in: {}",
        if gate.is_authenticated() { "yes" } else { "no" }
    );
    match gate.pending() {
        Some(action) => {
            let _ = writeln!(out, "pending: {} (awaiting login)", action.name());
        }
        None if gate.is_prompt_open() => out.push_str("login prompt: open\n"),
        None => {}
    }
    if let Some(credentials) = gate.credentials() {
        let _ = writeln!(
            out,
            "login prompt: user '{}', password {}",
            credentials.username,
            if credentials.password.is_empty() { "empty" } else { "entered" }
        );
    }
    match dispatcher.creation().draft() {
        Some(Draft::Participant(draft)) => {
            let _ = writeln!(out, "student form: id='{}' name='{}'", draft.id, draft.name);
        }
        Some(Draft::Task(draft)) => {
            let _ = writeln!(
                out,
                "task form: id='{}' name='{}' base_value='{}'",
                draft.id, draft.name, draft.base_value
            );
        }
        None => {}
    }
    if dispatcher.is_loading() {
        out.push_str("loading...\n");
    }
    if let Some(error) = dispatcher.last_error() {
        let _ = writeln!(out, "last error: {error}");
    }
    out
}
