//! Operator commands typed at the dashboard prompt.

use client_core::{DashboardError, DraftField, ProtectedAction};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Show,
    Status,
    Protected(ProtectedAction),
    User(String),
    Password(String),
    Login,
    Cancel,
    Set { field: DraftField, value: String },
    Submit,
    Close,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help' for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Field(#[from] DashboardError),
}

/// `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "refresh" => Command::Refresh,
        "show" | "ls" => Command::Show,
        "status" => Command::Status,
        "reassign" => Command::Protected(ProtectedAction::Reassign),
        "add-student" => Command::Protected(ProtectedAction::OpenCreateParticipantForm),
        "add-task" => Command::Protected(ProtectedAction::OpenCreateTaskForm),
        "user" => Command::User(required(rest, "user <name>")?.to_string()),
        "password" => Command::Password(required(rest, "password <secret>")?.to_string()),
        "login" => Command::Login,
        "cancel" => Command::Cancel,
        "set" => {
            let (field, value) = required(rest, "set <id|name|base_value> <value>")?
                .split_once(char::is_whitespace)
                .ok_or(CommandError::Usage("set <id|name|base_value> <value>"))?;
            Command::Set {
                field: field.parse()?,
                value: value.trim().to_string(),
            }
        }
        "submit" => Command::Submit,
        "close" => Command::Close,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest)
    }
}

pub const HELP: &str = "\
Commands:
  refresh                     reload assignments from the server
  show                        print the current assignments
  status                      session, form and loading state
  reassign                    reassign all tasks (needs login)
  add-student                 open the new-student form (needs login)
  add-task                    open the new-task form (needs login)
  user <name>                 type the username into the login prompt
  password <secret>           type the password into the login prompt
  login                       submit the login prompt
  cancel                      close the login prompt and drop the pending action
  set <field> <value>         fill a form field (id, name, base_value)
  submit                      submit the open form
  close                       discard the open form
  help                        this text
  quit                        leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn protected_commands_map_to_actions() {
        assert_eq!(
            parse("reassign"),
            Ok(Some(Command::Protected(ProtectedAction::Reassign)))
        );
        assert_eq!(
            parse("ADD-STUDENT"),
            Ok(Some(Command::Protected(
                ProtectedAction::OpenCreateParticipantForm
            )))
        );
    }

    #[test]
    fn set_keeps_spaces_in_value() {
        assert_eq!(
            parse("set name  Mary Ann "),
            Ok(Some(Command::Set {
                field: DraftField::Name,
                value: "Mary Ann".to_string(),
            }))
        );
    }

    #[test]
    fn set_without_value_shows_usage() {
        assert!(matches!(parse("set name"), Err(CommandError::Usage(_))));
        assert!(matches!(parse("set"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn set_with_unknown_field_is_field_error() {
        assert!(matches!(parse("set colour red"), Err(CommandError::Field(_))));
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(
            parse("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn password_requires_argument() {
        assert!(matches!(parse("password"), Err(CommandError::Usage(_))));
        assert_eq!(
            parse("password hunter2"),
            Ok(Some(Command::Password("hunter2".to_string())))
        );
    }
}
