use crate::utils::{print_error, print_help, write_listing};
use crossterm::style::Stylize;
use quip_core::{QuipError, Result, Session, TriggerEntry};
use std::io::{BufRead, Write};

/// A line typed into the interactive console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Add { trigger: String, expansion: String },
    List,
    Delete { trigger: String },
    Save,
    Help,
    Exit,
}

/// Whether the console keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Split off the first whitespace-delimited word
fn next_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

/// Parse one console line. Blank lines parse to `None`.
///
/// The command word is case-insensitive; for `add`, everything after the
/// trigger is the expansion, inner spacing included.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = next_word(line);
    let command = match word.to_lowercase().as_str() {
        "add" => {
            let (trigger, expansion) = next_word(rest);
            if trigger.is_empty() || expansion.is_empty() {
                return Err(QuipError::InvalidCommand(
                    "usage: add <trigger> <expansion>".to_string(),
                ));
            }
            ConsoleCommand::Add {
                trigger: trigger.to_string(),
                expansion: expansion.to_string(),
            }
        }
        "delete" => {
            let (trigger, _) = next_word(rest);
            if trigger.is_empty() {
                return Err(QuipError::InvalidCommand(
                    "usage: delete <trigger>".to_string(),
                ));
            }
            ConsoleCommand::Delete {
                trigger: trigger.to_string(),
            }
        }
        "list" => ConsoleCommand::List,
        "save" => ConsoleCommand::Save,
        "help" => ConsoleCommand::Help,
        "exit" => ConsoleCommand::Exit,
        other => {
            return Err(QuipError::InvalidCommand(format!(
                "unknown command '{}', type 'help'",
                other
            )))
        }
    };

    Ok(Some(command))
}

pub fn execute(session: &Session, command: ConsoleCommand, out: &mut impl Write) -> Result<Flow> {
    match command {
        ConsoleCommand::Add { trigger, expansion } => {
            let entry = TriggerEntry::new(trigger, expansion)?;
            let line = format!("{} -> {}", entry.trigger, entry.preview(20));
            let label = match session.store().add(entry) {
                Some(_) => "Replaced:",
                None => "Added:",
            };
            writeln!(out, "{} {}", label.green(), line)?;
        }
        ConsoleCommand::List => write_listing(out, &session.store().list())?,
        ConsoleCommand::Delete { trigger } => {
            session.store().remove(&trigger)?;
            writeln!(out, "{} {}", "Deleted:".green(), trigger)?;
        }
        ConsoleCommand::Save => {
            session.save()?;
            writeln!(
                out,
                "{} {} triggers to {}",
                "Saved".green(),
                session.store().len(),
                session.file().path().display()
            )?;
        }
        ConsoleCommand::Help => print_help(out)?,
        ConsoleCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// Read commands until `exit` or end of input. Command failures are printed
/// and the console keeps going.
pub fn run_console(session: &Session, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    write!(out, "{} ", ">".cyan())?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;

        let result = parse_command(&line).and_then(|command| match command {
            Some(command) => execute(session, command, out),
            None => Ok(Flow::Continue),
        });

        match result {
            Ok(Flow::Exit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(e) => print_error(out, &e)?,
        }

        write!(out, "{} ", ">".cyan())?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quip_core::{ManualHook, RecordingEmitter, Settings, TriggerFile};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        let settings = Settings {
            data_file: Some(dir.path().join("triggers.json")),
            ..Settings::default()
        };
        Session::open(
            &settings,
            Box::new(ManualHook::new()),
            Box::new(RecordingEmitter::new()),
        )
        .unwrap()
    }

    fn run(session: &Session, script: &str) -> String {
        let mut out = Vec::new();
        run_console(session, Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn add_keeps_rest_of_line_as_expansion() {
        assert_eq!(
            parse_command("  ADD sig Best regards,   A.  ").unwrap(),
            Some(ConsoleCommand::Add {
                trigger: "sig".to_string(),
                expansion: "Best regards,   A.".to_string(),
            })
        );
    }

    #[test]
    fn incomplete_and_unknown_commands_are_rejected() {
        assert!(matches!(
            parse_command("add sig"),
            Err(QuipError::InvalidCommand(_))
        ));
        assert!(matches!(
            parse_command("delete"),
            Err(QuipError::InvalidCommand(_))
        ));
        assert!(matches!(
            parse_command("frobnicate"),
            Err(QuipError::InvalidCommand(_))
        ));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn add_list_delete_round_trip() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);

        let output = run(&session, "add sig Best regards, A.\nlist\n");
        assert!(output.contains("sig -> Best regards, A."));
        assert!(output.contains("1. sig -> Best regards, A."));

        let output = run(&session, "delete sig\nlist\n");
        assert!(output.contains("Deleted:"));
        assert!(output.contains("No triggers saved"));
        assert!(session.store().is_empty());
    }

    #[test]
    fn errors_do_not_end_the_console() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);

        let output = run(&session, "delete ghost\nbogus\nadd ok fine\n");
        assert!(output.contains("trigger 'ghost' not found"));
        assert!(output.contains("unknown command 'bogus'"));
        assert_eq!(session.store().snapshot().get("ok"), Some("fine"));
    }

    #[test]
    fn exit_stops_reading() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);

        run(&session, "exit\nadd late never\n");
        assert!(session.store().is_empty());
    }

    #[test]
    fn save_writes_the_database() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);

        run(&session, "add brb be right back\nsave\n");

        let saved = TriggerFile::new(dir.path().join("triggers.json")).load();
        assert_eq!(saved.get("brb").map(String::as_str), Some("be right back"));
    }
}
