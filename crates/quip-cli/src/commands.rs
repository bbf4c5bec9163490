use crate::cli::{Commands, Quip};
use crate::console::run_console;
use crate::utils::{print_banner, write_listing};
use quip_core::{
    CaptureLoop, ManualHook, Outcome, Pipeline, RecordingEmitter, Result, Settings,
    Substitution, TriggerEntry, TriggerFile, TriggerStore,
};
use std::io::{self, Write};
use std::process;
use std::sync::Arc;

pub fn handle_command(args: Quip) -> Result<()> {
    let settings = load_settings(&args)?;

    match args.commands {
        Some(command) => handle_subcommand(command, &settings),
        None => handle_run(&settings), // Default: expand and open the console
    }
}

fn handle_subcommand(command: Commands, settings: &Settings) -> Result<()> {
    let file = TriggerFile::new(settings.data_file_path());

    match command {
        Commands::Run => handle_run(settings),
        Commands::Add { trigger, expansion } => {
            add_trigger(&file, trigger, expansion).map(|previous| match previous {
                Some(_) => println!("Trigger replaced successfully"),
                None => println!("Trigger added successfully"),
            })
        }
        Commands::Delete { trigger } => {
            delete_trigger(&file, &trigger).map(|_| println!("Trigger deleted successfully"))
        }
        Commands::List => {
            let store = TriggerStore::from_map(file.load());
            write_listing(&mut io::stdout(), &store.list())?;
            Ok(())
        }
        Commands::Try { text } => {
            let report = try_text(settings, &text)?;
            for sub in &report.substitutions {
                println!(
                    "{} -> {} (erase {})",
                    sub.trigger, sub.insert, sub.delete
                );
            }
            if report.substitutions.is_empty() {
                println!("No trigger fired");
            }
            println!("Result: {}", report.rendered);
            Ok(())
        }
    }
}

/// Config file first, then command-line overrides
fn load_settings(args: &Quip) -> Result<Settings> {
    let mut settings = Settings::load()?;
    if let Some(path) = &args.data_file {
        settings.data_file = Some(path.clone());
    }
    if let Some(ms) = args.timeout_ms {
        settings.buffer_timeout_ms = ms;
    }
    settings.validate()?;
    Ok(settings)
}

fn handle_run(settings: &Settings) -> Result<()> {
    let session = Arc::new(quip_listener::start_session(settings)?);
    log::debug!("Capture loop {}", session.state());

    let mut stdout = io::stdout();
    print_banner(&mut stdout, session.store().len(), session.file().path())?;

    let handler_session = Arc::clone(&session);
    if let Err(e) = ctrlc::set_handler(move || {
        if let Err(e) = handler_session.shutdown() {
            eprintln!("Error: {}", e);
        }
        println!("\nBye");
        process::exit(0);
    }) {
        log::warn!("Could not install Ctrl-C handler: {}", e);
    }

    let result = run_console(&session, io::stdin().lock(), &mut stdout);
    let saved = session.shutdown();
    writeln!(stdout, "Bye")?;

    result.and(saved)
}

/// Add a trigger straight to the database file. Returns the replaced
/// expansion, if any.
pub fn add_trigger(
    file: &TriggerFile,
    trigger: impl Into<String>,
    expansion: impl Into<String>,
) -> Result<Option<String>> {
    let entry = TriggerEntry::new(trigger, expansion)?;
    let store = TriggerStore::from_map(file.load());
    let previous = store.add(entry);
    file.save(&store.to_map())?;
    Ok(previous)
}

pub fn delete_trigger(file: &TriggerFile, trigger: &str) -> Result<String> {
    let store = TriggerStore::from_map(file.load());
    let removed = store.remove(trigger)?;
    file.save(&store.to_map())?;
    Ok(removed)
}

/// Outcome of a dry run over some typed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryReport {
    pub substitutions: Vec<Substitution>,
    /// What a text field would contain afterwards
    pub rendered: String,
}

/// Feed `text` through the expander with a simulated keyboard. Nothing is
/// typed into the real system.
pub fn try_text(settings: &Settings, text: &str) -> Result<TryReport> {
    let store = TriggerStore::from_map(TriggerFile::new(settings.data_file_path()).load());
    // Typed all at once, nothing should be mistaken for our own output
    let dry_settings = Settings {
        settle_window_ms: 0,
        ..settings.clone()
    };

    let hook = ManualHook::new();
    let pipeline = Pipeline::new(store, Box::new(RecordingEmitter::new()), &dry_settings);
    let mut capture = CaptureLoop::new(pipeline, Box::new(hook.clone()), &dry_settings);
    capture.start()?;

    let mut rendered = String::new();
    let mut substitutions = Vec::new();
    for (ch, outcome) in text.chars().zip(hook.type_str(text)) {
        if ch == '\u{8}' {
            rendered.pop();
        } else {
            rendered.push(ch);
        }

        if let Outcome::Expanded(sub) = outcome {
            for _ in 0..sub.delete {
                rendered.pop();
            }
            rendered.push_str(&sub.insert);
            substitutions.push(sub);
        }
    }

    capture.stop();
    Ok(TryReport {
        substitutions,
        rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quip_core::QuipError;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Settings {
        Settings {
            data_file: Some(dir.path().join("triggers.json")),
            ..Settings::default()
        }
    }

    #[test]
    fn add_and_delete_persist() {
        let dir = TempDir::new().unwrap();
        let file = TriggerFile::new(settings(&dir).data_file_path());

        assert_eq!(add_trigger(&file, "brb", "be right back").unwrap(), None);
        assert_eq!(
            add_trigger(&file, "brb", "back soon").unwrap(),
            Some("be right back".to_string())
        );
        assert_eq!(file.load().get("brb").map(String::as_str), Some("back soon"));

        assert_eq!(delete_trigger(&file, "brb").unwrap(), "back soon");
        assert!(file.load().is_empty());
    }

    #[test]
    fn invalid_edits_leave_the_file_alone() {
        let dir = TempDir::new().unwrap();
        let file = TriggerFile::new(settings(&dir).data_file_path());

        assert!(matches!(
            add_trigger(&file, "", "nothing"),
            Err(QuipError::EmptyTrigger)
        ));
        assert!(matches!(
            delete_trigger(&file, "ghost"),
            Err(QuipError::TriggerNotFound(_))
        ));
        assert!(!file.path().exists());
    }

    #[test]
    fn try_renders_expansions() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let file = TriggerFile::new(settings.data_file_path());
        add_trigger(&file, "sig", "Best regards, A.").unwrap();
        add_trigger(&file, "brb", "be right back").unwrap();

        let report = try_text(&settings, "ok brb, sig").unwrap();
        assert_eq!(report.substitutions.len(), 2);
        assert_eq!(report.substitutions[0].trigger, "brb");
        assert_eq!(report.substitutions[1].delete, 3);
        assert_eq!(report.rendered, "ok be right back, Best regards, A.");
    }

    #[test]
    fn try_without_triggers_echoes_input() {
        let dir = TempDir::new().unwrap();
        let report = try_text(&settings(&dir), "plain text").unwrap();
        assert!(report.substitutions.is_empty());
        assert_eq!(report.rendered, "plain text");
    }
}
