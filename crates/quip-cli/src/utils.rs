use crossterm::style::Stylize;
use quip_core::{QuipError, TriggerEntry};
use std::io::{self, Write};
use std::path::Path;

/// Width of the expansion preview in listings
const PREVIEW_WIDTH: usize = 30;

pub fn write_listing(out: &mut impl Write, entries: &[TriggerEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No triggers saved");
    }

    writeln!(out)?;
    writeln!(out, "{}", "Triggers:".bold())?;
    writeln!(out, "{}", "-".repeat(30))?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "{}. {} -> {}",
            i + 1,
            entry.trigger,
            entry.preview(PREVIEW_WIDTH)
        )?;
    }
    writeln!(out, "{}", "-".repeat(30))
}

pub fn print_error(out: &mut impl Write, error: &QuipError) -> io::Result<()> {
    writeln!(out, "{} {}", "Error:".red().bold(), error)
}

pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  add <trigger> <expansion>  - add or replace a trigger")?;
    writeln!(out, "  list                       - list all triggers")?;
    writeln!(out, "  delete <trigger>           - delete a trigger")?;
    writeln!(out, "  save                       - save triggers to disk")?;
    writeln!(out, "  help                       - show this table")?;
    writeln!(out, "  exit                       - save and quit")
}

pub fn print_banner(out: &mut impl Write, count: usize, db_path: &Path) -> io::Result<()> {
    let rule = "=".repeat(50);
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", "      quip - global text expander".bold())?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Loaded {} triggers from {}", count, db_path.display())?;
    print_help(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "Type a trigger in any application and it is replaced by its expansion."
    )?;
    writeln!(out, "{}", rule)
}
