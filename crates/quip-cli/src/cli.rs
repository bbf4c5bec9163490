use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "quip - a global text expander",
    long_about = "quip watches what you type in any application and replaces trigger words with their expansions."
)]
pub struct Quip {
    #[clap(subcommand)]
    pub commands: Option<Commands>,

    /// Enable debug logging
    #[clap(long, short, global = true)]
    pub verbose: bool,

    /// Use this trigger database instead of ~/.quip/triggers.json
    #[clap(long, global = true, value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// Forget typed input after this many milliseconds of inactivity
    #[clap(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start expanding and open the interactive console (default)
    Run,
    /// Add or replace a trigger
    Add {
        #[clap(long, short = 't', help = "Text to type to fire the expansion")]
        trigger: String,

        #[clap(long, short = 'e', help = "Text that replaces the trigger")]
        expansion: String,
    },
    /// Delete a trigger
    Delete {
        #[clap(long, short = 't', help = "Trigger to delete")]
        trigger: String,
    },
    /// List all triggers
    List,
    /// Show what typing TEXT would expand to, without touching the keyboard
    Try {
        /// Text to feed through the expander
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let args = Quip::try_parse_from(["quip"]).unwrap();
        assert!(args.commands.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn add_takes_trigger_and_expansion() {
        let args =
            Quip::try_parse_from(["quip", "add", "-t", "sig", "-e", "Best regards, A."]).unwrap();
        match args.commands {
            Some(Commands::Add { trigger, expansion }) => {
                assert_eq!(trigger, "sig");
                assert_eq!(expansion, "Best regards, A.");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let args =
            Quip::try_parse_from(["quip", "list", "--data-file", "/tmp/t.json", "--timeout-ms", "500"])
                .unwrap();
        assert!(matches!(args.commands, Some(Commands::List)));
        assert_eq!(args.data_file, Some(PathBuf::from("/tmp/t.json")));
        assert_eq!(args.timeout_ms, Some(500));
    }
}
