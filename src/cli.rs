use clap::{Parser, Subcommand};

const AFTER_HELP: &str = "\
Interactive tutorials:
  During logging, after selecting exercise and level, cali can open a tutorial link.
  If opened, cali exits immediately without saving the log entry.

Storage backends:
  Default: Google Sheets
  Local files override: set CALI_STORAGE=local
  Local path: ~/cali-logger/workout (override with CALI_LOG_DIR)

Google Sheets env vars:
  CALI_SHEET_ID=<spreadsheet-id> (required)
  CALI_SHEET_NAME=<tab-name>     (optional, default: Log)
  CALI_GOOGLE_CREDENTIALS_JSON=<service-account-json-path>
  or GOOGLE_APPLICATION_CREDENTIALS can be used instead

Every variable can also be stored with `cali config set`; the environment wins.

Examples:
  cali search 2026-01-24
  cali p
  CALI_STORAGE=local cali p";

#[derive(Parser)]
#[command(name = "cali", version, about = "Calisthenics workout logger")]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(global = true, short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Ask again on an invalid menu choice instead of using the first option.
    #[arg(long)]
    pub strict: bool,

    /// Without a subcommand, log a new workout.
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the last 10 workouts
    #[command(visible_alias = "p", alias = "print")]
    History,

    /// Search workouts by date
    #[command(visible_alias = "s")]
    Search {
        /// Date in YYYY-MM-DD format
        date: String,
    },

    /// Remove a workout entry
    #[command(visible_alias = "r")]
    Remove,

    /// Open a named resource (workout-template)
    Open { resource: String },

    /// Open the workout template link
    Template,

    /// Open the Convicted Conditioning playlists
    #[command(visible_alias = "yt")]
    Playlists,

    /// Open the tutorial for an exercise level, e.g. `cali tutorial handstand push-ups wall headstand`
    #[command(visible_alias = "t")]
    Tutorial {
        /// Exercise followed by level, quoted or not
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        words: Vec<String>,
    },

    /// List exercises, levels and goals
    #[command(visible_alias = "ex")]
    Exercises,

    /// View or edit cali config
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_log() {
        let cli = Cli::try_parse_from(["cali"]).unwrap();
        assert!(cli.cmd.is_none());
        assert!(!cli.strict);

        let cli = Cli::try_parse_from(["cali", "--strict"]).unwrap();
        assert!(cli.cmd.is_none());
        assert!(cli.strict);
    }

    #[test]
    fn aliases_parse() {
        assert!(matches!(
            Cli::try_parse_from(["cali", "p"]).unwrap().cmd,
            Some(Commands::History)
        ));
        assert!(matches!(
            Cli::try_parse_from(["cali", "print", "--json"]).unwrap().cmd,
            Some(Commands::History)
        ));
        assert!(matches!(
            Cli::try_parse_from(["cali", "s", "2026-01-24"]).unwrap().cmd,
            Some(Commands::Search { date }) if date == "2026-01-24"
        ));
        assert!(matches!(
            Cli::try_parse_from(["cali", "yt"]).unwrap().cmd,
            Some(Commands::Playlists)
        ));
    }

    #[test]
    fn tutorial_takes_free_words() {
        let cli = Cli::try_parse_from(["cali", "tutorial", "Leg", "Raises", "Knee Tuck"]).unwrap();
        match cli.cmd {
            Some(Commands::Tutorial { words }) => {
                assert_eq!(words, vec!["Leg", "Raises", "Knee Tuck"]);
            }
            _ => panic!("expected tutorial"),
        }
        assert!(Cli::try_parse_from(["cali", "tutorial"]).is_err());
    }

    #[test]
    fn verbose_counts() {
        let cli = Cli::try_parse_from(["cali", "-vv", "history"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
