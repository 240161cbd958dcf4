use crate::core::report::ReportTarget;
use crate::models::HalfShift;
use clap::{ArgGroup, Parser, Subcommand};

/// Command-line interface definition for rShiftbook
/// CLI ledger for half-day attendance and wages with SQLite
#[derive(Parser)]
#[command(
    name = "rshiftbook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Half-day attendance ledger: owners, wages, solar and lunar month reports (SQLite)",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum RosterAction {
    /// Add a new entry
    Add {
        /// Display name
        name: String,

        /// Daily rate (workers only): wage for a full day (AM + PM)
        #[arg(long = "rate")]
        rate: Option<String>,
    },

    /// List all entries
    List,

    /// Delete an entry by id (attendance records are kept)
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Manage the database (integrity checks, etc.)
    Db {
        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal journal
    Journal {
        #[arg(long = "print", help = "Print rows from the internal journal")]
        print: bool,
    },

    /// Manage workers
    Worker {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Manage owners (clients half-shifts are billed to)
    Owner {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Bill a worker's half-shift to an owner
    Assign {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Worker id
        worker: i64,
        /// Half-shift (am | pm)
        #[arg(value_enum)]
        half: HalfShift,
        /// Owner id
        owner: i64,
    },

    /// Remove the owner of a half-shift (clears its attendance too)
    Unassign {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Worker id
        worker: i64,
        /// Half-shift (am | pm)
        #[arg(value_enum)]
        half: HalfShift,
    },

    /// Toggle attendance of a half-shift (an owner must be assigned first)
    Mark {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Worker id
        worker: i64,
        /// Half-shift (am | pm)
        #[arg(value_enum)]
        half: HalfShift,
    },

    /// Show the attendance sheet of one day
    Day {
        /// Date (YYYY-MM-DD), default today
        date: Option<String>,
    },

    /// Period totals per worker or per owner
    #[command(group(ArgGroup::new("calendar").args(["solar", "lunar"])))]
    Report {
        /// Any date inside the wanted period (default today)
        #[arg(long = "date")]
        date: Option<String>,

        #[arg(long = "solar", help = "Bill by solar (Gregorian) month")]
        solar: bool,

        #[arg(long = "lunar", help = "Bill by lunar month")]
        lunar: bool,

        #[arg(long = "by", value_enum, default_value = "worker")]
        by: ReportTarget,

        #[arg(
            long = "shift",
            default_value_t = 0,
            allow_negative_numbers = true,
            help = "Move N periods back (negative) or forward"
        )]
        shift: i32,

        #[arg(long = "csv", value_name = "FILE", help = "Also write the rows to a CSV file")]
        csv: Option<String>,
    },

    /// Half-shifts behind one worker's or one owner's total
    #[command(group(ArgGroup::new("target").args(["worker", "owner"]).required(true)))]
    #[command(group(ArgGroup::new("calendar").args(["solar", "lunar"])))]
    Detail {
        #[arg(long = "worker")]
        worker: Option<i64>,

        #[arg(long = "owner")]
        owner: Option<i64>,

        #[arg(long = "date")]
        date: Option<String>,

        #[arg(long = "solar")]
        solar: bool,

        #[arg(long = "lunar")]
        lunar: bool,
    },

    /// Write a full snapshot of the ledger to a file
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite an existing file")]
        force: bool,
    },

    /// Replace the whole ledger with a snapshot file
    Restore {
        #[arg(long, value_name = "FILE")]
        file: String,
    },

    /// Hand the snapshot to the notification channel
    SendBackup {
        #[arg(long = "to", help = "Destination (default: backup_destination from config)")]
        to: Option<String>,

        #[arg(long = "auto", help = "Automatic send: at most one successful send per day")]
        auto: bool,
    },
}

impl Commands {
    /// Commands that change the ledger and may trigger the daily backup.
    pub fn is_mutation(&self) -> bool {
        match self {
            Commands::Worker { action } | Commands::Owner { action } => {
                !matches!(action, RosterAction::List)
            }
            Commands::Assign { .. }
            | Commands::Unassign { .. }
            | Commands::Mark { .. }
            | Commands::Restore { .. } => true,
            _ => false,
        }
    }
}
