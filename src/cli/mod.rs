pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};

/// Audit trail for content platforms: capture, store and browse events.
#[derive(Parser, Debug)]
#[command(name = "log-manager", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug diagnostics on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration directory (default: .log-manager)
    #[arg(long, global = true, env = "LOG_MANAGER_DIR")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration and create the database table
    Init,

    /// Page through stored audit entries
    Log {
        /// Filter on ip address, event type, object type or message
        #[arg(long)]
        search: Option<String>,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Entries per page
        #[arg(long, default_value_t = 20)]
        per_page: usize,
        /// Column to sort by
        #[arg(long, value_enum, default_value_t = OrderBy::Id)]
        order_by: OrderBy,
        /// Oldest first instead of newest first
        #[arg(long)]
        asc: bool,
    },

    /// Show the active storage backend and what it holds
    Status,

    /// Feed recorded notifications through the audit engines
    Replay {
        /// JSON file with the recorded requests
        requests: String,
        /// JSON file describing the site the requests run against
        #[arg(long)]
        site: String,
    },
}

/// Sortable columns as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum OrderBy {
    Id,
    IpAddress,
    Userid,
    EventTime,
    ObjectType,
    Severity,
    EventType,
}
