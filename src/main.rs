use clap::Parser;

use log_manager::cli::commands::log::LogArgs;
use log_manager::cli::{self, Cli, Commands};
use log_manager::config::app_config::AppConfig;
use log_manager::telemetry::tracing_setup::{TracingConfig, try_init_tracing_with_config};

fn main() {
    let args = Cli::parse();
    cli::context::init(args.config.as_deref());

    let logging = AppConfig::load_or_default(cli::context::config_dir()).logging;
    if let Err(e) = try_init_tracing_with_config(TracingConfig::from_section(
        &logging,
        args.verbose,
        args.quiet,
    )) {
        cli::output::warning(&format!("Diagnostics disabled: {e}"));
    }

    let result = match &args.command {
        Commands::Init => cli::commands::init::execute(args.verbose),
        Commands::Log {
            search,
            page,
            per_page,
            order_by,
            asc,
        } => cli::commands::log::execute(&LogArgs {
            search: search.clone(),
            page: *page,
            per_page: *per_page,
            order_by: *order_by,
            asc: *asc,
        }),
        Commands::Status => cli::commands::status::execute(),
        Commands::Replay { requests, site } => {
            cli::commands::replay::execute(requests, site, args.quiet)
        }
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
