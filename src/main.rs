use clap::Parser;
use tracing_subscriber::EnvFilter;
use workboard::cli::commands::{Cli, Commands};
use workboard::cli::handlers;

/// Logging for subcommands: stderr, and only with `--verbose`. The TUI sets
/// up its own file logger so the terminal stays clean.
fn init_cli_logging(verbose: bool) {
    if !verbose {
        return;
    }
    let filter = EnvFilter::try_from_env("WORKBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new("workboard=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI
            workboard::tui::run(cli.workspace_dir.as_deref())
        }
        Some(Commands::Init(args)) => {
            // Init is handled before workspace discovery
            init_cli_logging(cli.verbose);
            handlers::cmd_init(args, cli.workspace_dir.as_deref())
        }
        Some(_) => {
            init_cli_logging(cli.verbose);
            handlers::dispatch(cli)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
