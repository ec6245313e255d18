use clap::Parser;
use jotter::cli::commands::Cli;
use jotter::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // No subcommand: launch the TUI
        None => jotter::tui::run(cli.data_dir.as_deref()),
        Some(_) => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
