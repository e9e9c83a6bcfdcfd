use clap::Parser;
use taskdesk::cli::commands::Cli;
use taskdesk::cli::handlers;

fn main() {
    let cli = Cli::parse();

    // No subcommand launches the TUI; dispatch handles that too
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
