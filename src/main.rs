use beadboard::cli::commands::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = beadboard::tui::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
