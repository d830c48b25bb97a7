mod app;
mod cli;

use std::process;
use tracing::error;

fn main() {
    let cli = cli::parse();

    if let Err(e) = app::run(cli) {
        if tracing::dispatcher::has_been_set() {
            error!("An unexpected error occurred: {:#}", e);
        } else {
            eprintln!("Error: {:#}", e);
        }
        process::exit(1);
    }
}
