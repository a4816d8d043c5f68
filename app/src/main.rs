//! FILENAME: app/src/main.rs

use clap::Parser;

fn main() {
    let cli = app_lib::Cli::parse();
    if let Err(e) = app_lib::run(cli) {
        app_lib::log_error!("APP", "{}", e);
        std::process::exit(1);
    }
}
