mod app;
mod browserstack;
mod cli;
mod config;
mod core;
mod driver;
mod executors;
mod outcome;
mod reporters;
mod targets;
mod ui;
mod utils;

use clap::Parser;

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = cli::args::Cli::parse();
    if let Err(err) = app::run(cli).await {
        eprintln!("fatal: {:#}", err);
        std::process::exit(1);
    }
}
