use std::process;

use clap::Parser;
use colored::Colorize;

use task_gen::cli::Args;
use task_gen::{app, Error};

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match app::run(args) {
        Ok(()) => {}
        Err(Error::Cancelled) => {
            println!("{} Cancelled.", ">".bright_green());
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{} {}", "x".red(), err);
            process::exit(1);
        }
    }
}
