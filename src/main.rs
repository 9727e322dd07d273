mod args;
mod rank;

use clap::Parser;
use log::{debug, LevelFilter};
use std::error::Error;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::new();
    builder.filter_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    // RUST_LOG, when set, takes precedence.
    builder.parse_default_env();
    builder.init();

    debug!("args: {:?}", args);

    if let Err(e) = rank::run_from_args(&args) {
        let message = e.to_string();
        eprintln!("Error: {}", message);
        let mut source = e.source();
        while let Some(s) = source {
            if s.to_string() != message {
                eprintln!("  caused by: {}", s);
            }
            source = s.source();
        }
        std::process::exit(1);
    }
}
