mod cmdline;

use clap::Parser;
use log::{error, info};
use simple_logger::SimpleLogger;

fn main() {
    let args = cmdline::Args::parse();

    // Set up the logger. It writes to stderr, leaving stdout to the board.
    SimpleLogger::new().with_level(args.log_level).init().unwrap();

    info!("logger initialized");

    if let Err(err) = cmdline::cmdline(args) {
        error!("{}", err);
        eprintln!("boardside: {}", err);
        std::process::exit(1);
    }
}
