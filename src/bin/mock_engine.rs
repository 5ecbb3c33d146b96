//! A stand-in engine executable: answers the line protocol on stdin/stdout with a `FakeEngine`.

use board::Glyphs;
use clap::Parser;
use engine::{serve, FakeEngine};
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::io;

#[derive(Parser, Debug)]
#[clap(about = "Scripted engine speaking the boardside line protocol")]
struct Args {
    /// Report checkmate once this many half-moves have been played
    #[clap(long)]
    checkmate_after: Option<usize>,

    /// Report stalemate once this many half-moves have been played
    #[clap(long)]
    stalemate_after: Option<usize>,

    /// Answer every `init` with `initFailed`
    #[clap(long)]
    init_fails: bool,

    /// Answer every `botMove` with `botRefused`
    #[clap(long)]
    refuse_bot: bool,

    /// Send snapshots with Unicode chess symbols
    #[clap(long)]
    unicode: bool,

    #[clap(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() {
    let args = Args::parse();
    SimpleLogger::new().with_level(args.log_level).init().unwrap();

    let mut engine = FakeEngine::new();
    if let Some(plies) = args.checkmate_after {
        engine = engine.checkmate_after(plies);
    }
    if let Some(plies) = args.stalemate_after {
        engine = engine.stalemate_after(plies);
    }
    if args.init_fails {
        engine = engine.init_fails();
    }
    if args.refuse_bot {
        engine = engine.refuse_bot();
    }
    if args.unicode {
        engine = engine.glyphs(Glyphs::Unicode);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = serve(&mut engine, stdin.lock(), stdout.lock()) {
        error!("{}", err);
        std::process::exit(1);
    }
}
