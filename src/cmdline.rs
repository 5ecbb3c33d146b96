use boardside::sess::Session;
use boardside::{Config, ReplyMode, SessionController, SessionResult};

use board::{Glyphs, Orientation, Side};
use clap::Parser;
use engine::{host, EngineClient, EngineCommand, FakeEngine};
use log::{info, LevelFilter};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Engine executable speaking the line protocol; the built-in fake engine is used if omitted
    #[clap(short, long)]
    engine: Option<PathBuf>,

    /// Argument passed to the engine executable (repeatable)
    #[clap(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// The side you play: white or black
    #[clap(short, long, default_value = "white")]
    color: Side,

    /// Which side the board is drawn from; defaults to your color
    #[clap(short, long)]
    orientation: Option<Orientation>,

    /// Edge length of a board tile in pixels, for `click`
    #[clap(long, default_value_t = 80)]
    tile_size: u32,

    /// How long to wait for each engine reply, in milliseconds
    #[clap(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Only let the engine move when asked with `bot`
    #[clap(long)]
    manual_reply: bool,

    /// Let the engine play both sides
    #[clap(long)]
    self_play: bool,

    /// Stop self-play after this many half-moves
    #[clap(long, default_value_t = 200)]
    max_plies: usize,

    /// Don't ask the engine for the destinations of a selected piece
    #[clap(long)]
    no_highlights: bool,

    /// Draw pieces with Unicode chess symbols
    #[clap(long)]
    unicode: bool,

    /// Log level: off, error, warn, info, debug or trace
    #[clap(long, default_value = "warn")]
    pub log_level: LevelFilter,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            player: self.color,
            orientation: self
                .orientation
                .unwrap_or_else(|| Orientation::for_side(self.color)),
            tile_size: self.tile_size,
            reply_mode: if self.manual_reply {
                ReplyMode::Manual
            } else {
                ReplyMode::Automatic
            },
            highlights: !self.no_highlights,
            self_play: self.self_play,
            max_plies: self.max_plies,
            glyphs: if self.unicode {
                Glyphs::Unicode
            } else {
                Glyphs::Ascii
            },
        }
    }
}

pub fn cmdline(args: Args) -> SessionResult<()> {
    let config = args.config();

    let engine: Box<dyn EngineClient + Send> = match &args.engine {
        Some(program) => {
            let cmd = EngineCommand {
                program: program.clone(),
                args: args.engine_args.clone(),
            };
            host::init(cmd)?;
            Box::new(host::launch(Duration::from_millis(args.timeout_ms))?)
        }
        None => {
            info!("no engine given, playing the built-in fake engine");
            Box::new(FakeEngine::new())
        }
    };

    let result = play(engine, config);
    host::teardown();
    result
}

fn play(engine: Box<dyn EngineClient + Send>, config: Config) -> SessionResult<()> {
    let controller = SessionController::new(engine, config)?;
    let mut session = Session::new(controller, io::stdout());
    session.spawn_stdin_reader();
    session.main_loop()?;
    Ok(())
}
