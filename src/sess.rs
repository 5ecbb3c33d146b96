//! The console game session.
//!
//! The `Session` owns the controller and a single `crossbeam_channel` receiver fed from two
//! directions: a thread reading commands from stdin, and a worker thread for each engine move.
//! Messages are handled one at a time, so the controller is only ever touched from the session
//! thread. While an engine move is running the engine lives on the worker and the controller
//! answers `Busy`; when the worker reports back the engine is returned through
//! `complete_bot_move`.

use crate::bot::BotDone;
use crate::controller::{BotReply, BotTurn, Response, SessionController, SessionResult, State};
use crate::input::{Command, InputError, HELP};
use crate::render::render;
use engine::EngineClient;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};

/// A message received by the session, from the user or from an engine worker.
pub enum Message<E> {
    FromUser(Command),
    BadInput(InputError),
    FromWorker(BotDone<E>),
}

pub struct Session<E, W> {
    controller: SessionController<E>,
    tx: Sender<Message<E>>,
    rx: Receiver<Message<E>>,
    /// Where the board and the session's replies are written.
    out: W,
    /// The thread running the current engine move, if any.
    worker: Option<JoinHandle<()>>,
    quit: bool,
}

impl<E, W> Session<E, W>
where
    E: EngineClient + Send + 'static,
    W: Write,
{
    pub fn new(controller: SessionController<E>, out: W) -> Self {
        let (tx, rx) = unbounded::<Message<E>>();
        Self {
            controller: controller.defer_replies(),
            tx,
            rx,
            out,
            worker: None,
            quit: false,
        }
    }

    pub fn sender(&self) -> Sender<Message<E>> {
        self.tx.clone()
    }

    pub fn controller(&self) -> &SessionController<E> {
        &self.controller
    }

    pub fn into_parts(self) -> (SessionController<E>, W) {
        (self.controller, self.out)
    }

    /// Starts the thread which parses stdin into commands. End of input counts as `quit`.
    pub fn spawn_stdin_reader(&self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("stdin: {}", err);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let msg = match line.parse::<Command>() {
                    Ok(cmd) => Message::FromUser(cmd),
                    Err(err) => Message::BadInput(err),
                };
                let quitting = matches!(msg, Message::FromUser(Command::Quit));
                if tx.send(msg).is_err() || quitting {
                    return;
                }
            }

            let _ = tx.send(Message::FromUser(Command::Quit));
        })
    }

    /// Starts a game and handles messages until the user quits.
    pub fn main_loop(&mut self) -> io::Result<()> {
        self.start()?;
        while self.step()? {}
        Ok(())
    }

    pub fn start(&mut self) -> io::Result<()> {
        writeln!(self.out, "type `help` for the list of commands")?;
        let result = self.controller.new_game();
        self.handle_result(result)
    }

    /// Waits for and handles one message. Returns `false` once the session has quit.
    pub fn step(&mut self) -> io::Result<bool> {
        if self.quit {
            return Ok(false);
        }

        match self.rx.recv() {
            Ok(msg) => self.handle_message(msg)?,
            Err(err) => {
                error!("session channel closed: {}", err);
                self.quit = true;
            }
        }
        self.out.flush()?;

        Ok(!self.quit)
    }

    fn handle_message(&mut self, msg: Message<E>) -> io::Result<()> {
        match msg {
            Message::FromUser(cmd) => self.handle_command(cmd),
            Message::BadInput(err) => writeln!(self.out, "{}", err),
            Message::FromWorker(done) => self.handle_worker(done),
        }
    }

    fn handle_command(&mut self, cmd: Command) -> io::Result<()> {
        let result = match cmd {
            Command::Move(from, to) => self.controller.submit_move(from, to),
            Command::Select(sq) => self.controller.click_square(sq),
            Command::Click(x, y) => self.controller.click_at(x, y),
            Command::Bot => return self.start_bot(),
            Command::Flip => Ok(self.controller.flip_board()),
            Command::Cancel => Ok(self.controller.cancel_selection()),
            Command::New => self.controller.new_game(),
            Command::Board => return self.show_board(),
            Command::Help => return writeln!(self.out, "{}", HELP),
            Command::Quit => return self.quit_session(),
        };

        self.handle_result(result)
    }

    fn handle_worker(&mut self, done: BotDone<E>) -> io::Result<()> {
        self.join_worker();
        let result = self.controller.complete_bot_move(done);
        self.handle_result(result)
    }

    fn handle_result(&mut self, result: SessionResult<Response>) -> io::Result<()> {
        match result {
            Ok(response) => self.respond(response),
            Err(err) => {
                writeln!(self.out, "error: {}", err)?;
                if let State::Frozen(_) = self.controller.state() {
                    writeln!(self.out, "type `new` to start again")?;
                }
                Ok(())
            }
        }
    }

    fn respond(&mut self, response: Response) -> io::Result<()> {
        match response {
            Response::Started { bot, .. } => {
                writeln!(self.out, "new game, you play {}", self.controller.player())?;
                self.show_board()?;
                self.after_move(bot)
            }
            Response::Selected { from, .. } => {
                writeln!(self.out, "selected {}", from)?;
                self.show_board()
            }
            Response::Deselected => writeln!(self.out, "selection cleared"),
            Response::Played { bot, .. } => {
                self.show_board()?;
                self.after_move(bot)
            }
            Response::BotMoved { side, .. } => {
                writeln!(self.out, "engine moved for {}", side)?;
                self.show_board()?;
                self.after_move(BotReply::NotNeeded)
            }
            Response::InvalidMove => writeln!(self.out, "illegal move"),
            Response::GameOver(outcome) => {
                writeln!(self.out, "game over ({}), type `new` to play again", outcome)
            }
            Response::Busy => writeln!(self.out, "the engine is thinking"),
            Response::OffBoard => writeln!(self.out, "that click is outside the board"),
            Response::Flipped(_) => self.show_board(),
            Response::Unchanged => Ok(()),
        }
    }

    /// Reports a finished game, or starts the next engine move if one is due.
    fn after_move(&mut self, bot: BotReply) -> io::Result<()> {
        if let State::Terminal(outcome) = self.controller.state() {
            return writeln!(self.out, "game over: {}", outcome);
        }

        let config = self.controller.config();
        if config.self_play {
            if self.controller.plies() >= config.max_plies {
                info!("self-play stopped after {} plies", self.controller.plies());
                return writeln!(
                    self.out,
                    "self-play stopped after {} plies",
                    self.controller.plies()
                );
            }
            return self.start_bot();
        }

        match bot {
            BotReply::Due => self.start_bot(),
            BotReply::NotNeeded | BotReply::Played => Ok(()),
        }
    }

    fn start_bot(&mut self) -> io::Result<()> {
        match self.controller.begin_bot_move() {
            Ok(BotTurn::Started(job)) => {
                writeln!(self.out, "{} is thinking...", job.side())?;
                let tx = self.tx.clone();
                self.worker = Some(thread::spawn(move || {
                    let done = job.run();
                    let _ = tx.send(Message::FromWorker(done));
                }));
                Ok(())
            }
            Ok(BotTurn::Declined(response)) => self.respond(response),
            Err(err) => self.handle_result(Err(err)),
        }
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("engine worker panicked");
            }
        }
    }

    fn show_board(&mut self) -> io::Result<()> {
        let ctl = &self.controller;
        let board = render(
            ctl.board(),
            ctl.orientation(),
            ctl.selected(),
            ctl.highlights(),
            ctl.config().glyphs,
        );
        write!(self.out, "{}", board)?;
        writeln!(self.out, "{} to move", ctl.to_move())
    }

    /// Waits for a running engine move to come back, then ends the engine conversation.
    fn quit_session(&mut self) -> io::Result<()> {
        if self.controller.state() == &State::Busy {
            writeln!(self.out, "waiting for the engine to finish its move")?;
            while let Ok(msg) = self.rx.recv() {
                if let Message::FromWorker(done) = msg {
                    self.join_worker();
                    if let Err(err) = self.controller.complete_bot_move(done) {
                        warn!("engine move ended badly: {}", err);
                    }
                    break;
                }
            }
        }

        if let Err(err) = self.controller.shutdown() {
            warn!("engine shutdown failed: {}", err);
        }
        writeln!(self.out, "bye")?;
        self.quit = true;
        Ok(())
    }
}
