//! The game-session controller.
//!
//! The controller turns user intents (square clicks, move submissions, requests for an engine
//! move) into engine calls, and keeps the board, the side to move and the selection state in step
//! with what the engine reports. It never decides legality or game results itself: every move is
//! submitted to the engine, and the board is replaced wholesale by a freshly fetched snapshot
//! after every successful move.
//!
//! Engine moves can run inline (`submit_move` in automatic mode, `request_bot_move`) or on another
//! thread through `begin_bot_move` / `complete_bot_move`. While a job holds the engine the
//! controller is `Busy` and declines everything that would need it.

use crate::bot::{settle, BotDone, BotJob, Settled};
use crate::config::{Config, ReplyMode};
use board::{decode, Board, CoordinateMapper, MapError, Orientation, Side, Square, START_SNAPSHOT};
use engine::{EngineClient, EngineError, EngineResult};

use log::{debug, error, info, warn};
use std::{fmt, io};
use thiserror::Error;

/// The game status as last reported by the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GameStatus {
    InProgress,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

/// How a finished game ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Checkmate { winner: Side },
    Stalemate,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            Outcome::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// Why a session stopped accepting moves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FreezeReason {
    InitFailed,
    BotRefused(Side),
    EngineFailure(String),
}

impl fmt::Display for FreezeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreezeReason::InitFailed => write!(f, "the engine could not start a game"),
            FreezeReason::BotRefused(side) => write!(f, "the engine refused to move for {}", side),
            FreezeReason::EngineFailure(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum State {
    NotStarted,
    AwaitingSelection,
    AwaitingDestination(Square),
    /// An engine move is running on a `BotJob`.
    Busy,
    Terminal(Outcome),
    /// Only `new_game` is accepted.
    Frozen(FreezeReason),
}

/// What happened to the engine's reply after a move.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BotReply {
    /// No reply is expected: manual mode, or the game is over.
    NotNeeded,
    Played,
    /// The caller should run one through `begin_bot_move`.
    Due,
}

/// The result of a user intent that the controller accepted or declined without error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Started { status: GameStatus, bot: BotReply },
    Selected { from: Square, targets: Vec<Square> },
    Deselected,
    Played { status: GameStatus, bot: BotReply },
    BotMoved { side: Side, status: GameStatus },
    InvalidMove,
    GameOver(Outcome),
    Busy,
    OffBoard,
    Flipped(Orientation),
    Unchanged,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no game has been started")]
    NotStarted,
    #[error("session is frozen: {0}")]
    Frozen(FreezeReason),
    #[error("the engine could not start a new game")]
    InitFailed,
    #[error("the engine refused to move for {0}")]
    BotRefused(Side),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("console i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// An engine move that was started, or the reason it wasn't.
pub enum BotTurn<E> {
    Started(BotJob<E>),
    Declined(Response),
}

pub struct SessionController<E> {
    /// `None` while lent to a `BotJob`.
    engine: Option<E>,
    config: Config,
    mapper: CoordinateMapper,
    orientation: Orientation,
    board: Board,
    /// The text the current board was decoded from.
    snapshot: String,
    to_move: Side,
    state: State,
    status: GameStatus,
    highlights: Vec<Square>,
    /// Leave automatic replies to the caller instead of running them inline.
    defer_replies: bool,
    plies: usize,
}

impl<E: EngineClient> SessionController<E> {
    pub fn new(engine: E, config: Config) -> SessionResult<Self> {
        let mapper = CoordinateMapper::new(config.tile_size)?;
        Ok(Self {
            engine: Some(engine),
            mapper,
            orientation: config.orientation,
            board: Board::start_pos(),
            snapshot: START_SNAPSHOT.to_string(),
            to_move: Side::White,
            state: State::NotStarted,
            status: GameStatus::InProgress,
            highlights: Vec::new(),
            defer_replies: false,
            plies: 0,
            config,
        })
    }

    /// Automatic replies are reported as `BotReply::Due` instead of being played inline, for
    /// callers that run engine moves on a worker thread.
    pub fn defer_replies(mut self) -> Self {
        self.defer_replies = true;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// The side the human plays.
    pub fn player(&self) -> Side {
        self.config.player
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Destinations of the selected piece, as reported by the engine.
    pub fn highlights(&self) -> &[Square] {
        &self.highlights
    }

    pub fn selected(&self) -> Option<Square> {
        match self.state {
            State::AwaitingDestination(from) => Some(from),
            _ => None,
        }
    }

    /// Half-moves played since the game started.
    pub fn plies(&self) -> usize {
        self.plies
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Starts a game from the standard position. When the human plays Black in automatic mode the
    /// engine opens.
    pub fn new_game(&mut self) -> SessionResult<Response> {
        if self.state == State::Busy {
            return Ok(Response::Busy);
        }

        let player = self.config.player;
        self.clear_selection();
        self.board = Board::start_pos();
        self.snapshot = START_SNAPSHOT.to_string();
        self.to_move = Side::White;
        self.status = GameStatus::InProgress;
        self.plies = 0;

        if !self.call(|engine| engine.init_game(player))? {
            error!("engine failed to start a game");
            self.state = State::Frozen(FreezeReason::InitFailed);
            return Err(SessionError::InitFailed);
        }
        info!("new game, human plays {}", player);

        let settled = self.call(|engine| settle(engine, player))?;
        let status = self.apply(settled, false);
        if status.is_terminal() {
            return Ok(Response::Started {
                status,
                bot: BotReply::NotNeeded,
            });
        }

        self.state = State::AwaitingSelection;
        let engine_opens = self.config.reply_mode == ReplyMode::Automatic && player != Side::White;
        let bot = if !engine_opens {
            BotReply::NotNeeded
        } else if self.defer_replies {
            BotReply::Due
        } else {
            return match self.request_bot_move()? {
                Response::BotMoved { status, .. } => Ok(Response::Started {
                    status,
                    bot: BotReply::Played,
                }),
                other => Ok(other),
            };
        };

        Ok(Response::Started { status, bot })
    }

    /// A click on `sq`: selects it as the origin of a move, or completes the selected move.
    /// Clicking the selected square again clears the selection.
    pub fn click_square(&mut self, sq: Square) -> SessionResult<Response> {
        if let Some(declined) = self.check_ready()? {
            return Ok(declined);
        }

        match self.state {
            State::AwaitingDestination(from) if from == sq => Ok(self.cancel_selection()),
            State::AwaitingDestination(from) => self.submit_move(from, sq),
            _ => {
                self.state = State::AwaitingDestination(sq);
                self.highlights = self.targets_of(sq);
                debug!("selected {}", sq);
                Ok(Response::Selected {
                    from: sq,
                    targets: self.highlights.clone(),
                })
            }
        }
    }

    /// A click at pixel `(x, y)` of the drawn board. Clicks outside the board are ignored.
    pub fn click_at(&mut self, x: i32, y: i32) -> SessionResult<Response> {
        match self.mapper.square_at(x, y, self.orientation) {
            Ok(sq) => self.click_square(sq),
            Err(err) => {
                debug!("ignoring click: {}", err);
                Ok(Response::OffBoard)
            }
        }
    }

    pub fn cancel_selection(&mut self) -> Response {
        match self.state {
            State::AwaitingDestination(_) => {
                self.clear_selection();
                Response::Deselected
            }
            _ => Response::Unchanged,
        }
    }

    pub fn flip_board(&mut self) -> Response {
        self.orientation = self.orientation.flipped();
        Response::Flipped(self.orientation)
    }

    /// Submits a move for the human. The engine rejects it when the human is not to move. On
    /// success the board is refreshed from the engine and, in automatic mode, the engine replies
    /// for the other side.
    pub fn submit_move(&mut self, from: Square, to: Square) -> SessionResult<Response> {
        if let Some(declined) = self.check_ready()? {
            return Ok(declined);
        }

        let mover = self.config.player;
        let accepted = self.call(|engine| engine.make_move(from, to, mover))?;
        self.clear_selection();
        if !accepted {
            info!("{} {}{} rejected by the engine", mover, from, to);
            return Ok(Response::InvalidMove);
        }
        info!("{} plays {}{}", mover, from, to);

        let viewer = self.config.player;
        let settled = self.call(|engine| settle(engine, viewer))?;
        let status = self.apply(settled, true);

        let bot = if status.is_terminal() || self.config.reply_mode == ReplyMode::Manual {
            BotReply::NotNeeded
        } else if self.defer_replies {
            BotReply::Due
        } else {
            return match self.request_bot_move()? {
                Response::BotMoved { status, .. } => Ok(Response::Played {
                    status,
                    bot: BotReply::Played,
                }),
                other => Ok(other),
            };
        };

        Ok(Response::Played { status, bot })
    }

    /// Has the engine move for the side to move, inline.
    pub fn request_bot_move(&mut self) -> SessionResult<Response> {
        match self.begin_bot_move()? {
            BotTurn::Started(job) => self.complete_bot_move(job.run()),
            BotTurn::Declined(response) => Ok(response),
        }
    }

    /// Lends the engine to a job that moves for the side to move. The controller is `Busy` until
    /// the finished job is handed to `complete_bot_move`.
    pub fn begin_bot_move(&mut self) -> SessionResult<BotTurn<E>> {
        if let Some(declined) = self.check_ready()? {
            return Ok(BotTurn::Declined(declined));
        }

        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => return Ok(BotTurn::Declined(Response::Busy)),
        };
        self.clear_selection();
        self.state = State::Busy;
        Ok(BotTurn::Started(BotJob::new(
            engine,
            self.to_move,
            self.config.player,
        )))
    }

    /// Takes the engine back from a finished job and applies its result.
    pub fn complete_bot_move(&mut self, done: BotDone<E>) -> SessionResult<Response> {
        self.engine = Some(done.engine);
        self.state = State::AwaitingSelection;
        let side = done.side;

        match done.result {
            Ok(Some(settled)) => {
                info!("engine moved for {}", side);
                let status = self.apply(settled, true);
                Ok(Response::BotMoved { side, status })
            }
            Ok(None) => {
                error!("engine refused to move for {}", side);
                self.state = State::Frozen(FreezeReason::BotRefused(side));
                Err(SessionError::BotRefused(side))
            }
            Err(err) => Err(self.freeze(err)),
        }
    }

    /// Ends the conversation with the engine. The engine is unavailable while a job holds it.
    pub fn shutdown(&mut self) -> SessionResult<()> {
        if let Some(engine) = self.engine.as_mut() {
            engine.shutdown()?;
        }
        Ok(())
    }

    /// `Ok(Some(_))` for states that decline moves without touching the engine, `Err` for states
    /// that reject them.
    fn check_ready(&self) -> SessionResult<Option<Response>> {
        match &self.state {
            State::NotStarted => Err(SessionError::NotStarted),
            State::Frozen(reason) => Err(SessionError::Frozen(reason.clone())),
            State::Busy => Ok(Some(Response::Busy)),
            State::Terminal(outcome) => Ok(Some(Response::GameOver(*outcome))),
            State::AwaitingSelection | State::AwaitingDestination(_) => Ok(None),
        }
    }

    /// Runs `f` on the engine, freezing the session if the conversation fails.
    fn call<T>(&mut self, f: impl FnOnce(&mut E) -> EngineResult<T>) -> SessionResult<T> {
        let engine = match self.engine.as_mut() {
            Some(engine) => engine,
            None => return Err(SessionError::Engine(EngineError::Disconnected)),
        };

        match f(engine) {
            Ok(value) => Ok(value),
            Err(err) => Err(self.freeze(err)),
        }
    }

    fn freeze(&mut self, err: EngineError) -> SessionError {
        error!("engine failure: {}", err);
        self.state = State::Frozen(FreezeReason::EngineFailure(err.to_string()));
        SessionError::Engine(err)
    }

    /// Applies the position after a successful move: the side to move flips, the board is
    /// replaced and a finished game becomes terminal. `moved` is false for the position right
    /// after `init_game`.
    fn apply(&mut self, settled: Settled, moved: bool) -> GameStatus {
        if moved {
            self.to_move = !self.to_move;
            self.plies += 1;
        }
        self.load_snapshot(settled.snapshot);

        self.status = if settled.checkmate {
            GameStatus::Checkmate
        } else if settled.stalemate {
            GameStatus::Stalemate
        } else {
            GameStatus::InProgress
        };

        let outcome = match self.status {
            GameStatus::Checkmate => Some(Outcome::Checkmate {
                winner: !self.to_move,
            }),
            GameStatus::Stalemate => Some(Outcome::Stalemate),
            GameStatus::InProgress => None,
        };
        if let Some(outcome) = outcome {
            info!("game over: {}", outcome);
            self.state = State::Terminal(outcome);
        }

        self.status
    }

    fn load_snapshot(&mut self, snapshot: String) {
        match decode(&snapshot) {
            Ok(board) => {
                self.board = board;
                self.snapshot = snapshot;
            }
            Err(err) => warn!("keeping the last board, engine sent a bad snapshot: {}", err),
        }
    }

    /// Highlighting is best effort: a failure here never interrupts the game.
    fn targets_of(&mut self, sq: Square) -> Vec<Square> {
        if !self.config.highlights {
            return Vec::new();
        }

        let side = self.config.player;
        match self.engine.as_mut().map(|e| e.legal_targets(sq, side)) {
            Some(Ok(targets)) => targets,
            Some(Err(err)) => {
                warn!("could not fetch targets of {}: {}", sq, err);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn clear_selection(&mut self) {
        if let State::AwaitingDestination(_) = self.state {
            self.state = State::AwaitingSelection;
        }
        self.highlights.clear();
    }
}
