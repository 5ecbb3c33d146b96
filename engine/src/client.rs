//! The capability set of an opponent engine.
//!
//! Every call is synchronous and blocks until the engine has answered. The boolean results keep
//! the engine's own meaning (`false` from `make_move` is an illegal move, not a failure); an
//! `Err` means the conversation with the engine itself broke down.

use crate::protocol::ProtocolError;
use board::{Side, Square};

use std::io;
use std::time::Duration;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start engine {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("engine i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("engine did not answer `{request}` within {timeout:?}")]
    Timeout { request: String, timeout: Duration },
    #[error("engine closed its output")]
    Disconnected,
    #[error("engine sent a malformed reply: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("engine reported an error: {0}")]
    Remote(String),
    #[error("no engine host has been initialized")]
    NotInitialized,
    #[error("engine host is already initialized with {0}")]
    AlreadyInitialized(String),
}

/// An opponent engine. Implementations own all legality and search state; callers must never
/// issue two calls at once, which `&mut self` enforces.
pub trait EngineClient {
    /// Starts a new game from the standard starting position, the human playing `side`.
    /// Returns `false` if the engine could not set the game up.
    fn init_game(&mut self, side: Side) -> EngineResult<bool>;

    /// Submits a move for `side`. Returns `false`, leaving the position unchanged, if the move is
    /// illegal or `side` is not to move.
    fn make_move(&mut self, from: Square, to: Square, side: Side) -> EngineResult<bool>;

    /// The current board snapshot. `viewer` names who is looking; the snapshot is always written
    /// with the eighth rank first regardless.
    fn fetch_state(&mut self, viewer: Side) -> EngineResult<String>;

    /// Asks the engine to choose and play a move for `side`. Returns `false` if it has no legal
    /// move or refuses.
    fn bot_move(&mut self, side: Side) -> EngineResult<bool>;

    fn is_checkmate(&mut self) -> EngineResult<bool>;

    fn is_stalemate(&mut self) -> EngineResult<bool>;

    /// Destinations the engine would accept from `from`, used for highlighting only.
    fn legal_targets(&mut self, _from: Square, _side: Side) -> EngineResult<Vec<Square>> {
        Ok(Vec::new())
    }

    /// Ends the conversation with the engine.
    fn shutdown(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

impl<E: EngineClient + ?Sized> EngineClient for Box<E> {
    fn init_game(&mut self, side: Side) -> EngineResult<bool> {
        (**self).init_game(side)
    }

    fn make_move(&mut self, from: Square, to: Square, side: Side) -> EngineResult<bool> {
        (**self).make_move(from, to, side)
    }

    fn fetch_state(&mut self, viewer: Side) -> EngineResult<String> {
        (**self).fetch_state(viewer)
    }

    fn bot_move(&mut self, side: Side) -> EngineResult<bool> {
        (**self).bot_move(side)
    }

    fn is_checkmate(&mut self) -> EngineResult<bool> {
        (**self).is_checkmate()
    }

    fn is_stalemate(&mut self) -> EngineResult<bool> {
        (**self).is_stalemate()
    }

    fn legal_targets(&mut self, from: Square, side: Side) -> EngineResult<Vec<Square>> {
        (**self).legal_targets(from, side)
    }

    fn shutdown(&mut self) -> EngineResult<()> {
        (**self).shutdown()
    }
}
