//! Engine moves, run away from the controller.
//!
//! A `BotJob` owns the engine for the duration of one engine move, so it can be sent to a worker
//! thread while the controller keeps answering the user. Running the job asks the engine for its
//! move and, if it played one, for the resulting snapshot and game status. The finished job hands
//! the engine back inside a `BotDone`.

use board::Side;
use engine::{EngineClient, EngineResult};

use log::debug;

/// What the controller learns from the engine after a move has been made.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settled {
    pub snapshot: String,
    pub checkmate: bool,
    pub stalemate: bool,
}

/// Fetches the position after a successful move and asks whether the game is over.
pub(crate) fn settle<E>(engine: &mut E, viewer: Side) -> EngineResult<Settled>
where
    E: EngineClient + ?Sized,
{
    let snapshot = engine.fetch_state(viewer)?;
    let checkmate = engine.is_checkmate()?;
    let stalemate = !checkmate && engine.is_stalemate()?;

    Ok(Settled {
        snapshot,
        checkmate,
        stalemate,
    })
}

pub struct BotJob<E> {
    engine: E,
    side: Side,
    viewer: Side,
}

pub struct BotDone<E> {
    pub(crate) engine: E,
    pub(crate) side: Side,
    /// `None` if the engine refused to move.
    pub(crate) result: EngineResult<Option<Settled>>,
}

impl<E: EngineClient> BotJob<E> {
    pub(crate) fn new(engine: E, side: Side, viewer: Side) -> Self {
        Self {
            engine,
            side,
            viewer,
        }
    }

    /// The side the engine is moving for.
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn run(mut self) -> BotDone<E> {
        debug!("engine thinking for {}", self.side);
        let result = match self.engine.bot_move(self.side) {
            Ok(true) => settle(&mut self.engine, self.viewer).map(Some),
            Ok(false) => Ok(None),
            Err(err) => Err(err),
        };

        BotDone {
            engine: self.engine,
            side: self.side,
            result,
        }
    }
}

impl<E> BotDone<E> {
    pub fn side(&self) -> Side {
        self.side
    }

    /// Whether the engine actually played a move.
    pub fn moved(&self) -> bool {
        matches!(self.result, Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Call, FakeEngine, Journal};

    #[test]
    fn job_moves_and_settles() {
        let journal = Journal::new();
        let mut engine = FakeEngine::new().with_journal(journal.clone());
        engine.init_game(Side::Black).unwrap();
        journal.clear();

        let done = BotJob::new(engine, Side::White, Side::Black).run();
        assert!(done.moved());
        assert_eq!(done.side(), Side::White);
        assert_eq!(
            journal.calls(),
            vec![
                Call::BotMove(Side::White),
                Call::FetchState(Side::Black),
                Call::IsCheckmate,
                Call::IsStalemate,
            ]
        );
    }

    #[test]
    fn refusal_skips_the_fetch() {
        let journal = Journal::new();
        let mut engine = FakeEngine::new().refuse_bot().with_journal(journal.clone());
        engine.init_game(Side::White).unwrap();

        let done = BotJob::new(engine, Side::White, Side::White).run();
        assert!(!done.moved());
        assert!(matches!(done.result, Ok(None)));
        assert_eq!(journal.count(|c| matches!(c, Call::FetchState(_))), 0);
    }

    #[test]
    fn checkmate_skips_the_stalemate_query() {
        let mut engine = FakeEngine::new().checkmate_after(0);
        engine.init_game(Side::White).unwrap();
        let settled = settle(&mut engine, Side::White).unwrap();
        assert!(settled.checkmate);
        assert!(!settled.stalemate);
    }
}
