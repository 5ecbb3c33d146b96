//! An in-memory stand-in for a real engine.
//!
//! `FakeEngine` knows nothing about chess rules beyond whose turn it is and whose pieces stand
//! where: any move of one of the mover's pieces onto a square not holding one of its own pieces
//! is accepted. Everything else a real engine would decide (bot replies, checkmate, stalemate,
//! failures) is scripted through the builder methods.
//!
//! Every call is recorded in a `Journal`, which can be cloned and inspected after the engine has
//! been handed to the code under test.

use crate::client::{EngineClient, EngineError, EngineResult};
use board::{encode_with, Board, Glyphs, PieceType, Side, Square};

use log::debug;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A call made on a `FakeEngine`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    InitGame(Side),
    MakeMove { from: Square, to: Square, side: Side },
    FetchState(Side),
    BotMove(Side),
    IsCheckmate,
    IsStalemate,
    LegalTargets { from: Square, side: Side },
    Shutdown,
}

/// A shared record of the calls made on an engine, and of how many of them overlapped.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<Call>>>,
    in_flight: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
}

/// Marks a call as in flight until dropped.
struct InFlight {
    flag: Arc<AtomicBool>,
    /// Another call was already in flight when this one began.
    nested: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.nested {
            self.flag.store(false, Ordering::SeqCst);
        }
    }
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&self, call: Call) -> InFlight {
        let nested = self.in_flight.swap(true, Ordering::SeqCst);
        if nested {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        InFlight {
            flag: Arc::clone(&self.in_flight),
            nested,
        }
    }

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of calls that began while another was still running.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| pred(call))
            .count()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Clone, Debug)]
pub struct FakeEngine {
    board: Board,
    to_move: Side,
    started: bool,
    plies: usize,
    script: VecDeque<(Square, Square)>,
    checkmate_after: Option<usize>,
    stalemate_after: Option<usize>,
    init_fails: bool,
    refuse_bot: bool,
    corrupt_fetches: usize,
    disconnect_after: Option<usize>,
    calls: usize,
    glyphs: Glyphs,
    journal: Journal,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            board: Board::start_pos(),
            to_move: Side::White,
            started: false,
            plies: 0,
            script: VecDeque::new(),
            checkmate_after: None,
            stalemate_after: None,
            init_fails: false,
            refuse_bot: false,
            corrupt_fetches: 0,
            disconnect_after: None,
            calls: 0,
            glyphs: Glyphs::Ascii,
            journal: Journal::new(),
        }
    }

    /// Records calls into `journal` instead of a private one.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Queues moves the engine plays, in order, when asked for a bot move.
    pub fn script_replies(mut self, moves: impl IntoIterator<Item = (Square, Square)>) -> Self {
        self.script.extend(moves);
        self
    }

    /// Reports checkmate once `plies` half-moves have been played.
    pub fn checkmate_after(mut self, plies: usize) -> Self {
        self.checkmate_after = Some(plies);
        self
    }

    /// Reports stalemate once `plies` half-moves have been played.
    pub fn stalemate_after(mut self, plies: usize) -> Self {
        self.stalemate_after = Some(plies);
        self
    }

    pub fn init_fails(mut self) -> Self {
        self.init_fails = true;
        self
    }

    pub fn refuse_bot(mut self) -> Self {
        self.refuse_bot = true;
        self
    }

    /// The next `n` snapshots are garbage.
    pub fn corrupt_next_fetches(mut self, n: usize) -> Self {
        self.corrupt_fetches = n;
        self
    }

    /// Every call after the first `n` fails with `EngineError::Disconnected`.
    pub fn disconnect_after(mut self, n: usize) -> Self {
        self.disconnect_after = Some(n);
        self
    }

    pub fn glyphs(mut self, glyphs: Glyphs) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn plies(&self) -> usize {
        self.plies
    }

    fn tick(&mut self) -> EngineResult<()> {
        self.calls += 1;
        match self.disconnect_after {
            Some(limit) if self.calls > limit => Err(EngineError::Disconnected),
            _ => Ok(()),
        }
    }

    fn checkmate(&self) -> bool {
        self.checkmate_after.map_or(false, |n| self.plies >= n)
    }

    fn stalemate(&self) -> bool {
        self.stalemate_after.map_or(false, |n| self.plies >= n)
    }

    fn accepts(&self, from: Square, to: Square, side: Side) -> bool {
        self.started
            && !self.checkmate()
            && !self.stalemate()
            && from != to
            && side == self.to_move
            && self.board.piece_at_sq(from).side() == Some(side)
            && self.board.piece_at_sq(to).side() != Some(side)
    }

    fn play(&mut self, from: Square, to: Square) {
        self.board.move_piece(from, to);
        self.plies += 1;
        self.to_move = !self.to_move;
    }

    /// The first single pawn push available to `side`, scanning from a1 upwards.
    fn pawn_push(&self, side: Side) -> Option<(Square, Square)> {
        self.board
            .squares_of(side)
            .filter(|&sq| self.board.piece_at_sq(sq).type_of() == Some(PieceType::Pawn))
            .find_map(|sq| {
                let to = sq.shift_rank(side.pawn_push())?;
                self.board.piece_at_sq(to).is_none().then(|| (sq, to))
            })
    }
}

impl EngineClient for FakeEngine {
    fn init_game(&mut self, side: Side) -> EngineResult<bool> {
        let _call = self.journal.enter(Call::InitGame(side));
        self.tick()?;

        self.board = Board::start_pos();
        self.to_move = Side::White;
        self.plies = 0;
        self.started = !self.init_fails;
        Ok(self.started)
    }

    fn make_move(&mut self, from: Square, to: Square, side: Side) -> EngineResult<bool> {
        let _call = self.journal.enter(Call::MakeMove { from, to, side });
        self.tick()?;

        if !self.accepts(from, to, side) {
            debug!("fake engine rejects {}{} for {}", from, to, side);
            return Ok(false);
        }
        self.play(from, to);
        Ok(true)
    }

    fn fetch_state(&mut self, viewer: Side) -> EngineResult<String> {
        let _call = self.journal.enter(Call::FetchState(viewer));
        self.tick()?;

        if self.corrupt_fetches > 0 {
            self.corrupt_fetches -= 1;
            return Ok("this is not a board".to_string());
        }
        Ok(encode_with(&self.board, self.glyphs))
    }

    fn bot_move(&mut self, side: Side) -> EngineResult<bool> {
        let _call = self.journal.enter(Call::BotMove(side));
        self.tick()?;

        if self.refuse_bot || !self.started || side != self.to_move {
            return Ok(false);
        }

        let choice = match self.script.pop_front() {
            Some(mv) => Some(mv),
            None => self.pawn_push(side),
        };
        match choice {
            Some((from, to)) if self.accepts(from, to, side) => {
                self.play(from, to);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn is_checkmate(&mut self) -> EngineResult<bool> {
        let _call = self.journal.enter(Call::IsCheckmate);
        self.tick()?;
        Ok(self.checkmate())
    }

    fn is_stalemate(&mut self) -> EngineResult<bool> {
        let _call = self.journal.enter(Call::IsStalemate);
        self.tick()?;
        Ok(!self.checkmate() && self.stalemate())
    }

    /// Pawn pushes only; other pieces get no highlights.
    fn legal_targets(&mut self, from: Square, side: Side) -> EngineResult<Vec<Square>> {
        let _call = self.journal.enter(Call::LegalTargets { from, side });
        self.tick()?;

        let piece = self.board.piece_at_sq(from);
        if piece.side() != Some(side) || piece.type_of() != Some(PieceType::Pawn) {
            return Ok(Vec::new());
        }

        let home_rank = if side.is_white() { 1 } else { 6 };
        let mut targets = Vec::new();
        let mut sq = from;
        for _ in 0..if from.rank() == home_rank { 2 } else { 1 } {
            match sq.shift_rank(side.pawn_push()) {
                Some(next) if self.board.piece_at_sq(next).is_none() => {
                    targets.push(next);
                    sq = next;
                }
                _ => break,
            }
        }
        Ok(targets)
    }

    fn shutdown(&mut self) -> EngineResult<()> {
        let _call = self.journal.enter(Call::Shutdown);
        self.started = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::{decode, Piece, START_SNAPSHOT};

    fn started() -> FakeEngine {
        let mut engine = FakeEngine::new();
        assert!(engine.init_game(Side::White).unwrap());
        engine
    }

    #[test]
    fn starts_from_the_standard_position() {
        let mut engine = started();
        assert_eq!(engine.fetch_state(Side::White).unwrap(), START_SNAPSHOT);
        assert_eq!(engine.to_move(), Side::White);
    }

    #[test]
    fn moves_alternate_sides() {
        let mut engine = started();
        assert!(engine.make_move(Square::E2, Square::E4, Side::White).unwrap());
        assert!(!engine.make_move(Square::D2, Square::D4, Side::White).unwrap());
        assert!(engine.make_move(Square::E7, Square::E5, Side::Black).unwrap());

        let board = decode(&engine.fetch_state(Side::Black).unwrap()).unwrap();
        assert_eq!(board.piece_at_sq(Square::E4), Piece::WhitePawn);
        assert_eq!(board.piece_at_sq(Square::E5), Piece::BlackPawn);
        assert_eq!(engine.plies(), 2);
    }

    #[test]
    fn rejects_moves_that_are_obviously_wrong() {
        let mut engine = started();
        // Same square, empty square, opponent's piece, own piece on target.
        assert!(!engine.make_move(Square::E2, Square::E2, Side::White).unwrap());
        assert!(!engine.make_move(Square::E4, Square::E5, Side::White).unwrap());
        assert!(!engine.make_move(Square::E7, Square::E5, Side::White).unwrap());
        assert!(!engine.make_move(Square::A1, Square::A2, Side::White).unwrap());
        assert_eq!(engine.plies(), 0);
    }

    #[test]
    fn no_moves_before_init_or_after_failed_init() {
        let mut engine = FakeEngine::new();
        assert!(!engine.make_move(Square::E2, Square::E4, Side::White).unwrap());

        let mut engine = FakeEngine::new().init_fails();
        assert!(!engine.init_game(Side::White).unwrap());
        assert!(!engine.bot_move(Side::White).unwrap());
    }

    #[test]
    fn bot_plays_script_then_pawn_pushes() {
        let mut engine = FakeEngine::new().script_replies([(Square::G8, Square::F6)]);
        engine.init_game(Side::White).unwrap();
        engine.make_move(Square::E2, Square::E4, Side::White).unwrap();
        assert!(engine.bot_move(Side::Black).unwrap());
        assert_eq!(engine.board().piece_at_sq(Square::F6), Piece::BlackKnight);

        engine.make_move(Square::D2, Square::D4, Side::White).unwrap();
        assert!(engine.bot_move(Side::Black).unwrap());
        assert_eq!(engine.board().piece_at_sq(Square::A6), Piece::BlackPawn);
        assert_eq!(engine.to_move(), Side::White);
    }

    #[test]
    fn bot_only_moves_the_side_to_move() {
        let mut engine = started();
        assert!(!engine.bot_move(Side::Black).unwrap());
        assert!(engine.bot_move(Side::White).unwrap());
        assert!(!FakeEngine::new().refuse_bot().bot_move(Side::White).unwrap());
    }

    #[test]
    fn scripted_outcomes() {
        let mut engine = FakeEngine::new().checkmate_after(1);
        engine.init_game(Side::White).unwrap();
        assert!(!engine.is_checkmate().unwrap());
        engine.make_move(Square::F2, Square::F3, Side::White).unwrap();
        assert!(engine.is_checkmate().unwrap());
        assert!(!engine.is_stalemate().unwrap());
        assert!(!engine.make_move(Square::E7, Square::E5, Side::Black).unwrap());

        let mut engine = FakeEngine::new().stalemate_after(0);
        engine.init_game(Side::White).unwrap();
        assert!(engine.is_stalemate().unwrap());
    }

    #[test]
    fn corrupt_fetches_then_recovers() {
        let mut engine = FakeEngine::new().corrupt_next_fetches(1);
        engine.init_game(Side::White).unwrap();
        assert!(decode(&engine.fetch_state(Side::White).unwrap()).is_err());
        assert!(decode(&engine.fetch_state(Side::White).unwrap()).is_ok());
    }

    #[test]
    fn disconnects_after_a_number_of_calls() {
        let mut engine = FakeEngine::new().disconnect_after(1);
        assert!(engine.init_game(Side::White).is_ok());
        assert!(matches!(
            engine.is_checkmate(),
            Err(EngineError::Disconnected)
        ));
    }

    #[test]
    fn pawn_targets() {
        let mut engine = started();
        assert_eq!(
            engine.legal_targets(Square::E2, Side::White).unwrap(),
            vec![Square::E3, Square::E4]
        );
        assert!(engine.legal_targets(Square::G1, Side::White).unwrap().is_empty());
        assert!(engine.legal_targets(Square::E7, Side::White).unwrap().is_empty());
        assert_eq!(
            engine.legal_targets(Square::E7, Side::Black).unwrap(),
            vec![Square::E6, Square::E5]
        );
    }

    #[test]
    fn journal_records_calls_in_order() {
        let journal = Journal::new();
        let mut engine = FakeEngine::new().with_journal(journal.clone());
        engine.init_game(Side::Black).unwrap();
        engine.make_move(Square::E2, Square::E4, Side::White).unwrap();
        engine.is_checkmate().unwrap();

        assert_eq!(
            journal.calls(),
            vec![
                Call::InitGame(Side::Black),
                Call::MakeMove {
                    from: Square::E2,
                    to: Square::E4,
                    side: Side::White
                },
                Call::IsCheckmate,
            ]
        );
        assert_eq!(journal.count(|c| matches!(c, Call::MakeMove { .. })), 1);
        assert_eq!(journal.overlaps(), 0);
    }

    #[test]
    fn journal_counts_overlapping_calls() {
        let journal = Journal::new();
        let outer = journal.enter(Call::IsCheckmate);
        let inner = journal.enter(Call::IsStalemate);
        drop(inner);
        drop(outer);
        assert_eq!(journal.overlaps(), 1);

        let _next = journal.enter(Call::IsCheckmate);
        assert_eq!(journal.overlaps(), 1);
    }

    #[test]
    fn unicode_snapshots() {
        let mut engine = FakeEngine::new().glyphs(Glyphs::Unicode);
        engine.init_game(Side::White).unwrap();
        let snapshot = engine.fetch_state(Side::White).unwrap();
        assert!(snapshot.starts_with('♜'));
        assert_eq!(decode(&snapshot).unwrap(), Board::start_pos());
    }
}
