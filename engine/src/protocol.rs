//! The line protocol spoken between the controller and an out-of-process engine.
//!
//! Each request is one line, answered by exactly one reply line (except `quit`, which has no
//! answer). Squares travel as plain indices `0..64`, sides as `white` / `black`.
//!
//! | request                    | reply                                        |
//! |----------------------------|----------------------------------------------|
//! | `init <side>`              | `initSuccess` / `initFailed`                 |
//! | `move <from> <to> <side>`  | `moveMade` / `invalidMove`                   |
//! | `fetchState <side>`        | the board snapshot                           |
//! | `botMove <side>`           | `botMoved` / `botRefused`                    |
//! | `isMate`                   | `whiteWins` / `blackWins` / `staleMate` / `none` |
//! | `getMoves <square> <side>` | `moves <square>*`                            |
//! | `quit`                     |                                              |
//!
//! Any request may instead be answered with `error <message>`.

use board::{Side, Square, SquareError};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A request sent to the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Request {
    Init(Side),
    Move { from: Square, to: Square, side: Side },
    FetchState(Side),
    BotMove(Side),
    IsMate,
    GetMoves { square: Square, side: Side },
    Quit,
}

/// The answer to `isMate`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MateStatus {
    WhiteWins,
    BlackWins,
    Stalemate,
    None,
}

impl MateStatus {
    pub fn is_checkmate(self) -> bool {
        matches!(self, MateStatus::WhiteWins | MateStatus::BlackWins)
    }

    pub fn is_stalemate(self) -> bool {
        self == MateStatus::Stalemate
    }

    /// The status of a checkmated position, given the side that cannot move.
    pub fn mated(loser: Side) -> Self {
        match loser {
            Side::White => MateStatus::BlackWins,
            Side::Black => MateStatus::WhiteWins,
        }
    }
}

/// A reply read back from the engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    InitSuccess,
    InitFailed,
    MoveMade,
    InvalidMove,
    State(String),
    BotMoved,
    BotRefused,
    Mate(MateStatus),
    Moves(Vec<Square>),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("no input")]
    NoInput,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("expected `white` or `black`, found `{0}`")]
    ExpectedSide(String),
    #[error("expected a square index, found `{0}`")]
    ExpectedNumber(String),
    #[error("bad square: {0}")]
    Square(#[from] SquareError),
    #[error("line ended early")]
    UnexpectedEnd,
    #[error("unexpected trailing token `{0}`")]
    ExpectedEnd(String),
    #[error("`{found}` is not a valid reply to `{request}`")]
    UnexpectedReply { request: String, found: String },
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Init(side) => write!(f, "init {}", side.as_str()),
            Request::Move { from, to, side } => {
                write!(f, "move {} {} {}", from.index(), to.index(), side.as_str())
            }
            Request::FetchState(side) => write!(f, "fetchState {}", side.as_str()),
            Request::BotMove(side) => write!(f, "botMove {}", side.as_str()),
            Request::IsMate => write!(f, "isMate"),
            Request::GetMoves { square, side } => {
                write!(f, "getMoves {} {}", square.index(), side.as_str())
            }
            Request::Quit => write!(f, "quit"),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::InitSuccess => write!(f, "initSuccess"),
            Reply::InitFailed => write!(f, "initFailed"),
            Reply::MoveMade => write!(f, "moveMade"),
            Reply::InvalidMove => write!(f, "invalidMove"),
            Reply::State(snapshot) => write!(f, "{}", snapshot),
            Reply::BotMoved => write!(f, "botMoved"),
            Reply::BotRefused => write!(f, "botRefused"),
            Reply::Mate(MateStatus::WhiteWins) => write!(f, "whiteWins"),
            Reply::Mate(MateStatus::BlackWins) => write!(f, "blackWins"),
            Reply::Mate(MateStatus::Stalemate) => write!(f, "staleMate"),
            Reply::Mate(MateStatus::None) => write!(f, "none"),
            Reply::Moves(squares) => {
                write!(f, "moves")?;
                for sq in squares {
                    write!(f, " {}", sq.index())?;
                }
                Ok(())
            }
            Reply::Error(msg) => write!(f, "error {}", msg),
        }
    }
}

impl FromStr for Request {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_request()
    }
}

impl Reply {
    /// Parses `line` as the answer to `request`. Which replies are valid depends on what was
    /// asked; the snapshot of a `fetchState` is taken verbatim.
    pub fn parse(request: &Request, line: &str) -> Result<Reply, ProtocolError> {
        let line = line.trim();
        if let Some(msg) = line.strip_prefix("error") {
            if msg.is_empty() || msg.starts_with(' ') {
                return Ok(Reply::Error(msg.trim().to_string()));
            }
        }

        let unexpected = || ProtocolError::UnexpectedReply {
            request: request.to_string(),
            found: line.to_string(),
        };

        let reply = match request {
            Request::Init(_) => match line {
                "initSuccess" => Reply::InitSuccess,
                "initFailed" => Reply::InitFailed,
                _ => return Err(unexpected()),
            },
            Request::Move { .. } => match line {
                "moveMade" => Reply::MoveMade,
                "invalidMove" => Reply::InvalidMove,
                _ => return Err(unexpected()),
            },
            Request::FetchState(_) => Reply::State(line.to_string()),
            Request::BotMove(_) => match line {
                "botMoved" => Reply::BotMoved,
                "botRefused" => Reply::BotRefused,
                _ => return Err(unexpected()),
            },
            Request::IsMate => match line {
                "whiteWins" => Reply::Mate(MateStatus::WhiteWins),
                "blackWins" => Reply::Mate(MateStatus::BlackWins),
                "staleMate" => Reply::Mate(MateStatus::Stalemate),
                "none" => Reply::Mate(MateStatus::None),
                _ => return Err(unexpected()),
            },
            Request::GetMoves { .. } => {
                let mut parser = Parser::new(line);
                match parser.advance() {
                    Some(Token::Keyword(Keyword::Moves)) => {}
                    _ => return Err(unexpected()),
                }
                let mut squares = Vec::new();
                while !parser.at_end() {
                    squares.push(parser.square()?);
                }
                Reply::Moves(squares)
            }
            Request::Quit => return Err(unexpected()),
        };

        Ok(reply)
    }
}

/// A single whitespace-separated token: either a reserved word of the protocol or anything else.
#[derive(Copy, Clone, Debug)]
enum Token<'a> {
    Keyword(Keyword),
    Word(&'a str),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Keyword {
    Init,
    Move,
    FetchState,
    BotMove,
    IsMate,
    GetMoves,
    Moves,
    Quit,
}

struct Parser<'a> {
    toks: Vec<Token<'a>>,
    raw: Vec<&'a str>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn new(buf: &'a str) -> Self {
        let raw: Vec<&str> = buf.split_whitespace().collect();
        let toks = raw.iter().map(|&tok| Parser::scan_token(tok)).collect();

        Parser {
            toks,
            raw,
            cursor: 0,
        }
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let next = self.toks.get(self.cursor).copied();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.toks.len()
    }

    /// The next token as it appeared on the line, keyword or not.
    fn word(&mut self) -> Result<&'a str, ProtocolError> {
        let word = self
            .raw
            .get(self.cursor)
            .copied()
            .ok_or(ProtocolError::UnexpectedEnd)?;
        self.cursor += 1;
        Ok(word)
    }

    fn side(&mut self) -> Result<Side, ProtocolError> {
        let word = self.word()?;
        word.parse()
            .map_err(|_| ProtocolError::ExpectedSide(word.to_string()))
    }

    fn square(&mut self) -> Result<Square, ProtocolError> {
        let word = self.word()?;
        let idx: i64 = word
            .parse()
            .map_err(|_| ProtocolError::ExpectedNumber(word.to_string()))?;
        Ok(Square::try_from(idx)?)
    }

    fn finish(&mut self, req: Request) -> Result<Request, ProtocolError> {
        match self.raw.get(self.cursor) {
            None => Ok(req),
            Some(extra) => Err(ProtocolError::ExpectedEnd(extra.to_string())),
        }
    }

    fn parse_request(&mut self) -> Result<Request, ProtocolError> {
        let req = match self.advance() {
            None => return Err(ProtocolError::NoInput),
            Some(Token::Keyword(Keyword::Init)) => Request::Init(self.side()?),
            Some(Token::Keyword(Keyword::Move)) => {
                let from = self.square()?;
                let to = self.square()?;
                let side = self.side()?;
                Request::Move { from, to, side }
            }
            Some(Token::Keyword(Keyword::FetchState)) => Request::FetchState(self.side()?),
            Some(Token::Keyword(Keyword::BotMove)) => Request::BotMove(self.side()?),
            Some(Token::Keyword(Keyword::IsMate)) => Request::IsMate,
            Some(Token::Keyword(Keyword::GetMoves)) => {
                let square = self.square()?;
                let side = self.side()?;
                Request::GetMoves { square, side }
            }
            Some(Token::Keyword(Keyword::Quit)) => Request::Quit,
            Some(Token::Keyword(Keyword::Moves)) => {
                return Err(ProtocolError::UnknownCommand("moves".to_string()))
            }
            Some(Token::Word(word)) => return Err(ProtocolError::UnknownCommand(word.to_string())),
        };

        self.finish(req)
    }

    fn scan_token(s: &'a str) -> Token<'a> {
        match s {
            "init" => Token::Keyword(Keyword::Init),
            "move" => Token::Keyword(Keyword::Move),
            "fetchState" => Token::Keyword(Keyword::FetchState),
            "botMove" => Token::Keyword(Keyword::BotMove),
            "isMate" => Token::Keyword(Keyword::IsMate),
            "getMoves" => Token::Keyword(Keyword::GetMoves),
            "moves" => Token::Keyword(Keyword::Moves),
            "quit" => Token::Keyword(Keyword::Quit),
            _ => Token::Word(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_print_as_wire_lines() {
        let mv = Request::Move {
            from: Square::E2,
            to: Square::E4,
            side: Side::White,
        };
        assert_eq!(mv.to_string(), "move 12 28 white");
        assert_eq!(Request::Init(Side::Black).to_string(), "init black");
        assert_eq!(Request::FetchState(Side::White).to_string(), "fetchState white");
        assert_eq!(
            Request::GetMoves {
                square: Square::G8,
                side: Side::Black
            }
            .to_string(),
            "getMoves 62 black"
        );
    }

    #[test]
    fn parses_every_request() {
        let cases = [
            Request::Init(Side::White),
            Request::Move {
                from: Square::G1,
                to: Square::F3,
                side: Side::White,
            },
            Request::FetchState(Side::Black),
            Request::BotMove(Side::Black),
            Request::IsMate,
            Request::GetMoves {
                square: Square::A7,
                side: Side::Black,
            },
            Request::Quit,
        ];
        for req in cases {
            assert_eq!(req.to_string().parse::<Request>(), Ok(req));
        }
    }

    #[test]
    fn request_whitespace_is_lenient() {
        assert_eq!(
            "  move   12 28  white \n".parse::<Request>(),
            Ok(Request::Move {
                from: Square::E2,
                to: Square::E4,
                side: Side::White
            })
        );
    }

    #[test]
    fn malformed_requests() {
        assert_eq!("".parse::<Request>(), Err(ProtocolError::NoInput));
        assert_eq!(
            "castle".parse::<Request>(),
            Err(ProtocolError::UnknownCommand("castle".to_string()))
        );
        assert_eq!(
            "init red".parse::<Request>(),
            Err(ProtocolError::ExpectedSide("red".to_string()))
        );
        assert_eq!(
            "move e2 e4 white".parse::<Request>(),
            Err(ProtocolError::ExpectedNumber("e2".to_string()))
        );
        assert_eq!(
            "move 12 64 white".parse::<Request>(),
            Err(ProtocolError::Square(SquareError::OutOfRange(64)))
        );
        assert_eq!("move 12 28".parse::<Request>(), Err(ProtocolError::UnexpectedEnd));
        assert_eq!(
            "isMate now".parse::<Request>(),
            Err(ProtocolError::ExpectedEnd("now".to_string()))
        );
    }

    #[test]
    fn replies_depend_on_the_request() {
        let mv = Request::Move {
            from: Square::E2,
            to: Square::E4,
            side: Side::White,
        };
        assert_eq!(Reply::parse(&mv, "moveMade"), Ok(Reply::MoveMade));
        assert_eq!(Reply::parse(&mv, "invalidMove\r"), Ok(Reply::InvalidMove));
        assert!(matches!(
            Reply::parse(&mv, "initSuccess"),
            Err(ProtocolError::UnexpectedReply { .. })
        ));
        assert_eq!(
            Reply::parse(&Request::IsMate, "blackWins"),
            Ok(Reply::Mate(MateStatus::BlackWins))
        );
        assert_eq!(
            Reply::parse(&Request::IsMate, "staleMate"),
            Ok(Reply::Mate(MateStatus::Stalemate))
        );
    }

    #[test]
    fn state_reply_is_verbatim() {
        let req = Request::FetchState(Side::White);
        let line = board::START_SNAPSHOT;
        assert_eq!(Reply::parse(&req, line), Ok(Reply::State(line.to_string())));
    }

    #[test]
    fn move_lists() {
        let req = Request::GetMoves {
            square: Square::E2,
            side: Side::White,
        };
        let reply = Reply::Moves(vec![Square::E3, Square::E4]);
        assert_eq!(reply.to_string(), "moves 20 28");
        assert_eq!(Reply::parse(&req, "moves 20 28"), Ok(reply));
        assert_eq!(Reply::parse(&req, "moves"), Ok(Reply::Moves(vec![])));
        assert_eq!(
            Reply::parse(&req, "moves 20 x"),
            Err(ProtocolError::ExpectedNumber("x".to_string()))
        );
    }

    #[test]
    fn error_replies() {
        assert_eq!(
            Reply::parse(&Request::IsMate, "error no game in progress"),
            Ok(Reply::Error("no game in progress".to_string()))
        );
        assert_eq!(
            Reply::Error("bad".to_string()).to_string(),
            "error bad"
        );
    }

    #[test]
    fn mate_status_helpers() {
        assert_eq!(MateStatus::mated(Side::Black), MateStatus::WhiteWins);
        assert!(MateStatus::BlackWins.is_checkmate());
        assert!(!MateStatus::Stalemate.is_checkmate());
        assert!(MateStatus::Stalemate.is_stalemate());
    }
}
