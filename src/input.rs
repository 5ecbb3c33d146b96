//! Console commands.

use board::{Square, SquareError};

use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  e2 e4 | 12 28   play a move for the side to move
  select <sq>     select a square (a second square completes the move)
  click <x> <y>   click a pixel of the drawn board
  bot             let the engine move for the side to move
  flip            turn the board around
  cancel          drop the current selection
  new             start a new game
  board           show the board
  help            show this text
  quit            leave";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Move(Square, Square),
    Select(Square),
    Click(i32, i32),
    Bot,
    Flip,
    Cancel,
    New,
    Board,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error(transparent)]
    Square(#[from] SquareError),
    #[error("`{0}` is not a pixel coordinate")]
    Coordinate(String),
    #[error("`{command}` takes {expected}")]
    Arguments {
        command: &'static str,
        expected: &'static str,
    },
}

impl FromStr for Command {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let (first, rest) = match words.split_first() {
            Some((first, rest)) => (first.to_ascii_lowercase(), rest),
            None => return Err(InputError::Empty),
        };

        let no_args = |cmd: Command, name: &'static str| {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(InputError::Arguments {
                    command: name,
                    expected: "no arguments",
                })
            }
        };

        match first.as_str() {
            "select" => match rest {
                [sq] => Ok(Command::Select(sq.parse()?)),
                _ => Err(InputError::Arguments {
                    command: "select",
                    expected: "one square",
                }),
            },
            "click" => match rest {
                [x, y] => Ok(Command::Click(coordinate(x)?, coordinate(y)?)),
                _ => Err(InputError::Arguments {
                    command: "click",
                    expected: "two pixel coordinates",
                }),
            },
            "bot" => no_args(Command::Bot, "bot"),
            "flip" => no_args(Command::Flip, "flip"),
            "cancel" => no_args(Command::Cancel, "cancel"),
            "new" => no_args(Command::New, "new"),
            "board" => no_args(Command::Board, "board"),
            "help" | "?" => no_args(Command::Help, "help"),
            "quit" | "exit" => no_args(Command::Quit, "quit"),
            _ => match words.as_slice() {
                [from, to] => Ok(Command::Move(from.parse()?, to.parse()?)),
                _ => Err(InputError::Unknown(words[0].to_string())),
            },
        }
    }
}

fn coordinate(s: &str) -> Result<i32, InputError> {
    s.parse()
        .map_err(|_| InputError::Coordinate(s.to_string()))
}
