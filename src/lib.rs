//! A chess board session against an external engine: the session controller, the engine move
//! worker, and the console frontend built on them.

pub mod bot;
pub mod config;
pub mod controller;
pub mod input;
pub mod render;
pub mod sess;

pub use config::{Config, ReplyMode};
pub use controller::{
    BotReply, BotTurn, FreezeReason, GameStatus, Outcome, Response, SessionController,
    SessionError, SessionResult, State,
};
