//! Answers the line protocol on behalf of any `EngineClient`, which turns an in-process engine
//! into one that can be driven by `ProcessEngine`.

use crate::client::{EngineClient, EngineResult};
use crate::protocol::{MateStatus, Reply, Request};
use board::Side;

use log::{debug, warn};
use std::io::{self, BufRead, Write};

/// Reads requests from `reader` until `quit` or end of input, writing one reply line per request.
/// Unparsable requests are answered with `error <message>`, as are requests the engine failed on.
pub fn serve<E, R, W>(engine: &mut E, reader: R, mut writer: W) -> io::Result<()>
where
    E: EngineClient + ?Sized,
    R: BufRead,
    W: Write,
{
    // The checkmated side is the one to move, which the engine interface does not expose.
    let mut to_move = Side::White;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match line.parse::<Request>() {
            Ok(Request::Quit) => {
                debug!("quit received");
                if let Err(err) = engine.shutdown() {
                    warn!("engine shutdown failed: {}", err);
                }
                return Ok(());
            }
            Ok(req) => {
                debug!("<- {}", req);
                answer(engine, req, &mut to_move)
                    .unwrap_or_else(|err| Reply::Error(err.to_string()))
            }
            Err(err) => {
                warn!("unparsable request `{}`: {}", line.trim(), err);
                Reply::Error(err.to_string())
            }
        };

        debug!("-> {}", reply);
        writeln!(writer, "{}", reply)?;
        writer.flush()?;
    }

    Ok(())
}

fn answer<E>(engine: &mut E, req: Request, to_move: &mut Side) -> EngineResult<Reply>
where
    E: EngineClient + ?Sized,
{
    let reply = match req {
        Request::Init(side) => {
            if engine.init_game(side)? {
                *to_move = Side::White;
                Reply::InitSuccess
            } else {
                Reply::InitFailed
            }
        }
        Request::Move { from, to, side } => {
            if engine.make_move(from, to, side)? {
                *to_move = !side;
                Reply::MoveMade
            } else {
                Reply::InvalidMove
            }
        }
        Request::FetchState(side) => Reply::State(engine.fetch_state(side)?),
        Request::BotMove(side) => {
            if engine.bot_move(side)? {
                *to_move = !side;
                Reply::BotMoved
            } else {
                Reply::BotRefused
            }
        }
        Request::IsMate => {
            let status = if engine.is_checkmate()? {
                MateStatus::mated(*to_move)
            } else if engine.is_stalemate()? {
                MateStatus::Stalemate
            } else {
                MateStatus::None
            };
            Reply::Mate(status)
        }
        Request::GetMoves { square, side } => Reply::Moves(engine.legal_targets(square, side)?),
        Request::Quit => Reply::Error("quit has no reply".to_string()),
    };

    Ok(reply)
}
