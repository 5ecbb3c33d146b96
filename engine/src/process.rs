//! An engine running as a child process, driven over the line protocol.
//!
//! Requests are written to the child's stdin. A reader thread forwards every non-blank stdout
//! line into a `crossbeam_channel`, so a request can wait for its reply with a timeout instead of
//! blocking forever on a hung engine. Whatever the engine prints on stderr goes to the log.

use crate::client::{EngineClient, EngineError, EngineResult};
use crate::protocol::{MateStatus, ProtocolError, Reply, Request};
use board::{Side, Square};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How long a request waits for its reply unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the child gets to exit after `quit` before it is killed.
const EXIT_GRACE: Duration = Duration::from_millis(500);

/// The executable (and its arguments) that runs an engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

pub struct ProcessEngine {
    child: Child,
    /// `None` once the conversation has been shut down.
    stdin: Option<ChildStdin>,
    lines: Receiver<String>,
    timeout: Duration,
    /// Replies still owed for requests that timed out. The engine answers in order, so these are
    /// the next lines it prints.
    overdue: usize,
    name: String,
}

impl ProcessEngine {
    pub fn spawn(cmd: &EngineCommand, timeout: Duration) -> EngineResult<Self> {
        let name = cmd.to_string();
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: name.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().ok_or(EngineError::Disconnected)?;
        let (tx, lines) = unbounded::<String>();
        Self::stdout_thread(stdout, tx);
        if let Some(stderr) = child.stderr.take() {
            Self::stderr_thread(stderr, name.clone());
        }

        debug!("started engine `{}` (pid {})", name, child.id());
        Ok(Self {
            child,
            stdin,
            lines,
            timeout,
            overdue: 0,
            name,
        })
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// The reader threads are never joined: they exit on their own once the child's pipes close.
    fn stdout_thread(stdout: impl Read + Send + 'static, tx: Sender<String>) {
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(_) => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    }

    fn stderr_thread(stderr: impl Read + Send + 'static, name: String) {
        thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                debug!("[{}] {}", name, line);
            }
        });
    }

    fn send(&mut self, req: &Request) -> EngineResult<()> {
        let stdin = self.stdin.as_mut().ok_or(EngineError::Disconnected)?;
        debug!("-> {}", req);
        writeln!(stdin, "{}", req)?;
        stdin.flush()?;
        Ok(())
    }

    /// Sends `req` and waits for its reply. An `error` reply from the engine becomes
    /// `EngineError::Remote`.
    fn request(&mut self, req: Request) -> EngineResult<Reply> {
        while let Ok(stale) = self.lines.try_recv() {
            self.discard(&stale);
        }

        self.send(&req)?;
        let deadline = Instant::now() + self.timeout;
        let line = loop {
            match self.lines.recv_deadline(deadline) {
                Ok(line) if self.overdue > 0 => self.discard(&line),
                Ok(line) => break line,
                Err(RecvTimeoutError::Timeout) => {
                    self.overdue += 1;
                    return Err(EngineError::Timeout {
                        request: req.to_string(),
                        timeout: self.timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(EngineError::Disconnected),
            }
        };
        debug!("<- {}", line);

        match Reply::parse(&req, &line)? {
            Reply::Error(msg) => Err(EngineError::Remote(msg)),
            reply => Ok(reply),
        }
    }

    /// Drops a line that answers an earlier, timed-out request.
    fn discard(&mut self, line: &str) {
        self.overdue = self.overdue.saturating_sub(1);
        warn!("discarding stale engine output: {}", line);
    }

    fn unexpected(req: Request, reply: Reply) -> EngineError {
        EngineError::Protocol(ProtocolError::UnexpectedReply {
            request: req.to_string(),
            found: reply.to_string(),
        })
    }

    fn mate_status(&mut self) -> EngineResult<MateStatus> {
        match self.request(Request::IsMate)? {
            Reply::Mate(status) => Ok(status),
            other => Err(Self::unexpected(Request::IsMate, other)),
        }
    }

    fn wait_or_kill(&mut self) {
        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!("engine `{}` exited with {}", self.name, status);
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                _ => break,
            }
        }

        warn!("engine `{}` did not exit after quit, killing it", self.name);
        if let Err(err) = self.child.kill() {
            warn!("failed to kill engine `{}`: {}", self.name, err);
        }
        let _ = self.child.wait();
    }
}

impl EngineClient for ProcessEngine {
    fn init_game(&mut self, side: Side) -> EngineResult<bool> {
        let req = Request::Init(side);
        match self.request(req)? {
            Reply::InitSuccess => Ok(true),
            Reply::InitFailed => Ok(false),
            other => Err(Self::unexpected(req, other)),
        }
    }

    fn make_move(&mut self, from: Square, to: Square, side: Side) -> EngineResult<bool> {
        let req = Request::Move { from, to, side };
        match self.request(req)? {
            Reply::MoveMade => Ok(true),
            Reply::InvalidMove => Ok(false),
            other => Err(Self::unexpected(req, other)),
        }
    }

    fn fetch_state(&mut self, viewer: Side) -> EngineResult<String> {
        let req = Request::FetchState(viewer);
        match self.request(req)? {
            Reply::State(snapshot) => Ok(snapshot),
            other => Err(Self::unexpected(req, other)),
        }
    }

    fn bot_move(&mut self, side: Side) -> EngineResult<bool> {
        let req = Request::BotMove(side);
        match self.request(req)? {
            Reply::BotMoved => Ok(true),
            Reply::BotRefused => Ok(false),
            other => Err(Self::unexpected(req, other)),
        }
    }

    fn is_checkmate(&mut self) -> EngineResult<bool> {
        Ok(self.mate_status()?.is_checkmate())
    }

    fn is_stalemate(&mut self) -> EngineResult<bool> {
        Ok(self.mate_status()?.is_stalemate())
    }

    fn legal_targets(&mut self, from: Square, side: Side) -> EngineResult<Vec<Square>> {
        let req = Request::GetMoves { square: from, side };
        match self.request(req)? {
            Reply::Moves(squares) => Ok(squares),
            other => Err(Self::unexpected(req, other)),
        }
    }

    /// Sends `quit` and waits for the child to exit, killing it if it lingers. Calling this more
    /// than once is harmless.
    fn shutdown(&mut self) -> EngineResult<()> {
        if self.stdin.is_none() {
            return Ok(());
        }

        let sent = self.send(&Request::Quit);
        // Closing stdin tells engines that ignore `quit` that the conversation is over.
        self.stdin = None;
        self.wait_or_kill();
        sent
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            debug!("engine `{}` shut down uncleanly: {}", self.name, err);
        }
    }
}
