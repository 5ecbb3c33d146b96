//! The process-wide engine host.
//!
//! The engine executable is configured once per process with `init`, after which any number of
//! sessions can `launch` an engine from it. `teardown` forgets the configuration again.

use crate::client::{EngineError, EngineResult};
use crate::process::{EngineCommand, ProcessEngine};

use log::{debug, info};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

static HOST: Mutex<Option<EngineCommand>> = Mutex::new(None);

/// Records the engine command. Initializing again with the same command does nothing; a different
/// command is refused until `teardown`.
pub fn init(cmd: EngineCommand) -> EngineResult<()> {
    let mut host = HOST.lock().unwrap_or_else(PoisonError::into_inner);
    match host.as_ref() {
        Some(current) if *current == cmd => {
            debug!("engine host already initialized with `{}`", cmd);
            Ok(())
        }
        Some(current) => Err(EngineError::AlreadyInitialized(current.to_string())),
        None => {
            info!("engine host initialized with `{}`", cmd);
            *host = Some(cmd);
            Ok(())
        }
    }
}

pub fn is_initialized() -> bool {
    HOST.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// The configured engine command, if any.
pub fn command() -> Option<EngineCommand> {
    HOST.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Starts a new engine process from the configured command.
pub fn launch(timeout: Duration) -> EngineResult<ProcessEngine> {
    let cmd = command().ok_or(EngineError::NotInitialized)?;
    ProcessEngine::spawn(&cmd, timeout)
}

pub fn teardown() {
    let mut host = HOST.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(cmd) = host.take() {
        info!("engine host `{}` torn down", cmd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A single test, since the host is global to the test binary.
    #[test]
    fn host_lifecycle() {
        teardown();
        assert!(!is_initialized());
        assert!(matches!(
            launch(Duration::from_millis(10)),
            Err(EngineError::NotInitialized)
        ));

        let cmd = EngineCommand::new("/no/such/engine");
        init(cmd.clone()).unwrap();
        init(cmd.clone()).unwrap();
        assert!(is_initialized());
        assert_eq!(command(), Some(cmd));

        match init(EngineCommand::new("other")) {
            Err(EngineError::AlreadyInitialized(current)) => assert_eq!(current, "/no/such/engine"),
            other => panic!("expected AlreadyInitialized, got {:?}", other),
        }

        assert!(matches!(
            launch(Duration::from_millis(10)),
            Err(EngineError::Spawn { .. })
        ));

        teardown();
        assert!(!is_initialized());
        assert!(matches!(
            launch(Duration::from_millis(10)),
            Err(EngineError::NotInitialized)
        ));
        init(EngineCommand::new("other")).unwrap();
        teardown();
    }
}
