//! Everything needed to talk to an opponent engine: the `EngineClient` interface, the
//! child-process client and its wire protocol, a protocol server, and an in-memory fake.

pub mod client;
pub mod fake;
pub mod host;
pub mod process;
pub mod protocol;
pub mod serve;

pub use client::{EngineClient, EngineError, EngineResult};
pub use fake::{Call, FakeEngine, Journal};
pub use process::{EngineCommand, ProcessEngine, DEFAULT_TIMEOUT};
pub use protocol::{MateStatus, ProtocolError, Reply, Request};
pub use serve::serve;
