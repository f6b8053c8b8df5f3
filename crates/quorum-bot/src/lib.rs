//! Chat-platform bot runtime: a dispatcher that routes inbound events to
//! registered handlers, with a trigger-prefix command parser and a
//! development-mode credential allocator.

pub mod allocator;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod registry;
pub mod sink;
pub mod source;

pub use allocator::{Allocation, CredentialPool, TokenAllocator};
pub use config::Config;
pub use dispatcher::{Dispatcher, RunState};
pub use error::{AppError, AppResult};
pub use handlers::{Context, EventHandler};
pub use parser::{strip_markers, Command};
pub use registry::HandlerRegistry;
pub use sink::{ApiSink, ConsoleSink, ReplySink};
pub use source::{EventSource, PollSource, StdinSource};
