pub mod config;
pub mod controller;
pub mod state;
pub mod transport;

// Re-export main types for convenience
pub use config::Config;
pub use controller::{BackendStatus, ChatController, ControllerEvent, LogSink};
pub use state::{LineKind, Message, MessageLog, RenderedLine, Sender};
pub use transport::{HttpTransport, Transport, TransportError};
