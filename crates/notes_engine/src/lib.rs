//! Tracker engine: transport, polling and effect execution.
mod aggregate;
mod controller;
mod scheduler;
mod transport;
mod types;
mod wire;

pub use aggregate::aggregate;
pub use controller::{ProgressController, TrackerSettings};
pub use scheduler::{FixedCadence, PollCadence, PollHandle, PollScheduler};
pub use transport::{HttpTransport, Transport, TransportSettings};
pub use types::{JobCreated, StatusReport, TransportError, TransportErrorKind};
