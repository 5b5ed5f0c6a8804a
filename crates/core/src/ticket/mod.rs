//! Synthetic incident tickets: the data the generator produces and the
//! orchestrator evaluates.

mod types;

pub use types::{AmbiguityLevel, RootCause, Severity, Ticket};
