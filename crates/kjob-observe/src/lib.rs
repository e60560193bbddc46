//! Logging setup for kjob binaries.
//!
//! Libraries only emit `tracing` events; a binary calls [`init_logger`] once to install the
//! global subscriber.
mod logger;
pub use logger::*;
