//! Cooperative cancellation.
//!
//! The worker loop and the pipeline runner poll a shared [`CancellationToken`]
//! between folder mappings and between files; the worker also awaits it while
//! sleeping between polling ticks.

mod token;

pub use token::CancellationToken;
