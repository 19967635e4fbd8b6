#[cfg(test)]
mod tests;

pub mod backend;
pub mod config;
pub mod engine;
pub mod runtime;

pub use backend::{ActionSubmitter, EventBackend, HttpEventBackend, NewAction, SubmitError};
pub use config::ScreenConfig;
pub use engine::{RawAction, ReactionEvent, ScreenEngine, StreamIngestor, SubmissionGate};
pub use runtime::start_screen_ingestion;
