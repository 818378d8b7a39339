//! # Photo Organizer
//!
//! Sorts a photo library into a date-structured folder layout and removes
//! duplicate copies, either within one tree or against a separate archive.
//!
//! ## Core Philosophy
//! - **Never lose data** - name collisions disambiguate, ambiguity blocks deletion
//! - **Forward progress** - one unreadable file never aborts a batch
//! - **Explain every decision** - one result line per file acted on
//!
//! ## Architecture
//! The library is split into a core engine and a presentation layer:
//! - `core` - date inference, duplicate detection, and relocation engines
//! - `error` - error types
//! - the CLI lives in the binary crate

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
