//! # photo-organize CLI
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! photo-organize move --source ~/Incoming --target ~/Photos
//! photo-organize clean --source ~/Photos --keep newest
//! ```

mod cli;

use photo_organizer::Result;

fn main() -> Result<()> {
    photo_organizer::init_tracing();
    cli::run()
}
