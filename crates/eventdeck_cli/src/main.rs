//! EventDeck command-line front end.
//!
//! # Responsibility
//! - Drive the core event and note stores from a terminal.
//! - Keep output plain and line-oriented for scripting.

mod cli;
mod util;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
