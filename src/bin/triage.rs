//! Triage CLI binary.

use clap::Parser;
use std::process;
use triage::cli::{args::TriageArgs, commands::execute_training};

fn main() {
    // Parse command line arguments using clap; misuse prints the usage text
    // and performs no pipeline work.
    let args = TriageArgs::parse();

    // Execute the training pipeline
    if let Err(e) = execute_training(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
