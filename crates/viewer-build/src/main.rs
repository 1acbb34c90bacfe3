//! Entry point for the `viewer-build` binary.

use std::process;

fn main() {
    if let Err(err) = viewer_build::run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
