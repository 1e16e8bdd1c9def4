//! Kal compiler driver.
//!
//! Usage:
//!   kal file.kal     # compile and run a source file
//!   kal              # read from standard input (interactive prompt)
//!
//! Diagnostics, generated IR and evaluation results all go to stderr.

use std::env;
use std::fs;
use std::io::Read;

use inkwell::context::Context;

use kal::driver::Driver;
use kal::errors::{self, Phase};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() > 2 {
        errors::fatal_with_hint(
            Phase::Driver,
            "too many arguments",
            Some("usage: kal [source.kal]".into()),
        );
    }

    let context = Context::create();

    match args.get(1) {
        Some(path) => {
            let source = fs::read(path).unwrap_or_else(|e| {
                errors::fatal(Phase::Driver, format!("could not read {path}: {e}"));
            });
            Driver::new(&context, source.into_iter(), false).run();
        }
        None => {
            let stdin = std::io::stdin().bytes().filter_map(Result::ok);
            Driver::new(&context, stdin, true).run();
        }
    }
}
