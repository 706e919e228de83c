use std::io;
use std::process;

use console::style;
use structopt::StructOpt;
use tracing::Level;

use options::Options;
use tcsearch::search::{run, Setup};

mod options;

fn main() {
    let options = Options::from_args();
    if options.common().verbose {
        init_logging();
    }
    let setup = options.to_setup();

    println!("{}", style(format!("Searching {}", setup)).bold());
    if let Err(code) = search(&setup) {
        process::exit(code);
    }
}

/// Runs the search and prints the result. Returns the exit code on failure.
fn search(setup: &Setup) -> Result<(), i32> {
    match run(setup) {
        Ok(report) => {
            print!("{}", report);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), style(e).red());
            Err(1)
        }
    }
}

/// Logs to stderr, so the progress bar and the results on stdout stay readable.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::DEBUG)
        .init();
}
