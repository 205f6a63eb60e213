use std::{
    io::{self, Write},
    process,
};

use benchtrend::cli::{Cli, EXIT_USAGE, run};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let result = run(&cli, &mut stdout, &mut stderr);
    let _ = stdout.flush();
    let code = match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            let _ = writeln!(stderr, "error: {err}");
            EXIT_USAGE
        }
    };
    drop(stdout);
    drop(stderr);
    process::exit(code);
}
