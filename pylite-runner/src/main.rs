mod repl;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;

use clap::{ArgAction, Parser};

static TRACING_INIT: Once = Once::new();

/// Logs go to stderr, and only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}

/// Runs a pylite script, or starts an interactive session when no script is
/// given.
#[derive(Parser)]
#[command(author, version, about, disable_version_flag = true)]
struct Cli {
    /// Script to execute
    path: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.path {
        None => repl::start(),
        Some(path) => runner::execute_file(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
