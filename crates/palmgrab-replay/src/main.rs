//! Session replay entry point.

use palmgrab_replay::{Replay, ReplayResult, Session};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: palmgrab-replay <session.json>");
        return ExitCode::FAILURE;
    };

    match run(&path) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Replay of {:?} failed: {}", path, e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> ReplayResult<String> {
    log::info!("Loading session {:?}", path);
    let session = Session::load(path)?;
    let report = Replay::run(&session)?;
    Ok(serde_json::to_string_pretty(&report)?)
}
