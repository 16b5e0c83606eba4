//! Headless host: replays a scenario script and writes its exports.
//!
//! Usage: `warboard <script.json> [--config <config.json>] [--out <dir>] [--data <dir>]`
//!
//! The battle session is restored from and saved to `--data`, or the
//! platform data directory when it is not given.

use std::path::PathBuf;
use std::process::ExitCode;
use warboard_app::{Battle, Script, ScriptError, ShortcutRegistry};
use warboard_core::FileStorage;

struct Args {
    script: PathBuf,
    config: Option<PathBuf>,
    out: PathBuf,
    data: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let mut script = None;
    let mut config = None;
    let mut out = PathBuf::from(".");
    let mut data = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next()?)),
            "--out" => out = PathBuf::from(args.next()?),
            "--data" => data = Some(PathBuf::from(args.next()?)),
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }
    Some(Args {
        script: script?,
        config,
        out,
        data,
    })
}

#[cfg(feature = "native")]
fn init_logging() {
    env_logger::init();
}

#[cfg(not(feature = "native"))]
fn init_logging() {}

fn main() -> ExitCode {
    init_logging();
    if std::env::args().any(|a| a == "--shortcuts") {
        ShortcutRegistry::print_all();
        return ExitCode::SUCCESS;
    }
    let Some(args) = parse_args() else {
        eprintln!(
            "usage: warboard <script.json> [--config <config.json>] [--out <dir>] [--data <dir>] [--shortcuts]"
        );
        return ExitCode::FAILURE;
    };
    log::info!("Starting warboard with {}", args.script.display());

    let result = Script::load(&args.script).and_then(|script| {
        let config = script.config(args.config.as_deref())?;
        let storage = match &args.data {
            Some(dir) => FileStorage::new(dir.clone()),
            None => FileStorage::default_location(),
        }
        .map_err(ScriptError::Storage)?;
        let mut battle = Battle::restore(storage, &config)?;
        let mut whiteboard = script.whiteboard_with(&config)?;
        script.run(&mut whiteboard, &mut battle, &args.out)
    });
    match result {
        Ok(report) => {
            for notice in &report.notices {
                eprintln!("{notice}");
            }
            for entry in &report.history {
                println!("turn {} {}: {}", entry.turn, entry.phase, entry.notes);
            }
            for path in &report.exports {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
