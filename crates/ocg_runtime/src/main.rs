//! OCGCore duel runner
//!
//! Loads the native library, wraps it in the event emitter, runs one duel
//! and prints a summary.
//!
//! Run with: cargo run --bin ocg-duel -- [--config <file>] [library path]

mod boot_config;
mod duel_runner;
mod error;
mod trace;

use boot_config::RuntimeConfig;
use duel_runner::DuelRunner;
use error::Result;
use ocg_event::{attach_call_logging, OcgCoreEmitter};
use trace::CallTrace;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = RuntimeConfig::load(&args)?;

    let emitter = OcgCoreEmitter::load(config.library_path()?)?;
    log::info!(
        "OCGCore ready: {} ({} entry points)",
        emitter.inner().path().display(),
        emitter.inner().info.symbols
    );

    if config.trace.log_calls {
        attach_call_logging(&emitter);
    }
    if let Some(path) = &config.trace.file {
        CallTrace::create(path)?.attach(&emitter);
    }

    let summary = DuelRunner::new(&emitter, &config.duel).run()?;
    println!("{}", summary);
    Ok(())
}
