//! furnish
//!
//! Headless AR furniture session. Builds an in-memory scene with a box for
//! every catalog model and a scripted floor, replays a gesture script and
//! logs every placement, selection, rotation and deletion.
//!
//! Run with: cargo run -p furnish_runtime -- [config.toml] [script.toml]
//!       or: RUST_LOG=debug cargo run --bin furnish

mod error;
mod launch;
mod replay;
mod script;

use crate::error::ScriptResult;
use crate::launch::{Launch, CONFIG_ENV};
use crate::replay::Replay;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let launch = Launch::from_args(std::env::args().skip(1), std::env::var(CONFIG_ENV).ok());
    if let Err(e) = run(&launch) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(launch: &Launch) -> ScriptResult<()> {
    let config = launch.config()?;
    let script = launch.script()?;
    log::info!(
        "{} models, {} steps over {} ms",
        config.models.len(),
        script.steps.len(),
        script.duration_ms()
    );

    let mut replay = Replay::new(config, &script);
    replay.run(&script.steps);

    log::info!(
        "Replay finished with {} actions; session {:?}",
        replay.actions().len(),
        replay.session().state()
    );

    let summary = replay.summary();
    println!();
    println!("frames rendered : {}", summary.frames);
    println!("objects placed  : {}", summary.placed);
    println!("objects deleted : {}", summary.deleted);
    println!("rotation steps  : {}", summary.rotations);
    println!("objects in scene: {}", summary.remaining);
    Ok(())
}
