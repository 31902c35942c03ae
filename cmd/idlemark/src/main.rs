//! Idle-bitmap writer.
//!
//! Marks every physical page idle by writing all-ones words through
//! /sys/kernel/mm/page_idle/bitmap until the kernel reports the end, then
//! prints how much memory was marked, in MiB assuming 4 KiB pages. A later
//! idlestat run shows which pages were touched in between.
//!
//! Run: sudo ./target/release/idlemark

use std::process;
use std::time::Instant;

use log::debug;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use pagewatch_core::idlemap;
use pagewatch_core::stats::bits_to_mib;
use pagewatch_core::Result;

fn main() {
    let _ = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let start = Instant::now();
    let bits = idlemap::set_all_idle()?;
    debug!(
        "wrote {} bitmap words in {} ms",
        bits / 64,
        start.elapsed().as_millis()
    );

    println!("marked as idle: {}MiB", bits_to_mib(bits));
    Ok(())
}
