//! Idle-bitmap reader.
//!
//! Streams /sys/kernel/mm/page_idle/bitmap to the end and prints one line:
//! how much memory the bitmap covers and how it splits into active (idle
//! bit clear, touched since the last mark) and idle, in MiB assuming
//! 4 KiB pages.
//!
//! Run: sudo ./target/release/idlestat

use std::process;
use std::time::Instant;

use log::debug;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use pagewatch_core::idlemap;
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
    let counts = idlemap::read_counts()?;
    debug!(
        "drained {} bitmap words in {} ms",
        counts.total_bits / 64,
        start.elapsed().as_millis()
    );

    println!(
        "total: {}MiB active: {}MiB idle: {}MiB",
        counts.total_mib(),
        counts.active_mib(),
        counts.idle_mib()
    );
    Ok(())
}
