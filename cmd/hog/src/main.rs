//! Standalone memory-pressure generator.
//!
//! Holds one fixed 1 GiB buffer and cycles it forever: overwrite every
//! byte with a fresh random value, read the whole buffer back into a
//! checksum, sleep a second. Both halves of each cycle print, so a stall
//! between the fill line and the sum line points at reclaim activity.
//! Runs until killed; no root needed.
//!
//! Run: ./target/release/hog

use std::io::{self, Write};
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use pagewatch_core::pressure::{PressureBuf, DEFAULT_PRESSURE_BYTES};
use pagewatch_core::{ProbeError, Result};

/// Pause between pressure cycles.
const CYCLE_SLEEP: Duration = Duration::from_secs(1);

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
    let mut buf = PressureBuf::alloc(DEFAULT_PRESSURE_BYTES)?;

    loop {
        let fill: u8 = rand::random();
        // The fill line must land before the cycle starts for the stall
        // timing to mean anything.
        print!("fill buffer with value: 0x{:02x}... ", fill);
        io::stdout()
            .flush()
            .map_err(|e| ProbeError::write("stdout", e))?;

        let start = Instant::now();
        let sum = buf.cycle(fill);
        debug!("cycle took {} ms", start.elapsed().as_millis());

        println!("read buffer sum: 0x{:016x}", sum);
        thread::sleep(CYCLE_SLEEP);
    }
}
