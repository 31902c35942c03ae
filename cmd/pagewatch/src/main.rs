//! Page-activity sampler.
//!
//! Measures how the system's working set responds to synthetic memory
//! pressure. After a baseline kpageflags scan, the page cache is dropped
//! and the idle bitmap marked and latched; a hundred half-second rounds
//! then each rescan /proc/kpageflags and print one stats line while two
//! forked 1 GiB pressure children come and go on a fixed schedule (starts
//! at rounds 10 and 30, stops at 50 and 70).
//!
//! The host should be otherwise quiet while this runs: every number is
//! system-global, so concurrent activity lands in the stats.
//!
//! Run: sudo ./target/release/pagewatch

use std::process;
use std::thread;
use std::time::Instant;

use log::{debug, info};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use pagewatch_core::child::PressureChild;
use pagewatch_core::config::{ChildEvent, SamplerConfig};
use pagewatch_core::stats::PageStats;
use pagewatch_core::{idlemap, kpageflags, vm};
use pagewatch_core::Result;

fn main() {
    let _ = TermLogger::init(
        LevelFilter::Debug,
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
    let cfg = SamplerConfig::new();
    let page_size = vm::page_size()?;

    let npages = kpageflags::total_pages()?;
    info!("{} physical pages of {} bytes", npages, page_size);

    println!("init {}", sample(npages, page_size)?);

    println!("dropping the page cache");
    vm::drop_page_cache()?;
    thread::sleep(cfg.settle);

    println!("setting / reading idle bitmap");
    let marked = idlemap::set_all_idle()?;
    debug!("marked {} bits idle", marked);
    thread::sleep(cfg.settle);
    let latched = idlemap::drain()?;
    debug!("latched {} bitmap words", latched);
    thread::sleep(cfg.settle);

    let mut first: Option<PressureChild> = None;
    let mut second: Option<PressureChild> = None;

    for round in 1..=cfg.rounds {
        match cfg.event_at(round) {
            Some(ChildEvent::StartFirst) => {
                println!("allocate 1GB");
                let child = PressureChild::spawn(cfg.pressure_bytes)?;
                info!("first pressure child up (pid {})", child.pid());
                first = Some(child);
            }
            Some(ChildEvent::StartSecond) => {
                println!("allocate 1GB");
                let child = PressureChild::spawn(cfg.pressure_bytes)?;
                info!("second pressure child up (pid {})", child.pid());
                second = Some(child);
            }
            Some(ChildEvent::StopFirst) => {
                println!("free 1GB");
                if let Some(child) = first.take() {
                    info!("stopping first pressure child (pid {})", child.pid());
                    child.stop()?;
                }
            }
            Some(ChildEvent::StopSecond) => {
                println!("free 1GB");
                if let Some(child) = second.take() {
                    info!("stopping second pressure child (pid {})", child.pid());
                    child.stop()?;
                }
            }
            None => {}
        }

        println!("#{:03} {}", round, sample(npages, page_size)?);
        thread::sleep(cfg.round_interval);
    }

    Ok(())
}

/// One full kpageflags rescan. The scan cost is part of what the tool
/// observes, so the active count is never cached between rounds.
fn sample(npages: u64, page_size: u64) -> Result<PageStats> {
    let start = Instant::now();
    let nactive = kpageflags::active_pages()?;
    debug!("kpageflags scan took {} ms", start.elapsed().as_millis());
    Ok(PageStats::new(npages, nactive, page_size))
}
