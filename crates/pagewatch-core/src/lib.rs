//! # pagewatch-core
//!
//! Kernel-interface primitives shared by the pagewatch diagnostic tools:
//! page-idle tracking via `/sys/kernel/mm/page_idle/bitmap`, per-page flag
//! scans via `/proc/kpageflags`, and synthetic memory pressure.
//!
//! Everything here drives kernel-global instrumentation, so the tools
//! assume exclusive use of the host while they run; any concurrent reader
//! or writer of the idle bitmap skews everyone's numbers. Most operations
//! also need root.
//!
//! ## Modules
//!
//! - `flags` - kpageflags words and the active-page classification
//! - `idlemap` - idle-bitmap drain and mark loops
//! - `kpageflags` - chunked whole-file scans, one word per physical page
//! - `stats` - MiB conversions and the sampler's per-round stats line
//! - `vm` - page-size query and the drop_caches control
//! - `pressure` - fill-then-sum pressure buffer
//! - `child` - forked pressure children
//! - `config` - the sampler's fixed schedule
//! - `error` - error types

#[cfg(not(target_os = "linux"))]
compile_error!("pagewatch drives Linux-only interfaces under /proc and /sys");

pub mod child;
pub mod config;
pub mod error;
pub mod flags;
pub mod idlemap;
pub mod kpageflags;
pub mod pressure;
pub mod stats;
pub mod vm;

// Re-exports for convenience
pub use child::PressureChild;
pub use config::{ChildEvent, ConfigError, SamplerConfig};
pub use error::{ProbeError, Result};
pub use flags::PageFlags;
pub use idlemap::IdleCounts;
pub use pressure::PressureBuf;
pub use stats::PageStats;
