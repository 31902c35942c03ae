//! Synthetic memory pressure.
//!
//! A pressure buffer is a fixed heap allocation cycled through full
//! write-then-read passes: fill every byte with one value, then read every
//! byte back into a checksum. One cycle touches every backing page twice,
//! which is what flips kpageflags and idle-bitmap state for the whole
//! region.

use std::hint::black_box;

use crate::error::{ProbeError, Result};

/// Default pressure allotment: 1 GiB.
pub const DEFAULT_PRESSURE_BYTES: usize = 1024 * 1024 * 1024;

/// A heap buffer sized for generating real page traffic.
#[derive(Debug)]
pub struct PressureBuf {
    buf: Vec<u8>,
}

impl PressureBuf {
    /// Reserve and zero the full buffer up front. Reservation failure is
    /// reported to the caller instead of aborting the process.
    pub fn alloc(bytes: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes)
            .map_err(|_| ProbeError::Alloc { bytes })?;
        buf.resize(bytes, 0);
        Ok(Self { buf })
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// One pressure cycle: overwrite the whole buffer with `fill`, then
    /// sum every byte back. `black_box` on both passes keeps the compiler
    /// from folding the loop into `len * fill`.
    pub fn cycle(&mut self, fill: u8) -> u64 {
        self.buf.fill(fill);
        black_box(self.buf.as_mut_slice());
        let sum: u64 = self.buf.iter().map(|&b| u64::from(b)).sum();
        black_box(sum)
    }
}
