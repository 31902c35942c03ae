//! Idle-bitmap access via `/sys/kernel/mm/page_idle/bitmap`.
//!
//! The bitmap exposes one idle bit per physical page frame, packed into
//! 64-bit words. Reading returns the current flags and 0 at the end of the
//! bitmap; writing a set bit marks the page idle, and the kernel fails the
//! write with ENXIO once the offset is past the last frame. Both loops
//! here treat their end condition as success and every other error as
//! fatal, with no retries.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

use byteorder::{ByteOrder, NativeEndian};

use crate::error::{ProbeError, Result};
use crate::stats::bits_to_mib;

/// One idle bit per page frame, 64 bits per word.
pub const BITMAP_PATH: &str = "/sys/kernel/mm/page_idle/bitmap";

const WORD_BYTES: usize = 8;
const WORD_BITS: u64 = 64;

/// Pattern marking all 64 pages of one word idle.
const ALL_IDLE: [u8; WORD_BYTES] = [0xff; WORD_BYTES];

/// Totals accumulated while draining the bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdleCounts {
    /// Bits seen: 64 per word read.
    pub total_bits: u64,
    /// Bits that were set, i.e. pages idle since the last mark.
    pub set_bits: u64,
}

impl IdleCounts {
    /// Bits that were clear, i.e. pages touched since the last mark.
    /// Computed at bit granularity so the MiB figure is exact rather than
    /// the difference of two truncated divisions.
    pub fn clear_bits(&self) -> u64 {
        self.total_bits - self.set_bits
    }

    pub fn total_mib(&self) -> u64 {
        bits_to_mib(self.total_bits)
    }

    pub fn active_mib(&self) -> u64 {
        bits_to_mib(self.clear_bits())
    }

    pub fn idle_mib(&self) -> u64 {
        bits_to_mib(self.set_bits)
    }
}

/// Drain `reader` to end-of-file one word at a time, tallying total and
/// set bits. A zero-length read ends the drain cleanly; any I/O error,
/// EINTR included, aborts it.
pub fn drain_counts<R: Read>(mut reader: R) -> io::Result<IdleCounts> {
    let mut counts = IdleCounts::default();
    loop {
        // Re-zeroed each pass so a short read leaves the tail bytes clear.
        let mut raw = [0u8; WORD_BYTES];
        let n = reader.read(&mut raw)?;
        if n == 0 {
            return Ok(counts);
        }
        counts.total_bits += WORD_BITS;
        counts.set_bits += u64::from(NativeEndian::read_u64(&raw).count_ones());
    }
}

/// Drain `reader` to end-of-file, discarding the contents. Returns the
/// number of words read. The sampler uses this to latch idle state in the
/// kernel without caring about the values.
pub fn drain_discard<R: Read>(mut reader: R) -> io::Result<u64> {
    let mut words = 0u64;
    loop {
        let mut raw = [0u8; WORD_BYTES];
        let n = reader.read(&mut raw)?;
        if n == 0 {
            return Ok(words);
        }
        words += 1;
    }
}

/// Write all-ones words into `writer` until the bitmap is exhausted.
/// Returns the number of bits written (8 per byte accepted). A zero-length
/// write or ENXIO ends the loop; anything else is fatal.
pub fn mark_all<W: Write>(mut writer: W) -> io::Result<u64> {
    let mut bits = 0u64;
    loop {
        match writer.write(&ALL_IDLE) {
            Ok(0) => return Ok(bits),
            Ok(n) => bits += 8 * n as u64,
            Err(e) if e.raw_os_error() == Some(libc::ENXIO) => return Ok(bits),
            Err(e) => return Err(e),
        }
    }
}

/// Read the whole live bitmap and report its totals.
pub fn read_counts() -> Result<IdleCounts> {
    let file = File::open(BITMAP_PATH).map_err(|e| ProbeError::open(BITMAP_PATH, e))?;
    drain_counts(file).map_err(|e| ProbeError::read(BITMAP_PATH, e))
}

/// Mark every physical page idle. Returns the number of bits written.
pub fn set_all_idle() -> Result<u64> {
    let file = OpenOptions::new()
        .write(true)
        .open(BITMAP_PATH)
        .map_err(|e| ProbeError::open(BITMAP_PATH, e))?;
    mark_all(file).map_err(|e| ProbeError::write(BITMAP_PATH, e))
}

/// Read the whole live bitmap and throw the contents away.
pub fn drain() -> Result<u64> {
    let file = File::open(BITMAP_PATH).map_err(|e| ProbeError::open(BITMAP_PATH, e))?;
    drain_discard(file).map_err(|e| ProbeError::read(BITMAP_PATH, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn bitmap_bytes(words: &[u64]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(words.len() * WORD_BYTES);
        for w in words {
            bytes.extend_from_slice(&w.to_ne_bytes());
        }
        bytes
    }

    /// Fails every read with a non-EOF error.
    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(libc::EIO))
        }
    }

    /// Accepts `words` full writes, then reports end-of-file.
    struct CappedSink {
        words: usize,
    }

    impl Write for CappedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.words == 0 {
                return Ok(0);
            }
            self.words -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Accepts `words` full writes, then fails like the live bitmap does
    /// once the offset runs past the last page frame.
    struct EnxioSink {
        words: usize,
    }

    impl Write for EnxioSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.words == 0 {
                return Err(io::Error::from_raw_os_error(libc::ENXIO));
            }
            self.words -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fails every write with a permission error.
    struct DeniedSink;

    impl Write for DeniedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(libc::EACCES))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn drain_tallies_total_and_set_bits() {
        let words = [0u64, u64::MAX, 0xff, 1, 1 << 63];
        let counts = drain_counts(Cursor::new(bitmap_bytes(&words))).unwrap();
        assert_eq!(counts.total_bits, 5 * 64);
        assert_eq!(counts.set_bits, 64 + 8 + 1 + 1);
        assert_eq!(counts.clear_bits(), 5 * 64 - 74);
    }

    // End-of-file and read errors take different paths: a zero-length
    // read is the only clean terminator, everything else aborts the run.

    #[test]
    fn drain_of_empty_source_is_zero_not_error() {
        let counts = drain_counts(Cursor::new(Vec::new())).unwrap();
        assert_eq!(counts, IdleCounts::default());
    }

    #[test]
    fn drain_error_is_fatal() {
        assert!(drain_counts(BrokenReader).is_err());
    }

    #[test]
    fn mib_figures_come_from_bit_level_subtraction() {
        // 9 words, 130 set bits: the clear count in MiB must equal
        // (576 - 130) / 256, not 576/256 - 130/256.
        let mut words = vec![u64::MAX, u64::MAX];
        words.push(0b11);
        words.resize(9, 0);
        let counts = drain_counts(Cursor::new(bitmap_bytes(&words))).unwrap();
        assert_eq!(counts.total_bits, 576);
        assert_eq!(counts.set_bits, 130);
        assert_eq!(counts.active_mib(), (576 - 130) / 256);
        assert_eq!(counts.active_mib(), 1);
        assert_eq!(counts.idle_mib(), 0);
        assert_eq!(counts.total_mib(), 2);
    }

    #[test]
    fn half_set_bitmap_splits_evenly() {
        let mut words = vec![u64::MAX; 512];
        words.resize(1024, 0);
        let counts = drain_counts(Cursor::new(bitmap_bytes(&words))).unwrap();
        assert_eq!(counts.total_mib(), 256);
        assert_eq!(counts.active_mib(), 128);
        assert_eq!(counts.idle_mib(), 128);
    }

    #[test]
    fn discard_counts_words() {
        let words = vec![0xdead_beefu64; 37];
        assert_eq!(
            drain_discard(Cursor::new(bitmap_bytes(&words))).unwrap(),
            37
        );
    }

    #[test]
    fn mark_stops_at_end_of_file() {
        assert_eq!(mark_all(CappedSink { words: 16 }).unwrap(), 16 * 64);
    }

    #[test]
    fn mark_treats_enxio_as_end_of_bitmap() {
        assert_eq!(mark_all(EnxioSink { words: 16 }).unwrap(), 16 * 64);
        assert_eq!(mark_all(EnxioSink { words: 0 }).unwrap(), 0);
    }

    #[test]
    fn mark_propagates_other_errors() {
        let err = mark_all(DeniedSink).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EACCES));
    }

    #[test]
    fn mark_counts_short_writes_by_byte() {
        struct ShortSink {
            sent: bool,
        }
        impl Write for ShortSink {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                if self.sent {
                    return Ok(0);
                }
                self.sent = true;
                Ok(4)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        assert_eq!(mark_all(ShortSink { sent: false }).unwrap(), 32);
    }
}
