//! Chunked scans over `/proc/kpageflags`.
//!
//! The file carries one 64-bit flag word per physical page frame, in frame
//! order. Every count here streams the whole file again on each call; a
//! full rescan is the unit of measurement for the sampler, so nothing is
//! cached between calls.

use std::fs::File;
use std::io::{self, Read};

use byteorder::{ByteOrder, NativeEndian};

use crate::error::{ProbeError, Result};
use crate::flags::PageFlags;

pub const KPAGEFLAGS_PATH: &str = "/proc/kpageflags";

/// Words per read(2) call: 8 KiB chunks keep the scan in a few syscalls
/// per MiB of pages without buffering the whole file.
pub const CHUNK_WORDS: usize = 1024;

/// Stream `reader` to end-of-file in chunks of `chunk_words` flag words,
/// calling `visit` once per complete word. A trailing fragment shorter
/// than a word is dropped; the live interface never produces one.
pub fn for_each_word<R: Read>(
    mut reader: R,
    chunk_words: usize,
    mut visit: impl FnMut(u64),
) -> io::Result<()> {
    let mut raw = vec![0u8; chunk_words * 8];
    let mut words = vec![0u64; chunk_words];
    loop {
        let n = reader.read(&mut raw)?;
        if n == 0 {
            return Ok(());
        }
        let full = n / 8;
        NativeEndian::read_u64_into(&raw[..full * 8], &mut words[..full]);
        for &w in &words[..full] {
            visit(w);
        }
    }
}

/// Number of flag words in the stream, one per physical page.
pub fn count_pages<R: Read>(reader: R, chunk_words: usize) -> io::Result<u64> {
    let mut pages = 0u64;
    for_each_word(reader, chunk_words, |_| pages += 1)?;
    Ok(pages)
}

/// Number of flag words classified active, per [`PageFlags::is_active`].
pub fn count_active<R: Read>(reader: R, chunk_words: usize) -> io::Result<u64> {
    let mut active = 0u64;
    for_each_word(reader, chunk_words, |w| {
        if PageFlags::new(w).is_active() {
            active += 1;
        }
    })?;
    Ok(active)
}

/// Scan the live interface once and count every physical page frame.
pub fn total_pages() -> Result<u64> {
    let file = File::open(KPAGEFLAGS_PATH).map_err(|e| ProbeError::open(KPAGEFLAGS_PATH, e))?;
    count_pages(file, CHUNK_WORDS).map_err(|e| ProbeError::read(KPAGEFLAGS_PATH, e))
}

/// Scan the live interface once and count the currently-active pages.
pub fn active_pages() -> Result<u64> {
    let file = File::open(KPAGEFLAGS_PATH).map_err(|e| ProbeError::open(KPAGEFLAGS_PATH, e))?;
    count_active(file, CHUNK_WORDS).map_err(|e| ProbeError::read(KPAGEFLAGS_PATH, e))
}
