//! Page accounting and the sampler's per-round stats line.

use std::fmt;

/// MiB spanned by a run of idle-bitmap bits. One bit covers one page, and
/// the bitmap tools assume 4 KiB pages, so 256 bits cover a MiB.
pub fn bits_to_mib(bits: u64) -> u64 {
    bits / 256
}

/// Truncating page-count to MiB conversion at the given page size.
pub fn pages_to_mib(pages: u64, page_size: u64) -> u64 {
    pages * page_size / (1024 * 1024)
}

/// One sampling round's page accounting.
///
/// `npages` is the physical page count established at startup; `nactive`
/// comes from the round's kpageflags scan and everything not active is
/// reported idle, so the three totals always add up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    npages: u64,
    nactive: u64,
    page_size: u64,
}

impl PageStats {
    pub fn new(npages: u64, nactive: u64, page_size: u64) -> Self {
        Self {
            npages,
            nactive,
            page_size,
        }
    }

    pub fn npages(&self) -> u64 {
        self.npages
    }

    pub fn nactive(&self) -> u64 {
        self.nactive
    }

    /// Pages not classified active this round.
    pub fn nidle(&self) -> u64 {
        self.npages - self.nactive
    }
}

impl fmt::Display for PageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nidle = self.nidle();
        write!(
            f,
            "active/idle/total: {}/{}/{}MiB ({}/{}/{} pages)",
            pages_to_mib(self.nactive, self.page_size),
            pages_to_mib(nidle, self.page_size),
            pages_to_mib(self.npages, self.page_size),
            self.nactive,
            nidle,
            self.npages
        )
    }
}
