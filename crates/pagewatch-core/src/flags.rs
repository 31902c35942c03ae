//! Page-flag words from `/proc/kpageflags`.
//!
//! The kernel exports one 64-bit word per physical page frame, bit-encoded
//! per `Documentation/admin-guide/mm/pagemap.rst`. Only the four bits the
//! activity classification needs are named here.

/// Bit-encoded kernel flags for one physical page frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFlags(u64);

/// KPF_UPTODATE
const UPTODATE_BIT: u32 = 3;
/// KPF_LRU
const LRU_BIT: u32 = 5;
/// KPF_ACTIVE
const ACTIVE_BIT: u32 = 6;
/// KPF_IDLE
const IDLE_BIT: u32 = 25;

impl PageFlags {
    /// uptodate | lru | active; a page must carry all three to count as
    /// part of the working set.
    pub const RESIDENT_ACTIVE_MASK: u64 =
        1 << UPTODATE_BIT | 1 << LRU_BIT | 1 << ACTIVE_BIT;

    /// The idle-tracking bit. Set means untouched since the bitmap was
    /// last written.
    pub const IDLE_MASK: u64 = 1 << IDLE_BIT;

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn uptodate(self) -> bool {
        self.0 & (1 << UPTODATE_BIT) != 0
    }

    pub const fn lru(self) -> bool {
        self.0 & (1 << LRU_BIT) != 0
    }

    pub const fn active(self) -> bool {
        self.0 & (1 << ACTIVE_BIT) != 0
    }

    pub const fn idle(self) -> bool {
        self.0 & Self::IDLE_MASK != 0
    }

    /// A page is classified active iff it is uptodate, on an LRU list, on
    /// the active list, and its idle bit is clear. Anything else, from
    /// holes (flag word 0) to idle-but-resident pages, counts as idle.
    pub const fn is_active(self) -> bool {
        self.0 & Self::RESIDENT_ACTIVE_MASK == Self::RESIDENT_ACTIVE_MASK
            && self.0 & Self::IDLE_MASK == 0
    }
}
