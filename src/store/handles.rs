use std::sync::atomic::{AtomicU64, Ordering};

/// Issues open-file handle identifiers. No open-file table sits behind them;
/// the only guarantee is that a handle is never issued twice by one process.
pub struct HandleAllocator {
    next_fh: AtomicU64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self {
            next_fh: AtomicU64::new(1),
        }
    }

    pub fn alloc(&self) -> u64 {
        self.next_fh.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}
