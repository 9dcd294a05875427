use std::collections::HashMap;

/// Proof that a decoded page is locked in its source.
///
/// Leases are not `Clone`: the only way to end one is to hand it back through
/// [`FrameSource::release_page`](crate::FrameSource::release_page).
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "a page lease must be returned to the source that issued it"]
pub struct PageLease {
    id: u64,
    page: u32,
}

impl PageLease {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Bookkeeping for outstanding page leases, shared by the built-in sources.
#[derive(Debug, Default)]
pub struct PageArena {
    next_id: u64,
    outstanding: HashMap<u64, u32>,
}

impl PageArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&mut self, page: u32) -> PageLease {
        let id = self.next_id;
        self.next_id += 1;
        self.outstanding.insert(id, page);
        PageLease { id, page }
    }

    /// Returns `false` for a lease this arena did not issue or already released.
    pub fn release(&mut self, lease: PageLease) -> bool {
        if self.outstanding.remove(&lease.id).is_some() {
            return true;
        }
        tracing::warn!(page = lease.page, id = lease.id, "release of unknown page lease");
        false
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_locked(&self, page: u32) -> bool {
        self.outstanding.values().any(|&p| p == page)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/arena.rs"]
mod tests;
