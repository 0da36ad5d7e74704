use stakegate_core::BlockHeight;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the chain's block height.
///
/// The ledger never reads wall-clock time; whatever drives the chain
/// (node ticker, consensus layer, test harness) implements this and hands
/// it in at construction. Heights must be non-decreasing.
pub trait BlockClock: Send + Sync {
    fn current_height(&self) -> BlockHeight;
}

/// Shared atomic height counter. Cloning yields another handle onto the
/// same counter, so the node ticker and the ledger observe one height.
#[derive(Clone, Default)]
pub struct SharedClock {
    height: Arc<AtomicU64>,
}

impl SharedClock {
    pub fn starting_at(height: BlockHeight) -> Self {
        Self {
            height: Arc::new(AtomicU64::new(height)),
        }
    }

    /// Advance the chain by `blocks` and return the new height.
    /// Saturates at the maximum height instead of wrapping backward.
    pub fn advance(&self, blocks: u64) -> BlockHeight {
        let mut current = self.height.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(blocks);
            match self
                .height
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}

impl BlockClock for SharedClock {
    fn current_height(&self) -> BlockHeight {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_is_constant_without_advance() {
        let clock = SharedClock::starting_at(7);
        assert_eq!(clock.current_height(), 7);
        assert_eq!(clock.current_height(), 7);
    }

    #[test]
    fn advance_is_monotonic_and_shared() {
        let clock = SharedClock::starting_at(0);
        let handle = clock.clone();
        assert_eq!(clock.advance(3), 3);
        assert_eq!(handle.current_height(), 3);
        assert_eq!(handle.advance(1), 4);
        assert_eq!(clock.current_height(), 4);
    }

    #[test]
    fn advance_saturates_at_max_height() {
        let clock = SharedClock::starting_at(u64::MAX - 1);
        assert_eq!(clock.advance(5), u64::MAX);
        assert_eq!(clock.current_height(), u64::MAX);
        assert_eq!(clock.advance(1), u64::MAX);
    }
}
