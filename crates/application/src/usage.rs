use crashlens_domain::UsageCounter;
use tracing::{info, warn};

use crate::UsageStore;

/// Per-device cap on generated reports, backed by a [`UsageStore`].
pub struct UsageGovernor {
    store: Box<dyn UsageStore>,
}

impl UsageGovernor {
    pub fn new(store: Box<dyn UsageStore>) -> Self {
        Self { store }
    }

    /// Never fails: an unreadable store counts as zero uses.
    pub fn read(&self) -> UsageCounter {
        match self.store.read() {
            Ok(stored) => UsageCounter::parse_stored(stored.as_deref()),
            Err(error) => {
                warn!(error = %error, "usage counter unreadable, assuming 0");
                UsageCounter::default()
            }
        }
    }

    pub fn can_proceed(&self, counter: UsageCounter) -> bool {
        counter.can_proceed()
    }

    /// Persists `counter + 1`. A failed write is logged and the incremented
    /// value is still returned.
    pub fn record_success(&self, counter: UsageCounter) -> UsageCounter {
        let next = counter.incremented();
        match self.store.write(&next.to_stored()) {
            Ok(()) => info!(count = next.get(), remaining = next.remaining(), "usage recorded"),
            Err(error) => warn!(error = %error, count = next.get(), "usage counter not persisted"),
        }
        next
    }

    pub fn remaining(&self, counter: UsageCounter) -> u32 {
        counter.remaining()
    }
}
