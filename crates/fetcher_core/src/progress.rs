/// Byte counters of the response currently being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl TransferProgress {
    /// Rounded percentage, or `None` when the total size is unknown.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total?;
        if total == 0 {
            return Some(100);
        }
        let scaled = (u128::from(self.loaded.min(total)) * 100 + u128::from(total) / 2)
            / u128::from(total);
        Some(scaled as u8)
    }

    /// Record a new byte count; regressions are ignored. Returns `true` when anything changed.
    pub fn advance(&mut self, loaded: u64, total: Option<u64>) -> bool {
        if loaded < self.loaded {
            return false;
        }
        let next = Self {
            loaded,
            total: total.or(self.total),
        };
        let changed = next != *self;
        *self = next;
        changed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
