use crate::CacheKey;

/// Outcome of a bulk cache operation.
///
/// Bulk operations keep going past individual failures; this is where the
/// failures end up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// Number of entries processed without error.
    pub succeeded: usize,
    /// Keys of the entries that failed, in processing order.
    pub failed: Vec<CacheKey>,
}
impl BulkReport {
    pub(crate) fn success(&mut self) {
        self.succeeded += 1;
    }

    pub(crate) fn failure(&mut self, key: CacheKey) {
        self.failed.push(key);
    }

    /// Aggregate failure count.
    pub fn failures(&self) -> usize {
        self.failed.len()
    }

    /// Total entries attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    /// `true` when nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
