use autoscale_cuckoo_filter::CuckooFilter;
use std::sync::{PoisonError, RwLock};

/// Expected capacity and false-positive rate.
/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Probabilistic set of registered emails. A negative answer is exact,
/// a positive one still has to be confirmed.
pub struct EmailFilter {
    inner: RwLock<CuckooFilter<str>>,
}

impl Default for EmailFilter {
    fn default() -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
        }
    }
}

impl EmailFilter {
    /// Check if an email might be registered (false positives possible)
    pub fn might_exist(&self, email: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(email)
    }

    pub fn insert(&self, email: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(email);
    }

    /// Insert a batch of normalized emails under one write lock
    pub fn insert_batch(&self, emails: &[String]) {
        let mut filter = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for email in emails {
            filter.add(email);
        }
    }
}
