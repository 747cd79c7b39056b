use crate::matcher::Matcher;

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

/// A [`Matcher`] handle shared across request workers. Rule
/// redeployment builds a fresh matcher and publishes it atomically, so
/// in-flight matches keep the registry they started with.
pub struct SharedMatcher<V> {
    inner: ArcSwap<Matcher<V>>,
}

impl<V> SharedMatcher<V> {
    pub fn new(matcher: Matcher<V>) -> Self {
        Self {
            inner: ArcSwap::from_pointee(matcher),
        }
    }

    /// The current registry; the returned handle stays valid across a
    /// concurrent [`publish`](Self::publish).
    pub fn load(&self) -> Arc<Matcher<V>> {
        self.inner.load_full()
    }

    pub fn publish(&self, matcher: Matcher<V>) {
        debug!("publishing rebuilt matcher");
        self.inner.store(Arc::new(matcher));
    }
}

impl<V> Default for SharedMatcher<V> {
    fn default() -> Self {
        Self::new(Matcher::new())
    }
}
