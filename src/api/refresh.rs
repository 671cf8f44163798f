// ==========================================
// Poultry Metrics - refresh coordination
// ==========================================
// Overlapping refreshes are allowed; each gets a generation number.
// A finished refresh publishes only if no newer generation has
// published yet (last-started result that completes wins over
// anything older; stale results never overwrite newer ones).
// ==========================================

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Handle for one in-flight refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Published<T> {
    generation: u64,
    value: Option<T>,
}

pub struct RefreshCoordinator<T> {
    next_generation: AtomicU64,
    published: Mutex<Published<T>>,
}

impl<T> Default for RefreshCoordinator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RefreshCoordinator<T> {
    pub fn new() -> Self {
        Self {
            next_generation: AtomicU64::new(1),
            published: Mutex::new(Published {
                generation: 0,
                value: None,
            }),
        }
    }

    fn published(&self) -> MutexGuard<'_, Published<T>> {
        // the guarded data is always consistent, so a poisoned lock is reused
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a refresh
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket {
            generation: self.next_generation.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Offer a finished result; `false` when a newer refresh already published
    pub fn publish(&self, ticket: RefreshTicket, value: T) -> bool {
        let mut published = self.published();
        if ticket.generation <= published.generation {
            tracing::debug!(
                generation = ticket.generation,
                published = published.generation,
                "dropping stale refresh result"
            );
            return false;
        }
        published.generation = ticket.generation;
        published.value = Some(value);
        true
    }

    /// Generation of the value currently shown (0 = nothing yet)
    pub fn published_generation(&self) -> u64 {
        self.published().generation
    }

    /// Run one refresh end to end; failed refreshes publish nothing
    pub async fn refresh<F, E>(&self, fetch: F) -> Result<bool, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let ticket = self.begin();
        let value = fetch.await?;
        Ok(self.publish(ticket, value))
    }
}

impl<T: Clone> RefreshCoordinator<T> {
    /// Currently published value
    pub fn latest(&self) -> Option<T> {
        self.published().value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_result_wins_regardless_of_completion_order() {
        let coordinator = RefreshCoordinator::new();
        let first = coordinator.begin();
        let second = coordinator.begin();

        assert!(coordinator.publish(second, "second"));
        assert!(!coordinator.publish(first, "first"));
        assert_eq!(coordinator.latest(), Some("second"));
        assert_eq!(coordinator.published_generation(), second.generation());
    }

    #[test]
    fn test_in_order_completion_publishes_each() {
        let coordinator = RefreshCoordinator::new();
        assert_eq!(coordinator.latest(), None::<u32>);

        let first = coordinator.begin();
        assert!(coordinator.publish(first, 1));
        let second = coordinator.begin();
        assert!(coordinator.publish(second, 2));
        assert_eq!(coordinator.latest(), Some(2));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_value() {
        let coordinator = RefreshCoordinator::new();
        let ok: Result<bool, String> = coordinator.refresh(async { Ok(7) }).await;
        assert_eq!(ok, Ok(true));

        let err = coordinator
            .refresh(async { Err::<i32, _>("boom".to_string()) })
            .await;
        assert_eq!(err, Err("boom".to_string()));
        assert_eq!(coordinator.latest(), Some(7));
    }
}
