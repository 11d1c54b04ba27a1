use crate::core::normalizer::{Normalized, ShapeFailure};
use crate::models::CanonicalListing;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Token handed out when a fetch starts
///
/// Tickets are ordered: a response is only published if no later fetch has
/// already replaced the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Immutable view of one normalization pass
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// 0 until the first publish
    pub generation: u64,
    pub listings: Arc<Vec<CanonicalListing>>,
    pub failure: Option<ShapeFailure>,
}

/// Latest canonical listings, replaced wholesale on every fetch
#[derive(Debug, Default)]
pub struct ListingFeed {
    issued: AtomicU64,
    current: RwLock<Snapshot>,
}

impl ListingFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch and get its ticket
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Replace the snapshot unless a newer fetch already did
    ///
    /// Returns the published snapshot, or `None` when the response was stale
    /// and discarded.
    pub async fn publish(&self, ticket: FetchTicket, normalized: Normalized) -> Option<Snapshot> {
        let mut current = self.current.write().await;

        if ticket.0 <= current.generation {
            tracing::warn!(
                "Discarding stale listings response (generation {}, current {})",
                ticket.0,
                current.generation
            );
            return None;
        }

        *current = Snapshot {
            generation: ticket.0,
            listings: Arc::new(normalized.listings),
            failure: normalized.failure,
        };

        tracing::debug!(
            "Published {} listings as generation {}",
            current.listings.len(),
            current.generation
        );

        Some(current.clone())
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.current.read().await.clone()
    }
}
