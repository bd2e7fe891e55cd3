use super::{
    CellWrite, RowRange, StoreCapabilities, StoreFailureClassifier, StoreMetadata, StoreResult,
    TabularStore,
};
use crate::error::{SyncError, SyncResult};
use crate::models::{RawRow, StoreRef};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Classified, optionally time-bounded access to a [`TabularStore`].
///
/// Every store call made by this crate goes through here. A call that times
/// out is reported as a transient error: the backend may still apply it, so
/// callers should re-read before retrying.
#[derive(Debug, Clone)]
pub struct StoreGateway {
    store: Arc<dyn TabularStore>,
    classifier: StoreFailureClassifier,
    request_timeout: Option<Duration>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn TabularStore>, request_timeout: Option<Duration>) -> Self {
        Self {
            store,
            classifier: StoreFailureClassifier::new(),
            request_timeout,
        }
    }

    pub fn capabilities(&self) -> StoreCapabilities {
        self.store.capabilities()
    }

    pub async fn describe(&self, store_ref: &StoreRef) -> SyncResult<StoreMetadata> {
        self.guarded("describe", store_ref, self.store.describe(store_ref))
            .await
    }

    /// Read several ranges in one round trip
    pub async fn read_ranges(
        &self,
        store_ref: &StoreRef,
        ranges: &[RowRange],
    ) -> SyncResult<Vec<Vec<RawRow>>> {
        let results = self
            .guarded("read_ranges", store_ref, self.store.read_ranges(store_ref, ranges))
            .await?;
        if results.len() != ranges.len() {
            return Err(SyncError::transient(
                "read_ranges",
                format!(
                    "store returned {} value ranges for {} requested",
                    results.len(),
                    ranges.len()
                ),
            ));
        }
        debug!(
            store = %store_ref,
            ranges = ?ranges.iter().map(|r| r.to_a1(&store_ref.sheet)).collect::<Vec<_>>(),
            "Read store ranges"
        );
        Ok(results)
    }

    /// Every row of the sheet, header first
    pub async fn read_all(&self, store_ref: &StoreRef) -> SyncResult<Vec<RawRow>> {
        let mut results = self.read_ranges(store_ref, &[RowRange::all()]).await?;
        Ok(results.pop().unwrap_or_default())
    }

    pub async fn write_cells(&self, store_ref: &StoreRef, cells: &[CellWrite]) -> SyncResult<()> {
        self.guarded("write_cells", store_ref, self.store.write_cells(store_ref, cells))
            .await
    }

    pub async fn write_cell(&self, store_ref: &StoreRef, cell: &CellWrite) -> SyncResult<()> {
        self.guarded("write_cell", store_ref, self.store.write_cell(store_ref, cell))
            .await
    }

    async fn guarded<T, F>(&self, operation: &str, store_ref: &StoreRef, request: F) -> SyncResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let outcome = match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(SyncError::transient(
                        operation,
                        format!(
                            "no acknowledgement from {store_ref} within {}ms; the request may \
                             have applied, re-read the pending list before retrying",
                            limit.as_millis()
                        ),
                    ))
                }
            },
            None => request.await,
        };
        outcome.map_err(|failure| self.classifier.classify(operation, store_ref, failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::store::{InMemoryStore, StoreFailure};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StalledStore;

    #[async_trait]
    impl TabularStore for StalledStore {
        async fn describe(&self, _store: &StoreRef) -> StoreResult<StoreMetadata> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(StoreFailure::unavailable("unreachable"))
        }

        async fn read_ranges(
            &self,
            _store: &StoreRef,
            _ranges: &[RowRange],
        ) -> StoreResult<Vec<Vec<RawRow>>> {
            Ok(Vec::new())
        }

        async fn write_cells(&self, _store: &StoreRef, _cells: &[CellWrite]) -> StoreResult<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_transient() {
        let gateway = StoreGateway::new(Arc::new(StalledStore), Some(Duration::from_millis(50)));
        let err = gateway
            .write_cells(&StoreRef::spreadsheet("abc"), &[])
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("may have applied"));
    }

    #[tokio::test]
    async fn test_short_range_response_is_transient() {
        let gateway = StoreGateway::new(Arc::new(StalledStore), None);
        let err = gateway
            .read_ranges(&StoreRef::spreadsheet("abc"), &[RowRange::all()])
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transient);
    }

    #[tokio::test]
    async fn test_failures_are_classified() {
        let gateway = StoreGateway::new(Arc::new(InMemoryStore::new()), None);
        let err = gateway
            .describe(&StoreRef::spreadsheet("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
