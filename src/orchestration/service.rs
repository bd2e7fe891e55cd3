//! # Contact Sync Service
//!
//! Entry point for the three stateless operations and for starting calling
//! sessions. The service receives its store capability, configuration and
//! clock at construction and never reads ambient global state.

use super::session::CallingSession;
use super::types::{PendingListing, StoreProbe};
use crate::config::SyncConfig;
use crate::constants::operations;
use crate::error::{SyncError, SyncResult};
use crate::log_sync;
use crate::models::{RowAddress, StoreRef};
use crate::schema::{AliasTable, SchemaNormalizer};
use crate::services::{
    BatchAllocator, CompletionReceipt, CompletionWriter, PendingSet, PendingSetFilter,
};
use crate::store::{RowRange, StoreGateway, TabularStore};
use crate::time::Clock;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::debug;

/// Components shared by the service and every session it starts
#[derive(Debug)]
pub(crate) struct SyncEngine {
    pub(crate) gateway: StoreGateway,
    pub(crate) normalizer: SchemaNormalizer,
    pub(crate) filter: PendingSetFilter,
    pub(crate) allocator: BatchAllocator,
    pub(crate) writer: CompletionWriter,
    rng: Mutex<StdRng>,
    default_store: Option<StoreRef>,
}

impl SyncEngine {
    /// Use `store_ref` unless it is blank, then fall back to the configured default
    pub(crate) fn resolve_store(&self, store_ref: &StoreRef) -> SyncResult<StoreRef> {
        if !store_ref.is_blank() {
            return Ok(store_ref.clone());
        }
        self.default_store
            .clone()
            .ok_or_else(|| SyncError::validation("store reference must name a spreadsheet"))
    }

    /// One full read of the sheet, normalized and filtered
    pub(crate) async fn read_pending(&self, store_ref: &StoreRef) -> SyncResult<PendingSet> {
        let rows = self.gateway.read_all(store_ref).await?;
        debug!(store = %store_ref, rows = rows.len(), "Read sheet snapshot");
        self.filter.assess(&self.normalizer, &rows)
    }

    /// Independent generator for one session
    pub(crate) fn session_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.rng.lock().gen())
    }
}

/// Contact assignment and completion sync over a tabular store
#[derive(Debug, Clone)]
pub struct ContactSyncService {
    engine: Arc<SyncEngine>,
    config: SyncConfig,
}

impl ContactSyncService {
    pub fn new(
        store: Arc<dyn TabularStore>,
        config: SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> SyncResult<Self> {
        config.validate()?;
        let time_format = config.completion.time_format()?;
        let policy = config.allocation.to_policy()?;

        let rng = match config.allocation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let engine = SyncEngine {
            gateway: StoreGateway::new(store, config.store.request_timeout()),
            normalizer: SchemaNormalizer::new(AliasTable::standard(), time_format.clone()),
            filter: PendingSetFilter::new(),
            allocator: BatchAllocator::new(policy),
            writer: CompletionWriter::new(
                time_format,
                config.completion.completed_label.trim(),
                clock,
            ),
            rng: Mutex::new(rng),
            default_store: config.store.default_store_ref(),
        };

        debug!(
            policy = %policy,
            seeded = config.allocation.seed.is_some(),
            default_store = ?engine.default_store,
            "Contact sync service created"
        );

        Ok(Self {
            engine: Arc::new(engine),
            config,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fresh, randomized batch of pending contacts.
    ///
    /// An empty store, a header-only store and a store with nothing left to
    /// assign all return an empty batch, told apart by the listing's
    /// `condition`.
    pub async fn list_pending(&self, store_ref: &StoreRef) -> SyncResult<PendingListing> {
        let store_ref = self.engine.resolve_store(store_ref)?;
        let PendingSet {
            condition,
            data_rows,
            completed_rows,
            records,
            ..
        } = self.engine.read_pending(&store_ref).await?;

        let pending = records.len();
        let batch = {
            let mut rng = self.engine.rng.lock();
            self.engine.allocator.allocate(records, 0, &mut *rng)
        };

        log_sync!(info, operations::LIST_PENDING, store: store_ref,
            condition: condition,
            data_rows: data_rows,
            completed_rows: completed_rows,
            pending: pending,
            batch_size: batch.len()
        );

        Ok(PendingListing {
            condition,
            data_rows,
            completed_rows,
            batch,
        })
    }

    /// Record a completion for one row.
    ///
    /// A blank `completed_by` is rejected before the store is touched. The
    /// write carries no precondition on the row's previous value.
    pub async fn complete_contact(
        &self,
        store_ref: &StoreRef,
        row_address: RowAddress,
        completed_by: &str,
    ) -> SyncResult<CompletionReceipt> {
        let identity = CompletionWriter::validate_identity(completed_by)?;
        let store_ref = self.engine.resolve_store(store_ref)?;

        let receipt = self
            .engine
            .writer
            .complete(&self.engine.gateway, &store_ref, row_address, &identity)
            .await?;

        log_sync!(info, operations::COMPLETE_CONTACT, store: store_ref,
            row: row_address.row(),
            completed_by: receipt.completed_by,
            completed_at: receipt.completed_at
        );

        Ok(receipt)
    }

    /// Validate a store reference before first use. Reads only.
    pub async fn probe_store(&self, store_ref: &StoreRef) -> SyncResult<StoreProbe> {
        let store_ref = self.engine.resolve_store(store_ref)?;
        let metadata = self.engine.gateway.describe(&store_ref).await?;
        if !metadata.sheet_titles.iter().any(|t| t == &store_ref.sheet) {
            return Err(SyncError::not_found(format!(
                "sheet '{}' in spreadsheet '{}' (available: {})",
                store_ref.sheet,
                store_ref.spreadsheet_id,
                metadata.sheet_titles.join(", ")
            )));
        }

        let headers = self
            .engine
            .gateway
            .read_ranges(&store_ref, &[RowRange::header()])
            .await?
            .into_iter()
            .next()
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default();

        log_sync!(info, operations::PROBE_STORE, store: store_ref,
            title: metadata.title,
            headers: headers.len()
        );

        Ok(StoreProbe {
            title: metadata.title,
            sheet: store_ref.sheet,
            headers,
        })
    }

    /// Start a calling session against `store_ref`. No store access happens
    /// until the session loads its first batch.
    pub fn start_session(&self, store_ref: &StoreRef) -> SyncResult<CallingSession> {
        let store_ref = self.engine.resolve_store(store_ref)?;
        let rng = self.engine.session_rng();
        let session = CallingSession::new(Arc::clone(&self.engine), store_ref, rng);
        log_sync!(info, operations::SESSION_STARTED, store: session.store_ref(),
            session_id: session.id()
        );
        Ok(session)
    }
}
