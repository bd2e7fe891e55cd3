//! # Calling Session
//!
//! Per-caller state: the current batch view, the session's shuffled order of
//! pending contacts, and the rows this caller has completed. Sessions are
//! owned by one caller and driven through `&mut self`; concurrent callers
//! each hold their own session.

use super::service::SyncEngine;
use crate::constants::operations;
use crate::error::{SyncError, SyncResult};
use crate::log_sync;
use crate::models::{Batch, RowAddress, StoreRef};
use crate::schema::ColumnLayout;
use crate::services::{CompletionReceipt, CompletionWriter, SessionQueue};
use crate::state_machine::{
    SessionEvent, SessionOperation, SessionState, SessionStateMachine, SessionTransition,
};
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug)]
pub struct CallingSession {
    id: Uuid,
    engine: Arc<SyncEngine>,
    store_ref: StoreRef,
    caller: Option<String>,
    machine: SessionStateMachine,
    queue: SessionQueue,
    batch: Batch,
    /// Header layout from the latest read, used to address completion writes
    layout: Option<ColumnLayout>,
    completed: HashSet<RowAddress>,
    rng: StdRng,
}

impl CallingSession {
    pub(crate) fn new(engine: Arc<SyncEngine>, store_ref: StoreRef, rng: StdRng) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine,
            store_ref,
            caller: None,
            machine: SessionStateMachine::new(),
            queue: SessionQueue::new(),
            batch: Batch::default(),
            layout: None,
            completed: HashSet::new(),
            rng,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store_ref(&self) -> &StoreRef {
        &self.store_ref
    }

    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.machine.current_state()
    }

    pub fn history(&self) -> &[SessionTransition] {
        self.machine.history()
    }

    /// Records of the current batch not yet completed by this session
    pub fn current_batch(&self) -> &Batch {
        &self.batch
    }

    /// Rows this session has completed, across all batches
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn has_completed(&self, row_address: RowAddress) -> bool {
        self.completed.contains(&row_address)
    }

    /// Idle -> BatchLoaded, or SessionComplete when nothing is pending.
    /// A blank caller identity is rejected before the store is read.
    pub async fn load_first_batch(&mut self, caller: &str) -> SyncResult<&Batch> {
        self.machine.ensure_allowed(SessionOperation::LoadFirstBatch)?;
        let identity = CompletionWriter::validate_identity(caller)?;
        self.caller = Some(identity);
        self.load().await
    }

    /// BatchExhausted -> BatchLoaded from a fresh read, so completions made by
    /// other sessions are respected, or SessionComplete when nothing remains
    pub async fn load_next_batch(&mut self) -> SyncResult<&Batch> {
        self.machine.ensure_allowed(SessionOperation::LoadNextBatch)?;
        self.load().await
    }

    async fn load(&mut self) -> SyncResult<&Batch> {
        let pending = self.engine.read_pending(&self.store_ref).await?;
        let sequence = self.batch.sequence + 1;
        let batch = self.queue.next_batch(
            &self.engine.allocator,
            pending.records,
            &self.completed,
            sequence,
            &mut self.rng,
        );

        let state = self.machine.transition(SessionEvent::for_batch(batch.len()))?;
        self.layout = pending.layout;
        self.batch = batch;

        if state.is_terminal() {
            log_sync!(info, operations::SESSION_COMPLETE, store: self.store_ref,
                session_id: self.id,
                condition: pending.condition,
                completed: self.completed.len()
            );
        } else {
            log_sync!(info, operations::SESSION_BATCH_LOADED, store: self.store_ref,
                session_id: self.id,
                sequence: self.batch.sequence,
                size: self.batch.len(),
                queued: self.queue.remaining()
            );
        }

        Ok(&self.batch)
    }

    /// Complete one record of the current batch.
    ///
    /// The write goes through first; the record leaves the batch view only
    /// once the store acknowledges it, so a failed call leaves the view
    /// unchanged and can be retried. Completing the last record moves the
    /// session to BatchExhausted.
    pub async fn complete_one(&mut self, row_address: RowAddress) -> SyncResult<CompletionReceipt> {
        self.machine.ensure_allowed(SessionOperation::CompleteOne)?;
        if !self.batch.contains(row_address) {
            return Err(SyncError::validation(format!(
                "{row_address} is not in the current batch"
            )));
        }
        let caller = self
            .caller
            .as_deref()
            .ok_or_else(|| SyncError::InvalidSession("session has no caller".to_string()))?;
        let layout = self
            .layout
            .as_ref()
            .ok_or_else(|| SyncError::schema("session has no header layout"))?;

        let receipt = self
            .engine
            .writer
            .write_completion(&self.engine.gateway, &self.store_ref, layout, row_address, caller)
            .await?;

        self.batch.remove(row_address);
        self.completed.insert(row_address);
        let state = self
            .machine
            .transition(SessionEvent::for_completion(self.batch.len()))?;

        log_sync!(info, operations::SESSION_CONTACT_COMPLETED, store: self.store_ref,
            session_id: self.id,
            row: row_address.row(),
            remaining: self.batch.len()
        );
        if state == SessionState::BatchExhausted {
            log_sync!(info, operations::SESSION_BATCH_EXHAUSTED, store: self.store_ref,
                session_id: self.id,
                sequence: self.batch.sequence
            );
        }

        Ok(receipt)
    }
}
