//! # Services
//!
//! Stateless building blocks composed by the orchestration layer: the
//! pending-set filter, the batch allocator and the completion writer.

pub mod batch_allocator;
pub mod completion_writer;
pub mod pending_filter;

pub use batch_allocator::{AllocationPolicy, BatchAllocator, SessionQueue};
pub use completion_writer::{CompletionReceipt, CompletionWriter};
pub use pending_filter::{filter_pending, PendingSet, PendingSetFilter};
