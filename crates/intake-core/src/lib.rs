//! Reconciliation core: duplicate detection, source scans, row imports and
//! bulk lead mutation.
//!
//! The row transport and the lead store are reached only through the
//! [`RowSource`] and [`LeadStore`] traits.

pub mod bulk;
pub mod dedupe;
pub mod import;
pub mod locks;
pub mod memory;
pub mod ports;
pub mod scan;

pub use bulk::apply_bulk;
pub use dedupe::{DedupIndex, mark_duplicates};
pub use import::{ImportCoordinator, PROCESSED_MARKER, writeback_values};
pub use locks::{RowKey, RowLocks};
pub use memory::{MemoryLeadStore, MemoryRowSource};
pub use ports::{LeadStore, RowSource};
pub use scan::Scanner;
