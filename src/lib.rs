//! # logtable
//!
//! A persistent, concurrent, memory-resident key-value table with:
//! - An append-only log, fsynced on every write, for durability
//! - In-place tombstones for overwritten records
//! - Crash-safe compaction of the log every time the table is opened
//! - Single-lock reader/writer concurrency
//! - A pure in-memory mode with no filesystem side effects
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Table                                │
//! │              (one RwLock over index + log)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Log File  │          │    Index    │
//!   │  (Append +  │          │  (HashMap)  │
//!   │  Tombstone) │          └─────────────┘
//!   └──────┬──────┘
//!          │ on open
//!          ▼
//!   ┌─────────────┐
//!   │  Recovery   │
//!   │ (replay +   │
//!   │  compact)   │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use logtable::Table;
//!
//! let table = Table::open("/var/lib/app/table.log", 1024)?;
//! table.put(b"greeting", b"hello")?;
//! assert_eq!(table.get(b"greeting").as_deref(), Some(&b"hello"[..]));
//! table.close()?;
//! # Ok::<(), logtable::TableError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod logfile;
pub mod index;
pub mod table;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TableError};
pub use config::Config;
pub use logfile::RecoveryStats;
pub use table::Table;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of logtable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
