//! statecell - Persistent value cells backed by a durable key-value store.
//!
//! A [`PersistentCell`] keeps one piece of state alive across process
//! restarts: it initializes from a durable store (or a lazily computed
//! default), serves reads from memory, and mirrors changes back to the
//! store in an explicit reconciliation pass that also migrates the slot
//! when the cell's key changes.
//!
//! # Modules
//!
//! - [`cell`] - The persistent cell: bind, read, set, reconcile
//! - [`codec`] - Encode/decode pairs between values and stored strings
//! - [`error`] - Error types and result aliases
//! - [`store`] - The durable store trait and its implementations
//!
//! # Example
//!
//! ```
//! use statecell::{MemoryStore, PersistentCell};
//!
//! let mut store = MemoryStore::new();
//!
//! let mut count = PersistentCell::bind(&store, "count", || 0u32)?;
//! count.set(5);
//! count.reconcile(&mut store)?;
//!
//! // A fresh binding sees the stored value, not the default.
//! let rebound = PersistentCell::bind(&store, "count", || 0u32)?;
//! assert_eq!(*rebound.get(), 5);
//! # Ok::<(), statecell::CellError>(())
//! ```

pub mod cell;
pub mod codec;
pub mod error;
pub mod store;

pub use cell::PersistentCell;
pub use codec::{Codec, FnCodec, JsonCodec};
pub use error::{CellError, Result};
pub use store::{DurableStore, FileStore, MemoryStore};
