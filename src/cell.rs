//! Persistent value cells.
//!
//! A [`PersistentCell`] holds one value, bound to one key in a durable
//! store. Binding reads the store once and falls back to a lazily computed
//! default; setters mutate only the in-memory value; an explicit
//! [`reconcile`](PersistentCell::reconcile) pass mirrors the value back to
//! the store and migrates the slot when the key changed.
//!
//! Decoupling the setter from the store write lets the host batch
//! high-frequency updates into a single store write per settle cycle.

use std::fmt;

use tracing::{debug, trace};

use crate::codec::{Codec, FnCodec, JsonCodec};
use crate::error::{CellError, Result};
use crate::store::DurableStore;

/// One key, one current value, one codec.
///
/// The cell owns its value exclusively; the durable store is injected by
/// reference into the operations that touch it. Dropping a cell performs no
/// store cleanup, so the last-written entry survives for the next binding.
pub struct PersistentCell<T, C = JsonCodec> {
    key: String,
    prev_key: String,
    value: T,
    codec: C,
    dirty: bool,
}

impl<T> PersistentCell<T, JsonCodec>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Bind a cell to `key` using the default JSON codec.
    ///
    /// If the store holds an entry for `key`, its decoded value wins and
    /// `default` is never invoked. Otherwise the cell starts at
    /// `default()`. The producer form means an expensive default costs
    /// nothing when a stored value already exists.
    ///
    /// Binding never writes the store; the slot stays untouched until the
    /// first [`reconcile`](Self::reconcile) pass.
    ///
    /// # Errors
    ///
    /// A stored entry the codec rejects surfaces as
    /// [`CellError::DecodeFailure`]. There is no fallback to `default` on a
    /// decode failure: a corrupt slot is the caller's problem to notice,
    /// not this cell's to paper over.
    pub fn bind<S: DurableStore>(
        store: &S,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
    ) -> Result<Self> {
        Self::bind_with(store, key, default, JsonCodec)
    }
}

impl<T, C: Codec<T>> PersistentCell<T, C> {
    /// Bind a cell to `key` with an explicit codec.
    pub fn bind_with<S: DurableStore>(
        store: &S,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
        codec: C,
    ) -> Result<Self> {
        let key = key.into();

        let value = match store.get(&key)? {
            Some(raw) => {
                debug!(key = %key, "binding cell from stored value");
                codec.decode(&raw).map_err(|e| CellError::DecodeFailure {
                    key: key.clone(),
                    message: format!("{e:#}"),
                })?
            }
            None => {
                debug!(key = %key, "no stored value, binding cell from default");
                default()
            }
        };

        Ok(Self {
            prev_key: key.clone(),
            key,
            value,
            codec,
            // First reconciliation always writes, so a freshly defaulted
            // cell establishes its slot.
            dirty: true,
        })
    }

    /// Current in-memory value. O(1), no store access.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Key the cell is currently bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a reconciliation pass has store work pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the cell, yielding its value. No store cleanup.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Rebind the cell to a new key.
    ///
    /// Treated as a rename: the next reconciliation removes the old slot
    /// before writing the new one. Setting the current key again is a
    /// no-op.
    pub fn set_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key != self.key {
            self.key = key;
            self.dirty = true;
        }
    }

    /// Mirror pending value and key changes to the durable store.
    ///
    /// The host invokes this after changes settle, before the next
    /// observable read by other store consumers. A clean cell returns
    /// without touching the store. A dirty pass runs in slot order:
    ///
    /// 1. if the key changed since the last pass, remove the old slot;
    /// 2. encode the current value and write it under the current key.
    ///
    /// The removal always happens before the write, so a store observer
    /// never sees both keys live.
    ///
    /// # Errors
    ///
    /// Store and encode failures propagate from the failing call and leave
    /// the cell dirty, so the host's next pass retries the remaining work.
    /// An old slot already removed is not removed again.
    pub fn reconcile<S: DurableStore>(&mut self, store: &mut S) -> Result<()> {
        if !self.dirty {
            trace!(key = %self.key, "cell clean, skipping reconciliation");
            return Ok(());
        }

        if self.prev_key != self.key {
            store.remove(&self.prev_key)?;
            debug!(from = %self.prev_key, to = %self.key, "migrated cell slot");
            self.prev_key = self.key.clone();
        }

        let encoded = self
            .codec
            .encode(&self.value)
            .map_err(|e| CellError::EncodeFailure {
                key: self.key.clone(),
                message: format!("{e:#}"),
            })?;
        store.set(&self.key, &encoded)?;

        self.dirty = false;
        trace!(key = %self.key, "reconciled cell to store");
        Ok(())
    }
}

impl<T: PartialEq, C> PersistentCell<T, C> {
    /// Replace the in-memory value.
    ///
    /// Updates take effect immediately for readers of [`get`](Self::get);
    /// the store is untouched until the next reconciliation. A value equal
    /// to the current one leaves the cell clean.
    pub fn set(&mut self, value: T) {
        if value != self.value {
            self.value = value;
            self.dirty = true;
        }
    }

    /// Replace the value with a function of the previous value.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.value);
        self.set(next);
    }
}

impl<T, E, D> PersistentCell<T, FnCodec<E, D>>
where
    E: Fn(&T) -> anyhow::Result<String>,
    D: Fn(&str) -> anyhow::Result<T>,
{
    /// Bind a cell with a caller-supplied encode/decode closure pair.
    pub fn bind_with_fns<S: DurableStore>(
        store: &S,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
        encode: E,
        decode: D,
    ) -> Result<Self> {
        Self::bind_with(store, key, default, FnCodec::new(encode, decode))
    }
}

impl<T: fmt::Debug, C> fmt::Debug for PersistentCell<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentCell")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("dirty", &self.dirty)
            .finish()
    }
}
