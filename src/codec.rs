//! Value codecs.
//!
//! A codec is a stateless pair of pure transforms between an in-memory value
//! and its string representation in the durable store. [`JsonCodec`] is the
//! default structural codec; [`FnCodec`] adapts a caller-supplied closure
//! pair for custom wire shapes.
//!
//! Codec correctness is not validated here. A decode that does not invert
//! the matching encode round-trips garbage; that contract belongs to the
//! caller.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode/decode pair between values and their stored string form.
///
/// Both directions report failures through `anyhow`; the cell attaches the
/// key context when surfacing them.
pub trait Codec<T> {
    /// Transform a value into its stored string form.
    fn encode(&self, value: &T) -> anyhow::Result<String>;

    /// Transform a stored string back into a value.
    fn decode(&self, raw: &str) -> anyhow::Result<T>;
}

/// Default structural codec: JSON via serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> anyhow::Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> anyhow::Result<T> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Codec built from a caller-supplied encode/decode closure pair.
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnCodec<E, D> {
    /// Pair up an encode and a decode closure.
    pub fn new(encode: E, decode: D) -> Self {
        Self { encode, decode }
    }
}

impl<T, E, D> Codec<T> for FnCodec<E, D>
where
    E: Fn(&T) -> anyhow::Result<String>,
    D: Fn(&str) -> anyhow::Result<T>,
{
    fn encode(&self, value: &T) -> anyhow::Result<String> {
        (self.encode)(value)
    }

    fn decode(&self, raw: &str) -> anyhow::Result<T> {
        (self.decode)(raw)
    }
}
