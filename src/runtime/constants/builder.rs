//! Build-time encoder for the constant pool.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    config::ConstantsConfig,
    runtime::constants::{
        BlockMixer, ChainedBlockCipher, ConstantId, ConstantKind, ConstantPrimitive,
        EncryptedPayload,
    },
    utils::to_u32,
    Result,
};

/// Collects constants into the pool layout [`crate::runtime::constants::ConstantStore`]
/// reads back.
///
/// Identical records are stored once; adding the same string twice yields
/// the same id.
///
/// # Example
///
/// ```rust
/// use dotshield::runtime::constants::ConstantPoolBuilder;
///
/// let mut builder = ConstantPoolBuilder::new();
/// let a = builder.add_string("key")?;
/// let b = builder.add_scalar(42i64)?;
/// assert_eq!(builder.add_string("key")?, a);
/// assert_ne!(a, b);
/// # Ok::<(), dotshield::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ConstantPoolBuilder {
    buffer: Vec<u8>,
    records: FxHashMap<(ConstantKind, Vec<u8>), ConstantId>,
}

impl ConstantPoolBuilder {
    /// Creates an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id every lookup answers with the zero value of the requested type
    #[must_use]
    pub fn default_id() -> ConstantId {
        ConstantId::new(ConstantKind::Default, 0)
    }

    /// Adds a string record
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the string or the pool grows
    /// beyond what ids can address.
    pub fn add_string(&mut self, value: &str) -> Result<ConstantId> {
        let mut record = Vec::with_capacity(4 + value.len());
        record.extend_from_slice(&to_u32(value.len())?.to_le_bytes());
        record.extend_from_slice(value.as_bytes());

        self.append(ConstantKind::String, record)
    }

    /// Adds a scalar record
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the pool grows beyond what ids
    /// can address.
    pub fn add_scalar<T: ConstantPrimitive>(&mut self, value: T) -> Result<ConstantId> {
        let mut record = Vec::with_capacity(T::SIZE);
        value.write_le(&mut record);

        self.append(ConstantKind::Scalar, record)
    }

    /// Adds an array record
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the array or the pool grows
    /// beyond what ids can address.
    pub fn add_array<T: ConstantPrimitive>(&mut self, values: &[T]) -> Result<ConstantId> {
        let byte_len = values.len() * T::SIZE;

        let mut record = Vec::with_capacity(8 + byte_len);
        record.extend_from_slice(&to_u32(byte_len + 4)?.to_le_bytes());
        record.extend_from_slice(&to_u32(values.len())?.to_le_bytes());
        for value in values {
            value.write_le(&mut record);
        }

        self.append(ConstantKind::Array, record)
    }

    /// Size of the plaintext pool in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no record was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The plaintext pool
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Compresses and encrypts the pool
    ///
    /// ## Arguments
    /// * 'seed'   - Secret keystream seed, embedded next to the ciphertext
    /// * 'mixer'  - The mixing network the runtime will decrypt with
    /// * 'config' - Selects the codec
    ///
    /// # Errors
    /// Returns [`crate::Error::Decompression`] if the codec fails.
    pub fn seal(
        &self,
        seed: u32,
        mixer: &dyn BlockMixer,
        config: &ConstantsConfig,
    ) -> Result<EncryptedPayload> {
        let compressed = config.compression.compress(&self.buffer)?;
        let words = ChainedBlockCipher::new(mixer, seed).encrypt(&compressed);

        debug!(
            records = self.records.len(),
            plaintext = self.buffer.len(),
            compressed = compressed.len(),
            compression = %config.compression,
            "sealed constant pool"
        );

        Ok(EncryptedPayload::new(seed, words))
    }

    fn append(&mut self, kind: ConstantKind, mut record: Vec<u8>) -> Result<ConstantId> {
        // Records start on 4-byte boundaries
        record.resize(record.len().next_multiple_of(4), 0);

        match self.records.entry((kind, record)) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let id = ConstantId::from_offset(kind, self.buffer.len())?;
                self.buffer.extend_from_slice(&entry.key().1);
                trace!(?id, size = entry.key().1.len(), "added constant record");
                entry.insert(id);
                Ok(id)
            }
        }
    }
}
