//! Decoded constant pool and its lazily initialized process-wide instance.

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{
    config::ConstantsConfig,
    runtime::constants::{
        keystream::BLOCK_WORDS, BlockMixer, ChainedBlockCipher, Constant, ConstantId,
        ConstantPrimitive,
    },
    utils::Decompressor,
    Error, Result,
};

/// The embedded form of a constant pool: ciphertext words plus the seed of
/// the keystream that encrypted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Secret keystream seed
    pub seed: u32,
    /// Ciphertext, a whole number of 16-word blocks
    pub words: Vec<u32>,
}

impl EncryptedPayload {
    /// Creates a payload from its parts
    #[must_use]
    pub fn new(seed: u32, words: Vec<u32>) -> Self {
        EncryptedPayload { seed, words }
    }

    /// Reads ciphertext stored as little-endian bytes, e.g. a field's
    /// initial value
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `bytes` is not a whole number of words.
    pub fn from_le_bytes(seed: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(malformed_error!(
                "Payload of {} bytes is not a whole number of words",
                bytes.len()
            ));
        }

        let words = bytes
            .chunks_exact(4)
            .map(|raw| u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            .collect();
        Ok(EncryptedPayload { seed, words })
    }

    /// Serializes the ciphertext as little-endian bytes
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }

    /// Number of cipher blocks
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.words.len() / BLOCK_WORDS
    }
}

/// A decoded constant pool.
///
/// Read-only once built; lookups take `&self` and may run concurrently.
///
/// # Record Layout
///
/// ```text
/// string : u32 length L, L bytes UTF-8
/// scalar : size_of::<T>() bytes little-endian
/// array  : u32 total size S, u32 count N, S - 4 bytes of N elements
/// ```
///
/// Every record starts on a 4-byte boundary; the id's index is the offset
/// divided by four.
#[derive(Debug)]
pub struct ConstantStore {
    buffer: Vec<u8>,
    strings: Option<DashMap<Box<str>, Arc<str>>>,
}

impl ConstantStore {
    /// Wraps an already decoded pool
    #[must_use]
    pub fn from_plaintext(buffer: Vec<u8>, config: &ConstantsConfig) -> Self {
        ConstantStore {
            buffer,
            strings: config.intern_strings.then(DashMap::new),
        }
    }

    /// Decrypts and decompresses `payload` with the codec of `config`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a partial trailing block and
    /// [`Error::Decompression`] if the decrypted bytes are not a valid stream.
    /// A wrong seed or mixer only surfaces through the codec; without
    /// compression it decodes to garbage.
    pub fn decode(
        payload: &EncryptedPayload,
        mixer: &dyn BlockMixer,
        config: &ConstantsConfig,
    ) -> Result<Self> {
        Self::decode_with(payload, mixer, &config.compression, config)
    }

    /// Decrypts `payload` and hands the plaintext to a custom codec
    ///
    /// # Errors
    /// See [`ConstantStore::decode`].
    pub fn decode_with(
        payload: &EncryptedPayload,
        mixer: &dyn BlockMixer,
        decompressor: &dyn Decompressor,
        config: &ConstantsConfig,
    ) -> Result<Self> {
        let plaintext = ChainedBlockCipher::new(mixer, payload.seed).decrypt(&payload.words)?;
        let buffer = decompressor.decompress(&plaintext)?;

        debug!(
            blocks = payload.block_count(),
            plaintext = plaintext.len(),
            buffer = buffer.len(),
            "decoded constant pool"
        );

        Ok(Self::from_plaintext(buffer, config))
    }

    /// Size of the decoded pool in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the pool holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The raw decoded pool
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Looks up the constant behind `id` as a `T`
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the record does not fit into the
    /// pool, [`Error::TypeConversionInvalid`] if the id's kind does not match
    /// `T` and [`Error::Malformed`] for inconsistent records.
    pub fn get<T: Constant>(&self, id: impl Into<ConstantId>) -> Result<T> {
        let id = id.into();
        T::read(self, id.kind(), id.offset())
    }

    /// Looks up a string constant
    ///
    /// # Errors
    /// See [`ConstantStore::get`].
    pub fn get_string(&self, id: impl Into<ConstantId>) -> Result<Arc<str>> {
        self.get(id)
    }

    /// Reads the scalar record at `offset`
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the value does not fit into the pool.
    pub fn read_scalar<T: ConstantPrimitive>(&self, offset: usize) -> Result<T> {
        Ok(T::from_le_slice(self.bytes(offset, T::SIZE)?))
    }

    /// Reads the array record at `offset`
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the record does not fit into the pool
    /// and [`Error::Malformed`] if its size and count disagree.
    pub fn read_array<T: ConstantPrimitive>(&self, offset: usize) -> Result<Vec<T>> {
        let total = self.read_u32(offset)? as usize;
        let count = self.read_u32(offset.checked_add(4).ok_or(Error::OutOfBounds)?)? as usize;

        let byte_len = total
            .checked_sub(4)
            .ok_or_else(|| malformed_error!("Array record size {} is below its header", total))?;
        if count.checked_mul(T::SIZE) != Some(byte_len) {
            return Err(malformed_error!(
                "Array record of {byte_len} bytes cannot hold {count} elements of {} bytes",
                T::SIZE
            ));
        }

        let data = self.bytes(offset.checked_add(8).ok_or(Error::OutOfBounds)?, byte_len)?;
        Ok(data.chunks_exact(T::SIZE).map(T::from_le_slice).collect())
    }

    /// Reads the string record at `offset`
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the record does not fit into the pool
    /// and [`Error::Malformed`] if it is not valid UTF-8.
    pub fn read_string(&self, offset: usize) -> Result<Arc<str>> {
        let len = self.read_u32(offset)? as usize;
        let raw = self.bytes(offset.checked_add(4).ok_or(Error::OutOfBounds)?, len)?;
        let value = std::str::from_utf8(raw)
            .map_err(|e| malformed_error!("String record at {} is not UTF-8: {}", offset, e))?;

        Ok(self.intern(value))
    }

    fn intern(&self, value: &str) -> Arc<str> {
        let Some(strings) = &self.strings else {
            return Arc::from(value);
        };

        if let Some(existing) = strings.get(value) {
            return Arc::clone(existing.value());
        }
        strings
            .entry(Box::from(value))
            .or_insert_with(|| Arc::from(value))
            .value()
            .clone()
    }

    fn read_u32(&self, offset: usize) -> Result<u32> {
        let raw = self.bytes(offset, 4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = offset.checked_add(len).ok_or(Error::OutOfBounds)?;
        self.buffer.get(offset..end).ok_or(Error::OutOfBounds)
    }
}

/// A constant pool decoded on first use.
///
/// Decoding happens exactly once, even when many threads race for the first
/// lookup; the losers block until the winner is done and never observe a
/// partial pool. A failed decode is remembered and reported to every caller
/// as [`Error::ConstantsUnavailable`].
pub struct LazyConstants {
    payload: EncryptedPayload,
    mixer: Box<dyn BlockMixer + Send + Sync>,
    config: ConstantsConfig,
    store: OnceLock<std::result::Result<ConstantStore, String>>,
}

impl LazyConstants {
    /// Creates an undecoded pool
    pub fn new(
        payload: EncryptedPayload,
        mixer: impl BlockMixer + Send + Sync + 'static,
        config: ConstantsConfig,
    ) -> Self {
        LazyConstants {
            payload,
            mixer: Box::new(mixer),
            config,
            store: OnceLock::new(),
        }
    }

    /// The decoded pool, decoding it if this is the first access
    ///
    /// # Errors
    /// Returns [`Error::ConstantsUnavailable`] if decoding failed, now or on
    /// an earlier access.
    pub fn store(&self) -> Result<&ConstantStore> {
        let state = self.store.get_or_init(|| {
            ConstantStore::decode(&self.payload, &*self.mixer, &self.config).map_err(
                |error| {
                    warn!(%error, "constant pool failed to decode");
                    error.to_string()
                },
            )
        });

        state
            .as_ref()
            .map_err(|message| Error::ConstantsUnavailable(message.clone()))
    }

    /// Returns true once the first access has run, successful or not
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }

    /// Looks up the constant behind `id`, see [`ConstantStore::get`]
    ///
    /// # Errors
    /// Returns [`Error::ConstantsUnavailable`] if the pool failed to decode,
    /// otherwise the errors of [`ConstantStore::get`].
    pub fn get<T: Constant>(&self, id: impl Into<ConstantId>) -> Result<T> {
        self.store()?.get(id)
    }

    /// Looks up a string constant, see [`ConstantStore::get_string`]
    ///
    /// # Errors
    /// See [`LazyConstants::get`].
    pub fn get_string(&self, id: impl Into<ConstantId>) -> Result<Arc<str>> {
        self.get(id)
    }
}

impl fmt::Debug for LazyConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyConstants")
            .field("blocks", &self.payload.block_count())
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

static GLOBAL: OnceLock<LazyConstants> = OnceLock::new();

/// Installs the process-wide constant pool.
///
/// The pool is not decoded until the first [`get_global`] call.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if a pool is already installed.
pub fn install_global(constants: LazyConstants) -> Result<()> {
    GLOBAL
        .set(constants)
        .map_err(|_| Error::InvalidInput("A constant pool is already installed".to_string()))
}

/// Looks up a constant in the process-wide pool.
///
/// # Errors
/// Returns [`Error::ConstantsUnavailable`] if no pool is installed or it
/// failed to decode, otherwise the errors of [`ConstantStore::get`].
pub fn get_global<T: Constant>(id: impl Into<ConstantId>) -> Result<T> {
    GLOBAL
        .get()
        .ok_or_else(|| Error::ConstantsUnavailable("No constant pool installed".to_string()))?
        .get(id)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        runtime::constants::{ArxMixer, Block, ConstantKind, ConstantPoolBuilder, XorMixer},
        utils::Compression,
    };

    fn plain_config() -> ConstantsConfig {
        ConstantsConfig::new().with_compression(Compression::None)
    }

    fn store_from(bytes: &[u8]) -> ConstantStore {
        ConstantStore::from_plaintext(bytes.to_vec(), &plain_config())
    }

    #[test]
    fn test_string_record() {
        let mut raw = 5u32.to_le_bytes().to_vec();
        raw.extend_from_slice(b"hello\0\0\0");
        let store = store_from(&raw);

        let id = ConstantId::new(ConstantKind::String, 0);
        assert_eq!(&*store.get_string(id).unwrap(), "hello");
        assert_eq!(store.get::<String>(id).unwrap(), "hello");
    }

    #[test]
    fn test_scalar_and_array_records() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&(-7i32).to_le_bytes());
        raw.extend_from_slice(&12u32.to_le_bytes()); // S = 4 + 2 * 4
        raw.extend_from_slice(&2u32.to_le_bytes());
        raw.extend_from_slice(&10i32.to_le_bytes());
        raw.extend_from_slice(&20i32.to_le_bytes());
        let store = store_from(&raw);

        assert_eq!(store.get::<i32>(ConstantId::new(ConstantKind::Scalar, 0)).unwrap(), -7);
        assert_eq!(
            store
                .get::<Vec<i32>>(ConstantId::new(ConstantKind::Array, 1))
                .unwrap(),
            vec![10, 20]
        );
    }

    #[test]
    fn test_default_kind() {
        let store = store_from(&[]);
        let id = ConstantId::new(ConstantKind::Default, 0);

        assert_eq!(store.get::<u64>(id).unwrap(), 0);
        assert_eq!(store.get::<f32>(id).unwrap(), 0.0);
        assert!(!store.get::<bool>(id).unwrap());
        assert!(store.get::<Vec<u8>>(id).unwrap().is_empty());
        assert_eq!(&*store.get_string(id).unwrap(), "");
    }

    #[test]
    fn test_out_of_bounds() {
        let store = store_from(&[1, 0, 0, 0]);

        assert!(matches!(
            store.get::<u64>(ConstantId::new(ConstantKind::Scalar, 0)),
            Err(Error::OutOfBounds)
        ));
        assert!(matches!(
            store.get::<u32>(ConstantId::new(ConstantKind::Scalar, 1)),
            Err(Error::OutOfBounds)
        ));
        // Length prefix claims one byte that is not there
        assert!(matches!(
            store.get_string(ConstantId::new(ConstantKind::String, 0)),
            Err(Error::OutOfBounds)
        ));
        assert!(matches!(
            store.get::<u8>(ConstantId::new(ConstantKind::Scalar, 0x3FFF_FFFF)),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_kind_mismatch() {
        let store = store_from(&[0; 16]);

        assert!(matches!(
            store.get_string(ConstantId::new(ConstantKind::Scalar, 0)),
            Err(Error::TypeConversionInvalid)
        ));
        assert!(matches!(
            store.get::<i32>(ConstantId::new(ConstantKind::Array, 0)),
            Err(Error::TypeConversionInvalid)
        ));
        assert!(matches!(
            store.get::<Vec<i32>>(ConstantId::new(ConstantKind::String, 0)),
            Err(Error::TypeConversionInvalid)
        ));
    }

    #[test]
    fn test_inconsistent_array() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&8u32.to_le_bytes()); // 4 payload bytes
        raw.extend_from_slice(&3u32.to_le_bytes()); // but three i32 elements
        raw.extend_from_slice(&[0; 12]);
        let store = store_from(&raw);

        assert!(matches!(
            store.get::<Vec<i32>>(ConstantId::new(ConstantKind::Array, 0)),
            Err(Error::Malformed { .. })
        ));

        let store = store_from(&[0; 8]); // S = 0
        assert!(matches!(
            store.get::<Vec<u8>>(ConstantId::new(ConstantKind::Array, 0)),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut raw = 2u32.to_le_bytes().to_vec();
        raw.extend_from_slice(&[0xC3, 0x28, 0, 0]);
        let store = store_from(&raw);

        assert!(matches!(
            store.get_string(ConstantId::new(ConstantKind::String, 0)),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_interning() {
        let mut raw = 3u32.to_le_bytes().to_vec();
        raw.extend_from_slice(b"abc\0");
        let id = ConstantId::new(ConstantKind::String, 0);

        let store = store_from(&raw);
        let first = store.get_string(id).unwrap();
        let second = store.get_string(id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let store = ConstantStore::from_plaintext(raw, &plain_config().with_interning(false));
        let first = store.get_string(id).unwrap();
        let second = store.get_string(id).unwrap();
        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_payload_bytes() {
        let payload = EncryptedPayload::new(9, vec![0x0403_0201, 0x0807_0605]);
        let bytes = payload.to_le_bytes();
        assert_eq!(bytes, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(EncryptedPayload::from_le_bytes(9, &bytes).unwrap(), payload);
        assert!(EncryptedPayload::from_le_bytes(9, &bytes[..7]).is_err());
    }

    #[test]
    fn test_decode_wrong_seed_garbles() {
        let config = plain_config();
        let mut builder = ConstantPoolBuilder::new();
        builder.add_string("secret").unwrap();
        let mut payload = builder.seal(0x1111, &ArxMixer, &config).unwrap();

        let store = ConstantStore::decode(&payload, &ArxMixer, &config).unwrap();
        assert_eq!(&store.as_bytes()[..builder.len()], builder.as_bytes());

        payload.seed = 0x2222;
        let store = ConstantStore::decode(&payload, &ArxMixer, &config).unwrap();
        assert_ne!(&store.as_bytes()[..builder.len()], builder.as_bytes());
    }

    struct CountingMixer {
        calls: Arc<AtomicUsize>,
    }

    impl BlockMixer for CountingMixer {
        fn decrypt(&self, block: &mut Block, key: &Block) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            XorMixer.decrypt(block, key);
        }

        fn encrypt(&self, block: &mut Block, key: &Block) {
            XorMixer.encrypt(block, key);
        }
    }

    #[test]
    fn test_lazy_decodes_once() {
        let config = plain_config();
        let mut builder = ConstantPoolBuilder::new();
        let id = builder.add_scalar(0x0BAD_F00D_u32).unwrap();
        let payload = builder.seal(77, &XorMixer, &config).unwrap();
        let blocks = payload.block_count();

        let calls = Arc::new(AtomicUsize::new(0));
        let lazy = LazyConstants::new(
            payload,
            CountingMixer {
                calls: Arc::clone(&calls),
            },
            config,
        );
        assert!(!lazy.is_initialized());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    assert_eq!(lazy.get::<u32>(id).unwrap(), 0x0BAD_F00D);
                });
            }
        });

        assert!(lazy.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), blocks);
    }

    #[test]
    fn test_lazy_failure_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        // Three words are not a whole block
        let lazy = LazyConstants::new(
            EncryptedPayload::new(1, vec![1, 2, 3]),
            CountingMixer {
                calls: Arc::clone(&calls),
            },
            plain_config(),
        );

        for _ in 0..3 {
            assert!(matches!(
                lazy.get::<u32>(ConstantId(0x4000_0000)),
                Err(Error::ConstantsUnavailable(_))
            ));
        }
        assert!(lazy.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
