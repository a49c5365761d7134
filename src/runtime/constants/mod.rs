//! Encrypted constant pool.
//!
//! String literals, numeric literals and array initializers of protected
//! methods are moved into one pool that is compressed, encrypted and embedded
//! in the assembly. Call sites keep only an obfuscated 32-bit id; the first
//! lookup decrypts and decompresses the pool, later lookups are plain reads.
//!
//! # Pipeline
//!
//! ```text
//! build:    records -> ConstantPoolBuilder -> compress -> encrypt -> EncryptedPayload
//! runtime:  EncryptedPayload -> decrypt -> decompress -> ConstantStore -> get(id)
//! ```
//!
//! # Key Components
//!
//! - [`Keystream`] - Xorshift word generator seeded from the secret key
//! - [`ChainedBlockCipher`] - 16-word block cipher with plaintext feedback
//! - [`BlockMixer`] - Seam for the secret per-build mixing network
//! - [`ConstantStore`] / [`LazyConstants`] - Decoded pool and its once-only initializer
//! - [`ConstantPoolBuilder`] - Build-time encoder
//! - [`ConstantId`] / [`IdKey`] / [`CallSiteKey`] - Ids and their call-site scrambling
//!
//! # Id Layout
//!
//! ```text
//! bits 30..31 : kind (0 string, 1 scalar, 2 array, 3 default value)
//! bits 0..29  : record index, byte offset = index << 2
//! ```

mod builder;
mod cipher;
mod id;
mod keystream;
mod store;
mod value;

pub use builder::ConstantPoolBuilder;
pub use cipher::{ArxMixer, BlockMixer, ChainedBlockCipher, XorMixer};
pub use id::{CallSiteKey, ConstantId, ConstantKind, IdKey, INDEX_MASK};
pub use keystream::{Block, Keystream, BLOCK_BYTES, BLOCK_WORDS};
pub use store::{get_global, install_global, ConstantStore, EncryptedPayload, LazyConstants};
pub use value::{Constant, ConstantPrimitive};
