//! Runtime primitives injected into protected assemblies.
//!
//! Everything here exists twice in a protected program's life: the build-time
//! tool uses it to produce payloads and instruction streams, and the injected
//! runtime replays it to recover them. Both sides must agree bit-for-bit, so
//! the encode and decode directions live next to each other.
//!
//! # Architecture
//!
//! - [`constants`] - Encrypted constant pool: keystream, chained block cipher,
//!   lazily decoded store and the build-time pool encoder
//! - [`statemachine`] - Four-register control-flow state machine
//!
//! # Usage
//!
//! ```rust
//! use dotshield::config::ConstantsConfig;
//! use dotshield::runtime::constants::{ArxMixer, ConstantPoolBuilder, ConstantStore};
//! use dotshield::utils::Compression;
//!
//! let config = ConstantsConfig::new().with_compression(Compression::Deflate);
//!
//! let mut builder = ConstantPoolBuilder::new();
//! let id = builder.add_string("hello world")?;
//! let payload = builder.seal(0x5EED, &ArxMixer, &config)?;
//!
//! let store = ConstantStore::decode(&payload, &ArxMixer, &config)?;
//! assert_eq!(&*store.get_string(id)?, "hello world");
//! # Ok::<(), dotshield::Error>(())
//! ```

pub mod constants;
pub mod statemachine;
