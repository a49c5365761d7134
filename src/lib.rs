// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotshield
//!
//! The analysis and runtime core of a protection tool for .NET assemblies.
//! `dotshield` covers the parts of an obfuscator that have to be exact: the
//! generic type substitution protection passes rely on to understand call
//! sites, and the runtime primitives that get injected into the protected
//! assembly and must reproduce, bit for bit, what the build-time tool planned.
//!
//! ## Features
//!
//! - **Generic signature resolution** - Substitute `!n` / `!!n` parameters in
//!   arbitrarily nested signature trees with a bounded recursion depth
//! - **Encrypted constant pool** - Keystream, chained block cipher, codecs and
//!   a lazily decoded, id-addressed store, together with the build-time encoder
//! - **Control-flow register machine** - The four-register state machine
//!   scrambling branch decisions and call-site keys
//!
//! ## Quick Start
//!
//! ```rust
//! use dotshield::prelude::*;
//!
//! // List<int>.Add(!0) seen from an instantiation site
//! let param = TypeSignature::GenericParamType(0);
//! let resolved = resolve_type(&param, &[TypeSignature::I4])?;
//! assert_eq!(*resolved, TypeSignature::I4);
//!
//! // Register machine replay
//! let mut ctx = CfgContext::new(0x1234_5678);
//! let first = ctx.next(0b0000_0100, 7);
//! assert_eq!(first, ctx.registers()[1]);
//! # Ok::<(), dotshield::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Signature trees and metadata tokens, as handed over by
//!   the metadata reader
//! - [`analysis`] - Generic argument resolution
//! - [`runtime`] - Constant pool and control-flow state machine
//! - [`config`] - Resolver and constant pool configuration
//! - [`utils`] - Payload codecs and integer helpers
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber:
//! `debug` when a constant pool is sealed or decoded, `trace` for every
//! generic substitution and `warn` when a resolution hits the recursion
//! limit or a pool fails to decode.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//!
//! # Fuzz the constant store
//! cargo +nightly fuzz run constants --release
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and functions.
///
/// # Example
///
/// ```rust
/// use dotshield::prelude::*;
///
/// let mut builder = ConstantPoolBuilder::new();
/// let id = builder.add_scalar(7u32)?;
/// let config = ConstantsConfig::new().with_compression(Compression::Deflate);
/// let store = ConstantStore::decode(&builder.seal(3, &ArxMixer, &config)?, &ArxMixer, &config)?;
/// assert_eq!(store.get::<u32>(id)?, 7);
/// # Ok::<(), dotshield::Error>(())
/// ```
pub mod prelude;

/// Signature trees and metadata tokens
///
/// The signature model mirrors ECMA-335 II.23.2: element types, pointer and
/// array shapes, custom modifiers, generic parameters and instantiations.
/// Trees are plain owned data; nothing in this crate parses them from bytes.
pub mod metadata;

/// Analysis passes over signature trees
pub mod analysis;

/// Runtime primitives injected into protected assemblies
pub mod runtime;

/// Configuration for the resolver and the constant pool
pub mod config;

/// Payload codecs and integer helpers
pub mod utils;

/// `dotshield` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dotshield` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dotshield::{analysis::generics::resolve_type, metadata::signatures::TypeSignature, Error};
///
/// let mut sig = TypeSignature::GenericParamType(0);
/// for _ in 0..200 {
///     sig = TypeSignature::ptr(sig);
/// }
///
/// match resolve_type(&sig, &[TypeSignature::I4]) {
///     Err(Error::RecursionLimit(max)) => println!("deeper than {max}"),
///     Err(e) => println!("Error: {e}"),
///     Ok(resolved) => println!("{resolved:?}"),
/// }
/// ```
pub use error::Error;
