//! Configuration for the resolver and the constant pool.
//!
//! Both configurations follow the same pattern: a `Default` carrying the
//! values the injected runtime uses, plus `with_*` builder methods for
//! callers that need to deviate.

use crate::utils::Compression;

/// Default recursion limit of the generic signature resolver.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration for generic signature resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum nesting depth the resolver descends into (default: 100).
    ///
    /// A tree of exactly this depth resolves, one level more fails with
    /// [`crate::Error::RecursionLimit`].
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum recursion depth.
    ///
    /// # Arguments
    ///
    /// * `max_depth` - The deepest nesting level that still resolves.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Configuration for decoding and reading the constant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantsConfig {
    /// Codec applied to the plaintext after decryption (default: LZMA).
    pub compression: Compression,

    /// Hand out one shared allocation per distinct string (default: true).
    ///
    /// When disabled every string lookup allocates a fresh `Arc<str>`.
    pub intern_strings: bool,
}

impl Default for ConstantsConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Lzma,
            intern_strings: true,
        }
    }
}

impl ConstantsConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the codec used on the decrypted plaintext.
    ///
    /// # Arguments
    ///
    /// * `compression` - The codec the build-time encoder applied.
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Enables or disables string interning.
    #[must_use]
    pub fn with_interning(mut self, enable: bool) -> Self {
        self.intern_strings = enable;
        self
    }
}
