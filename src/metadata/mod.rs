//! Metadata object model consumed by the protection core.
//!
//! The raw metadata reader/writer lives outside of this crate. What remains
//! here is the pure data it hands over:
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`signatures`] - Type and method signature trees

/// Implementation of method and type signatures
pub mod signatures;
/// Implementation of the metadata token
pub mod token;
