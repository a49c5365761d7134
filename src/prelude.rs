//! # dotshield Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and functions
//! from the dotshield library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotshield operations
pub use crate::Error;

/// The result type used throughout dotshield
pub use crate::Result;

/// Configuration types
pub use crate::config::{ConstantsConfig, ResolverConfig};

// ================================================================================================
// Signatures
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Signature tree types
pub use crate::metadata::signatures::{
    SignatureArray, SignatureMethod, SignatureModifier, SignatureModule, SignatureParameter,
    SignatureValueArray, TypeSignature,
};

// ================================================================================================
// Generic Resolution
// ================================================================================================

/// Resolver and its building blocks
pub use crate::analysis::generics::{
    resolve_method, resolve_type, GenericArgumentResolver, GenericArguments, RecursionGuard,
};

// ================================================================================================
// Runtime Primitives
// ================================================================================================

/// Constant pool encode and decode
pub use crate::runtime::constants::{
    ArxMixer, BlockMixer, ConstantId, ConstantKind, ConstantPoolBuilder, ConstantStore,
    EncryptedPayload, IdKey, LazyConstants, XorMixer,
};

/// Control-flow register machine
pub use crate::runtime::statemachine::{CfgContext, CfgInstruction};

/// Payload codecs
pub use crate::utils::{Compression, Decompressor};
