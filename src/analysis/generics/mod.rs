//! Generic argument resolution for signature trees.
//!
//! A protection pass that meets a call to `List<int>.Add(!0)` needs to know
//! that the parameter really is an `int32`. This module substitutes concrete
//! types for generic type parameters (`!n`) and generic method parameters
//! (`!!n`) inside arbitrarily nested [`TypeSignature`] and [`SignatureMethod`]
//! trees.
//!
//! # Key Components
//!
//! - [`RecursionGuard`] - Bounded depth counter, owned by one top-level call
//! - [`GenericArguments`] - Independent stacks of type-level and method-level frames
//! - [`GenericArgumentResolver`] - The recursive tree rewriter
//!
//! # Resolution Rules
//!
//! - Parameters bound by the active frame are replaced by their binding,
//!   which is not resolved any further
//! - Parameters without a binding (no frame, index out of range) pass through
//!   unchanged; they belong to an enclosing generic context
//! - Every other node is rebuilt around its resolved children; sizes, bounds,
//!   ranks, modifier tokens and module indices are carried over verbatim
//! - Function pointers are rejected with [`crate::Error::NotSupported`]
//! - A generic instantiation whose generic type does not resolve to a class
//!   or value type is rejected with [`crate::Error::Malformed`]
//! - Trees deeper than [`ResolverConfig::max_depth`] abort the whole call with
//!   [`crate::Error::RecursionLimit`]
//!
//! # Examples
//!
//! ```rust
//! use dotshield::analysis::generics::resolve_method;
//! use dotshield::metadata::signatures::{SignatureMethod, SignatureParameter, TypeSignature};
//!
//! // !0 Get(int32, !0[])
//! let sig = SignatureMethod {
//!     has_this: true,
//!     param_count: 2,
//!     return_type: SignatureParameter::new(TypeSignature::GenericParamType(0)),
//!     params: vec![
//!         SignatureParameter::new(TypeSignature::I4),
//!         SignatureParameter::new(TypeSignature::sz_array(TypeSignature::GenericParamType(0))),
//!     ],
//!     ..Default::default()
//! };
//!
//! let resolved = resolve_method(&sig, &[TypeSignature::String])?;
//! assert_eq!(resolved.return_type.base, TypeSignature::String);
//! assert_eq!(resolved.params[1].base, TypeSignature::sz_array(TypeSignature::String));
//! # Ok::<(), dotshield::Error>(())
//! ```

mod frames;
mod guard;
mod resolver;

use std::borrow::Cow;

pub use frames::GenericArguments;
pub use guard::{DepthScope, RecursionGuard};
pub use resolver::GenericArgumentResolver;

use crate::{
    config::ResolverConfig,
    metadata::signatures::{SignatureMethod, TypeSignature},
    Result,
};

/// Resolve a type signature against the generic arguments of its declaring type
///
/// ## Arguments
/// * 'sig'       - The signature to resolve
/// * 'type_args' - The type-level generic arguments, may be empty
///
/// # Errors
/// See [`GenericArgumentResolver::resolve_type`]
pub fn resolve_type<'s>(
    sig: &'s TypeSignature,
    type_args: &[TypeSignature],
) -> Result<Cow<'s, TypeSignature>> {
    GenericArgumentResolver::new(type_args).resolve_type(sig)
}

/// Resolve a method signature against the generic arguments of its declaring type
///
/// ## Arguments
/// * 'sig'       - The method signature to resolve
/// * 'type_args' - The type-level generic arguments, may be empty
///
/// # Errors
/// See [`GenericArgumentResolver::resolve_method`]
pub fn resolve_method(sig: &SignatureMethod, type_args: &[TypeSignature]) -> Result<SignatureMethod> {
    GenericArgumentResolver::new(type_args).resolve_method(sig)
}

/// Resolve a type signature with both type-level and method-level arguments
///
/// ## Arguments
/// * 'sig'         - The signature to resolve
/// * 'type_args'   - The type-level generic arguments
/// * 'method_args' - The method-level generic arguments
///
/// # Errors
/// See [`GenericArgumentResolver::resolve_type`]
pub fn resolve_type_with_method_args<'s>(
    sig: &'s TypeSignature,
    type_args: &[TypeSignature],
    method_args: &[TypeSignature],
) -> Result<Cow<'s, TypeSignature>> {
    GenericArgumentResolver::new(type_args)
        .with_method_args(method_args)
        .resolve_type(sig)
}

/// Resolve a method signature with both type-level and method-level arguments
///
/// ## Arguments
/// * 'sig'         - The method signature to resolve
/// * 'type_args'   - The type-level generic arguments
/// * 'method_args' - The method-level generic arguments
///
/// # Errors
/// See [`GenericArgumentResolver::resolve_method`]
pub fn resolve_method_with_method_args(
    sig: &SignatureMethod,
    type_args: &[TypeSignature],
    method_args: &[TypeSignature],
) -> Result<SignatureMethod> {
    GenericArgumentResolver::new(type_args)
        .with_method_args(method_args)
        .resolve_method(sig)
}

/// Resolve a type signature with an explicit configuration
///
/// ## Arguments
/// * 'sig'       - The signature to resolve
/// * 'type_args' - The type-level generic arguments
/// * 'config'    - Resolver configuration, e.g. a different depth limit
///
/// # Errors
/// See [`GenericArgumentResolver::resolve_type`]
pub fn resolve_type_with_config<'s>(
    sig: &'s TypeSignature,
    type_args: &[TypeSignature],
    config: ResolverConfig,
) -> Result<Cow<'s, TypeSignature>> {
    GenericArgumentResolver::new(type_args)
        .with_config(config)
        .resolve_type(sig)
}

/// Resolve a method signature with an explicit configuration
///
/// ## Arguments
/// * 'sig'       - The method signature to resolve
/// * 'type_args' - The type-level generic arguments
/// * 'config'    - Resolver configuration, e.g. a different depth limit
///
/// # Errors
/// See [`GenericArgumentResolver::resolve_method`]
pub fn resolve_method_with_config(
    sig: &SignatureMethod,
    type_args: &[TypeSignature],
    config: ResolverConfig,
) -> Result<SignatureMethod> {
    GenericArgumentResolver::new(type_args)
        .with_config(config)
        .resolve_method(sig)
}
