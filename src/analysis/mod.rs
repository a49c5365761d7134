//! Analysis infrastructure used by the protection passes.
//!
//! # Architecture
//!
//! - [`generics`] - Generic argument substitution in signature trees, used to
//!   learn the concrete type of a generic member at an instantiation site
//!
//! # Usage
//!
//! ```rust
//! use dotshield::analysis::generics::resolve_type;
//! use dotshield::metadata::signatures::TypeSignature;
//!
//! let sig = TypeSignature::GenericParamType(0);
//! let resolved = resolve_type(&sig, &[TypeSignature::String])?;
//! assert_eq!(*resolved, TypeSignature::String);
//! # Ok::<(), dotshield::Error>(())
//! ```

pub mod generics;

pub use generics::{GenericArgumentResolver, GenericArguments, RecursionGuard};
