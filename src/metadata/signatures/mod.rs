//! Type and method signature trees for .NET metadata.
//!
//! Signatures describe the shape of a type or a method as a tree of element
//! kinds (ECMA-335, Partition II, Section 23.2). This crate consumes them as
//! plain data handed over by the metadata reader; it never parses the binary
//! blob encoding itself.
//!
//! # Tree Shape
//!
//! - **Leaves** - primitives, [`TypeSignature::Class`] and [`TypeSignature::ValueType`]
//! - **Single-child nodes** - pointers, by-refs, pinned types, arrays, module
//!   qualified types and custom modifiers; each owns exactly one child
//! - **Generic instantiations** - the generic type plus its ordered arguments
//! - **Generic parameters** - [`TypeSignature::GenericParamType`] (`!n`) and
//!   [`TypeSignature::GenericParamMethod`] (`!!n`), placeholders bound by an
//!   enclosing type or method
//!
//! # Examples
//!
//! ```rust
//! use dotshield::metadata::{signatures::TypeSignature, token::Token};
//!
//! // List<!0>[]
//! let list = TypeSignature::generic_inst(
//!     TypeSignature::Class(Token(0x0100_0010)),
//!     vec![TypeSignature::GenericParamType(0)],
//! );
//! let array = TypeSignature::sz_array(list);
//! assert!(array.contains_generic_params());
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod types;

pub use types::*;
