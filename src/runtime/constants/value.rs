//! Typed views onto constant records.

use std::sync::Arc;

use crate::{
    runtime::constants::{ConstantKind, ConstantStore},
    Error, Result,
};

/// A fixed-size primitive stored little-endian in the pool.
pub trait ConstantPrimitive: Copy {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decodes from exactly [`Self::SIZE`] bytes
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Appends the little-endian encoding to `out`
    fn write_le(self, out: &mut Vec<u8>);

    /// The zero value
    fn zero() -> Self;
}

macro_rules! impl_constant_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConstantPrimitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn zero() -> Self {
                    0 as $ty
                }
            }
        )*
    };
}

impl_constant_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl ConstantPrimitive for bool {
    const SIZE: usize = 1;

    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn write_le(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }

    fn zero() -> Self {
        false
    }
}

/// A value that can be read from the constant pool by id.
pub trait Constant: Sized {
    /// Reads the record of `kind` at `offset`
    ///
    /// # Errors
    /// Returns [`Error::TypeConversionInvalid`] for a record of the wrong
    /// kind and [`Error::OutOfBounds`] for a record outside the pool.
    fn read(store: &ConstantStore, kind: ConstantKind, offset: usize) -> Result<Self>;
}

macro_rules! impl_scalar_constant {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Constant for $ty {
                fn read(store: &ConstantStore, kind: ConstantKind, offset: usize) -> Result<Self> {
                    match kind {
                        ConstantKind::Scalar => store.read_scalar(offset),
                        ConstantKind::Default => Ok(<$ty as ConstantPrimitive>::zero()),
                        ConstantKind::String | ConstantKind::Array => {
                            Err(Error::TypeConversionInvalid)
                        }
                    }
                }
            }
        )*
    };
}

impl_scalar_constant!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, bool);

impl<T: ConstantPrimitive> Constant for Vec<T> {
    fn read(store: &ConstantStore, kind: ConstantKind, offset: usize) -> Result<Self> {
        match kind {
            ConstantKind::Array => store.read_array(offset),
            ConstantKind::Default => Ok(Vec::new()),
            ConstantKind::String | ConstantKind::Scalar => Err(Error::TypeConversionInvalid),
        }
    }
}

impl Constant for Arc<str> {
    fn read(store: &ConstantStore, kind: ConstantKind, offset: usize) -> Result<Self> {
        match kind {
            ConstantKind::String => store.read_string(offset),
            ConstantKind::Default => Ok(Arc::from("")),
            ConstantKind::Scalar | ConstantKind::Array => Err(Error::TypeConversionInvalid),
        }
    }
}

impl Constant for String {
    fn read(store: &ConstantStore, kind: ConstantKind, offset: usize) -> Result<Self> {
        <Arc<str> as Constant>::read(store, kind, offset).map(|s| s.to_string())
    }
}
