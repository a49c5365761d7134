//! Constant identifiers and their call-site obfuscation.

use std::fmt;

use crate::{
    runtime::statemachine::{CfgContext, CfgInstruction},
    utils::mod_inverse_u32,
    Result,
};

/// Mask of the 30-bit record index inside a [`ConstantId`].
pub const INDEX_MASK: u32 = 0x3FFF_FFFF;

/// Record kind, stored in the top two bits of a [`ConstantId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum ConstantKind {
    /// Length-prefixed UTF-8 string
    String = 0,
    /// Fixed-size little-endian primitive
    Scalar = 1,
    /// Size and count prefixed primitive array
    Array = 2,
    /// The zero value of the requested type, no record
    Default = 3,
}

impl ConstantKind {
    /// Decodes the two kind bits
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => ConstantKind::String,
            1 => ConstantKind::Scalar,
            2 => ConstantKind::Array,
            _ => ConstantKind::Default,
        }
    }
}

/// A 32-bit constant handle: kind in bits 30..31, word index in bits 0..29.
///
/// The byte offset of the record is `index << 2`, so records are always
/// 4-byte aligned.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConstantId(pub u32);

impl ConstantId {
    /// Creates an id from its parts, `index` is truncated to 30 bits
    #[must_use]
    pub const fn new(kind: ConstantKind, index: u32) -> Self {
        ConstantId(((kind as u32) << 30) | (index & INDEX_MASK))
    }

    /// Creates an id addressing the record at `offset`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `offset` is not 4-byte aligned
    /// or beyond what 30 index bits can address.
    pub fn from_offset(kind: ConstantKind, offset: usize) -> Result<Self> {
        if offset % 4 != 0 {
            return Err(malformed_error!("Record offset {} is not 4-byte aligned", offset));
        }

        let index = u32::try_from(offset >> 2)
            .ok()
            .filter(|index| *index <= INDEX_MASK)
            .ok_or_else(|| malformed_error!("Record offset {} exceeds the id range", offset))?;

        Ok(Self::new(kind, index))
    }

    /// The record kind
    #[must_use]
    pub fn kind(self) -> ConstantKind {
        ConstantKind::from_bits(self.0 >> 30)
    }

    /// The 30-bit word index
    #[must_use]
    pub fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    /// The byte offset of the record inside the decoded pool
    #[must_use]
    pub fn offset(self) -> usize {
        (self.index() as usize) << 2
    }

    /// The raw 32-bit value
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for ConstantId {
    fn from(value: u32) -> Self {
        ConstantId(value)
    }
}

impl From<ConstantId> for u32 {
    fn from(id: ConstantId) -> Self {
        id.0
    }
}

impl fmt::Debug for ConstantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstantId({}, 0x{:08x})", self.kind(), self.index())
    }
}

/// Affine scrambling of ids at call sites.
///
/// The protected call site carries `(id ^ xor) * mul`; the runtime recovers
/// the id by multiplying with the inverse of `mul` modulo 2^32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdKey {
    mul: u32,
    xor: u32,
    inverse: u32,
}

impl IdKey {
    /// Creates a key from its multiplier and xor mask
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidInput`] if `mul` is even, because even
    /// multipliers are not invertible.
    pub fn new(mul: u32, xor: u32) -> Result<Self> {
        let inverse = mod_inverse_u32(mul).ok_or_else(|| {
            crate::Error::InvalidInput(format!("Id multiplier 0x{mul:08x} is even"))
        })?;

        Ok(IdKey { mul, xor, inverse })
    }

    /// The multiplier applied at encode time
    #[must_use]
    pub fn multiplier(&self) -> u32 {
        self.mul
    }

    /// The inverse of the multiplier modulo 2^32
    #[must_use]
    pub fn inverse(&self) -> u32 {
        self.inverse
    }

    /// The xor mask
    #[must_use]
    pub fn xor(&self) -> u32 {
        self.xor
    }

    /// Scrambles `id` for embedding at a call site
    #[must_use]
    pub fn encode(&self, id: ConstantId) -> u32 {
        (id.0 ^ self.xor).wrapping_mul(self.mul)
    }

    /// Recovers the id from a call-site value
    #[must_use]
    pub fn decode(&self, encoded: u32) -> ConstantId {
        ConstantId(encoded.wrapping_mul(self.inverse) ^ self.xor)
    }
}

/// A call-site value tied to the control-flow register machine.
///
/// Instead of a static encoded id the call site carries an instruction and a
/// masked value. The mask is whatever the register machine yields at that
/// point of the method, so the value only decodes on the planned path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSiteKey {
    /// Instruction executed at the call site
    pub instruction: CfgInstruction,
    /// Value masked with the instruction's output
    pub masked: u32,
}

impl CallSiteKey {
    /// Masks `value` with the output of `instruction` on `ctx`
    ///
    /// `ctx` must be in the state the runtime will be in when it reaches the
    /// call site; it is advanced exactly like the runtime advances it.
    pub fn encode(ctx: &mut CfgContext, instruction: CfgInstruction, value: u32) -> Self {
        CallSiteKey {
            instruction,
            masked: value ^ ctx.step(instruction),
        }
    }

    /// Executes the instruction on `ctx` and unmasks the value
    pub fn resolve(&self, ctx: &mut CfgContext) -> u32 {
        self.masked ^ ctx.step(self.instruction)
    }
}
