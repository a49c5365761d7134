//! Control-flow register machine.
//!
//! Protected methods carry a small four-register state machine whose outputs
//! feed control-flow decisions and constant keys. A call site issues
//! `next(flag, operand)`: one register is mutated, a (possibly different)
//! register is read back. The output of a single call tells nothing about the
//! next one; only replaying the whole instruction stream from the seed yields
//! the values the build-time tool planned for.
//!
//! # Instruction Encoding
//!
//! ```text
//! flag bit 7     : 1 = overwrite the update register, 0 = combine with operand
//! flag bits 0..1 : update register (A, B, C, D)
//! flag bits 2..3 : read register, returned after the update
//! ```
//!
//! Combining operations per register, in incremental mode:
//!
//! ```text
//! A ^= operand
//! B += operand   (wrapping)
//! C ^= operand
//! D -= operand   (wrapping)
//! ```
//!
//! # Seeding
//!
//! ```text
//! A = seed * 0x21412321
//! B = A    * 0x21412321
//! C = B    * 0x21412321
//! D = C    * 0x21412321
//! ```

use std::fmt;

/// Multiplier chaining the four registers during seeding.
pub const CFG_MULTIPLIER: u32 = 0x2141_2321;

/// Flag bit selecting overwrite instead of combine.
pub const EXPLICIT_FLAG: u8 = 0x80;

/// Combining operation applied to a register in incremental mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    /// `register ^= operand`
    Xor,
    /// `register += operand`, wrapping
    Add,
    /// `register -= operand`, wrapping
    Sub,
}

impl RegisterOp {
    /// Applies this operation to `register` and `operand`
    #[must_use]
    pub fn apply(self, register: u32, operand: u32) -> u32 {
        match self {
            RegisterOp::Xor => register ^ operand,
            RegisterOp::Add => register.wrapping_add(operand),
            RegisterOp::Sub => register.wrapping_sub(operand),
        }
    }
}

/// Incremental operation of each register, indexed by register number.
pub const REGISTER_OPS: [RegisterOp; 4] = [
    RegisterOp::Xor,
    RegisterOp::Add,
    RegisterOp::Xor,
    RegisterOp::Sub,
];

/// One step of the instruction stream: a flag byte and its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CfgInstruction {
    /// Encoded update register, read register and mode
    pub flag: u8,
    /// Value combined into (or written to) the update register
    pub operand: u32,
}

impl CfgInstruction {
    /// Creates an instruction from a raw flag byte
    #[must_use]
    pub const fn new(flag: u8, operand: u32) -> Self {
        CfgInstruction { flag, operand }
    }

    /// Combines `operand` into register `update` and reads register `read`
    ///
    /// Register numbers are taken modulo 4.
    #[must_use]
    pub const fn combine(update: u8, read: u8, operand: u32) -> Self {
        CfgInstruction {
            flag: (update & 0b11) | ((read & 0b11) << 2),
            operand,
        }
    }

    /// Overwrites register `update` with `operand` and reads register `read`
    ///
    /// Register numbers are taken modulo 4.
    #[must_use]
    pub const fn overwrite(update: u8, read: u8, operand: u32) -> Self {
        CfgInstruction {
            flag: EXPLICIT_FLAG | (update & 0b11) | ((read & 0b11) << 2),
            operand,
        }
    }

    /// The register mutated by this instruction
    #[must_use]
    pub fn update_register(&self) -> usize {
        (self.flag & 0b11) as usize
    }

    /// The register returned by this instruction
    #[must_use]
    pub fn read_register(&self) -> usize {
        ((self.flag >> 2) & 0b11) as usize
    }

    /// True if the update register is overwritten rather than combined
    #[must_use]
    pub fn is_overwrite(&self) -> bool {
        self.flag & EXPLICIT_FLAG != 0
    }
}

/// The four-register obfuscation state.
///
/// A plain value: copying a context forks the state, and it only evolves
/// through explicit [`CfgContext::next`] calls.
///
/// # Example
///
/// ```rust
/// use dotshield::runtime::statemachine::CfgContext;
///
/// let mut ctx = CfgContext::new(0x1234_5678);
/// // Combine into A, return B
/// let b = ctx.next(0b0000_0100, 0x1111);
/// assert_eq!(b, ctx.registers()[1]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CfgContext {
    registers: [u32; 4],
}

impl CfgContext {
    /// Seeds the registers with the standard multiplier
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self::with_multiplier(seed, CFG_MULTIPLIER)
    }

    /// Seeds the registers with a custom multiplier
    ///
    /// Builds that randomize the multiplier must use an odd value, otherwise
    /// the chain collapses towards zero.
    #[must_use]
    pub fn with_multiplier(seed: u32, multiplier: u32) -> Self {
        let mut registers = [0u32; 4];
        let mut current = seed;
        for register in &mut registers {
            current = current.wrapping_mul(multiplier);
            *register = current;
        }

        CfgContext { registers }
    }

    /// Creates a context from explicit register values
    #[must_use]
    pub const fn from_registers(registers: [u32; 4]) -> Self {
        CfgContext { registers }
    }

    /// Current register values, A through D
    #[must_use]
    pub fn registers(&self) -> [u32; 4] {
        self.registers
    }

    /// Executes one step and returns the read register after the update.
    ///
    /// # Arguments
    ///
    /// * `flag` - The flag byte encoding update/read registers and mode
    /// * `operand` - The value combined into or written to the update register
    pub fn next(&mut self, flag: u8, operand: u32) -> u32 {
        self.step(CfgInstruction::new(flag, operand))
    }

    /// Executes one decoded instruction, see [`CfgContext::next`]
    pub fn step(&mut self, instruction: CfgInstruction) -> u32 {
        let update = instruction.update_register();
        self.registers[update] = if instruction.is_overwrite() {
            instruction.operand
        } else {
            REGISTER_OPS[update].apply(self.registers[update], instruction.operand)
        };

        self.registers[instruction.read_register()]
    }

    /// Executes a whole instruction stream, collecting every output.
    pub fn run<I>(&mut self, stream: I) -> Vec<u32>
    where
        I: IntoIterator<Item = CfgInstruction>,
    {
        stream
            .into_iter()
            .map(|instruction| self.step(instruction))
            .collect()
    }
}

impl fmt::Debug for CfgContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CfgContext(A: 0x{:08x}, B: 0x{:08x}, C: 0x{:08x}, D: 0x{:08x})",
            self.registers[0], self.registers[1], self.registers[2], self.registers[3]
        )
    }
}
