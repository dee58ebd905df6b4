//! The benchmark workload: a fixed block of 20 ALU instructions that is executed back-to-back
//! [ITERATIONS](crate::config::ITERATIONS) times.
//!
//! The block mixes every RV32I ALU operation class (add/sub, signed and unsigned compares,
//! xor/or/and, logical and arithmetic shifts), in both register-register and register-immediate
//! form, plus two no-ops that pad it out to 20 instructions. The exact sequence matters: the mix
//! determines how much the adder, comparator and shifter are each exercised, so two cores can only
//! be compared if they ran the very same block.
//!
//! There are no branches and no memory accesses in the block. Some registers (`x5` and `x10`)
//! carry results from one block into the next, so the core can't skip any of the work.

use crate::config::BLOCK_SIZE;
use crate::isa::{AluOp, Instruction, Reg};
use bitvec::prelude::*;
use core::fmt;
use nexusv_bench_proc_macros::parse_alu_block;

/// Invokes the given macro with the workload block's instructions, as one assembly string literal
/// per instruction, followed by a trailing comma and then any extra tokens passed in.
///
/// This is the single definition of the block. The firmware passes it to [core::arch::asm!], with
/// the scratch registers bound as operands:
///
/// ```ignore
/// with_alu_block!(asm!(inout("x5") x5, /* ... */ options(nostack)));
/// ```
///
/// while [BLOCK] passes it to the `parse_alu_block!` proc macro to get a table of
/// [Instruction]s that can be inspected and simulated.
#[macro_export]
macro_rules! with_alu_block {
    ($callback:ident!($($extra:tt)*)) => {
        $callback!(
            // Arithmetic and compares, register-register.
            "add  x12, x10, x11",
            "sub  x13, x10, x11",
            "slt  x14, x11, x10",
            "sltu x14, x11, x10",
            // Logical, register-register.
            "xor  x5,  x5,  x10",
            "or   x5,  x5,  x11",
            "and  x5,  x5,  x12",
            // Shifts, register-register.
            "sll  x6,  x10, x11",
            "srl  x6,  x10, x11",
            "sra  x6,  x10, x11",
            // Register-immediate.
            "addi x10, x10, 1",
            "xori x5,  x5,  0xFF",
            "ori  x5,  x5,  0x0F",
            "andi x5,  x5,  0xF0",
            "slti x14, x10, 100",
            // Shifts, register-immediate.
            "slli x6,  x10, 2",
            "srli x6,  x10, 2",
            "srai x6,  x10, 2",
            // Padding.
            "add  x0,  x0,  x0",
            "add  x0,  x0,  x0",
            $($extra)*
        )
    };
}

/// The workload block, parsed from the same assembly text the firmware executes.
pub const BLOCK: [Instruction; BLOCK_SIZE] = with_alu_block!(parse_alu_block!());

/// The registers the block uses (besides `x0`). Workload implementations must preserve these
/// between blocks.
pub const SCRATCH_REGISTERS: [Reg; 7] = [
    Reg::X5,
    Reg::X6,
    Reg::X10,
    Reg::X11,
    Reg::X12,
    Reg::X13,
    Reg::X14,
];

/// The values the scratch registers are seeded with before the first block runs. These are
/// non-zero and differ from each other, so that no instruction ever computes on all-zero or
/// undefined inputs (simulators tend to propagate 'X' values from uninitialized registers, and
/// real hardware may take shortcuts on zero operands).
pub const SEEDS: [(Reg, u32); 3] = [(Reg::X10, 50), (Reg::X11, 20), (Reg::X5, 0xAAAA)];

/// Something that can run the workload block: the actual CPU core, or a model of it.
pub trait Workload {
    /// Sets the given registers to the given values. Called once, before the measurement starts.
    fn seed(&mut self, seeds: &[(Reg, u32)]);

    /// Executes the block once.
    fn execute_block(&mut self);

    /// Executes the block `iterations` times, back-to-back.
    fn execute(&mut self, iterations: u32) {
        for _ in 0..iterations {
            self.execute_block();
        }
    }
}

impl<W: Workload + ?Sized> Workload for &mut W {
    fn seed(&mut self, seeds: &[(Reg, u32)]) {
        (**self).seed(seeds)
    }

    fn execute_block(&mut self) {
        (**self).execute_block()
    }

    fn execute(&mut self, iterations: u32) {
        (**self).execute(iterations)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The instruction at `position` reads `reg`, but no earlier instruction wrote it and it
    /// wasn't seeded either.
    UninitializedRead {
        position: usize,
        instruction: Instruction,
        reg: Reg,
    },
}
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UninitializedRead {
                position,
                instruction,
                reg,
            } => write!(
                f,
                "instruction {position} (`{instruction}`) reads uninitialized register {reg}"
            ),
        }
    }
}

/// Checks that every register read in `block` traces back to either one of the `seeds` or a
/// write by an earlier instruction in the block. `x0` always counts as initialized.
///
/// If this holds for one execution of the block, it holds for any number of back-to-back
/// executions, since the set of initialized registers only grows.
pub fn check_initialized(block: &[Instruction], seeds: &[(Reg, u32)]) -> Result<()> {
    let mut initialized = bitarr![u32, Lsb0; 0; 32];
    initialized.set(Reg::X0.index(), true);
    for (reg, _) in seeds {
        initialized.set(reg.index(), true);
    }

    for (position, instruction) in block.iter().enumerate() {
        if let Some(reg) = instruction.sources().find(|reg| !initialized[reg.index()]) {
            return Err(Error::UninitializedRead {
                position,
                instruction: *instruction,
                reg,
            });
        }
        if let Some(rd) = instruction.destination() {
            initialized.set(rd.index(), true);
        }
    }
    Ok(())
}

/// Returns whether `block` contains `op` in register-immediate form (if `immediate` is true) or
/// register-register form (if it is false).
pub fn covers(block: &[Instruction], op: AluOp, immediate: bool) -> bool {
    block
        .iter()
        .any(|instr| !instr.is_nop() && instr.op == op && instr.is_immediate() == immediate)
}
