//! Executes the workload block as real machine code on the Nexus-V core.

use core::arch::asm;
use nexusv_bench::isa::{Reg, RegisterFile};
use nexusv_bench::with_alu_block;
use nexusv_bench::workload::Workload;

/// A [Workload] that runs the block's instructions on the core itself.
///
/// The scratch registers' values are kept in a [RegisterFile] between calls, and bound to the
/// exact registers the block names for the duration of [Workload::execute]. This means the values
/// stay resident in those registers from one block to the next, and each block consumes the
/// results of the one before it, without any loads or stores in between.
pub struct AluCore {
    regs: RegisterFile,
}

impl Default for AluCore {
    fn default() -> Self {
        Self::new()
    }
}

impl AluCore {
    pub const fn new() -> AluCore {
        AluCore {
            regs: RegisterFile::new(),
        }
    }

    /// The scratch registers' values as of the end of the last [Workload::execute] call.
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }
}

impl Workload for AluCore {
    fn seed(&mut self, seeds: &[(Reg, u32)]) {
        for &(reg, value) in seeds {
            self.regs.set(reg, value);
        }
    }

    fn execute_block(&mut self) {
        self.execute(1);
    }

    fn execute(&mut self, iterations: u32) {
        let mut x5 = self.regs.get(Reg::X5);
        let mut x6 = self.regs.get(Reg::X6);
        let mut x10 = self.regs.get(Reg::X10);
        let mut x11 = self.regs.get(Reg::X11);
        let mut x12 = self.regs.get(Reg::X12);
        let mut x13 = self.regs.get(Reg::X13);
        let mut x14 = self.regs.get(Reg::X14);
        for _ in 0..iterations {
            // SAFETY: the block only reads and writes the registers bound below, and doesn't touch
            // memory or the stack. We deliberately don't pass `nomem`, so that the compiler treats
            // each block as a barrier and can't move the timer reads into the middle of the loop.
            unsafe {
                with_alu_block!(asm!(
                    inout("x5") x5,
                    inout("x6") x6,
                    inout("x10") x10,
                    inout("x11") x11,
                    inout("x12") x12,
                    inout("x13") x13,
                    inout("x14") x14,
                    options(nostack),
                ));
            }
        }
        self.regs.set(Reg::X5, x5);
        self.regs.set(Reg::X6, x6);
        self.regs.set(Reg::X10, x10);
        self.regs.set(Reg::X11, x11);
        self.regs.set(Reg::X12, x12);
        self.regs.set(Reg::X13, x13);
        self.regs.set(Reg::X14, x14);
    }
}
