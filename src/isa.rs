//! A small model of the part of the RV32I instruction set the workload block uses: the integer
//! register-register and register-immediate ALU instructions.
//!
//! The firmware never uses this model to execute anything, it runs the block as real machine
//! code. The model exists so that the block can be inspected (which registers it reads and
//! writes, which operation classes it covers) and simulated on the host.

use core::fmt;

/// One of the 32 integer registers, `x0` to `x31`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(u8);

impl Reg {
    /// The zero register. Reads always return zero and writes are discarded.
    pub const X0: Reg = Reg(0);
    pub const X5: Reg = Reg(5);
    pub const X6: Reg = Reg(6);
    pub const X10: Reg = Reg(10);
    pub const X11: Reg = Reg(11);
    pub const X12: Reg = Reg(12);
    pub const X13: Reg = Reg(13);
    pub const X14: Reg = Reg(14);

    /// Returns the register with the given index. Panics (at compile time, when used in a const
    /// context) if the index is not in `0..32`.
    pub const fn new(index: u8) -> Reg {
        assert!(index < 32, "RV32I only has 32 integer registers");
        Reg(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// The broad classes of ALU operation. Different classes may be served by different functional
/// units of the core (e.g. the adder vs. the shifter), which is why the workload mixes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Compare,
    Logical,
    Shift,
}

/// An ALU operation, independent of whether its second operand is a register or an immediate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    /// Set if less than, signed.
    Slt,
    /// Set if less than, unsigned.
    Sltu,
    Xor,
    Or,
    And,
    /// Shift left logical.
    Sll,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
}

impl AluOp {
    /// Every ALU operation.
    pub const ALL: [AluOp; 10] = [
        AluOp::Add,
        AluOp::Sub,
        AluOp::Slt,
        AluOp::Sltu,
        AluOp::Xor,
        AluOp::Or,
        AluOp::And,
        AluOp::Sll,
        AluOp::Srl,
        AluOp::Sra,
    ];

    /// Computes the result of the operation the way an RV32I core does: arithmetic wraps,
    /// comparisons produce 0 or 1, and shifts only use the low 5 bits of the shift amount.
    pub fn apply(self, a: u32, b: u32) -> u32 {
        let shamt = b & 0x1F;
        match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Slt => ((a as i32) < (b as i32)) as u32,
            AluOp::Sltu => (a < b) as u32,
            AluOp::Xor => a ^ b,
            AluOp::Or => a | b,
            AluOp::And => a & b,
            AluOp::Sll => a << shamt,
            AluOp::Srl => a >> shamt,
            AluOp::Sra => ((a as i32) >> shamt) as u32,
        }
    }

    pub const fn class(self) -> OpClass {
        match self {
            AluOp::Add | AluOp::Sub => OpClass::Arithmetic,
            AluOp::Slt | AluOp::Sltu => OpClass::Compare,
            AluOp::Xor | AluOp::Or | AluOp::And => OpClass::Logical,
            AluOp::Sll | AluOp::Srl | AluOp::Sra => OpClass::Shift,
        }
    }

    /// Whether RV32I has a register-immediate encoding of this operation. Only `sub` doesn't
    /// (`addi` with a negated immediate is used instead).
    pub const fn has_immediate_form(self) -> bool {
        !matches!(self, AluOp::Sub)
    }

    /// Whether this is a shift, whose immediate form takes a 5-bit shift amount rather than a
    /// 12-bit signed immediate.
    pub const fn is_shift(self) -> bool {
        matches!(self.class(), OpClass::Shift)
    }

    /// The assembly mnemonic of the register-register form.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "add",
            AluOp::Sub => "sub",
            AluOp::Slt => "slt",
            AluOp::Sltu => "sltu",
            AluOp::Xor => "xor",
            AluOp::Or => "or",
            AluOp::And => "and",
            AluOp::Sll => "sll",
            AluOp::Srl => "srl",
            AluOp::Sra => "sra",
        }
    }

    /// The assembly mnemonic of the register-immediate form, if there is one.
    pub const fn immediate_mnemonic(self) -> Option<&'static str> {
        Some(match self {
            AluOp::Add => "addi",
            AluOp::Sub => return None,
            AluOp::Slt => "slti",
            AluOp::Sltu => "sltiu",
            AluOp::Xor => "xori",
            AluOp::Or => "ori",
            AluOp::And => "andi",
            AluOp::Sll => "slli",
            AluOp::Srl => "srli",
            AluOp::Sra => "srai",
        })
    }
}

/// The second source operand of an ALU instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// A register (R-type instruction).
    Reg(Reg),
    /// An immediate (I-type instruction). For shifts this is the 5-bit shift amount, for all other
    /// operations a 12-bit value that gets sign-extended to 32 bits.
    Imm(i32),
}

/// A single ALU instruction: `rd = op(rs1, src2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub op: AluOp,
    pub rd: Reg,
    pub rs1: Reg,
    pub src2: Operand,
}

impl Instruction {
    /// Constructs a register-register instruction.
    pub const fn reg(op: AluOp, rd: Reg, rs1: Reg, rs2: Reg) -> Instruction {
        Instruction {
            op,
            rd,
            rs1,
            src2: Operand::Reg(rs2),
        }
    }

    /// Constructs a register-immediate instruction.
    pub const fn imm(op: AluOp, rd: Reg, rs1: Reg, imm: i32) -> Instruction {
        Instruction {
            op,
            rd,
            rs1,
            src2: Operand::Imm(imm),
        }
    }

    pub const fn is_immediate(&self) -> bool {
        matches!(self.src2, Operand::Imm(_))
    }

    /// Whether the instruction has no architecturally visible effect, i.e. it writes to `x0`.
    pub fn is_nop(&self) -> bool {
        self.rd == Reg::X0
    }

    /// The registers this instruction reads, `rs1` first.
    pub fn sources(&self) -> impl Iterator<Item = Reg> {
        let rs2 = match self.src2 {
            Operand::Reg(rs2) => Some(rs2),
            Operand::Imm(_) => None,
        };
        core::iter::once(self.rs1).chain(rs2)
    }

    /// The register this instruction writes, if any. Writes to `x0` are discarded, so they don't
    /// count.
    pub fn destination(&self) -> Option<Reg> {
        (!self.is_nop()).then_some(self.rd)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.src2 {
            Operand::Reg(rs2) => write!(f, "{} {}, {}, {rs2}", self.op.mnemonic(), self.rd, self.rs1),
            Operand::Imm(imm) => write!(
                f,
                "{} {}, {}, {imm}",
                self.op.immediate_mnemonic().unwrap_or("?"),
                self.rd,
                self.rs1
            ),
        }
    }
}

/// The integer register file of an RV32I hart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u32; 32],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Returns a register file with all registers set to zero.
    pub const fn new() -> RegisterFile {
        RegisterFile { regs: [0; 32] }
    }

    pub fn get(&self, reg: Reg) -> u32 {
        self.regs[reg.index()]
    }

    /// Sets the register's value. Writes to `x0` are ignored.
    pub fn set(&mut self, reg: Reg, value: u32) {
        if reg != Reg::X0 {
            self.regs[reg.index()] = value;
        }
    }

    /// Executes a single instruction against this register file.
    pub fn execute(&mut self, instr: &Instruction) {
        let a = self.get(instr.rs1);
        let b = match instr.src2 {
            Operand::Reg(rs2) => self.get(rs2),
            Operand::Imm(imm) => imm as u32,
        };
        self.set(instr.rd, instr.op.apply(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alu_add() {
        assert_eq!(30, AluOp::Add.apply(10, 20));
        assert_eq!(0, AluOp::Add.apply(u32::MAX, 1));
    }

    #[test]
    fn alu_sub_negative_result() {
        assert_eq!(-20, AluOp::Sub.apply(50, 70) as i32);
    }

    #[test]
    fn alu_set_less_than() {
        assert_eq!(1, AluOp::Slt.apply(-5i32 as u32, 2));
        // The same operands compare the other way around when treated as unsigned.
        assert_eq!(0, AluOp::Sltu.apply(-5i32 as u32, 2));
        assert_eq!(1, AluOp::Sltu.apply(2, -5i32 as u32));
        assert_eq!(0, AluOp::Slt.apply(7, 7));
    }

    #[test]
    fn alu_shifts() {
        assert_eq!(0xC000_0000, AluOp::Sra.apply(0x8000_0000, 1));
        assert_eq!(0x4000_0000, AluOp::Srl.apply(0x8000_0000, 1));
        assert_eq!(0x0000_0002, AluOp::Sll.apply(1, 1));
        // Only the low 5 bits of the shift amount are used.
        assert_eq!(50 << 20, AluOp::Sll.apply(50, 20 + 32));
        assert_eq!(0xFFFF_FFFF, AluOp::Sra.apply(0x8000_0000, 31));
    }

    #[test]
    fn alu_logical() {
        assert_eq!(0xAAAA ^ 50, AluOp::Xor.apply(0xAAAA, 50));
        assert_eq!(0x0F, AluOp::Or.apply(0x0A, 0x05));
        assert_eq!(0x0A, AluOp::And.apply(0xFA, 0x0F));
    }

    #[test]
    fn register_file_x0_is_hardwired() {
        let mut regs = RegisterFile::new();
        regs.set(Reg::X0, 123);
        assert_eq!(0, regs.get(Reg::X0));
        regs.execute(&Instruction::imm(AluOp::Add, Reg::X0, Reg::X0, 5));
        assert_eq!(RegisterFile::new(), regs);
    }

    #[test]
    fn register_file_immediates_are_sign_extended() {
        let mut regs = RegisterFile::new();
        regs.set(Reg::X10, 1);
        regs.execute(&Instruction::imm(AluOp::Add, Reg::X11, Reg::X10, -2));
        assert_eq!(u32::MAX, regs.get(Reg::X11));
        regs.execute(&Instruction::imm(AluOp::Xor, Reg::X12, Reg::X11, -1));
        assert_eq!(0, regs.get(Reg::X12));
    }

    #[test]
    fn instruction_operands() {
        let add = Instruction::reg(AluOp::Add, Reg::X12, Reg::X10, Reg::X11);
        assert_eq!(vec![Reg::X10, Reg::X11], add.sources().collect::<Vec<_>>());
        assert_eq!(Some(Reg::X12), add.destination());

        let nop = Instruction::reg(AluOp::Add, Reg::X0, Reg::X0, Reg::X0);
        assert!(nop.is_nop());
        assert_eq!(None, nop.destination());

        let slli = Instruction::imm(AluOp::Sll, Reg::X6, Reg::X10, 2);
        assert_eq!(vec![Reg::X10], slli.sources().collect::<Vec<_>>());
    }

    #[test]
    fn instruction_display() {
        assert_eq!(
            "sltu x14, x11, x10",
            Instruction::reg(AluOp::Sltu, Reg::X14, Reg::X11, Reg::X10).to_string()
        );
        assert_eq!(
            "srai x6, x10, 2",
            Instruction::imm(AluOp::Sra, Reg::X6, Reg::X10, 2).to_string()
        );
    }
}
