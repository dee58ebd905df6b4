use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, punctuated::Punctuated, LitStr, Token};

/// Maps each supported mnemonic to the `AluOp` variant it corresponds to, and whether it's the
/// register-immediate form.
const MNEMONICS: &[(&str, &str, bool)] = &[
    ("add", "Add", false),
    ("sub", "Sub", false),
    ("slt", "Slt", false),
    ("sltu", "Sltu", false),
    ("xor", "Xor", false),
    ("or", "Or", false),
    ("and", "And", false),
    ("sll", "Sll", false),
    ("srl", "Srl", false),
    ("sra", "Sra", false),
    ("addi", "Add", true),
    ("slti", "Slt", true),
    ("sltiu", "Sltu", true),
    ("xori", "Xor", true),
    ("ori", "Or", true),
    ("andi", "And", true),
    ("slli", "Sll", true),
    ("srli", "Srl", true),
    ("srai", "Sra", true),
];

/// Parses a list of RV32I ALU assembly instructions (one string literal per instruction, e.g.
/// `"addi x10, x10, 1"`) into an array expression of `nexusv_bench::isa::Instruction` values.
///
/// This lets the exact same assembly text be handed to [core::arch::asm!] for execution, and to
/// this macro for inspection and simulation on the host. Anything that isn't a register-register
/// or register-immediate ALU instruction is rejected with a compile error pointing at the
/// offending literal, as are register names other than `x0`-`x31`/`zero` and out-of-range
/// immediates.
///
/// A trailing comma after the last instruction is allowed.
#[proc_macro]
pub fn parse_alu_block(input: TokenStream) -> TokenStream {
    let lits = parse_macro_input!(input with Punctuated::<LitStr, Token![,]>::parse_terminated);

    let mut instrs = Vec::with_capacity(lits.len());
    for lit in &lits {
        match parse_instruction(&lit.value()) {
            Ok(instr) => instrs.push(instr),
            Err(msg) => return syn::Error::new(lit.span(), msg).to_compile_error().into(),
        }
    }
    TokenStream::from(quote! { [ #(#instrs),* ] })
}

/// Parses a single `<mnemonic> rd, rs1, rs2|imm` instruction into a constructor expression.
fn parse_instruction(text: &str) -> Result<proc_macro2::TokenStream, String> {
    let (mnemonic, operands) = text
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("expected `<mnemonic> rd, rs1, rs2|imm`, got `{text}`"))?;
    let &(_, op, immediate) = MNEMONICS
        .iter()
        .find(|(name, _, _)| *name == mnemonic)
        .ok_or_else(|| format!("unsupported instruction `{mnemonic}`"))?;
    let op = format_ident!("{}", op);

    let operands: Vec<&str> = operands.split(',').map(str::trim).collect();
    let [rd, rs1, src2] = operands.as_slice() else {
        return Err(format!(
            "`{mnemonic}` takes 3 operands, got {}",
            operands.len()
        ));
    };
    let rd = parse_reg(rd)?;
    let rs1 = parse_reg(rs1)?;

    if immediate {
        let imm = parse_imm(src2)?;
        // Shift amounts are 5 bits wide, all other immediates are 12-bit signed values.
        let range = if matches!(mnemonic, "slli" | "srli" | "srai") {
            0..=31
        } else {
            -2048..=2047
        };
        if !range.contains(&imm) {
            return Err(format!(
                "immediate {imm} for `{mnemonic}` is outside of {}..={}",
                range.start(),
                range.end()
            ));
        }
        let imm = imm as i32;
        Ok(quote! {
            ::nexusv_bench::isa::Instruction::imm(
                ::nexusv_bench::isa::AluOp::#op,
                ::nexusv_bench::isa::Reg::new(#rd),
                ::nexusv_bench::isa::Reg::new(#rs1),
                #imm,
            )
        })
    } else {
        let rs2 = parse_reg(src2)?;
        Ok(quote! {
            ::nexusv_bench::isa::Instruction::reg(
                ::nexusv_bench::isa::AluOp::#op,
                ::nexusv_bench::isa::Reg::new(#rd),
                ::nexusv_bench::isa::Reg::new(#rs1),
                ::nexusv_bench::isa::Reg::new(#rs2),
            )
        })
    }
}

fn parse_reg(text: &str) -> Result<u8, String> {
    if text == "zero" {
        return Ok(0);
    }
    text.strip_prefix('x')
        .and_then(|index| index.parse::<u8>().ok())
        .filter(|index| *index < 32)
        .ok_or_else(|| format!("invalid register `{text}`, expected `x0` to `x31`"))
}

/// Parses a decimal or `0x`-prefixed hexadecimal immediate, optionally negated.
fn parse_imm(text: &str) -> Result<i64, String> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, text),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| format!("invalid immediate `{text}`"))?;
    Ok(if negative { -value } else { value })
}
