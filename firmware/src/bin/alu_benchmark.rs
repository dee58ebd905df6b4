//! Runs the ALU benchmark once on the Nexus-V core, prints the elapsed cycle count and the number
//! of executed instructions over the serial port, and then halts.
//!
//! The output looks like this:
//!
//! ```text
//! === Nexus-V ALU Benchmark ===
//! Testing R-Type and I-Type Performance...
//! Total Cycles:   0x00005DCB
//! Inst Count:     0x00004E20
//!
//! --- Copy these values for MIPS Calculation ---
//! ```
//!
//! Dividing the two gives the core's CPI for this instruction mix. Note that the cycle count also
//! includes the loop overhead and the cost of the timer reads themselves, which should be
//! calibrated for separately.

#![no_std]
#![no_main]

use log::info;
use nexusv_bench::bench::Benchmark;
use nexusv_bench::config::CPU_FREQ_MHZ;
use nexusv_bench_firmware::{alu_core::AluCore, halt, logger, mmio::MmioDevice};
use panic_halt as _;
use riscv_rt::entry;

#[entry]
fn main() -> ! {
    logger::init_logger_from_env();
    info!("Booted up! Expecting a {}MHz core clock.", CPU_FREQ_MHZ);

    let mut benchmark = Benchmark::new(MmioDevice::platform(), AluCore::new());
    benchmark.run();
    halt()
}
