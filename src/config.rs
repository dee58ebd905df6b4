//! Compile-time configuration of the benchmark. None of this can be changed at runtime: the
//! reported numbers are only comparable between runs if every run uses the exact same values.

/// The number of times the workload block is executed between the two timer samples.
pub const ITERATIONS: u32 = 1000;

/// The number of instructions in a single workload block. See [crate::workload::BLOCK].
pub const BLOCK_SIZE: usize = 20;

/// The total number of workload instructions executed during the measured interval. This is a
/// constant, it is never derived from the measurement itself.
pub const INSTRUCTION_COUNT: u32 = ITERATIONS * BLOCK_SIZE as u32;

/// The clock frequency the core is expected to run at, in MHz.
///
/// Only used as a reference for converting the reported cycle count into wall-clock time on the
/// host side. Nothing in the harness computes with it.
pub const CPU_FREQ_MHZ: u32 = 50;

/// The address of the free-running 32-bit cycle counter.
pub const TIMER_ADDR: usize = 0x8000_0008;

/// The address of the serial transmit register. Each write transmits the low byte of the written
/// word.
pub const UART_TX_ADDR: usize = 0x8000_0100;
