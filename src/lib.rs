//! A micro-benchmark harness for the Nexus-V soft CPU core.
//!
//! The harness runs a fixed block of 20 ALU instructions [config::ITERATIONS] times, samples a
//! memory-mapped cycle counter before and after, and prints the elapsed cycle count and the
//! (constant) number of executed instructions over a memory-mapped serial port. A host-side tool
//! reads those two numbers back to compute the core's CPI/MIPS figures.
//!
//! This crate contains all the platform-independent parts: the [device::Device] abstraction, the
//! [output] formatting routines, the [workload] block and the [isa] model it's expressed in, and
//! the [bench::Benchmark] state machine that ties them together. The `nexusv_bench_firmware`
//! crate provides the MMIO device and inline-assembly workload that run on the actual core, while
//! the [sim] module provides in-memory stand-ins for use in tests.

#![cfg_attr(not(test), no_std)]

// Lets the `parse_alu_block!` proc macro refer to this crate's types as `::nexusv_bench::...`,
// including from within this crate.
extern crate self as nexusv_bench;

pub mod bench;
pub mod config;
pub mod device;
pub mod isa;
pub mod output;
pub mod sim;
pub mod workload;
