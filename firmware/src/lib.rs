#![no_std]

// This crate contains the Nexus-V platform-specific code: access to the memory-mapped devices, and
// the inline assembly that runs the workload block on the core itself. None of it can run on the
// host.

pub mod alu_core;
pub mod logger;
pub mod mmio;

/// Parks the hart forever. The benchmark binary must never return from its entry point, since
/// there's nothing to return to.
#[allow(clippy::empty_loop)]
pub fn halt() -> ! {
    loop {}
}
