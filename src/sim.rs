//! In-memory stand-ins for the hardware, for use in tests and host-side simulations.
//!
//! [FakeDevice] implements [Device] without any MMIO: timer values either come from a fixed script
//! or from a shared simulated clock, and transmitted characters are captured in a buffer.
//! [SimulatedCore] implements [Workload] by running the [BLOCK] on a software register file, and
//! can advance the same simulated clock by a fixed number of cycles per retired instruction.

use crate::device::Device;
use crate::isa::{Reg, RegisterFile};
use crate::workload::{Workload, BLOCK};
use core::cell::Cell;
use log::{trace, warn};

enum FakeTimer<'a> {
    /// Returns the given values in order, and keeps returning the last one once they run out (or
    /// zero, if there are none).
    Script { values: &'a [u32], next: usize },
    /// Returns the current value of a clock shared with e.g. a [SimulatedCore].
    Clock(&'a Cell<u32>),
}

/// A [Device] that keeps everything in memory.
///
/// Captures up to `CAP` transmitted characters. Any characters beyond that are dropped (and
/// counted, see [FakeDevice::dropped]).
pub struct FakeDevice<'a, const CAP: usize> {
    timer: FakeTimer<'a>,
    read_cost: u32,
    timer_reads: usize,
    transmitted: heapless::Vec<u8, CAP>,
    dropped: usize,
}

impl<'a, const CAP: usize> FakeDevice<'a, CAP> {
    /// Creates a device whose timer returns the given values, one per read.
    pub fn scripted(values: &'a [u32]) -> Self {
        Self::new(FakeTimer::Script { values, next: 0 })
    }

    /// Creates a device whose timer reads the given simulated clock.
    pub fn with_clock(clock: &'a Cell<u32>) -> Self {
        Self::new(FakeTimer::Clock(clock))
    }

    fn new(timer: FakeTimer<'a>) -> Self {
        FakeDevice {
            timer,
            read_cost: 0,
            timer_reads: 0,
            transmitted: heapless::Vec::new(),
            dropped: 0,
        }
    }

    /// Makes every timer read advance the simulated clock by `cycles`, after the value has been
    /// sampled. This models the cost of the load instruction, and any other fixed overhead
    /// between the two samples. Has no effect on scripted timers.
    pub fn with_read_cost(mut self, cycles: u32) -> Self {
        self.read_cost = cycles;
        self
    }

    /// The number of times the timer has been read.
    pub fn timer_reads(&self) -> usize {
        self.timer_reads
    }

    /// The characters transmitted so far.
    pub fn transmitted(&self) -> &[u8] {
        &self.transmitted
    }

    /// The characters transmitted so far, as a string.
    ///
    /// Panics if something other than UTF-8 text was transmitted.
    pub fn transmitted_str(&self) -> &str {
        core::str::from_utf8(&self.transmitted).expect("transmitted data should be UTF-8")
    }

    /// The number of characters that didn't fit in the capture buffer.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<'a, const CAP: usize> Device for FakeDevice<'a, CAP> {
    fn read_timer(&mut self) -> u32 {
        self.timer_reads += 1;
        match &mut self.timer {
            FakeTimer::Script { values, next } => {
                let value = values
                    .get(*next)
                    .or(values.last())
                    .copied()
                    .unwrap_or_default();
                *next += 1;
                value
            }
            FakeTimer::Clock(clock) => {
                let value = clock.get();
                clock.set(value.wrapping_add(self.read_cost));
                value
            }
        }
    }

    fn write_char(&mut self, c: u8) {
        if self.transmitted.push(c).is_err() {
            if self.dropped == 0 {
                warn!("FakeDevice capture buffer full ({} bytes), dropping output", CAP);
            }
            self.dropped += 1;
        }
    }
}

/// A [Workload] that runs the [BLOCK] on a software model of the scratch registers.
pub struct SimulatedCore<'a> {
    regs: RegisterFile,
    clock: Option<&'a Cell<u32>>,
    cycles_per_instruction: u32,
    retired: u64,
}

impl<'a> Default for SimulatedCore<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SimulatedCore<'a> {
    /// Creates a core that doesn't advance any clock.
    pub fn new() -> Self {
        SimulatedCore {
            regs: RegisterFile::new(),
            clock: None,
            cycles_per_instruction: 0,
            retired: 0,
        }
    }

    /// Creates a core that advances `clock` by `cycles_per_instruction` for every instruction it
    /// retires. The clock wraps around at 2^32, like the real timer.
    pub fn with_clock(clock: &'a Cell<u32>, cycles_per_instruction: u32) -> Self {
        SimulatedCore {
            clock: Some(clock),
            cycles_per_instruction,
            ..Self::new()
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// The number of instructions executed so far, including no-ops.
    pub fn retired(&self) -> u64 {
        self.retired
    }
}

impl<'a> Workload for SimulatedCore<'a> {
    fn seed(&mut self, seeds: &[(Reg, u32)]) {
        for &(reg, value) in seeds {
            self.regs.set(reg, value);
        }
    }

    fn execute_block(&mut self) {
        for instr in BLOCK.iter() {
            self.regs.execute(instr);
            if let Some(clock) = self.clock {
                clock.set(clock.get().wrapping_add(self.cycles_per_instruction));
            }
        }
        self.retired += BLOCK.len() as u64;
        trace!(
            "Block done, x5 = {:#010X}, x10 = {}",
            self.regs.get(Reg::X5),
            self.regs.get(Reg::X10)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_timer_repeats_last_value() {
        let mut device = FakeDevice::<4>::scripted(&[3, 1]);
        assert_eq!(3, device.read_timer());
        assert_eq!(1, device.read_timer());
        assert_eq!(1, device.read_timer());
        assert_eq!(3, device.timer_reads());

        let mut empty = FakeDevice::<4>::scripted(&[]);
        assert_eq!(0, empty.read_timer());
    }

    #[test]
    fn clock_timer_charges_read_cost() {
        let clock = Cell::new(u32::MAX - 1);
        let mut device = FakeDevice::<4>::with_clock(&clock).with_read_cost(2);
        assert_eq!(u32::MAX - 1, device.read_timer());
        assert_eq!(0, clock.get());
        assert_eq!(0, device.read_timer());
    }

    #[test]
    fn capture_buffer_overflow_drops_characters() {
        let mut device = FakeDevice::<2>::scripted(&[]);
        for c in b"abcd" {
            device.write_char(*c);
        }
        assert_eq!(b"ab", device.transmitted());
        assert_eq!(2, device.dropped());
    }

    #[test]
    fn simulated_core_advances_clock_per_instruction() {
        let clock = Cell::new(0);
        let mut core = SimulatedCore::with_clock(&clock, 3);
        core.execute(2);
        assert_eq!(40, core.retired());
        assert_eq!(120, clock.get());
    }

    // `x10` is incremented once per block, and every block builds on the previous block's value.
    #[test]
    fn simulated_core_carries_results_across_blocks() {
        let mut core = SimulatedCore::new();
        core.seed(&crate::workload::SEEDS);
        core.execute(1000);
        assert_eq!(1050, core.registers().get(Reg::X10));
        assert_eq!(1050 >> 2, core.registers().get(Reg::X6));
        // 1050 is no longer less than 100.
        assert_eq!(0, core.registers().get(Reg::X14));
        assert_eq!(20, core.registers().get(Reg::X11));
    }
}
