//! The benchmark controller: seeds the scratch registers, samples the timer around
//! [ITERATIONS] executions of the workload block, and reports the result over the serial port.
//!
//! The controller is a strictly sequential state machine with no branches on runtime data and no
//! error states:
//!
//! ```text
//! Init -> TimingStart -> Running -> TimingEnd -> Report -> Halted
//! ```
//!
//! On the target the entry point spins forever once [State::Halted] is reached. On the host
//! [Benchmark::step] simply keeps returning [State::Halted], so tests can observe the terminal
//! state without looping.

use crate::config::{INSTRUCTION_COUNT, ITERATIONS};
use crate::device::Device;
use crate::output::{print_hex32, print_str};
use crate::workload::{Workload, SEEDS};
use log::{debug, info};

/// The report's header line.
pub const BANNER: &str = "\n=== Nexus-V ALU Benchmark ===\n";
/// The line following the [BANNER], describing the workload.
pub const DESCRIPTION: &str = "Testing R-Type and I-Type Performance...\n";
/// The label preceding the cycle count.
pub const CYCLES_LABEL: &str = "Total Cycles:   ";
/// The label preceding the instruction count.
pub const INSTRUCTIONS_LABEL: &str = "Inst Count:     ";
/// The report's final line.
pub const TRAILER: &str = "\n--- Copy these values for MIPS Calculation ---\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// The scratch registers are about to be seeded.
    Init,
    /// The start time is about to be sampled.
    TimingStart,
    /// The workload is about to be executed.
    Running,
    /// The end time is about to be sampled.
    TimingEnd,
    /// The report is about to be emitted.
    Report,
    /// The run is over. This state is never left.
    Halted,
}

/// The two timer values sampled around the workload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Samples {
    pub start: u32,
    pub end: u32,
}

impl Samples {
    /// The number of cycles elapsed between the two samples.
    ///
    /// This is correct as long as the timer wrapped around at most once in between. A second
    /// wraparound goes undetected and yields a too-small result.
    pub fn cycles(&self) -> u32 {
        self.end.wrapping_sub(self.start)
    }
}

/// The result of a benchmark run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    /// The number of cycles it took to run the workload.
    pub total_cycles: u32,
    /// The number of workload instructions executed. Always [INSTRUCTION_COUNT].
    pub instructions: u32,
}

impl Report {
    pub fn new(samples: Samples) -> Report {
        Report {
            total_cycles: samples.cycles(),
            instructions: INSTRUCTION_COUNT,
        }
    }

    /// Writes the report to the device, in the format the host-side tooling expects.
    pub fn emit<D: Device + ?Sized>(&self, device: &mut D) {
        print_str(device, BANNER);
        print_str(device, DESCRIPTION);
        print_str(device, CYCLES_LABEL);
        print_hex32(device, self.total_cycles);
        print_str(device, INSTRUCTIONS_LABEL);
        print_hex32(device, self.instructions);
        print_str(device, TRAILER);
    }
}

/// Drives a single benchmark run of workload `W`, timed and reported through device `D`.
pub struct Benchmark<D, W> {
    device: D,
    workload: W,
    state: State,
    samples: Samples,
}

impl<D: Device, W: Workload> Benchmark<D, W> {
    pub fn new(device: D, workload: W) -> Self {
        Benchmark {
            device,
            workload,
            state: State::Init,
            samples: Samples::default(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The timer samples, once both have been taken.
    pub fn samples(&self) -> Option<Samples> {
        self.measured().then_some(self.samples)
    }

    /// The run's result, once the end time has been sampled.
    pub fn report(&self) -> Option<Report> {
        self.measured().then(|| Report::new(self.samples))
    }

    fn measured(&self) -> bool {
        matches!(self.state, State::Report | State::Halted)
    }

    /// Performs the current state's action and moves on to the next state, which is returned.
    /// Does nothing once [State::Halted] has been reached.
    pub fn step(&mut self) -> State {
        let next = match self.state {
            State::Init => {
                self.workload.seed(&SEEDS);
                State::TimingStart
            }
            State::TimingStart => {
                self.samples.start = self.device.read_timer();
                State::Running
            }
            State::Running => {
                self.workload.execute(ITERATIONS);
                State::TimingEnd
            }
            State::TimingEnd => {
                self.samples.end = self.device.read_timer();
                State::Report
            }
            State::Report => {
                let report = Report::new(self.samples);
                report.emit(&mut self.device);
                info!(
                    "Measured {} cycles for {} instructions",
                    report.total_cycles, report.instructions
                );
                State::Halted
            }
            State::Halted => State::Halted,
        };
        // Nothing may be logged between the two timer samples, since log output takes cycles too.
        if next != self.state && !matches!(next, State::Running | State::TimingEnd) {
            debug!("Benchmark state: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        next
    }

    /// Steps through all states until [State::Halted] is reached, and returns the report.
    pub fn run(&mut self) -> Report {
        while self.step() != State::Halted {}
        Report::new(self.samples)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn workload(&self) -> &W {
        &self.workload
    }

    pub fn into_parts(self) -> (D, W) {
        (self.device, self.workload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BLOCK_SIZE;
    use crate::isa::Reg;
    use crate::sim::{FakeDevice, SimulatedCore};
    use core::cell::Cell;

    type TestDevice<'a> = FakeDevice<'a, 256>;

    /// A workload that does nothing but count how it's used.
    #[derive(Default)]
    struct CountingWorkload {
        seeds: Vec<(Reg, u32)>,
        seed_calls: usize,
        blocks: u32,
    }

    impl Workload for CountingWorkload {
        fn seed(&mut self, seeds: &[(Reg, u32)]) {
            self.seeds.extend_from_slice(seeds);
            self.seed_calls += 1;
        }

        fn execute_block(&mut self) {
            self.blocks += 1;
        }
    }

    fn expected_output(cycles: &str, instructions: &str) -> String {
        format!(
            "\n=== Nexus-V ALU Benchmark ===\n\
             Testing R-Type and I-Type Performance...\n\
             Total Cycles:   {cycles}\n\
             Inst Count:     {instructions}\n\
             \n--- Copy these values for MIPS Calculation ---\n"
        )
    }

    #[test]
    fn steps_through_every_state_in_order() {
        let mut bench = Benchmark::new(
            TestDevice::scripted(&[10, 20]),
            CountingWorkload::default(),
        );
        assert_eq!(State::Init, bench.state());
        assert_eq!(None, bench.report());

        assert_eq!(State::TimingStart, bench.step());
        assert_eq!(1, bench.workload().seed_calls);
        assert_eq!(SEEDS.to_vec(), bench.workload().seeds);
        assert_eq!(0, bench.device().timer_reads());

        assert_eq!(State::Running, bench.step());
        assert_eq!(1, bench.device().timer_reads());
        assert_eq!(0, bench.workload().blocks);

        assert_eq!(State::TimingEnd, bench.step());
        assert_eq!(ITERATIONS, bench.workload().blocks);
        assert_eq!(1, bench.device().timer_reads());

        assert_eq!(State::Report, bench.step());
        assert_eq!(2, bench.device().timer_reads());
        assert_eq!(Some(Samples { start: 10, end: 20 }), bench.samples());
        assert!(bench.device().transmitted().is_empty());

        assert_eq!(State::Halted, bench.step());
        assert_eq!(
            expected_output("0x0000000A", "0x00004E20"),
            bench.device().transmitted_str()
        );
    }

    #[test]
    fn halted_is_terminal() {
        let mut bench = Benchmark::new(TestDevice::scripted(&[0, 1]), CountingWorkload::default());
        bench.run();
        let transmitted = bench.device().transmitted().len();
        for _ in 0..3 {
            assert_eq!(State::Halted, bench.step());
        }
        assert_eq!(transmitted, bench.device().transmitted().len());
        assert_eq!(2, bench.device().timer_reads());
        assert_eq!(ITERATIONS, bench.workload().blocks);
        assert_eq!(1, bench.workload().seed_calls);
    }

    #[test]
    fn delta_survives_one_wraparound() {
        let mut bench = Benchmark::new(
            TestDevice::scripted(&[0xFFFF_FFF0, 0x0000_0010]),
            CountingWorkload::default(),
        );
        let report = bench.run();
        assert_eq!(0x20, report.total_cycles);
        assert_eq!(
            expected_output("0x00000020", "0x00004E20"),
            bench.device().transmitted_str()
        );
    }

    #[test]
    fn instruction_count_is_constant() {
        assert_eq!(20000, INSTRUCTION_COUNT);
        assert_eq!(ITERATIONS * BLOCK_SIZE as u32, INSTRUCTION_COUNT);
        for script in [[0, 0], [5, 5_000_000], [100, 50], [u32::MAX, 0]] {
            let mut bench = Benchmark::new(TestDevice::scripted(&script), SimulatedCore::new());
            assert_eq!(INSTRUCTION_COUNT, bench.run().instructions);
            assert!(bench
                .device()
                .transmitted_str()
                .contains("Inst Count:     0x00004E20\n"));
        }
    }

    // The reported delta must equal k cycles for each of the instructions executed between the two
    // samples, no matter how large k is, even when the timer wraps during the run.
    #[test]
    fn delta_scales_with_cycles_per_instruction() {
        for k in [1, 2, 3, 17, 1000, 200_000] {
            for start in [0, 0xFFFF_0000] {
                let clock = Cell::new(start);
                let mut bench = Benchmark::new(
                    TestDevice::with_clock(&clock),
                    SimulatedCore::with_clock(&clock, k),
                );
                let report = bench.run();
                assert_eq!(
                    20000 * k,
                    report.total_cycles,
                    "k = {k}, start = {start:#X}"
                );
                assert_eq!(20000, bench.workload().retired());
            }
        }
    }

    // With one cycle per instruction, the result is the instruction count plus a fixed overhead.
    // The overhead is platform-specific, so it is calibrated by timing an empty workload rather
    // than assumed.
    #[test]
    fn end_to_end_with_calibrated_overhead() {
        const READ_COST: u32 = 7;

        let clock = Cell::new(1_000);
        let mut calibration = Benchmark::new(
            TestDevice::with_clock(&clock).with_read_cost(READ_COST),
            CountingWorkload::default(),
        );
        let overhead = calibration.run().total_cycles;

        let clock = Cell::new(1_000);
        let mut bench = Benchmark::new(
            TestDevice::with_clock(&clock).with_read_cost(READ_COST),
            SimulatedCore::with_clock(&clock, 1),
        );
        let report = bench.run();
        assert_eq!(20000 + overhead, report.total_cycles);
        assert_eq!(
            expected_output(&format!("0x{:08X}", 20000 + overhead), "0x00004E20"),
            bench.device().transmitted_str()
        );

        let (_, core) = bench.into_parts();
        assert_eq!(1050, core.registers().get(Reg::X10));
    }

    #[test]
    fn report_emits_exact_protocol() {
        let mut device = TestDevice::scripted(&[]);
        Report {
            total_cycles: 0x0001_2345,
            instructions: INSTRUCTION_COUNT,
        }
        .emit(&mut device);
        assert_eq!(
            "\n=== Nexus-V ALU Benchmark ===\nTesting R-Type and I-Type Performance...\n\
             Total Cycles:   0x00012345\nInst Count:     0x00004E20\n\n\
             --- Copy these values for MIPS Calculation ---\n",
            device.transmitted_str()
        );
    }
}
