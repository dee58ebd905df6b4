//! A [log] backend that writes to the serial port.
//!
//! The serial port also carries the benchmark report, which is parsed by host-side tooling, so any
//! log output ends up mixed in with it. Logging is therefore off by default, and can be enabled at
//! build time by setting the `NEXUSV_LOGLEVEL` environment variable (e.g. to `debug`). The harness
//! never logs between the two timer samples, so enabling it doesn't affect the measurement itself.

use crate::mmio::MmioDevice;
use core::fmt::Write;
use log::{LevelFilter, Log, Metadata, Record};
use nexusv_bench::output::SerialWriter;

struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut device = MmioDevice::platform();
        // Writing to the serial port never fails.
        let _ = writeln!(
            SerialWriter(&mut device),
            "{} - {}",
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Installs the serial logger, using the level set in the `NEXUSV_LOGLEVEL` environment variable
/// at build time. Logging stays off if the variable is unset or isn't a valid level.
pub fn init_logger_from_env() {
    const LEVEL: Option<&str> = option_env!("NEXUSV_LOGLEVEL");
    init_logger(
        LEVEL
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Off),
    );
}

/// Installs the serial logger with the given maximum level.
pub fn init_logger(level: LevelFilter) {
    // RV32I has no atomic compare-and-swap, so the non-racy `set_logger` isn't available.
    //
    // SAFETY: the firmware runs on a single hart and never enables interrupts, so nothing can
    // observe the logger while it's being installed.
    if unsafe { log::set_logger_racy(&LOGGER) }.is_ok() {
        log::set_max_level(level);
    }
}
