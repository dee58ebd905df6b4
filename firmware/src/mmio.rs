//! Volatile access to the Nexus-V cycle counter and serial transmit register.

use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};
use nexusv_bench::config::{TIMER_ADDR, UART_TX_ADDR};
use nexusv_bench::device::Device;

/// A [Device] backed by the actual memory-mapped registers.
pub struct MmioDevice {
    timer: *const u32,
    uart_tx: *mut u32,
}

impl MmioDevice {
    /// Creates a device using the registers at the given addresses.
    ///
    /// # Safety
    ///
    /// `timer_addr` must be the address of a readable 32-bit register and `uart_tx_addr` the
    /// address of a writable 32-bit register, both naturally aligned, for as long as the returned
    /// value is used.
    pub const unsafe fn new(timer_addr: usize, uart_tx_addr: usize) -> MmioDevice {
        MmioDevice {
            timer: timer_addr as *const u32,
            uart_tx: uart_tx_addr as *mut u32,
        }
    }

    /// Creates a device using the Nexus-V platform's fixed register addresses
    /// ([TIMER_ADDR] and [UART_TX_ADDR]).
    pub const fn platform() -> MmioDevice {
        // SAFETY: these are the addresses at which the platform maps its timer and UART.
        unsafe { MmioDevice::new(TIMER_ADDR, UART_TX_ADDR) }
    }
}

impl Device for MmioDevice {
    fn read_timer(&mut self) -> u32 {
        // The fences keep the compiler from moving any of the surrounding (workload) code across
        // the read, which would skew the measurement.
        compiler_fence(Ordering::SeqCst);
        // SAFETY: `self.timer` points to a readable register, see [MmioDevice::new].
        let value = unsafe { ptr::read_volatile(self.timer) };
        compiler_fence(Ordering::SeqCst);
        value
    }

    fn write_char(&mut self, c: u8) {
        // SAFETY: `self.uart_tx` points to a writable register, see [MmioDevice::new]. The UART
        // transmits the low byte of each word written to it.
        unsafe { ptr::write_volatile(self.uart_tx, c as u32) }
    }
}
