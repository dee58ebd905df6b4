//! The interface between the harness and the two memory-mapped devices it uses.

/// Access to the platform's cycle counter and serial transmit register.
///
/// Both operations are infallible. Implementations for real hardware must perform exactly one
/// volatile access per call, and must not let the compiler move the access across surrounding
/// code (the timer's value changes for reasons invisible to the compiler).
pub trait Device {
    /// Returns the current value of the free-running cycle counter. The counter increments once
    /// per CPU cycle and silently wraps around at 2^32.
    fn read_timer(&mut self) -> u32;

    /// Transmits a single character. There is no flow control: the receiver is assumed to have
    /// consumed the previous character by the time this is called again.
    fn write_char(&mut self, c: u8);
}

impl<D: Device + ?Sized> Device for &mut D {
    fn read_timer(&mut self) -> u32 {
        (**self).read_timer()
    }

    fn write_char(&mut self, c: u8) {
        (**self).write_char(c)
    }
}
