//! Character-by-character rendering of strings and hexadecimal values over a [Device].
//!
//! The output of these functions is consumed by a host-side tool, so the format is a
//! compatibility contract: hex values are always `0x`-prefixed, exactly 8 uppercase digits wide,
//! and followed by a single newline.

use crate::device::Device;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Writes each byte of `s` to the device, in order.
///
/// Stops at the first NUL byte, if there is one, so that NUL-terminated strings can be passed
/// as-is. The NUL itself is not transmitted.
pub fn print_str<D: Device + ?Sized>(device: &mut D, s: &str) {
    for c in s.bytes().take_while(|&c| c != 0) {
        device.write_char(c);
    }
}

/// Writes `value` as `0x` followed by 8 uppercase hexadecimal digits (most significant nibble
/// first, leading zeros preserved), and then a newline.
pub fn print_hex32<D: Device + ?Sized>(device: &mut D, value: u32) {
    device.write_char(b'0');
    device.write_char(b'x');
    for shift in (0..32).step_by(4).rev() {
        device.write_char(HEX_DIGITS[((value >> shift) & 0xF) as usize]);
    }
    device.write_char(b'\n');
}

/// Adapts a [Device] to [core::fmt::Write], so that `write!` can be used to send formatted text
/// to the serial port. Writes never fail.
pub struct SerialWriter<'a, D: Device + ?Sized>(pub &'a mut D);

impl<'a, D: Device + ?Sized> core::fmt::Write for SerialWriter<'a, D> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.bytes() {
            self.0.write_char(c);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FakeDevice;
    use core::fmt::Write;

    fn hex(value: u32) -> String {
        let mut device = FakeDevice::<16>::scripted(&[]);
        print_hex32(&mut device, value);
        device.transmitted_str().to_string()
    }

    #[test]
    fn print_str_writes_bytes_in_order() {
        let mut device = FakeDevice::<64>::scripted(&[]);
        print_str(&mut device, "Total Cycles:   ");
        assert_eq!("Total Cycles:   ", device.transmitted_str());
    }

    #[test]
    fn print_str_stops_at_nul() {
        let mut device = FakeDevice::<64>::scripted(&[]);
        print_str(&mut device, "abc\0def");
        assert_eq!(b"abc", device.transmitted());
    }

    #[test]
    fn print_str_empty() {
        let mut device = FakeDevice::<8>::scripted(&[]);
        print_str(&mut device, "");
        print_str(&mut device, "\0");
        assert!(device.transmitted().is_empty());
    }

    #[test]
    fn print_hex32_boundaries() {
        assert_eq!("0x00000000\n", hex(0));
        assert_eq!("0xFFFFFFFF\n", hex(u32::MAX));
        assert_eq!("0x00004E20\n", hex(20000));
        assert_eq!("0xDEADBEEF\n", hex(0xDEAD_BEEF));
    }

    // Each value must produce exactly 10 characters before the newline, no matter how many
    // significant digits it has.
    #[test]
    fn print_hex32_fixed_width() {
        let mut value: u32 = 1;
        for _ in 0..32 {
            for candidate in [value, value - 1, value.wrapping_neg()] {
                let rendered = hex(candidate);
                assert_eq!(11, rendered.len(), "{rendered:?}");
                assert!(rendered.starts_with("0x"));
                assert!(rendered.ends_with('\n'));
                assert!(rendered[2..10]
                    .bytes()
                    .all(|c| c.is_ascii_digit() || (b'A'..=b'F').contains(&c)));
                assert_eq!(
                    candidate,
                    u32::from_str_radix(&rendered[2..10], 16).unwrap()
                );
            }
            value = value.wrapping_shl(1) | 1;
        }
    }

    #[test]
    fn serial_writer_formats() {
        let mut device = FakeDevice::<64>::scripted(&[]);
        writeln!(SerialWriter(&mut device), "INFO - {} cycles", 42).unwrap();
        assert_eq!("INFO - 42 cycles\n", device.transmitted_str());
    }
}
