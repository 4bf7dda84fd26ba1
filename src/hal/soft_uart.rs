//! Bit-banged 8N1 transmitter on PB1
//!
//! The ATtiny84 has no USART and both timers are busy generating baud
//! clocks, so bit timing comes from a cycle-counted delay loop with
//! interrupts held off for the whole frame.

use crate::config::TRACE_DELAY_SPINS;
use core::arch::asm;
use core::convert::Infallible;
use embedded_hal::serial;

/// PB1 is driven with `sbi`/`cbi` on PORTB (I/O address 0x18), which leaves
/// the OC0A output on PB2 alone and takes a fixed two cycles.
pub struct SoftTx {
    _private: (),
}

impl SoftTx {
    /// PB1 must already be an output idling high
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline(always)]
    fn set_line(high: bool) {
        unsafe {
            if high {
                asm!("sbi 0x18, 1", options(nomem, nostack, preserves_flags));
            } else {
                asm!("cbi 0x18, 1", options(nomem, nostack, preserves_flags));
            }
        }
    }

    /// `TRACE_DELAY_SPINS` rounds of three cycles each
    #[inline(always)]
    fn bit_delay() {
        unsafe {
            asm!(
                "1:",
                "dec {0}",
                "brne 1b",
                inout(reg) TRACE_DELAY_SPINS => _,
                options(nomem, nostack),
            );
        }
    }

    #[inline(always)]
    fn send_bit(high: bool) {
        Self::set_line(high);
        Self::bit_delay();
    }
}

impl serial::Write<u8> for SoftTx {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        avr_device::interrupt::free(|_| {
            Self::send_bit(false);
            let mut bits = word;
            for _ in 0..8u8 {
                Self::send_bit(bits & 1 != 0);
                bits >>= 1;
            }
            Self::send_bit(true);
        });
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
