use avr_device::attiny84::{CPU, WDT};

/// Watchdog control. A watchdog reset leaves the watchdog running at the
/// shortest timeout, so it has to be switched off before anything else.
pub struct Watchdog {
    _private: (),
}

impl Watchdog {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Clear the reset flags and stop the watchdog
    #[inline]
    pub fn disable(&mut self) {
        avr_device::interrupt::free(|_| unsafe {
            (*CPU::ptr()).mcusr.write(|w| w.bits(0));
            let p = WDT::ptr();
            // Timed sequence: WDCE | WDE, then clear within four cycles
            (*p).wdtcsr.write(|w| w.bits(0x18));
            (*p).wdtcsr.write(|w| w.bits(0x00));
        });
    }
}

