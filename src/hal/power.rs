use crate::application::IdleWait;
use crate::config::ClockPrescale;
use avr_device::attiny84::{CPU, EXINT};

const SE: u8 = 1 << 5;
/// SM1:0, all clear selects idle
const SM_MASK: u8 = 0b0001_1000;
const CLKPCE: u8 = 1 << 7;
const PCIE0: u8 = 1 << 4;

pub struct Power {
    _private: (),
}

impl Power {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Set the system clock division. Both writes must land within four
    /// cycles, so interrupts stay off for the sequence.
    pub fn set_clock_prescale(&mut self, prescale: ClockPrescale) {
        avr_device::interrupt::free(|_| unsafe {
            let p = CPU::ptr();
            (*p).clkpr.write(|w| w.bits(CLKPCE));
            (*p).clkpr.write(|w| w.bits(prescale.clkpr()));
        });
    }

    /// Let the listed PCINT0..7 sources raise the pin change interrupt
    pub fn enable_pin_change_wake(&mut self, mask: u8) {
        unsafe {
            let p = EXINT::ptr();
            (*p).pcmsk0.write(|w| w.bits(mask));
            (*p).gimsk.modify(|r, w| w.bits(r.bits() | PCIE0));
        }
    }
}

/// Idle sleep woken by the pin change interrupt. The timers keep running.
///
/// Interrupts stay globally off except across `sleep`. The instruction after
/// `sei` always executes before a pending interrupt is taken, so a pin change
/// flagged while the selectors were being sampled wakes the CPU straight
/// away instead of being serviced before it goes to sleep.
impl IdleWait for Power {
    #[inline]
    fn mask(&mut self) {
        avr_device::interrupt::disable();
    }

    fn sleep(&mut self) {
        unsafe {
            let p = CPU::ptr();
            (*p).mcucr.modify(|r, w| w.bits((r.bits() & !SM_MASK) | SE));
            core::arch::asm!("sei", "sleep", "cli");
            (*p).mcucr.modify(|r, w| w.bits(r.bits() & !SE));
        }
    }
}
