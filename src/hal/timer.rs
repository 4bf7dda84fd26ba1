use crate::baud::Divisor;
use crate::channel::ClockChannel;
use crate::config::TimerConfig;
use avr_device::attiny84::{TC0, TC1};
use core::marker::PhantomData;

/// Register access for a timer that can drive a baud clock on its OCnA pin
pub trait BaudTimerRegisters {
    fn configure(config: &TimerConfig);
    fn write_compare(value: u8);
}

impl BaudTimerRegisters for TC0 {
    fn configure(config: &TimerConfig) {
        unsafe {
            let p = &*TC0::ptr();
            // Stop the clock while the mode changes
            p.tccr0b.write(|w| w.bits(0));
            p.tcnt0.write(|w| w.bits(0));
            p.ocr0a.write(|w| w.bits(config.initial_divisor.value()));
            p.timsk0.write(|w| w.bits(config.timsk()));
            p.tccr0a.write(|w| w.bits(config.tccr0a()));
            p.tccr0b.write(|w| w.bits(config.tccr0b()));
        }
    }

    #[inline]
    fn write_compare(value: u8) {
        unsafe {
            (*TC0::ptr()).ocr0a.write(|w| w.bits(value));
        }
    }
}

impl BaudTimerRegisters for TC1 {
    fn configure(config: &TimerConfig) {
        unsafe {
            let p = &*TC1::ptr();
            p.tccr1b.write(|w| w.bits(0));
            p.tcnt1.write(|w| w.bits(0));
            p.ocr1a.write(|w| w.bits(config.initial_divisor.value() as u16));
            p.timsk1.write(|w| w.bits(config.timsk()));
            p.tccr1a.write(|w| w.bits(config.tccr1a()));
            p.tccr1b.write(|w| w.bits(config.tccr1b()));
        }
    }

    #[inline]
    fn write_compare(value: u8) {
        unsafe {
            (*TC1::ptr()).ocr1a.write(|w| w.bits(value as u16));
        }
    }
}

/// A timer configured as a free-running toggle-on-compare clock
pub struct BaudTimer<T> {
    _timer: PhantomData<T>,
}

impl<T: BaudTimerRegisters> BaudTimer<T> {
    /// Takes the peripheral so nothing else can reconfigure it
    pub fn new(_timer: T, config: &TimerConfig) -> Self {
        T::configure(config);
        Self { _timer: PhantomData }
    }
}

impl<T: BaudTimerRegisters> ClockChannel for BaudTimer<T> {
    #[inline]
    fn set_divisor(&mut self, divisor: Divisor) {
        T::write_compare(divisor.value());
    }
}
