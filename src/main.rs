#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
use baud_gen::{
    config::{PORT_A, SYSTEM_CLOCK_PRESCALE, TIMER0, TIMER1},
    hal::{gpio, BaudTimer, PortASelector, Power, Watchdog},
    Application,
};

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    avr_device::interrupt::disable();
    Watchdog::new().disable();

    let dp = avr_device::attiny84::Peripherals::take().unwrap();
    let mut power = Power::new();
    power.set_clock_prescale(SYSTEM_CLOCK_PRESCALE);

    // Timers first, the OCnA pins only become outputs once they are running
    let channel_a = BaudTimer::new(dp.TC0, &TIMER0);
    let channel_b = BaudTimer::new(dp.TC1, &TIMER1);

    gpio::configure(&dp.PORTA, &PORT_A);

    #[cfg(feature = "debug")]
    let mut log = {
        gpio::configure(&dp.PORTB, &baud_gen::config::PORT_B_TRACE);
        baud_gen::logger::Logger::new(baud_gen::hal::SoftTx::new())
    };
    #[cfg(not(feature = "debug"))]
    let mut log = {
        gpio::configure(&dp.PORTB, &baud_gen::config::PORT_B);
        baud_gen::logger::NullLog
    };

    baud_gen::logger::system(&mut log, "baud-gen v0.1.0").ok();
    #[cfg(feature = "debug")]
    baud_gen::testing::self_test(&mut log);

    let app = Application::new(PortASelector::new(dp.PORTA), channel_a, channel_b, log);

    app.run(idle_wait(power))
}

/// Sleep between polls. Pin changes only become pending here; `Power`
/// unmasks them across the sleep instruction itself.
#[cfg(all(target_arch = "avr", feature = "low-power"))]
fn idle_wait(mut power: Power) -> Power {
    power.enable_pin_change_wake(baud_gen::config::PIN_CHANGE_MASK);
    power
}

#[cfg(all(target_arch = "avr", not(feature = "low-power")))]
fn idle_wait(_power: Power) -> baud_gen::application::BusyPoll {
    baud_gen::application::BusyPoll
}

/// Only here to wake the CPU from idle
#[cfg(all(target_arch = "avr", feature = "low-power"))]
#[avr_device::interrupt(attiny84)]
fn PCINT0() {}

// The firmware only runs on the ATtiny84; host builds exist for the library
// tests.
#[cfg(not(target_arch = "avr"))]
fn main() {}
