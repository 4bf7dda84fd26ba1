use crate::config::PortConfig;
use crate::selector::{Selection, SelectorSource};
use avr_device::attiny84::{PORTA, PORTB};
use core::convert::Infallible;

pub trait PortRegisters {
    fn configure(config: &PortConfig);
    fn read() -> u8;
}

macro_rules! impl_port {
    ($PORT:ident, $ddr:ident, $port:ident, $pin:ident) => {
        impl PortRegisters for $PORT {
            fn configure(config: &PortConfig) {
                unsafe {
                    let p = &*$PORT::ptr();
                    // Pull-ups first so inputs never float while switching
                    p.$port.write(|w| w.bits(config.port_bits()));
                    p.$ddr.write(|w| w.bits(config.ddr_bits()));
                }
            }

            #[inline]
            fn read() -> u8 {
                unsafe { (*$PORT::ptr()).$pin.read().bits() }
            }
        }
    };
}

impl_port!(PORTA, ddra, porta, pina);
impl_port!(PORTB, ddrb, portb, pinb);

/// Apply a direction and pull-up layout to a port
pub fn configure<P: PortRegisters>(_port: &P, config: &PortConfig) {
    P::configure(config);
}

/// Samples PA0..PA5 with a single PINA read, so both groups always come from
/// the same instant
pub struct PortASelector {
    _port: PORTA,
}

impl PortASelector {
    pub fn new(port: PORTA) -> Self {
        Self { _port: port }
    }
}

impl SelectorSource for PortASelector {
    type Error = Infallible;

    #[inline]
    fn sample(&mut self) -> Result<Selection, Self::Error> {
        Ok(Selection::from_bits(PORTA::read()))
    }
}
