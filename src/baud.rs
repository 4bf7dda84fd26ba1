//! Baud rate selector decoding
//!
//! Maps a 3-bit selector code onto the compare value a channel timer needs to
//! generate the matching bit-rate clock. Divisors are tabulated for a
//! 3.6864MHz timer clock and must not be approximated.

use ufmt::{uDisplay, uWrite, Formatter};

/// 3-bit baud rate selector code, always in `0..=7`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectorCode(u8);

impl SelectorCode {
    pub const MASK: u8 = 0x07;

    /// Keep the low three bits of `bits`
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Timer compare value. The output toggles every `divisor + 1` timer ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Divisor(u8);

impl Divisor {
    /// Used for undefined codes and as the power-up compare value
    pub const DEFAULT: Divisor = DEFAULT_RATE.divisor();

    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Square wave frequency produced from a timer clock of `clock_hz`
    pub const fn output_hz(self, clock_hz: u32) -> u32 {
        clock_hz / (2 * (self.0 as u32 + 1))
    }
}

impl uDisplay for Divisor {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uDisplay::fmt(&self.0, f)
    }
}

/// The six bit rates a channel can generate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaudRate {
    Baud4800,
    Baud9600,
    Baud19200,
    Baud38400,
    Baud57600,
    Baud115200,
}

/// Rate used for codes 6 and 7
pub const DEFAULT_RATE: BaudRate = BaudRate::Baud9600;

impl BaudRate {
    pub const ALL: [BaudRate; 6] = [
        BaudRate::Baud4800,
        BaudRate::Baud9600,
        BaudRate::Baud19200,
        BaudRate::Baud38400,
        BaudRate::Baud57600,
        BaudRate::Baud115200,
    ];

    pub const fn from_code(code: SelectorCode) -> Option<Self> {
        match code.bits() {
            0 => Some(BaudRate::Baud4800),
            1 => Some(BaudRate::Baud9600),
            2 => Some(BaudRate::Baud19200),
            3 => Some(BaudRate::Baud38400),
            4 => Some(BaudRate::Baud57600),
            5 => Some(BaudRate::Baud115200),
            _ => None,
        }
    }

    pub const fn code(self) -> SelectorCode {
        SelectorCode::from_bits(self as u8)
    }

    pub const fn divisor(self) -> Divisor {
        match self {
            BaudRate::Baud4800 => Divisor(23),
            BaudRate::Baud9600 => Divisor(11),
            BaudRate::Baud19200 => Divisor(5),
            BaudRate::Baud38400 => Divisor(2),
            BaudRate::Baud57600 => Divisor(1),
            BaudRate::Baud115200 => Divisor(15),
        }
    }

    /// Clock cycles per bit the receiving UART expects
    pub const fn oversampling(self) -> u8 {
        match self {
            BaudRate::Baud115200 => 1,
            _ => 16,
        }
    }

    pub const fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::Baud4800 => 4800,
            BaudRate::Baud9600 => 9600,
            BaudRate::Baud19200 => 19200,
            BaudRate::Baud38400 => 38400,
            BaudRate::Baud57600 => 57600,
            BaudRate::Baud115200 => 115200,
        }
    }
}

/// Compare value for a selector code. Undefined codes fall back to 9600.
#[inline]
pub const fn decode(code: SelectorCode) -> Divisor {
    match BaudRate::from_code(code) {
        Some(rate) => rate.divisor(),
        None => Divisor::DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REF_CLOCK_HZ;
    use crate::testing::StringSink;

    #[test]
    fn decode_matches_rate_table() {
        let expected = [23, 11, 5, 2, 1, 15, 11, 11];
        for (code, divisor) in expected.iter().enumerate() {
            assert_eq!(
                decode(SelectorCode::from_bits(code as u8)),
                Divisor::new(*divisor),
                "code {}",
                code
            );
        }
    }

    #[test]
    fn undefined_codes_use_default() {
        assert_eq!(BaudRate::from_code(SelectorCode::from_bits(6)), None);
        assert_eq!(BaudRate::from_code(SelectorCode::from_bits(7)), None);
        assert_eq!(decode(SelectorCode::from_bits(6)), Divisor::DEFAULT);
        assert_eq!(decode(SelectorCode::from_bits(7)), Divisor::DEFAULT);
        assert_eq!(Divisor::DEFAULT.value(), 11);
    }

    #[test]
    fn each_rate_decodes_from_its_own_code() {
        let divisors = [23, 11, 5, 2, 1, 15];
        for (rate, divisor) in BaudRate::ALL.iter().zip(divisors) {
            assert_eq!(decode(rate.code()), Divisor::new(divisor));
            assert_eq!(BaudRate::from_code(rate.code()), Some(*rate));
        }
    }

    #[test]
    fn selector_code_keeps_three_bits() {
        assert_eq!(SelectorCode::from_bits(0b1111_1101).bits(), 0b101);
        assert_eq!(SelectorCode::from_bits(0b0000_1000).bits(), 0);
    }

    #[test]
    fn divisors_hit_nominal_rates_exactly() {
        for rate in BaudRate::ALL {
            let clock = rate.divisor().output_hz(REF_CLOCK_HZ);
            assert_eq!(clock % rate.oversampling() as u32, 0);
            assert_eq!(
                clock / rate.oversampling() as u32,
                rate.bits_per_second(),
                "{:?}",
                rate
            );
        }
    }

    #[test]
    fn divisor_displays_as_decimal() {
        let mut sink = StringSink::default();
        ufmt::uwrite!(&mut sink, "{}", Divisor::new(23)).ok();
        assert_eq!(sink.0, "23");
    }
}
