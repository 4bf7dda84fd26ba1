//! Configuration for the ATtiny84 baud rate generator
//!
//! Register settings are described with typed structs and encoded to raw bits
//! by `const fn`s, so the values written at start-up are checked on the host.

use crate::baud::Divisor;

/// Reference oscillator on CLKI in Hz
pub const REF_CLOCK_HZ: u32 = 3_686_400;

/// Port A bits carrying the two selector groups (PA0..PA5)
pub const SELECTOR_MASK: u8 = 0b0011_1111;

/// Serial trace bit rate on PB1
pub const TRACE_BAUD: u32 = 9600;

/// System clock division applied after reset. The factory fuse setting is
/// `Div8`; the divisor table needs the timers counting at the full rate.
pub const SYSTEM_CLOCK_PRESCALE: ClockPrescale = ClockPrescale::Div1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinConfig {
    pub direction: Direction,
    /// Pull-up for inputs, initial level for outputs
    pub pull_up: bool,
}

impl PinConfig {
    pub const INPUT: PinConfig = PinConfig { direction: Direction::Input, pull_up: false };
    pub const INPUT_PULL_UP: PinConfig = PinConfig { direction: Direction::Input, pull_up: true };
    pub const OUTPUT: PinConfig = PinConfig { direction: Direction::Output, pull_up: false };
}

/// Direction and pull-up for each pin of an 8-bit port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortConfig {
    pub pins: [PinConfig; 8],
}

impl PortConfig {
    pub const fn all_inputs() -> Self {
        Self { pins: [PinConfig::INPUT; 8] }
    }

    pub const fn with_pin(mut self, pin: usize, config: PinConfig) -> Self {
        self.pins[pin] = config;
        self
    }

    /// DDRx value
    pub const fn ddr_bits(&self) -> u8 {
        let mut bits = 0;
        let mut i = 0;
        while i < 8 {
            if let Direction::Output = self.pins[i].direction {
                bits |= 1 << i;
            }
            i += 1;
        }
        bits
    }

    /// PORTx value
    pub const fn port_bits(&self) -> u8 {
        let mut bits = 0;
        let mut i = 0;
        while i < 8 {
            if self.pins[i].pull_up {
                bits |= 1 << i;
            }
            i += 1;
        }
        bits
    }
}

/// PA0..PA5 selectors with pull-ups, PA6 OC1A output, PA7 unused
pub const PORT_A: PortConfig = PortConfig::all_inputs()
    .with_pin(0, PinConfig::INPUT_PULL_UP)
    .with_pin(1, PinConfig::INPUT_PULL_UP)
    .with_pin(2, PinConfig::INPUT_PULL_UP)
    .with_pin(3, PinConfig::INPUT_PULL_UP)
    .with_pin(4, PinConfig::INPUT_PULL_UP)
    .with_pin(5, PinConfig::INPUT_PULL_UP)
    .with_pin(6, PinConfig::OUTPUT);

/// PB0 CLKI, PB1 unused, PB2 OC0A output, PB3 reset
pub const PORT_B: PortConfig = PortConfig::all_inputs().with_pin(2, PinConfig::OUTPUT);

/// Port B with the trace transmitter on PB1, idling high
pub const PORT_B_TRACE: PortConfig = PORT_B.with_pin(
    1,
    PinConfig { direction: Direction::Output, pull_up: true },
);

/// Pin change sources that wake the CPU from idle (PCINT0..5)
pub const PIN_CHANGE_MASK: u8 = SELECTOR_MASK;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterMode {
    /// Count up to the top and wrap
    Normal,
    /// Count up and clear on compare match A
    ClearOnCompare,
}

/// Timer clock select, CSn2:0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ClockSource {
    Stopped = 0,
    /// I/O clock undivided. Runs from the external oscillator on CLKI.
    Io = 1,
    IoDiv8 = 2,
    IoDiv64 = 3,
    IoDiv256 = 4,
    IoDiv1024 = 5,
    ExternalFalling = 6,
    ExternalRising = 7,
}

/// Compare output mode for OCnA, COMnA1:0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CompareOutput {
    Disconnected = 0,
    Toggle = 1,
    Clear = 2,
    Set = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    pub counter_mode: CounterMode,
    pub clock_source: ClockSource,
    pub compare_output: CompareOutput,
    pub initial_divisor: Divisor,
    pub interrupts: bool,
}

impl TimerConfig {
    /// Free running square wave generator at the default rate
    pub const fn baud_clock() -> Self {
        Self {
            counter_mode: CounterMode::ClearOnCompare,
            clock_source: ClockSource::Io,
            compare_output: CompareOutput::Toggle,
            initial_divisor: Divisor::DEFAULT,
            interrupts: false,
        }
    }

    const fn com_bits(&self) -> u8 {
        (self.compare_output as u8) << 6
    }

    /// TCCR0A: COM0A1:0 and WGM01:0
    pub const fn tccr0a(&self) -> u8 {
        let wgm = match self.counter_mode {
            CounterMode::Normal => 0b00,
            CounterMode::ClearOnCompare => 0b10,
        };
        self.com_bits() | wgm
    }

    /// TCCR0B: WGM02 and CS02:0
    pub const fn tccr0b(&self) -> u8 {
        self.clock_source as u8
    }

    /// TCCR1A: COM1A1:0 and WGM11:0
    pub const fn tccr1a(&self) -> u8 {
        self.com_bits()
    }

    /// TCCR1B: WGM13:2 and CS12:0
    pub const fn tccr1b(&self) -> u8 {
        let wgm = match self.counter_mode {
            CounterMode::Normal => 0b00,
            CounterMode::ClearOnCompare => 0b01,
        };
        (wgm << 3) | self.clock_source as u8
    }

    /// TIMSKn: only OCIEnA is ever used
    pub const fn timsk(&self) -> u8 {
        if self.interrupts {
            0b0000_0010
        } else {
            0
        }
    }
}

/// Channel A
pub const TIMER0: TimerConfig = TimerConfig::baud_clock();

/// Channel B
pub const TIMER1: TimerConfig = TimerConfig::baud_clock();

/// System clock division factor, CLKPS3:0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ClockPrescale {
    Div1 = 0,
    Div2 = 1,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
    Div256 = 8,
}

impl ClockPrescale {
    pub const fn clkpr(self) -> u8 {
        self as u8
    }

    pub const fn divide(self, hz: u32) -> u32 {
        hz >> (self as u8)
    }
}

/// Timer clock after the system clock scaler
pub const TIMER_CLOCK_HZ: u32 = SYSTEM_CLOCK_PRESCALE.divide(REF_CLOCK_HZ);

/// CPU cycles in one trace bit
pub const TRACE_CYCLES_PER_BIT: u32 = TIMER_CLOCK_HZ / TRACE_BAUD;

/// One `dec` plus a taken `brne`
pub const TRACE_SPIN_CYCLES: u32 = 3;

/// Cycles per bit spent outside the delay loop: loading the count, the
/// final untaken branch, `sbi`/`cbi` and the bit loop itself
pub const TRACE_BIT_OVERHEAD_CYCLES: u32 = 10;

/// Iterations of the trace delay loop per bit
pub const TRACE_DELAY_SPINS: u8 = ((TRACE_CYCLES_PER_BIT - TRACE_BIT_OVERHEAD_CYCLES) / TRACE_SPIN_CYCLES) as u8;

/// Bit time the trace transmitter actually produces, in cycles
pub const fn trace_bit_cycles(spins: u8) -> u32 {
    spins as u32 * TRACE_SPIN_CYCLES + TRACE_BIT_OVERHEAD_CYCLES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_a_encoding() {
        assert_eq!(PORT_A.ddr_bits(), 0b0100_0000);
        assert_eq!(PORT_A.port_bits(), 0b0011_1111);
        assert_eq!(PORT_A.port_bits(), SELECTOR_MASK);
    }

    #[test]
    fn port_b_encoding() {
        assert_eq!(PORT_B.ddr_bits(), 0b0000_0100);
        assert_eq!(PORT_B.port_bits(), 0);
        assert_eq!(PORT_B_TRACE.ddr_bits(), 0b0000_0110);
        assert_eq!(PORT_B_TRACE.port_bits(), 0b0000_0010);
    }

    #[test]
    fn timer_encoding() {
        assert_eq!(TIMER0.tccr0a(), 0b0100_0010);
        assert_eq!(TIMER0.tccr0b(), 0b0000_0001);
        assert_eq!(TIMER0.timsk(), 0);
        assert_eq!(TIMER1.tccr1a(), 0b0100_0000);
        assert_eq!(TIMER1.tccr1b(), 0b0000_1001);
        assert_eq!(TIMER1.timsk(), 0);
        assert_eq!(TIMER0.initial_divisor.value(), 11);
    }

    #[test]
    fn normal_mode_clears_wgm_bits() {
        let config = TimerConfig {
            counter_mode: CounterMode::Normal,
            ..TimerConfig::baud_clock()
        };
        assert_eq!(config.tccr0a(), 0b0100_0000);
        assert_eq!(config.tccr1b(), 0b0000_0001);
    }

    #[test]
    fn timers_run_at_reference_clock() {
        assert_eq!(SYSTEM_CLOCK_PRESCALE.clkpr(), 0);
        assert_eq!(TIMER_CLOCK_HZ, REF_CLOCK_HZ);
        assert_eq!(ClockPrescale::Div8.divide(REF_CLOCK_HZ), 460_800);
    }

    #[test]
    fn trace_bit_time_matches_baud() {
        assert_eq!(TRACE_CYCLES_PER_BIT, 384);
        assert_eq!(TRACE_DELAY_SPINS, 124);

        let cycles = trace_bit_cycles(TRACE_DELAY_SPINS);
        assert!(cycles <= TRACE_CYCLES_PER_BIT);
        assert!(TRACE_CYCLES_PER_BIT - cycles < TRACE_SPIN_CYCLES);

        // 8N1 tolerates a few percent; stay under 1%
        let actual_baud = TIMER_CLOCK_HZ / cycles;
        assert!(actual_baud.abs_diff(TRACE_BAUD) * 100 < TRACE_BAUD);
    }

    #[test]
    fn trace_delay_fits_a_register() {
        let spins = (TRACE_CYCLES_PER_BIT - TRACE_BIT_OVERHEAD_CYCLES) / TRACE_SPIN_CYCLES;
        assert!(spins > 0 && spins <= u8::MAX as u32);
    }
}
