//! Power-on self test
//!
//! Runs on the target in debug builds and reports through the trace logger.
//! The cases only touch pure code, so the same suite also runs on the host.

use crate::baud::{decode, BaudRate, Divisor, SelectorCode};
use crate::config::{PORT_A, PORT_B, REF_CLOCK_HZ, TIMER0, TIMER1};
use crate::logger::{self, LogType};
use crate::poll::Update;
use crate::selector::Selection;
use ufmt::{uWrite, uwrite, uwriteln};

pub trait TestCase {
    fn run(&self) -> TestResult;
    fn name(&self) -> &'static str;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    /// Carries the failed condition
    Fail(&'static str),
}

macro_rules! check {
    ($cond:expr) => {
        if !$cond {
            return TestResult::Fail(stringify!($cond));
        }
    };
}

pub struct TestRunner<'a, L: uWrite> {
    log: &'a mut L,
    total_tests: u8,
    passed_tests: u8,
}

impl<'a, L: uWrite> TestRunner<'a, L> {
    pub fn new(log: &'a mut L) -> Self {
        Self { log, total_tests: 0, passed_tests: 0 }
    }

    pub fn run_suite(&mut self, name: &'static str, tests: &[&dyn TestCase]) {
        uwriteln!(self.log, "=== Test Suite: {} ===\r", name).ok();

        for test in tests {
            self.total_tests += 1;
            uwrite!(self.log, "Running {}: ", test.name()).ok();

            match test.run() {
                TestResult::Pass => {
                    self.passed_tests += 1;
                    self.log.write_str("PASS\r\n").ok();
                }
                TestResult::Fail(what) => {
                    uwriteln!(self.log, "FAIL - {}\r", what).ok();
                }
            }
        }

        uwriteln!(self.log, "Passed: {}/{}\r", self.passed_tests, self.total_tests).ok();
    }

    pub fn all_passed(&self) -> bool {
        self.passed_tests == self.total_tests
    }
}

pub struct DecodeTableTest;
impl TestCase for DecodeTableTest {
    fn name(&self) -> &'static str {
        "Decode table"
    }

    fn run(&self) -> TestResult {
        const TABLE: [u8; 8] = [23, 11, 5, 2, 1, 15, 11, 11];
        for (code, divisor) in TABLE.iter().enumerate() {
            check!(decode(SelectorCode::from_bits(code as u8)) == Divisor::new(*divisor));
        }
        for rate in BaudRate::ALL {
            let clock = rate.divisor().output_hz(REF_CLOCK_HZ);
            check!(clock == rate.bits_per_second() * rate.oversampling() as u32);
        }
        TestResult::Pass
    }
}

pub struct ChannelIndependenceTest;
impl TestCase for ChannelIndependenceTest {
    fn name(&self) -> &'static str {
        "Channel independence"
    }

    fn run(&self) -> TestResult {
        for a in 0u8..8 {
            let reference = decode(SelectorCode::from_bits(a));
            for b in 0u8..8 {
                let update = Update::for_selection(Selection::from_bits(a | (b << 3)));
                check!(update.a == reference);
                check!(update.b == decode(SelectorCode::from_bits(b)));
            }
        }
        TestResult::Pass
    }
}

pub struct RegisterConfigTest;
impl TestCase for RegisterConfigTest {
    fn name(&self) -> &'static str {
        "Register config"
    }

    fn run(&self) -> TestResult {
        check!(PORT_A.ddr_bits() == 0x40);
        check!(PORT_A.port_bits() == 0x3F);
        check!(PORT_B.ddr_bits() == 0x04);
        check!(TIMER0.tccr0a() == 0x42);
        check!(TIMER0.tccr0b() == 0x01);
        check!(TIMER1.tccr1a() == 0x40);
        check!(TIMER1.tccr1b() == 0x09);
        TestResult::Pass
    }
}

/// Run every self test case, true when all of them pass
pub fn self_test<L: uWrite>(log: &mut L) -> bool {
    let mut runner = TestRunner::new(log);
    runner.run_suite(
        "Self test",
        &[&DecodeTableTest, &ChannelIndependenceTest, &RegisterConfigTest],
    );
    let passed = runner.all_passed();
    logger::line(log, LogType::System, if passed { "self test ok" } else { "self test FAILED" }).ok();
    passed
}

/// Collects output in a `String`
#[cfg(test)]
#[derive(Default)]
pub(crate) struct StringSink(pub std::string::String);

#[cfg(test)]
impl uWrite for StringSink {
    type Error = core::convert::Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.0.push_str(s);
        Ok(())
    }
}
