//! Trace logging over a byte-wide serial transmitter
//!
//! Lines are tagged the same way the console output always has been:
//! `[SYS]` for lifecycle messages and `[SEL]` for applied selections.

use crate::poll::Update;
use core::convert::Infallible;
use embedded_hal::serial;
use ufmt::{uWrite, uwriteln};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    System,
    Selection,
}

impl LogType {
    const fn tag(self) -> &'static str {
        match self {
            LogType::System => "[SYS] ",
            LogType::Selection => "[SEL] ",
        }
    }
}

/// `uWrite` adapter for any embedded-hal serial transmitter
pub struct Logger<W> {
    tx: W,
}

impl<W: serial::Write<u8>> Logger<W> {
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    pub fn release(self) -> W {
        self.tx
    }

    pub fn flush(&mut self) -> Result<(), W::Error> {
        nb::block!(self.tx.flush())
    }
}

impl<W: serial::Write<u8>> uWrite for Logger<W> {
    type Error = W::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            nb::block!(self.tx.write(byte))?;
        }
        Ok(())
    }
}

/// Discards everything, used when tracing is compiled out
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLog;

impl uWrite for NullLog {
    type Error = Infallible;

    #[inline]
    fn write_str(&mut self, _s: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Write one tagged line
pub fn line<L: uWrite>(log: &mut L, log_type: LogType, msg: &str) -> Result<(), L::Error> {
    log.write_str(log_type.tag())?;
    log.write_str(msg)?;
    log.write_str("\r\n")
}

pub fn system<L: uWrite>(log: &mut L, msg: &str) -> Result<(), L::Error> {
    line(log, LogType::System, msg)
}

/// `[SEL] 0x09 A=11 B=11`
pub fn selection<L: uWrite>(log: &mut L, update: &Update) -> Result<(), L::Error> {
    log.write_str(LogType::Selection.tag())?;
    uwriteln!(log, "{} A={} B={}\r", update.selection, update.a, update.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selection;
    use crate::testing::StringSink;
    use embedded_hal_mock::eh0::serial::{Mock as SerialMock, Transaction};

    #[test]
    fn logger_writes_each_byte() {
        let expectations = [Transaction::write_many(b"[SYS] up\r\n"), Transaction::flush()];
        let mut logger = Logger::new(SerialMock::new(&expectations));

        system(&mut logger, "up").unwrap();
        logger.flush().unwrap();

        logger.release().done();
    }

    #[test]
    fn selection_line_format() {
        let mut sink = StringSink::default();
        let update = Update::for_selection(Selection::from_bits(0b001_101));
        selection(&mut sink, &update).unwrap();
        assert_eq!(sink.0, "[SEL] 0x0D A=15 B=11\r\n");
    }

    #[test]
    fn tags() {
        let mut sink = StringSink::default();
        system(&mut sink, "x").unwrap();
        line(&mut sink, LogType::Selection, "y").unwrap();
        assert_eq!(sink.0, "[SYS] x\r\n[SEL] y\r\n");
    }

    #[test]
    fn null_log_accepts_everything() {
        let mut log = NullLog;
        assert!(system(&mut log, "ignored").is_ok());
    }
}
