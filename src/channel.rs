//! Clock channel abstraction
//!
//! A channel is one timer running in clear-on-compare mode with its output
//! pin toggling on every match, so it produces `f / (2 * (divisor + 1))`.
//! A new compare value is picked up at the timer's next cycle boundary, the
//! software side never has to synchronise with the counter.

use crate::baud::Divisor;
use ufmt::{uDisplay, uWrite, Formatter};

/// Logical generator output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelId {
    /// Timer0, OC0A on PB2, selector bits 0..2
    A,
    /// Timer1, OC1A on PA6, selector bits 3..5
    B,
}

impl uDisplay for ChannelId {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(match self {
            ChannelId::A => "A",
            ChannelId::B => "B",
        })
    }
}

/// Write-only handle to a generator's compare register
pub trait ClockChannel {
    fn set_divisor(&mut self, divisor: Divisor);
}

impl<T: ClockChannel + ?Sized> ClockChannel for &mut T {
    #[inline]
    fn set_divisor(&mut self, divisor: Divisor) {
        (**self).set_divisor(divisor)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::vec::Vec;

    /// Remembers every compare value written to it
    #[derive(Default)]
    pub struct RecordingChannel {
        pub writes: Vec<Divisor>,
    }

    impl RecordingChannel {
        pub fn last(&self) -> Option<Divisor> {
            self.writes.last().copied()
        }
    }

    impl ClockChannel for RecordingChannel {
        fn set_divisor(&mut self, divisor: Divisor) {
            self.writes.push(divisor);
        }
    }
}
