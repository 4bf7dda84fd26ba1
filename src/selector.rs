//! Selector input sampling

use crate::baud::SelectorCode;
use crate::channel::ChannelId;
use crate::config::SELECTOR_MASK;
use embedded_hal::digital::v2::InputPin;
use ufmt::{uDisplay, uWrite, Formatter};

/// Both 3-bit selector groups as read from the port, bits 0..5
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection(u8);

impl Selection {
    /// Drop everything outside the selector bits
    #[inline]
    pub const fn from_bits(raw: u8) -> Self {
        Self(raw & SELECTOR_MASK)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn channel_a(self) -> SelectorCode {
        SelectorCode::from_bits(self.0)
    }

    #[inline]
    pub const fn channel_b(self) -> SelectorCode {
        SelectorCode::from_bits(self.0 >> 3)
    }

    pub const fn code(self, channel: ChannelId) -> SelectorCode {
        match channel {
            ChannelId::A => self.channel_a(),
            ChannelId::B => self.channel_b(),
        }
    }
}

impl uDisplay for Selection {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        const HEX_CHARS: &str = "0123456789ABCDEF";
        let hi = (self.0 >> 4) as usize;
        let lo = (self.0 & 0xF) as usize;
        f.write_str("0x")?;
        f.write_str(&HEX_CHARS[hi..hi + 1])?;
        f.write_str(&HEX_CHARS[lo..lo + 1])
    }
}

/// Somewhere the current selector bits can be sampled from
pub trait SelectorSource {
    type Error;

    fn sample(&mut self) -> Result<Selection, Self::Error>;
}

/// Six individual input pins, bit 0 first. Pins are read one after another,
/// so prefer a whole-port reader when the selectors share a port.
pub struct PinSelector<P> {
    pins: [P; 6],
}

impl<P: InputPin> PinSelector<P> {
    pub fn new(pins: [P; 6]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; 6] {
        self.pins
    }
}

impl<P: InputPin> SelectorSource for PinSelector<P> {
    type Error = P::Error;

    fn sample(&mut self) -> Result<Selection, Self::Error> {
        let mut bits = 0;
        for (idx, pin) in self.pins.iter().enumerate() {
            if pin.is_high()? {
                bits |= 1 << idx;
            }
        }
        Ok(Selection::from_bits(bits))
    }
}

/// Returned once a finite sample stream has run dry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exhausted;

/// Replays raw port values from an iterator, for driving the loop off-target
pub struct Samples<I> {
    inner: I,
}

impl<I: Iterator<Item = u8>> Samples<I> {
    pub fn new<T: IntoIterator<IntoIter = I>>(samples: T) -> Self {
        Self { inner: samples.into_iter() }
    }
}

impl<I: Iterator<Item = u8>> SelectorSource for Samples<I> {
    type Error = Exhausted;

    fn sample(&mut self) -> Result<Selection, Self::Error> {
        self.inner.next().map(Selection::from_bits).ok_or(Exhausted)
    }
}
