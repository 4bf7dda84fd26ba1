//! Selector poll loop
//!
//! Remembers the last applied selection and only touches the timers when the
//! sampled bits differ from it. Rewriting a compare register while the timer
//! runs is harmless but pointless, and the idle path stays register-free.

use crate::baud::{decode, Divisor};
use crate::channel::{ChannelId, ClockChannel};
use crate::selector::Selection;

/// Divisors for both channels after a selection change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Update {
    pub selection: Selection,
    pub a: Divisor,
    pub b: Divisor,
}

impl Update {
    pub const fn for_selection(selection: Selection) -> Self {
        Self {
            selection,
            a: decode(selection.channel_a()),
            b: decode(selection.channel_b()),
        }
    }

    /// Register writes in the order they are applied, A first
    pub const fn writes(&self) -> [WriteEvent; 2] {
        [
            WriteEvent { channel: ChannelId::A, divisor: self.a },
            WriteEvent { channel: ChannelId::B, divisor: self.b },
        ]
    }
}

/// One compare register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteEvent {
    pub channel: ChannelId,
    pub divisor: Divisor,
}

/// Single transition on raw port values. Returns the new divisors for A and
/// B when the selector bits of `input` differ from `previous`.
pub fn step(input: u8, previous: &mut u8) -> Option<(Divisor, Divisor)> {
    let mut state = PollLoop { previous: Selection::from_bits(*previous) };
    let update = state.step(Selection::from_bits(input));
    *previous = state.previous.bits();
    update.map(|u| (u.a, u.b))
}

pub struct PollLoop {
    previous: Selection,
}

impl PollLoop {
    /// Starts from an all-zero previous selection
    pub const fn new() -> Self {
        Self { previous: Selection::from_bits(0) }
    }

    /// Last selection a change was detected for
    #[inline]
    pub fn previous(&self) -> Selection {
        self.previous
    }

    pub fn step(&mut self, sample: Selection) -> Option<Update> {
        if sample == self.previous {
            return None;
        }

        self.previous = sample;
        Some(Update::for_selection(sample))
    }

    /// Step and push any change into the channels
    pub fn apply<A, B>(&mut self, sample: Selection, a: &mut A, b: &mut B) -> Option<Update>
    where
        A: ClockChannel + ?Sized,
        B: ClockChannel + ?Sized,
    {
        let update = self.step(sample)?;
        a.set_divisor(update.a);
        b.set_divisor(update.b);
        Some(update)
    }
}

impl Default for PollLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the loop over a stream of raw port samples and yield the register
/// writes it would make. Lazy, so `samples` may be endless.
pub fn write_events<I>(samples: I) -> impl Iterator<Item = WriteEvent>
where
    I: IntoIterator<Item = u8>,
{
    samples
        .into_iter()
        .scan(PollLoop::new(), |state, raw| Some(state.step(Selection::from_bits(raw))))
        .flatten()
        .flat_map(|update| update.writes())
}
