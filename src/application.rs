//! Application layer: ties the selector input, the poll loop and both clock
//! channels together and runs them forever.

use crate::channel::ClockChannel;
use crate::logger;
use crate::poll::{PollLoop, Update};
use crate::selector::SelectorSource;
use core::convert::Infallible;
use ufmt::uWrite;

pub struct Application<S, A, B, L> {
    source: S,
    channel_a: A,
    channel_b: B,
    poll: PollLoop,
    log: L,
}

impl<S, A, B, L> Application<S, A, B, L>
where
    S: SelectorSource,
    A: ClockChannel,
    B: ClockChannel,
    L: uWrite,
{
    /// Both channels must already run at the default divisor
    pub fn new(source: S, channel_a: A, channel_b: B, log: L) -> Self {
        Self {
            source,
            channel_a,
            channel_b,
            poll: PollLoop::new(),
            log,
        }
    }

    /// One poll iteration. Returns the applied update if the selection changed.
    pub fn update(&mut self) -> Result<Option<Update>, S::Error> {
        let sample = self.source.sample()?;
        let update = self.poll.apply(sample, &mut self.channel_a, &mut self.channel_b);

        if let Some(update) = &update {
            logger::selection(&mut self.log, update).ok();
        }

        Ok(update)
    }

    pub fn log(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn release(self) -> (S, A, B, L) {
        (self.source, self.channel_a, self.channel_b, self.log)
    }
}

impl<S, A, B, L> Application<S, A, B, L>
where
    S: SelectorSource<Error = Infallible>,
    A: ClockChannel,
    B: ClockChannel,
    L: uWrite,
{
    /// Poll forever, waiting on `idle` between iterations
    pub fn run<W: IdleWait>(mut self, mut idle: W) -> ! {
        logger::system(&mut self.log, "polling selectors").ok();
        idle.mask();
        loop {
            match self.poll_and_wait(&mut idle) {
                Ok(_) => {}
                Err(never) => match never {},
            }
        }
    }
}

impl<S, A, B, L> Application<S, A, B, L>
where
    S: SelectorSource,
    A: ClockChannel,
    B: ClockChannel,
    L: uWrite,
{
    /// One iteration with the wake source masked, then the idle wait. A
    /// change that lands after the sample stays pending and ends the wait at
    /// once, so it is picked up by the next iteration.
    pub fn poll_and_wait<W: IdleWait>(&mut self, idle: &mut W) -> Result<Option<Update>, S::Error> {
        let update = self.update()?;
        idle.sleep();
        Ok(update)
    }
}

/// Wait between polls.
pub trait IdleWait {
    /// Hold off the wake source so it can only become pending
    fn mask(&mut self);

    /// Unmask and sleep as a single step; returns masked again. Must return
    /// immediately when a wake-up is already pending.
    fn sleep(&mut self);
}

/// Tight busy-poll, no waiting at all
#[derive(Clone, Copy, Debug, Default)]
pub struct BusyPoll;

impl IdleWait for BusyPoll {
    #[inline]
    fn mask(&mut self) {}

    #[inline]
    fn sleep(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baud::Divisor;
    use crate::channel::mock::RecordingChannel;
    use crate::logger::NullLog;
    use crate::selector::{Exhausted, Samples, Selection};
    use crate::testing::StringSink;
    use core::cell::Cell;
    use std::rc::Rc;

    fn d(value: u8) -> Divisor {
        Divisor::new(value)
    }

    #[test]
    fn applies_changes_until_input_runs_out() {
        let samples = Samples::new([0b000_000, 0b001_001, 0b001_001, 0b111_111, 0b101_101]);
        let mut app = Application::new(
            samples,
            RecordingChannel::default(),
            RecordingChannel::default(),
            NullLog,
        );

        let mut changes = 0;
        loop {
            match app.update() {
                Ok(Some(_)) => changes += 1,
                Ok(None) => {}
                Err(Exhausted) => break,
            }
        }

        let (_, a, b, _) = app.release();
        assert_eq!(changes, 3);
        assert_eq!(a.writes, [d(11), d(11), d(15)]);
        assert_eq!(b.writes, [d(11), d(11), d(15)]);
    }

    #[test]
    fn changes_are_traced() {
        let samples = Samples::new([0b011_000, 0b011_000]);
        let mut app = Application::new(
            samples,
            RecordingChannel::default(),
            RecordingChannel::default(),
            StringSink::default(),
        );

        assert!(app.update().unwrap().is_some());
        assert!(app.update().unwrap().is_none());
        assert_eq!(app.log().0, "[SEL] 0x18 A=23 B=2\r\n");
    }

    /// Interrupt flag and pending pin change shared between the fake port
    /// and the fake sleep
    #[derive(Default)]
    struct Irq {
        enabled: Cell<bool>,
        pending: Cell<bool>,
        blocked: Cell<u32>,
    }

    /// Port that changes right after it has been sampled
    struct ChangingPort {
        irq: Rc<Irq>,
        values: std::vec::IntoIter<u8>,
    }

    impl SelectorSource for ChangingPort {
        type Error = Exhausted;

        fn sample(&mut self) -> Result<Selection, Self::Error> {
            assert!(!self.irq.enabled.get(), "sampled with wake-up unmasked");
            let raw = self.values.next().ok_or(Exhausted)?;
            // The edge arrives while the wake source is still masked
            self.irq.pending.set(true);
            Ok(Selection::from_bits(raw))
        }
    }

    struct FakeSleep {
        irq: Rc<Irq>,
    }

    impl IdleWait for FakeSleep {
        fn mask(&mut self) {
            self.irq.enabled.set(false);
        }

        fn sleep(&mut self) {
            self.irq.enabled.set(true);
            if self.irq.pending.get() {
                self.irq.pending.set(false);
            } else {
                self.irq.blocked.set(self.irq.blocked.get() + 1);
            }
            self.irq.enabled.set(false);
        }
    }

    #[test]
    fn change_after_sample_is_not_lost() {
        let irq = Rc::new(Irq::default());
        let port = ChangingPort { irq: irq.clone(), values: vec![0b001_001, 0b010_010].into_iter() };
        let mut app = Application::new(
            port,
            RecordingChannel::default(),
            RecordingChannel::default(),
            NullLog,
        );
        let mut idle = FakeSleep { irq: irq.clone() };
        idle.mask();

        assert!(app.poll_and_wait(&mut idle).unwrap().is_some());
        assert_eq!(irq.blocked.get(), 0);
        assert!(app.poll_and_wait(&mut idle).unwrap().is_some());
        assert_eq!(irq.blocked.get(), 0);

        let (_, a, b, _) = app.release();
        assert_eq!(a.last(), Some(d(5)));
        assert_eq!(b.last(), Some(d(5)));
    }

    #[test]
    fn busy_poll_never_waits() {
        let mut app = Application::new(
            Samples::new([0b000_100]),
            RecordingChannel::default(),
            RecordingChannel::default(),
            NullLog,
        );
        assert_eq!(app.poll_and_wait(&mut BusyPoll).unwrap().map(|u| u.a), Some(d(1)));
        assert_eq!(app.poll_and_wait(&mut BusyPoll), Err(Exhausted));
    }
}
