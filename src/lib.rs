//! Dual-channel baud rate clock generator for the ATtiny84
//!
//! Two timers generate free-running square waves whose rates are picked by
//! two 3-bit selector groups on PA0..PA5. Everything except `hal` is plain
//! `no_std` code and runs on the host as well.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod application;
pub mod baud;
pub mod channel;
pub mod config;
pub mod logger;
pub mod poll;
pub mod selector;
pub mod testing;

#[cfg(target_arch = "avr")]
pub mod hal;

pub use application::{Application, BusyPoll, IdleWait};
pub use baud::{decode, BaudRate, Divisor, SelectorCode};
pub use channel::{ChannelId, ClockChannel};
pub use poll::{step, write_events, PollLoop, Update, WriteEvent};
pub use selector::{Selection, SelectorSource};
