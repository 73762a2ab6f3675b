//! Time-related primitives for polled radio HALs.
//!
//! This crate extends a narrow, wrapping microsecond counter into a stable
//! 32-bit tick domain ([`TickClock`]) and builds busy-wait deadline handling
//! on top of it ([`Deadlines`]).
//!
//! Everything here assumes a single execution context: one core, no
//! preemption of the code calling into the clock.

#![no_std]
#![deny(missing_docs)]
//deny_warnings_placeholder_for_ci

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(feature = "defmt-03")]
use defmt_03 as defmt;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod deadline;
pub mod tick_clock;

pub use deadline::{Deadlines, WaitConfig, WaitConfigError};
pub use tick_clock::{calculate_ticks, MicrosCounter, TickClock};

/// Re-export for implementors of the delay collaborator.
pub use embedded_hal;
/// Re-export for the duration types used at the conversion API.
pub use fugit;
