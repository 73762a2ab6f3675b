//! Hardware abstraction for LoRa radio transceivers driven from a single
//! control loop.
//!
//! The crate has three parts:
//!
//! - [`irq`]: nested interrupt masking. Only the outermost disable/enable
//!   pair touches the real interrupt mask.
//! - [`dio`]: edge detection on the radio's DIO lines by polling. The lines
//!   are sampled each time interrupts are re-enabled at the outermost level,
//!   rising edges go to a [`RadioIrqHandler`].
//! - [`radio`]: [`RadioHal`], tying both together with the pins, the SPI bus
//!   and the tick clock of [`radiohal_time`].
//!
//! No real pin interrupts are used. Every callback runs from normal context,
//! which keeps all SPI traffic out of interrupt handlers.
//!
//! # Example
//!
//! ```ignore
//! use radiohal::prelude::*;
//!
//! let clock = TickClock::<_, 4>::new(|| board.micros());
//! let deadlines = Deadlines::new(clock, board.delay, WaitConfig::default());
//! let pins = RadioPins {
//!     nss: board.nss,
//!     rxtx: None::<NoPin>,
//!     rst: Some(board.rst),
//!     dio: [Some(board.dio0), Some(board.dio1), None],
//! };
//!
//! let mut hal = RadioHal::new_or_fail(
//!     pins,
//!     board.spi,
//!     deadlines,
//!     CriticalSectionInterrupts::new(),
//!     |dio| radio_irq_handler(dio),
//!     halt,
//! );
//!
//! loop {
//!     hal.with_irqs_disabled(|hal| run_jobs(hal));
//! }
//! ```

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

pub mod dio;
pub mod error;
pub mod irq;
pub mod radio;

pub use dio::{DioPoller, RadioIrqHandler};
pub use error::{ConfigError, Error};
pub use irq::{CriticalSectionInterrupts, InterruptControl, IrqGuard, IrqNesting, NestedIrqs};
pub use radio::{halt, NoPin, RadioHal, RadioPins, ResetLine, RstLevel};

pub use radiohal_time;

/// Everything needed to set up and drive a [`RadioHal`].
pub mod prelude {
    pub use crate::{
        halt, CriticalSectionInterrupts, NestedIrqs, NoPin, RadioHal, RadioIrqHandler, RadioPins,
        ResetLine, RstLevel,
    };
    pub use radiohal_time::{Deadlines, MicrosCounter, TickClock, WaitConfig};
}
