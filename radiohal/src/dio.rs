//! Polled edge detection on the radio DIO lines.
//!
//! The radio signals events by raising its DIO lines. Instead of hooking real
//! pin interrupts, the lines are sampled whenever interrupts are re-enabled at
//! the outermost level, see [`RadioHal`](crate::RadioHal). Every rising edge
//! is reported to a [`RadioIrqHandler`] from normal, non-interrupt context, so
//! the handler is free to run SPI transfers.

use embedded_hal::digital::{Error as _, InputPin};

/// Receives rising edges of the DIO lines.
pub trait RadioIrqHandler {
    /// DIO line `dio` went from low to high.
    fn on_dio_rising(&mut self, dio: usize);
}

impl<F> RadioIrqHandler for F
where
    F: FnMut(usize),
{
    fn on_dio_rising(&mut self, dio: usize) {
        self(dio)
    }
}

/// Last observed level of `N` DIO lines.
#[derive(Debug, Clone)]
pub struct DioPoller<const N: usize> {
    states: [bool; N],
}

impl<const N: usize> Default for DioPoller<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DioPoller<N> {
    /// All lines start out low.
    pub const fn new() -> Self {
        Self { states: [false; N] }
    }

    /// The level each line had at the last poll.
    pub fn states(&self) -> &[bool; N] {
        &self.states
    }

    /// Sample every configured line once.
    ///
    /// `None` slots are unused and never read. A line whose level changed
    /// updates its stored state; only a change to high calls `handler`, with
    /// the line's index. A failing read counts as "unchanged".
    ///
    /// Returns the number of rising edges reported.
    pub fn poll<P, H>(&mut self, lines: &mut [Option<P>; N], handler: &mut H) -> usize
    where
        P: InputPin,
        H: RadioIrqHandler + ?Sized,
    {
        let mut rising = 0;

        for (dio, (line, state)) in lines.iter_mut().zip(self.states.iter_mut()).enumerate() {
            let Some(pin) = line else {
                continue;
            };

            let level = match pin.is_high() {
                Ok(level) => level,
                Err(e) => {
                    warn!("dio{}: read failed: {}", dio, e.kind());
                    continue;
                }
            };

            if level != *state {
                *state = level;

                if level {
                    trace!("dio{}: rising edge", dio);
                    handler.on_dio_rising(dio);
                    rising += 1;
                }
            }
        }

        rising
    }
}
