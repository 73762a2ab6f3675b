//! Signed tick deltas and busy-wait deadlines on top of a [`TickClock`].

use core::fmt;

use embedded_hal::delay::DelayNs;

#[cfg(feature = "defmt-03")]
use crate::defmt;
use crate::tick_clock::{MicrosCounter, TickClock};

/// Length of one coarse sleep step, in milliseconds.
pub const DEFAULT_COARSE_CHUNK_MS: u32 = 16;

/// Longest microsecond sleep the platform performs accurately.
pub const DEFAULT_MAX_FINE_SLEEP_US: u32 = 16_000;

impl<C: MicrosCounter, const EXP: u32> TickClock<C, EXP> {
    /// Ticks from now until `target`.
    ///
    /// Positive values lie in the future, zero or negative values have been
    /// reached. Correct as long as the true distance stays below `2^31` ticks.
    #[inline]
    pub fn delta(&self, target: u32) -> i32 {
        target.wrapping_sub(self.ticks()) as i32
    }

    /// True if `target` has been reached or passed.
    ///
    /// Does not arm any wake-up source, the caller keeps looping.
    #[inline]
    pub fn check_deadline(&self, target: u32) -> bool {
        self.delta(target) <= 0
    }
}

/// Rejected [`WaitConfig`] parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum WaitConfigError {
    /// The coarse sleep step is zero and would never make progress.
    ZeroCoarseChunk,
    /// A coarse sleep step is longer than the fine sleep window.
    CoarseChunkExceedsFineSleep,
}

impl fmt::Display for WaitConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCoarseChunk => f.write_str("coarse sleep chunk must be non-zero"),
            Self::CoarseChunkExceedsFineSleep => {
                f.write_str("coarse sleep chunk exceeds the maximum fine sleep")
            }
        }
    }
}

/// Platform tuning of [`Deadlines::wait_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct WaitConfig {
    coarse_chunk_ms: u32,
    max_fine_sleep_us: u32,
}

impl WaitConfig {
    /// Validates and builds a configuration.
    ///
    /// `max_fine_sleep_us` is the longest microsecond sleep that is still
    /// accurate on the platform. Longer waits are first shortened in steps of
    /// `coarse_chunk_ms`, which must fit inside that window.
    pub const fn new(coarse_chunk_ms: u32, max_fine_sleep_us: u32) -> Result<Self, WaitConfigError> {
        if coarse_chunk_ms == 0 {
            return Err(WaitConfigError::ZeroCoarseChunk);
        }

        match coarse_chunk_ms.checked_mul(1_000) {
            Some(us) if us <= max_fine_sleep_us => Ok(Self {
                coarse_chunk_ms,
                max_fine_sleep_us,
            }),
            _ => Err(WaitConfigError::CoarseChunkExceedsFineSleep),
        }
    }

    /// Length of one coarse sleep step in milliseconds.
    pub const fn coarse_chunk_ms(&self) -> u32 {
        self.coarse_chunk_ms
    }

    /// Longest accurate microsecond sleep.
    pub const fn max_fine_sleep_us(&self) -> u32 {
        self.max_fine_sleep_us
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            coarse_chunk_ms: DEFAULT_COARSE_CHUNK_MS,
            max_fine_sleep_us: DEFAULT_MAX_FINE_SLEEP_US,
        }
    }
}

/// Busy-wait deadline handling for a tick clock.
///
/// Bundles the clock with the platform sleep primitives. Waiting blocks the
/// whole control flow, there is no yield and no way to cancel a wait.
pub struct Deadlines<C, D, const EXP: u32> {
    clock: TickClock<C, EXP>,
    delay: D,
    config: WaitConfig,
}

impl<C, D, const EXP: u32> Deadlines<C, D, EXP>
where
    C: MicrosCounter,
    D: DelayNs,
{
    // Longest single wait of `delay_us`, keeps the tick span below 2^31.
    const MAX_SPAN_US: u32 = 1 << 30;

    /// Create deadline handling from a clock, the platform delay and tuning.
    pub fn new(clock: TickClock<C, EXP>, delay: D, config: WaitConfig) -> Self {
        Self {
            clock,
            delay,
            config,
        }
    }

    /// The underlying tick clock.
    pub fn clock(&self) -> &TickClock<C, EXP> {
        &self.clock
    }

    /// The active wait tuning.
    pub fn config(&self) -> WaitConfig {
        self.config
    }

    /// See [`TickClock::ticks`].
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.clock.ticks()
    }

    /// See [`TickClock::delta`].
    #[inline]
    pub fn delta(&self, target: u32) -> i32 {
        self.clock.delta(target)
    }

    /// See [`TickClock::check_deadline`].
    #[inline]
    pub fn check_deadline(&self, target: u32) -> bool {
        self.clock.check_deadline(target)
    }

    /// Busy-wait until `target` is reached.
    ///
    /// Returns immediately if `target` already passed. Waits longer than the
    /// fine sleep window are first reduced in coarse steps, then the rest is
    /// slept in one microsecond sleep.
    pub fn wait_until(&mut self, target: u32) {
        let max_fine_ticks = (self.config.max_fine_sleep_us >> EXP) as i32;
        let coarse_ticks = ((self.config.coarse_chunk_ms * 1_000) >> EXP) as i32;

        let mut delta = self.delta(target);
        trace!("wait_until: target {}, {} ticks ahead", target, delta);

        while delta > max_fine_ticks {
            self.delay.delay_ms(self.config.coarse_chunk_ms);
            delta -= coarse_ticks;
        }

        if delta > 0 {
            self.delay.delay_us((delta as u32) << EXP);
        }
    }

    /// Put the system into low-power mode until the next interrupt.
    ///
    /// Not implemented: this is a no-op and the caller is expected to keep
    /// polling.
    #[inline]
    pub fn sleep(&mut self) {}

    /// Release the clock and the delay.
    pub fn free(self) -> (TickClock<C, EXP>, D) {
        (self.clock, self.delay)
    }
}

impl<C, D, const EXP: u32> DelayNs for Deadlines<C, D, EXP>
where
    C: MicrosCounter,
    D: DelayNs,
{
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, mut us: u32) {
        while us > 0 {
            let span = us.min(Self::MAX_SPAN_US);
            us -= span;

            let now = self.ticks();
            // Compensate for sub-tick uncertainty
            let ticks = span.div_ceil(TickClock::<C, EXP>::US_PER_TICK) + 1;
            self.wait_until(now.wrapping_add(ticks));
        }
    }

    fn delay_ms(&mut self, mut ms: u32) {
        const MAX_SPAN_MS: u32 = (1 << 30) / 1_000;

        while ms > 0 {
            let span = ms.min(MAX_SPAN_MS);
            ms -= span;
            self.delay_us(span * 1_000);
        }
    }
}
