//! A 32-bit tick clock on top of a wrapping microsecond counter.
//!
//! The platform counter is scaled down by `2^EXP` microseconds per tick. The
//! scaled value has its top `EXP` bits permanently cleared, so on its own it
//! would wrap long before a 32-bit tick count should. A single extension byte
//! fills that gap. It consists of three parts:
//!
//! - The upper `EXP` bits extend the scaled counter and end up in the upper
//!   bits of the returned tick value.
//! - The next bit (the *seam bit*) overlaps the most significant bit of the
//!   scaled counter. It is used to detect wraps of the platform counter.
//! - The remaining low bits are always zero.
//!
//! Whenever the seam bit of the counter differs from the stored one, that bit
//! is *added* to the extension byte. Going `0 -> 1` just sets the bit, going
//! `1 -> 0` clears it and carries into the extension bits. No comparisons or
//! branches are involved.
//!
//! The clock must be read at least once per half wrap period of the platform
//! counter (2^31 us, about 35 minutes), otherwise a seam flip is missed and
//! the upper bits fall behind.
//!
//! Reading the counter and updating the extension byte happen inside one
//! critical section, so the clock can be shared with interrupt handlers.

use fugit::{MicrosDurationU32, MicrosDurationU64};
use portable_atomic::{AtomicU8, Ordering};

/// The raw, wrapping microsecond counter of the platform.
pub trait MicrosCounter {
    /// Current counter value. Wraps at `2^32` microseconds.
    fn now_micros(&self) -> u32;
}

impl<F> MicrosCounter for F
where
    F: Fn() -> u32,
{
    #[inline]
    fn now_micros(&self) -> u32 {
        self()
    }
}

struct Exponent<const EXP: u32>;

impl<const EXP: u32> Exponent<EXP> {
    // 0 would work but the clock could just return the counter unmodified,
    // 8 leaves no room for the seam bit.
    const VALID: () = assert!(
        EXP > 0 && EXP < 8,
        "The tick exponent must be in the range 1..=7"
    );
}

/// Stitches one raw counter reading into the tick domain.
///
/// Takes the current extension byte and the raw microsecond value, returns the
/// updated extension byte and the resulting tick value.
#[inline]
pub fn calculate_ticks<const EXP: u32>(overflow: u8, raw_micros: u32) -> (u8, u32) {
    #[allow(clippy::let_unit_value)]
    let () = Exponent::<EXP>::VALID;

    let scaled = raw_micros >> EXP;
    let msb = (scaled >> 24) as u8;
    let seam = 1u8 << (7 - EXP);

    let overflow = overflow.wrapping_add((msb ^ overflow) & seam);

    // The seam bit is equal in both halves and the low bits of `overflow` are
    // zero, so the `|` only contributes the extension bits.
    (overflow, scaled | (u32::from(overflow) << 24))
}

/// A 32-bit tick clock with `2^EXP` microseconds per tick.
///
/// The extension byte is owned by the clock and only ever updated by
/// [`TickClock::ticks`]. It is never reset.
pub struct TickClock<C, const EXP: u32> {
    counter: C,
    overflow: AtomicU8,
}

impl<C, const EXP: u32> TickClock<C, EXP> {
    /// Microseconds per tick.
    pub const US_PER_TICK: u32 = 1 << EXP;

    /// Create a new clock on top of `counter`.
    ///
    /// Fails to compile unless `0 < EXP < 8`.
    pub const fn new(counter: C) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Exponent::<EXP>::VALID;

        Self {
            counter,
            overflow: AtomicU8::new(0),
        }
    }

    /// The underlying platform counter.
    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Converts a duration into whole ticks, rounding down.
    #[inline]
    pub const fn micros_to_ticks(duration: MicrosDurationU32) -> u32 {
        duration.ticks() >> EXP
    }

    /// Converts a tick count back into microseconds.
    ///
    /// Tick counts of `2^(32 - EXP)` and above span more than `u32`
    /// microseconds, hence the wider duration.
    #[inline]
    pub const fn ticks_to_micros(ticks: u32) -> MicrosDurationU64 {
        MicrosDurationU64::from_ticks((ticks as u64) << EXP)
    }
}

impl<C: MicrosCounter, const EXP: u32> TickClock<C, EXP> {
    /// The current time in ticks, monotonic modulo `2^32`.
    pub fn ticks(&self) -> u32 {
        critical_section::with(|_| {
            let overflow = self.overflow.load(Ordering::Relaxed);
            let (overflow, now) = calculate_ticks::<EXP>(overflow, self.counter.now_micros());
            self.overflow.store(overflow, Ordering::Relaxed);

            now
        })
    }
}
