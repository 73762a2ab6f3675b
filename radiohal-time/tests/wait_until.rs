//! Verifies the busy-wait behaviour of [`Deadlines`] against a simulated
//! microsecond counter that only advances while the delay sleeps.

use std::{cell::Cell, rc::Rc};

use radiohal_time::{
    embedded_hal::delay::DelayNs, Deadlines, MicrosCounter, TickClock, WaitConfig,
};

#[derive(Clone)]
struct SimCounter(Rc<Cell<u32>>);

impl MicrosCounter for SimCounter {
    fn now_micros(&self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sleep {
    Ms(u32),
    Us(u32),
}

struct SimDelay {
    now: Rc<Cell<u32>>,
    sleeps: Vec<Sleep>,
}

impl SimDelay {
    fn advance(&mut self, us: u32) {
        self.now.set(self.now.get().wrapping_add(us));
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.sleeps.push(Sleep::Us(us));
        self.advance(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps.push(Sleep::Ms(ms));
        self.advance(ms * 1_000);
    }
}

fn setup<const EXP: u32>(start_us: u32, config: WaitConfig) -> Deadlines<SimCounter, SimDelay, EXP> {
    let now = Rc::new(Cell::new(start_us));
    let clock = TickClock::new(SimCounter(now.clone()));
    let delay = SimDelay {
        now,
        sleeps: Vec::new(),
    };

    Deadlines::new(clock, delay, config)
}

fn sleeps<const EXP: u32>(deadlines: Deadlines<SimCounter, SimDelay, EXP>) -> Vec<Sleep> {
    deadlines.free().1.sleeps
}

#[test]
fn past_target_does_not_sleep() {
    let mut deadlines = setup::<4>(1_600_000, WaitConfig::default());
    let now = deadlines.ticks();

    deadlines.wait_until(now);
    deadlines.wait_until(now.wrapping_sub(1));
    deadlines.wait_until(now.wrapping_sub(1_000_000));

    assert_eq!(deadlines.ticks(), now);
    assert!(sleeps(deadlines).is_empty());
}

#[test]
fn short_wait_is_one_fine_sleep() {
    let mut deadlines = setup::<4>(0, WaitConfig::default());
    let target = deadlines.ticks() + 1_000;

    deadlines.wait_until(target);

    assert_eq!(deadlines.ticks(), target);
    assert_eq!(sleeps(deadlines), [Sleep::Us(16_000)]);
}

#[test]
fn long_wait_uses_coarse_chunks_first() {
    let mut deadlines = setup::<4>(0, WaitConfig::default());
    let target = deadlines.ticks() + 100_000;

    deadlines.wait_until(target);

    assert!(deadlines.check_deadline(target));
    assert_eq!(deadlines.ticks(), target);

    let mut expected = vec![Sleep::Ms(16); 99];
    expected.push(Sleep::Us(16_000));
    assert_eq!(sleeps(deadlines), expected);
}

#[test]
fn custom_chunking() {
    let config = WaitConfig::new(10, 16_383).unwrap();
    let mut deadlines = setup::<6>(0, config);
    let target = deadlines.ticks() + 1_000;

    deadlines.wait_until(target);

    // 1000 ticks at 64 us, fine window 255 ticks, coarse step 156 ticks. A
    // coarse step really lasts 156.25 ticks, the remainder makes it late.
    assert_eq!(deadlines.ticks(), target + 1);
    let mut expected = vec![Sleep::Ms(10); 5];
    expected.push(Sleep::Us((1_000 - 5 * 156) * 64));
    assert_eq!(sleeps(deadlines), expected);
}

#[test]
fn never_early_and_bounded_slack() {
    for &start in &[0u32, 17, u32::MAX - 3_000_000, u32::MAX - 5] {
        for &ahead in &[1u32, 2, 249, 250, 251, 999, 1_000, 1_001, 31_337, 2_000_000] {
            let mut deadlines = setup::<6>(start, WaitConfig::default());
            let target = deadlines.ticks().wrapping_add(ahead);

            deadlines.wait_until(target);

            let late = deadlines.delta(target);
            assert!(late <= 0, "returned {} ticks early", late);
            assert!(-late <= (16_000 >> 6), "returned {} ticks late", -late);
        }
    }
}

#[test]
fn check_deadline_flips_at_target() {
    let mut deadlines = setup::<6>(0, WaitConfig::default());
    let target = deadlines.ticks() + 10;

    deadlines.wait_until(target - 1);
    assert!(!deadlines.check_deadline(target));

    deadlines.wait_until(target);
    assert!(deadlines.check_deadline(target));
    assert!(deadlines.check_deadline(target - 1));
}

#[test]
fn delay_ns_waits_at_least_requested() {
    let mut deadlines = setup::<4>(5, WaitConfig::default());

    let start = deadlines.clock().counter().now_micros();
    deadlines.delay_us(1_000);
    let elapsed = deadlines.clock().counter().now_micros() - start;
    assert!(elapsed >= 1_000, "slept {} us", elapsed);
    assert!(elapsed <= 1_000 + 2 * 16, "slept {} us", elapsed);

    let start = deadlines.clock().counter().now_micros();
    deadlines.delay_ms(100);
    let elapsed = deadlines.clock().counter().now_micros() - start;
    assert!(elapsed >= 100_000, "slept {} us", elapsed);
    assert!(elapsed <= 100_000 + 2 * 16, "slept {} us", elapsed);
}
