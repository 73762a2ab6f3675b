use std::cell::Cell;

use radiohal_time::{calculate_ticks, TickClock};

macro_rules! do_test {
    ($exp:literal, $overflow:literal, $raw:literal, $expected_overflow:literal, $expected:literal) => {{
        let overflow: u8 = $overflow;
        let raw: u32 = $raw;
        let expected: (u8, u32) = ($expected_overflow, $expected);
        let actual = calculate_ticks::<$exp>(overflow, raw);
        assert_eq!(
            actual,
            expected,
            "Expected: E={} ({:#04x} | {:#010x}) => ({:#04x}, {:#010x}), got: ({:#04x}, {:#010x})",
            $exp,
            overflow,
            raw,
            expected.0,
            expected.1,
            actual.0,
            actual.1
        );
    }};
}

#[test]
fn seam_bit_tracking() {
    // E = 1: seam is bit 6 of the byte, bit 30 of the scaled counter.
    do_test!(1, 0x00, 0x0000_0000, 0x00, 0x0000_0000);
    do_test!(1, 0x00, 0x7fff_fffe, 0x00, 0x3fff_ffff);
    do_test!(1, 0x00, 0x8000_0000, 0x40, 0x4000_0000);
    do_test!(1, 0x40, 0xffff_fffe, 0x40, 0x7fff_ffff);
    do_test!(1, 0x40, 0x0000_0000, 0x80, 0x8000_0000);
    do_test!(1, 0x80, 0x8000_0000, 0xc0, 0xc000_0000);
    do_test!(1, 0xc0, 0x0000_0002, 0x00, 0x0000_0001);

    // E = 7: seam is bit 0 of the byte, bit 24 of the scaled counter.
    do_test!(7, 0x00, 0x7fff_ff80, 0x00, 0x00ff_ffff);
    do_test!(7, 0x00, 0x8000_0000, 0x01, 0x0100_0000);
    do_test!(7, 0x01, 0xffff_ff80, 0x01, 0x01ff_ffff);
    do_test!(7, 0x01, 0x0000_0000, 0x02, 0x0200_0000);
    do_test!(7, 0x02, 0x0000_0080, 0x02, 0x0200_0001);
}

fn track_against_model<const EXP: u32>(steps: &[u32]) {
    let raw = Cell::new(0u32);
    let clock = TickClock::<_, EXP>::new(|| raw.get());

    let mut total_us = 0u64;
    let mut last = clock.ticks();
    assert_eq!(last, 0);

    for (i, &step) in steps.iter().cycle().take(steps.len() * 8).enumerate() {
        total_us += u64::from(step);
        raw.set(total_us as u32);

        let now = clock.ticks();
        assert_eq!(now, (total_us >> EXP) as u32, "step {}: {} us", i, total_us);
        assert!(now.wrapping_sub(last) as i32 >= 0, "step {} went backwards", i);
        last = now;
    }

    // Make sure the run actually crossed several counter wraps.
    assert!(total_us > 4 * (1u64 << 32));
}

#[test]
fn monotonic_across_counter_wraps() {
    let steps = [
        0,
        1,
        999,
        62_500,
        (1 << 31) - 1,
        16_000,
        1 << 30,
        123_456_789,
        (1 << 31) - 7,
        0,
        3,
    ];

    track_against_model::<1>(&steps);
    track_against_model::<3>(&steps);
    track_against_model::<6>(&steps);
    track_against_model::<7>(&steps);
}

#[test]
fn static_clock() {
    use std::sync::atomic::{AtomicU32, Ordering};

    static RAW: AtomicU32 = AtomicU32::new(0);

    fn raw_micros() -> u32 {
        RAW.load(Ordering::Relaxed)
    }

    static CLOCK: TickClock<fn() -> u32, 6> = TickClock::new(raw_micros as fn() -> u32);

    RAW.store(u32::MAX, Ordering::Relaxed);
    let before = CLOCK.ticks();
    RAW.store(64, Ordering::Relaxed);
    let after = CLOCK.ticks();

    assert_eq!(after.wrapping_sub(before), 2);
}
