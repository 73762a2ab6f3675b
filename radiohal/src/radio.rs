//! The radio HAL: pins, SPI, time and polled interrupts in one place.
//!
//! [`RadioHal`] is what a LoRa MAC layer talks to. Apart from the nested
//! interrupt handling and the DIO polling it is a thin pass-through to the
//! board: chip select with SPI transaction bracketing, the RX/TX antenna
//! switch, the reset line and single byte SPI transfers.

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, ErrorType, InputPin, OutputPin},
    spi::SpiBus,
};
use radiohal_time::{Deadlines, MicrosCounter};

#[cfg(feature = "defmt-03")]
use crate::defmt;
use crate::{
    dio::{DioPoller, RadioIrqHandler},
    error::{ConfigError, Error},
    irq::{InterruptControl, IrqNesting, NestedIrqs},
};

/// Requested state of the radio reset line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum RstLevel {
    /// Drive low, holding the radio in reset.
    Low,
    /// Drive high.
    High,
    /// Release the line, letting the radio's pull-up take over.
    Floating,
}

/// The radio reset line.
///
/// Unlike a plain output it has to be able to stop driving the line, so
/// implementations usually switch the pin direction.
pub trait ResetLine: ErrorType {
    /// Drive the line to `high`.
    fn drive(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Stop driving the line.
    fn float(&mut self) -> Result<(), Self::Error>;
}

/// Placeholder for a pin the board does not wire up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }
}

impl ResetLine for NoPin {
    fn drive(&mut self, _high: bool) -> Result<(), Infallible> {
        Ok(())
    }

    fn float(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// The pins wiring the MCU to the radio.
///
/// `None` marks an unused pin. DIO0 is mandatory, and with three or more
/// lines at least one of DIO1 (LoRa) and DIO2 (FSK) must be present.
pub struct RadioPins<NSS, RXTX, RST, DIO, const N: usize> {
    /// Chip select, active low.
    pub nss: NSS,
    /// RX/TX antenna switch, high for TX.
    pub rxtx: Option<RXTX>,
    /// Reset line.
    pub rst: Option<RST>,
    /// DIO interrupt lines, by index.
    pub dio: [Option<DIO>; N],
}

impl<NSS, RXTX, RST, DIO, const N: usize> RadioPins<NSS, RXTX, RST, DIO, N> {
    const _CHECK: () = assert!(N > 0, "At least DIO0 must be part of the pin map");

    /// Checks the pin preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::_CHECK;

        if self.dio[0].is_none() {
            return Err(ConfigError::Dio0Unset);
        }

        let optional = &self.dio[1..N.min(3)];
        if !optional.is_empty() && optional.iter().all(Option::is_none) {
            return Err(ConfigError::Dio1AndDio2Unset);
        }

        Ok(())
    }

    /// Number of DIO lines that are wired up.
    pub fn monitored(&self) -> usize {
        self.dio.iter().filter(|dio| dio.is_some()).count()
    }
}

/// Fatal failure hook that logs and then panics.
///
/// Pass it to [`RadioHal::new_or_fail`] when the board has no better
/// terminal action (halting in a loop, resetting).
pub fn halt(err: ConfigError) -> ! {
    error!("radio HAL configuration failed: {}", err);
    panic!("radio HAL configuration failed: {}", err)
}

/// The radio hardware abstraction.
///
/// Interrupt masking is nested through [`NestedIrqs`]; each time the
/// outermost level is re-enabled the DIO lines are polled and rising edges
/// are delivered to `H`.
pub struct RadioHal<SPI, NSS, RXTX, RST, DIO, C, D, I, H, const EXP: u32, const N: usize> {
    spi: SPI,
    pins: RadioPins<NSS, RXTX, RST, DIO, N>,
    deadlines: Deadlines<C, D, EXP>,
    irq: IrqNesting<I>,
    poller: DioPoller<N>,
    handler: H,
}

impl<SPI, NSS, RXTX, RST, DIO, C, D, I, H, const EXP: u32, const N: usize>
    RadioHal<SPI, NSS, RXTX, RST, DIO, C, D, I, H, EXP, N>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
    RXTX: OutputPin,
    RST: ResetLine,
    DIO: InputPin,
    C: MicrosCounter,
    D: DelayNs,
    I: InterruptControl,
    H: RadioIrqHandler,
{
    /// Validate the pin map and set up the HAL, leaving the radio deselected.
    ///
    /// The pins are expected to already be in the right mode, inputs for the
    /// DIO lines and outputs for the rest.
    pub fn new(
        mut pins: RadioPins<NSS, RXTX, RST, DIO, N>,
        spi: SPI,
        deadlines: Deadlines<C, D, EXP>,
        irq: I,
        handler: H,
    ) -> Result<Self, ConfigError> {
        pins.validate()?;
        pins.nss.set_high().map_err(|err| ConfigError::Nss(err.kind()))?;

        debug!(
            "radio HAL: {} of {} DIO lines monitored, {} us per tick",
            pins.monitored(),
            N,
            1u32 << EXP
        );

        Ok(Self {
            spi,
            pins,
            deadlines,
            irq: IrqNesting::new(irq),
            poller: DioPoller::new(),
            handler,
        })
    }

    /// Like [`new`](Self::new), but a configuration error is terminal.
    ///
    /// `on_failure` is called once with the violated precondition and does
    /// not return. [`halt`] is a ready-made hook, non-capturing closures that
    /// diverge work too.
    pub fn new_or_fail(
        pins: RadioPins<NSS, RXTX, RST, DIO, N>,
        spi: SPI,
        deadlines: Deadlines<C, D, EXP>,
        irq: I,
        handler: H,
        on_failure: fn(ConfigError) -> !,
    ) -> Self {
        match Self::new(pins, spi, deadlines, irq, handler) {
            Ok(hal) => hal,
            Err(err) => {
                error!("radio HAL init: {}", err);
                on_failure(err)
            }
        }
    }

    /// Drive chip select, `false` selects the radio.
    ///
    /// Selecting begins an SPI transaction, deselecting flushes the bus
    /// before the pin is released.
    pub fn pin_nss(&mut self, high: bool) -> Result<(), Error> {
        if high {
            self.spi.flush().map_err(Error::spi)?;
            self.pins.nss.set_high().map_err(Error::pin)
        } else {
            self.pins.nss.set_low().map_err(Error::pin)
        }
    }

    /// Drive the RX/TX switch, `true` for TX. No-op without a switch.
    pub fn pin_rxtx(&mut self, tx: bool) -> Result<(), Error> {
        match self.pins.rxtx.as_mut() {
            Some(pin) if tx => pin.set_high().map_err(Error::pin),
            Some(pin) => pin.set_low().map_err(Error::pin),
            None => Ok(()),
        }
    }

    /// Control the reset line. No-op without a reset line.
    pub fn pin_rst(&mut self, level: RstLevel) -> Result<(), Error> {
        let Some(rst) = self.pins.rst.as_mut() else {
            return Ok(());
        };

        let res = match level {
            RstLevel::Low => rst.drive(false),
            RstLevel::High => rst.drive(true),
            RstLevel::Floating => rst.float(),
        };

        res.map_err(Error::pin)
    }

    /// Full-duplex transfer of one byte, returns the byte clocked in.
    pub fn spi(&mut self, out: u8) -> Result<u8, Error> {
        let mut byte = [out];
        self.spi.transfer_in_place(&mut byte).map_err(Error::spi)?;

        Ok(byte[0])
    }

    /// Put the system into low-power mode until the next interrupt.
    ///
    /// Not implemented: this is a no-op, the run loop keeps polling.
    #[inline]
    pub fn sleep(&mut self) {
        self.deadlines.sleep();
    }

    /// Current time in ticks.
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.deadlines.ticks()
    }

    /// Ticks until `target`, negative once it passed.
    #[inline]
    pub fn delta(&self, target: u32) -> i32 {
        self.deadlines.delta(target)
    }

    /// Busy-wait until `target`.
    pub fn wait_until(&mut self, target: u32) {
        self.deadlines.wait_until(target)
    }

    /// True once `target` is reached.
    #[inline]
    pub fn check_deadline(&self, target: u32) -> bool {
        self.deadlines.check_deadline(target)
    }

    /// The time keeping part.
    pub fn deadlines(&mut self) -> &mut Deadlines<C, D, EXP> {
        &mut self.deadlines
    }

    /// Current interrupt nesting level, 0 when enabled.
    pub fn irq_level(&self) -> usize {
        self.irq.level()
    }

    /// Level of each DIO line at the last poll.
    pub fn dio_states(&self) -> &[bool; N] {
        self.poller.states()
    }

    /// The interrupt handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The interrupt handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Tear the HAL down into its parts.
    #[allow(clippy::type_complexity)]
    pub fn free(self) -> (RadioPins<NSS, RXTX, RST, DIO, N>, SPI, Deadlines<C, D, EXP>, I, H) {
        (
            self.pins,
            self.spi,
            self.deadlines,
            self.irq.into_inner(),
            self.handler,
        )
    }
}

impl<SPI, NSS, RXTX, RST, DIO, C, D, I, H, const EXP: u32, const N: usize> NestedIrqs
    for RadioHal<SPI, NSS, RXTX, RST, DIO, C, D, I, H, EXP, N>
where
    DIO: InputPin,
    I: InterruptControl,
    H: RadioIrqHandler,
{
    fn disable_irqs(&mut self) {
        self.irq.disable();
    }

    /// Leaves one nesting level; at the outermost level interrupts are
    /// unmasked and the DIO lines are polled.
    ///
    /// Polling here instead of in a pin interrupt keeps the handler, and the
    /// SPI traffic it causes, out of interrupt context. The run loop masks
    /// and unmasks interrupts on every iteration, so the lines are sampled at
    /// least once per iteration.
    fn enable_irqs(&mut self) {
        if self.irq.enable() {
            self.poller.poll(&mut self.pins.dio, &mut self.handler);
        }
    }
}
