//! Nested interrupt disable/enable bookkeeping.
//!
//! Real interrupts are only masked and unmasked by the outermost pair of a
//! nested sequence of disable/enable calls. [`IrqNesting`] keeps the count,
//! [`NestedIrqs`] and [`IrqGuard`] turn it into a scoped acquisition.

use core::ops::{Deref, DerefMut};

use critical_section::RestoreState;

/// Masks and unmasks the real CPU interrupts.
pub trait InterruptControl {
    /// Mask all interrupts. May be called while already masked.
    fn disable(&mut self);

    /// Unmask interrupts.
    fn enable(&mut self);
}

/// [`InterruptControl`] on top of the global [`critical_section`] implementation.
///
/// Holds a single restore token while interrupts are masked, repeated
/// `disable` calls keep the first one.
#[derive(Debug, Default)]
pub struct CriticalSectionInterrupts {
    restore: Option<RestoreState>,
}

impl CriticalSectionInterrupts {
    /// Create the backend with interrupts considered enabled.
    pub const fn new() -> Self {
        Self { restore: None }
    }

    /// True while this backend holds the critical section.
    pub fn is_masked(&self) -> bool {
        self.restore.is_some()
    }
}

impl InterruptControl for CriticalSectionInterrupts {
    fn disable(&mut self) {
        if self.restore.is_none() {
            // SAFETY: the token is stored and handed back exactly once in
            // `enable`, so acquire/release stay paired.
            self.restore = Some(unsafe { critical_section::acquire() });
        }
    }

    fn enable(&mut self) {
        if let Some(restore) = self.restore.take() {
            // SAFETY: `restore` came from the matching `acquire` in `disable`.
            unsafe { critical_section::release(restore) };
        }
    }
}

/// The nesting counter in front of an [`InterruptControl`].
///
/// Interrupts are physically enabled iff the level is 0.
#[derive(Debug)]
pub struct IrqNesting<I> {
    irq: I,
    level: usize,
}

impl<I: InterruptControl> IrqNesting<I> {
    /// Create a counter at level 0.
    pub const fn new(irq: I) -> Self {
        Self { irq, level: 0 }
    }

    /// Mask interrupts and enter one more nesting level.
    pub fn disable(&mut self) {
        self.irq.disable();
        self.level += 1;
    }

    /// Leave one nesting level.
    ///
    /// Returns true if this was the outermost level, in which case interrupts
    /// have been unmasked again. Must be paired with an earlier
    /// [`disable`](Self::disable).
    #[must_use]
    pub fn enable(&mut self) -> bool {
        debug_assert!(self.level > 0, "unbalanced interrupt enable");

        self.level -= 1;
        if self.level == 0 {
            self.irq.enable();
            true
        } else {
            false
        }
    }

    /// Current nesting level.
    pub fn level(&self) -> usize {
        self.level
    }

    /// True if interrupts are not masked by this counter.
    pub fn is_enabled(&self) -> bool {
        self.level == 0
    }

    /// The interrupt backend.
    pub fn interrupts(&self) -> &I {
        &self.irq
    }

    /// Release the interrupt backend.
    pub fn into_inner(self) -> I {
        self.irq
    }
}

/// Something with nested interrupt masking.
pub trait NestedIrqs {
    /// Mask interrupts, nestable.
    fn disable_irqs(&mut self);

    /// Undo one [`disable_irqs`](Self::disable_irqs).
    fn enable_irqs(&mut self);

    /// Mask interrupts until the returned guard is dropped.
    ///
    /// The guard dereferences to `self`, so guards nest.
    fn irq_guard(&mut self) -> IrqGuard<'_, Self>
    where
        Self: Sized,
    {
        IrqGuard::new(self)
    }

    /// Run `f` with interrupts masked.
    fn with_irqs_disabled<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut guard = self.irq_guard();
        f(&mut guard)
    }
}

/// Scoped interrupt masking, releases on drop.
pub struct IrqGuard<'a, T: NestedIrqs> {
    inner: &'a mut T,
}

impl<'a, T: NestedIrqs> IrqGuard<'a, T> {
    /// Mask interrupts on `inner` for the lifetime of the guard.
    pub fn new(inner: &'a mut T) -> Self {
        inner.disable_irqs();
        Self { inner }
    }
}

impl<T: NestedIrqs> Deref for IrqGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner
    }
}

impl<T: NestedIrqs> DerefMut for IrqGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner
    }
}

impl<T: NestedIrqs> Drop for IrqGuard<'_, T> {
    fn drop(&mut self) {
        self.inner.enable_irqs();
    }
}
