//! Measurement step tracking
//!
//! The measurement thread is the only writer of the current step; the
//! command listener and the session read it from other threads to decide
//! whether input is expected and whether they should shut down.

use std::fmt;
use std::ops::BitOr;
use std::sync::atomic::{AtomicU8, Ordering};

/// A set of measurement steps.
///
/// Each named step is a single flag. Sets can be combined with [`union`]
/// (or `|`) and tested with [`intersects`], which is how the derived sets
/// [`MeasurementStep::MEASURING`] and [`MeasurementStep::AFTER_ALL`] are
/// queried.
///
/// [`union`]: MeasurementStep::union
/// [`intersects`]: MeasurementStep::intersects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeasurementStep(u8);

impl MeasurementStep {
    pub const READY: Self = Self(1 << 0);
    pub const START: Self = Self(1 << 1);
    pub const UPDATE: Self = Self(1 << 2);
    pub const FINISH_MEASURE: Self = Self(1 << 3);
    pub const END: Self = Self(1 << 4);
    pub const AFTER: Self = Self(1 << 5);

    /// Steps during which operator commands are accepted
    pub const MEASURING: Self = Self::UPDATE;

    /// Every step after the measurement loop has stopped
    pub const AFTER_ALL: Self = Self(Self::FINISH_MEASURE.0 | Self::END.0 | Self::AFTER.0);

    /// Single steps in their logical order
    pub const SEQUENCE: [Self; 6] = [
        Self::READY,
        Self::START,
        Self::UPDATE,
        Self::FINISH_MEASURE,
        Self::END,
        Self::AFTER,
    ];

    const NAMES: [&'static str; 6] = ["READY", "START", "UPDATE", "FINISH_MEASURE", "END", "AFTER"];

    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when the two sets share at least one step
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True when every step of `other` is in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the single steps contained in this set, in logical order
    pub fn iter(self) -> impl Iterator<Item = MeasurementStep> {
        Self::SEQUENCE.into_iter().filter(move |s| self.contains(*s))
    }

    fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for MeasurementStep {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for MeasurementStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        let mut first = true;
        for (step, name) in Self::SEQUENCE.iter().zip(Self::NAMES) {
            if self.contains(*step) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Current measurement step, readable from any thread.
#[derive(Debug)]
pub struct MeasurementState {
    current: AtomicU8,
}

impl Default for MeasurementState {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementState {
    /// A new state at [`MeasurementStep::READY`]
    pub fn new() -> Self {
        Self {
            current: AtomicU8::new(MeasurementStep::READY.bits()),
        }
    }

    /// Overwrite the current step. Transitions are not validated.
    pub fn set_step(&self, step: MeasurementStep) {
        let previous = MeasurementStep::from_bits(self.current.swap(step.bits(), Ordering::AcqRel));
        if previous != step {
            tracing::debug!("Measurement step {} -> {}", previous, step);
        }
    }

    pub fn current_step(&self) -> MeasurementStep {
        MeasurementStep::from_bits(self.current.load(Ordering::Acquire))
    }

    /// Whether the measurement loop is updating (operator input is expected)
    pub fn is_measuring(&self) -> bool {
        self.current_step().intersects(MeasurementStep::MEASURING)
    }

    /// Whether the measurement loop has stopped
    pub fn has_finished(&self) -> bool {
        self.current_step().intersects(MeasurementStep::AFTER_ALL)
    }
}
