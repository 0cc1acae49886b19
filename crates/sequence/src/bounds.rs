//! The resolved configuration shared by both sequence flavours.

use core::fmt;

use primitives_sequence_state::{State, ValidationError};

use crate::Error;

/// The step and the inclusive range of a configured sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    /// The amount added on every advance.
    pub increment: u64,
    /// The inclusive lower bound.
    pub minvalue: u64,
    /// The inclusive upper bound.
    pub maxvalue: u64,
}

impl Bounds {
    /// The position of a sequence that has not been advanced yet.
    ///
    /// Only fails for bounds that bypassed validation, where the position
    /// would underflow.
    pub fn pre_start(&self) -> Result<u64, Error> {
        self.minvalue.checked_sub(self.increment).ok_or(
            ValidationError::StepAboveMinimum {
                step: self.increment,
                minvalue: self.minvalue,
            }
            .into(),
        )
    }

    /// The position after advancing from `current`.
    ///
    /// An addition past the `u64` range parks the sequence at `u64::MAX`,
    /// which is always out of range for validated bounds.
    pub fn step_from(&self, current: u64) -> u64 {
        current.saturating_add(self.increment)
    }

    /// Check that a freshly advanced value is within the range.
    pub fn check(&self, value: u64) -> Result<u64, Error> {
        if value < self.minvalue {
            return Err(Error::BelowMinimum {
                value,
                minvalue: self.minvalue,
            });
        }
        if value > self.maxvalue {
            return Err(Error::AboveMaximum {
                value,
                maxvalue: self.maxvalue,
            });
        }
        Ok(value)
    }

    /// Whether a sequence at `current` has started handing out values.
    ///
    /// Note the upper bound is exclusive here: a sequence sitting exactly at
    /// `maxvalue` reports as not started.
    pub fn is_started(&self, current: u64) -> bool {
        current >= self.minvalue && current < self.maxvalue
    }

    /// Combine the bounds with a position into a persistable state.
    pub fn state(&self, current: u64) -> State {
        State {
            current,
            increment: self.increment,
            maxvalue: self.maxvalue,
            minvalue: self.minvalue,
        }
    }

    /// Write the human readable representation of a sequence at `current`,
    /// or of an unstarted one if `current` is `None`.
    pub(crate) fn describe(&self, f: &mut fmt::Formatter<'_>, current: Option<u64>) -> fmt::Result {
        match current {
            Some(current) => write!(f, "Sequence at {}, ", current)?,
            None => write!(f, "Unstarted Sequence ")?,
        }
        write!(
            f,
            "incremented by {} between {} and {}",
            self.increment, self.minvalue, self.maxvalue
        )
    }
}

impl From<&State> for Bounds {
    fn from(state: &State) -> Self {
        Self {
            increment: state.increment,
            minvalue: state.minvalue,
            maxvalue: state.maxvalue,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SAMPLE: Bounds = Bounds {
        increment: 5,
        minvalue: 10,
        maxvalue: 100,
    };

    #[test]
    fn pre_start() {
        assert_eq!(SAMPLE.pre_start().unwrap(), 5);

        let unchecked = Bounds {
            increment: 3,
            ..SAMPLE
        };
        assert_eq!(unchecked.pre_start().unwrap(), 7);

        let underflowing = Bounds {
            increment: 11,
            ..SAMPLE
        };
        assert_matches!(
            underflowing.pre_start(),
            Err(Error::InvalidStep(ValidationError::StepAboveMinimum {
                step: 11,
                minvalue: 10
            }))
        );
    }

    #[test]
    fn step_from_saturates() {
        assert_eq!(SAMPLE.step_from(5), 10);
        assert_eq!(SAMPLE.step_from(u64::MAX - 2), u64::MAX);
        assert_eq!(SAMPLE.step_from(u64::MAX), u64::MAX);
    }

    #[test]
    fn check() {
        assert_eq!(SAMPLE.check(10).unwrap(), 10);
        assert_eq!(SAMPLE.check(100).unwrap(), 100);
        assert_matches!(
            SAMPLE.check(9),
            Err(Error::BelowMinimum {
                value: 9,
                minvalue: 10
            })
        );
        assert_matches!(
            SAMPLE.check(101),
            Err(Error::AboveMaximum {
                value: 101,
                maxvalue: 100
            })
        );
    }

    #[test]
    fn is_started_upper_bound_is_exclusive() {
        assert!(!SAMPLE.is_started(5));
        assert!(!SAMPLE.is_started(9));
        assert!(SAMPLE.is_started(10));
        assert!(SAMPLE.is_started(99));
        assert!(!SAMPLE.is_started(100));
        assert!(!SAMPLE.is_started(105));
    }

    #[test]
    fn state_round_trips_through_bounds() {
        let state = SAMPLE.state(35);
        assert_eq!(
            state,
            State {
                current: 35,
                increment: 5,
                maxvalue: 100,
                minvalue: 10,
            }
        );
        assert_eq!(Bounds::from(&state), SAMPLE);
    }
}
