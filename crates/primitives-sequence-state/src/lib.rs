//! The persisted state of a sequence and its portable textual form.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The lowest value a sequence is allowed to hand out.
pub const MIN_BOUND: u64 = 1;

/// The highest value a sequence is allowed to hand out.
///
/// The top of the `u64` range is reserved and never reachable.
pub const MAX_BOUND: u64 = u64::MAX - 1;

/// The opaque encoded state, as produced by [`State::encode`].
pub type OpaqueState = Vec<u8>;

/// A snapshot of the four scalar fields of a sequence.
///
/// The field order is the lexical order of the keys, so the JSON encoding
/// always lists them as `current`, `increment`, `maxvalue`, `minvalue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// The last value handed out.
    pub current: u64,
    /// The amount added on every advance.
    pub increment: u64,
    /// The inclusive upper bound.
    pub maxvalue: u64,
    /// The inclusive lower bound.
    pub minvalue: u64,
}

/// The decoded form of a [`State`], a flat map of unsigned integers.
#[derive(Deserialize)]
struct Record {
    /// The known keys.
    #[serde(flatten)]
    state: State,
    /// Whatever else was in the map.
    #[serde(flatten)]
    #[allow(dead_code)]
    extra: BTreeMap<String, u64>,
}

/// The reasons a set of sequence fields can be inconsistent.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The step is zero, so the sequence would never move.
    #[error("the step must be non-zero")]
    ZeroStep,
    /// The upper bound is below the lower bound.
    #[error("the maximum value {maxvalue} is less than the minimum value {minvalue}")]
    InvertedBounds {
        /// The lower bound.
        minvalue: u64,
        /// The upper bound.
        maxvalue: u64,
    },
    /// Part of the range is outside of [`MIN_BOUND`]..=[`MAX_BOUND`].
    #[error("the range {minvalue}..={maxvalue} is out of bounds")]
    OutOfRange {
        /// The lower bound.
        minvalue: u64,
        /// The upper bound.
        maxvalue: u64,
    },
    /// The lower bound is smaller than the step, the pre-start position
    /// would underflow.
    #[error("the minimum value {minvalue} must be greater than or equal to the step {step}")]
    StepAboveMinimum {
        /// The step.
        step: u64,
        /// The lower bound.
        minvalue: u64,
    },
    /// The current value is before the pre-start position.
    #[error("the current value {current} is before the start position {pre_start}")]
    BeforeStart {
        /// The current value.
        current: u64,
        /// The pre-start position.
        pre_start: u64,
    },
}

/// Check the step and the bounds of a sequence for consistency.
///
/// The checks run in a fixed order: the zero step first, then the bounds
/// ordering, then the allowed range, and the step against the lower bound
/// last.
pub fn validate_bounds(step: u64, minvalue: u64, maxvalue: u64) -> Result<(), ValidationError> {
    if step == 0 {
        return Err(ValidationError::ZeroStep);
    }
    if maxvalue < minvalue {
        return Err(ValidationError::InvertedBounds { minvalue, maxvalue });
    }
    if minvalue < MIN_BOUND || maxvalue > MAX_BOUND {
        return Err(ValidationError::OutOfRange { minvalue, maxvalue });
    }
    if minvalue < step {
        return Err(ValidationError::StepAboveMinimum { step, minvalue });
    }
    Ok(())
}

impl State {
    /// The position of a sequence that has not been advanced yet.
    ///
    /// Saturates at zero for states that were never validated.
    pub fn pre_start(&self) -> u64 {
        self.minvalue.saturating_sub(self.increment)
    }

    /// Run the same checks initialization runs, plus ensure the current
    /// value is not before the pre-start position.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_bounds(self.increment, self.minvalue, self.maxvalue)?;

        let pre_start = self.pre_start();
        if self.current < pre_start {
            return Err(ValidationError::BeforeStart {
                current: self.current,
                pre_start,
            });
        }
        Ok(())
    }

    /// Encode the state into its textual form.
    pub fn encode(&self) -> Result<OpaqueState, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode the state from its textual form.
    ///
    /// All four keys must be present. Unknown keys are ignored as long as
    /// their values are unsigned integers too, anything else is rejected.
    /// No invariant checks are performed, see [`State::validate`].
    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        let record: Record = serde_json::from_slice(data)?;
        Ok(record.state)
    }
}

impl TryFrom<&[u8]> for State {
    type Error = serde_json::Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::decode(value)
    }
}
