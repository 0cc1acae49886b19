//! Bounded, steppable, monotonically increasing sequences.
//!
//! Two flavours are provided: [`Sequence`] for exclusive single-threaded use,
//! and [`AtomicSequence`] that can be advanced and read concurrently through
//! a shared reference.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use primitives_sequence_state::ValidationError;
use thiserror::Error;

mod atomic;
mod bounds;
mod params;
mod sequence;

pub use atomic::*;
pub use bounds::*;
pub use params::*;
pub use primitives_sequence_state::{OpaqueState, State, MAX_BOUND, MIN_BOUND};
pub use sequence::*;

/// The sequence error.
#[derive(Error, Debug)]
pub enum Error {
    /// The sequence is already configured and can not be configured again.
    #[error("cannot re-initialize a sequence")]
    AlreadyInitialized,
    /// The operation requires a configured sequence.
    #[error("sequence has not been initialized")]
    NotInitialized,
    /// The sequence has not handed out any value yet, or is past its range.
    #[error("sequence has not been started")]
    NotStarted,
    /// More positional parameters were passed than there are settings.
    #[error("too many arguments specified: got {0}, at most 3 are allowed")]
    TooManyArguments(usize),
    /// The bounds are inverted or out of the allowed range.
    #[error("invalid bounds: {0}")]
    InvalidBounds(ValidationError),
    /// The step is zero or larger than the lower bound.
    #[error("invalid step: {0}")]
    InvalidStep(ValidationError),
    /// A loaded state failed validation.
    #[error("invalid state: {0}")]
    InvalidState(ValidationError),
    /// The advanced value fell under the lower bound.
    #[error("reached minimum bound of the sequence: {value} is below {minvalue}")]
    BelowMinimum {
        /// The value the sequence is at.
        value: u64,
        /// The lower bound.
        minvalue: u64,
    },
    /// The advanced value went over the upper bound.
    #[error("reached maximum bound of the sequence: {value} is above {maxvalue}")]
    AboveMaximum {
        /// The value the sequence is at.
        value: u64,
        /// The upper bound.
        maxvalue: u64,
    },
    /// The update would move the sequence backwards.
    #[error("cannot decrease monotonically increasing sequence from {current} to {value}")]
    NonMonotonic {
        /// The value the sequence is at.
        current: u64,
        /// The rejected value.
        value: u64,
    },
    /// The state payload is missing a field or is not well-formed.
    #[error("improperly formatted sequence state: {0}")]
    MalformedState(#[source] serde_json::Error),
    /// The state could not be encoded.
    #[error("unable to encode sequence state: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ZeroStep | ValidationError::StepAboveMinimum { .. } => {
                Self::InvalidStep(err)
            }
            ValidationError::InvertedBounds { .. } | ValidationError::OutOfRange { .. } => {
                Self::InvalidBounds(err)
            }
            ValidationError::BeforeStart { .. } => Self::InvalidState(err),
        }
    }
}

/// How much a loaded state is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Take the decoded fields as they are.
    #[default]
    Trusted,
    /// Run the initialization checks on the decoded fields before accepting
    /// them.
    Validated,
}

/// Decode the state payload, validating it if the mode asks for it.
fn decode_state(data: &[u8], mode: LoadMode) -> Result<State, Error> {
    let state = State::decode(data).map_err(Error::MalformedState)?;
    if mode == LoadMode::Validated {
        state.validate()?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn validation_errors_map_to_kinds() {
        assert_matches!(
            Error::from(ValidationError::ZeroStep),
            Error::InvalidStep(ValidationError::ZeroStep)
        );
        assert_matches!(
            Error::from(ValidationError::StepAboveMinimum {
                step: 2,
                minvalue: 1
            }),
            Error::InvalidStep(_)
        );
        assert_matches!(
            Error::from(ValidationError::InvertedBounds {
                minvalue: 2,
                maxvalue: 1
            }),
            Error::InvalidBounds(_)
        );
        assert_matches!(
            Error::from(ValidationError::OutOfRange {
                minvalue: 0,
                maxvalue: 1
            }),
            Error::InvalidBounds(_)
        );
        assert_matches!(
            Error::from(ValidationError::BeforeStart {
                current: 0,
                pre_start: 1
            }),
            Error::InvalidState(_)
        );
    }

    #[test]
    fn decode_state_modes() {
        let data = br#"{"current":0,"increment":3,"maxvalue":10,"minvalue":1}"#;

        assert_eq!(decode_state(data, LoadMode::Trusted).unwrap().increment, 3);
        assert_matches!(
            decode_state(data, LoadMode::Validated),
            Err(Error::InvalidStep(ValidationError::StepAboveMinimum {
                step: 3,
                minvalue: 1
            }))
        );
        assert_matches!(
            decode_state(b"{}", LoadMode::Trusted),
            Err(Error::MalformedState(_))
        );
    }
}
