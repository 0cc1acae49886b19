//! Sequence configuration parameters.

use primitives_sequence_state::{validate_bounds, MAX_BOUND, MIN_BOUND};
use serde::{Deserialize, Serialize};

use crate::{Bounds, Error};

/// The parameters to configure a sequence with.
///
/// Every field is optional, the defaults describe a sequence counting by one
/// from [`MIN_BOUND`] to [`MAX_BOUND`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// The amount to add on every advance, `1` if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u64>,
    /// The inclusive lower bound, [`MIN_BOUND`] if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minvalue: Option<u64>,
    /// The inclusive upper bound, [`MAX_BOUND`] if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxvalue: Option<u64>,
}

impl Params {
    /// Set the step.
    pub fn with_step(mut self, step: u64) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the lower bound.
    pub fn with_minvalue(mut self, minvalue: u64) -> Self {
        self.minvalue = Some(minvalue);
        self
    }

    /// Set the upper bound.
    pub fn with_maxvalue(mut self, maxvalue: u64) -> Self {
        self.maxvalue = Some(maxvalue);
        self
    }

    /// Interpret positional parameters by their count:
    ///
    /// - `[]` counts by one from [`MIN_BOUND`] to [`MAX_BOUND`];
    /// - `[max]` counts by one from [`MIN_BOUND`] to `max`;
    /// - `[min, max]` counts by one from `min` to `max`;
    /// - `[min, max, step]` counts by `step` from `min` to `max`.
    ///
    /// Both ends of the range are inclusive.
    pub fn from_positional(params: &[u64]) -> Result<Self, Error> {
        let params = match *params {
            [] => Self::default(),
            [maxvalue] => Self::default().with_maxvalue(maxvalue),
            [minvalue, maxvalue] => Self::default()
                .with_minvalue(minvalue)
                .with_maxvalue(maxvalue),
            [minvalue, maxvalue, step] => Self::default()
                .with_minvalue(minvalue)
                .with_maxvalue(maxvalue)
                .with_step(step),
            _ => return Err(Error::TooManyArguments(params.len())),
        };
        Ok(params)
    }

    /// Fill in the defaults and validate the result.
    pub fn resolve(&self) -> Result<Bounds, Error> {
        let bounds = Bounds {
            increment: self.step.unwrap_or(1),
            minvalue: self.minvalue.unwrap_or(MIN_BOUND),
            maxvalue: self.maxvalue.unwrap_or(MAX_BOUND),
        };
        validate_bounds(bounds.increment, bounds.minvalue, bounds.maxvalue)?;
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use primitives_sequence_state::ValidationError;

    use super::*;

    fn resolve(params: &[u64]) -> Result<Bounds, Error> {
        Params::from_positional(params)?.resolve()
    }

    #[test]
    fn positional_defaults() {
        assert_eq!(
            resolve(&[]).unwrap(),
            Bounds {
                increment: 1,
                minvalue: 1,
                maxvalue: u64::MAX - 1,
            }
        );
    }

    #[test]
    fn positional_single_is_maxvalue() {
        assert_eq!(
            resolve(&[100]).unwrap(),
            Bounds {
                increment: 1,
                minvalue: 1,
                maxvalue: 100,
            }
        );
        assert_matches!(
            resolve(&[0]),
            Err(Error::InvalidBounds(ValidationError::InvertedBounds {
                minvalue: 1,
                maxvalue: 0
            }))
        );
    }

    #[test]
    fn positional_range() {
        assert_eq!(
            resolve(&[10, 100]).unwrap(),
            Bounds {
                increment: 1,
                minvalue: 10,
                maxvalue: 100,
            }
        );
        assert_matches!(resolve(&[100, 10]), Err(Error::InvalidBounds(_)));
        assert_matches!(
            resolve(&[0, 10]),
            Err(Error::InvalidBounds(ValidationError::OutOfRange { .. }))
        );
        assert_matches!(
            resolve(&[1, u64::MAX]),
            Err(Error::InvalidBounds(ValidationError::OutOfRange { .. }))
        );
    }

    #[test]
    fn positional_range_with_step() {
        assert_eq!(
            resolve(&[10, 100, 5]).unwrap(),
            Bounds {
                increment: 5,
                minvalue: 10,
                maxvalue: 100,
            }
        );
        assert_matches!(
            resolve(&[10, 100, 0]),
            Err(Error::InvalidStep(ValidationError::ZeroStep))
        );
        assert_matches!(
            resolve(&[1, 100, 2]),
            Err(Error::InvalidStep(ValidationError::StepAboveMinimum {
                step: 2,
                minvalue: 1
            }))
        );
    }

    #[test]
    fn positional_too_many() {
        assert_matches!(
            Params::from_positional(&[10, 100, 4, 20]),
            Err(Error::TooManyArguments(4))
        );
    }

    #[test]
    fn builder_matches_positional() {
        let built = Params::default()
            .with_step(2)
            .with_minvalue(2)
            .with_maxvalue(100);
        assert_eq!(built, Params::from_positional(&[2, 100, 2]).unwrap());
    }

    #[test]
    fn serde_parse() {
        let val = r#"{"minvalue": 10, "step": 5}"#;
        let val: Params = serde_json::from_str(val).unwrap();
        assert_eq!(val, Params::default().with_minvalue(10).with_step(5));

        let val: Params = serde_json::from_str("{}").unwrap();
        assert_eq!(val, Params::default());
    }

    #[test]
    fn serde_skips_unset_fields() {
        let val = Params::default().with_maxvalue(7);
        assert_eq!(serde_json::to_string(&val).unwrap(), r#"{"maxvalue":7}"#);
    }

    #[test]
    #[should_panic = "unknown field `increment`"]
    fn serde_parse_does_not_allow_unknown_fields() {
        let val = r#"{"increment": 5}"#;
        let _: Params = serde_json::from_str(val).unwrap();
    }
}
