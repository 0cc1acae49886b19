//! Sequence implementation.

use core::fmt;

use primitives_sequence_state::{OpaqueState, State};
use tracing::{debug, trace, warn};

use crate::{decode_state, Bounds, Error, LoadMode, Params};

/// An increment-only bounded sequence, similar to a database sequence object.
///
/// A default-constructed sequence is unconfigured, it has to go through
/// [`Sequence::init`], [`Sequence::init_with`] or [`Sequence::load`] once
/// before it can be advanced.
///
/// All mutating operations take `&mut self`; share it behind a lock, or use
/// [`crate::AtomicSequence`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    /// The last value handed out.
    pub(crate) current: u64,
    /// The configuration, `None` until initialized.
    pub(crate) bounds: Option<Bounds>,
}

impl Sequence {
    /// Create a sequence configured from positional parameters,
    /// see [`Params::from_positional`].
    pub fn new(params: &[u64]) -> Result<Self, Error> {
        let mut seq = Self::default();
        seq.init(params)?;
        Ok(seq)
    }

    /// Create a sequence configured from the given parameters.
    pub fn with_params(params: Params) -> Result<Self, Error> {
        let mut seq = Self::default();
        seq.init_with(params)?;
        Ok(seq)
    }

    /// Create a sequence from a previously dumped state.
    pub fn from_state(data: &[u8], mode: LoadMode) -> Result<Self, Error> {
        let mut seq = Self::default();
        seq.load_with(data, mode)?;
        Ok(seq)
    }

    /// Configure the sequence from positional parameters,
    /// see [`Params::from_positional`].
    pub fn init(&mut self, params: &[u64]) -> Result<(), Error> {
        if self.bounds.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        self.init_with(Params::from_positional(params)?)
    }

    /// Configure the sequence.
    ///
    /// The sequence can only be configured once. Nothing is changed if
    /// the parameters are rejected.
    pub fn init_with(&mut self, params: Params) -> Result<(), Error> {
        if self.bounds.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let bounds = params.resolve()?;
        self.current = bounds.pre_start()?;
        self.bounds = Some(bounds);

        debug!(
            message = "Sequence initialized",
            increment = bounds.increment,
            minvalue = bounds.minvalue,
            maxvalue = bounds.maxvalue,
        );
        Ok(())
    }

    /// Advance the sequence and return the new value.
    ///
    /// Once the range is left the sequence stays out of range, and every
    /// subsequent call fails the same way until [`Sequence::restart`] or
    /// [`Sequence::update`].
    pub fn advance(&mut self) -> Result<u64, Error> {
        let bounds = self.bounds.ok_or(Error::NotInitialized)?;

        let previous = self.current;
        self.current = bounds.step_from(previous);

        if previous <= bounds.maxvalue && self.current > bounds.maxvalue {
            warn!(
                message = "Sequence exhausted",
                current = self.current,
                maxvalue = bounds.maxvalue,
            );
        }

        bounds.check(self.current)
    }

    /// Reset the sequence to its unstarted position.
    pub fn restart(&mut self) -> Result<(), Error> {
        let bounds = self.bounds.ok_or(Error::NotInitialized)?;
        self.current = bounds.pre_start()?;

        debug!(message = "Sequence restarted", current = self.current);
        Ok(())
    }

    /// Move the sequence to `value` directly.
    ///
    /// The value is not checked against the bounds, only against the
    /// direction of the sequence. A sequence with a zero step has no
    /// direction and accepts any value.
    pub fn update(&mut self, value: u64) -> Result<(), Error> {
        let bounds = self.bounds.ok_or(Error::NotInitialized)?;
        if bounds.increment > 0 && value < self.current {
            return Err(Error::NonMonotonic {
                current: self.current,
                value,
            });
        }

        trace!(message = "Sequence updated", from = self.current, to = value);
        self.current = value;
        Ok(())
    }

    /// The last value handed out.
    pub fn current(&self) -> Result<u64, Error> {
        if self.bounds.is_none() {
            return Err(Error::NotInitialized);
        }
        if !self.is_started() {
            return Err(Error::NotStarted);
        }
        Ok(self.current)
    }

    /// Whether the sequence is configured and has handed out values.
    pub fn is_started(&self) -> bool {
        self.bounds.is_some_and(|bounds| bounds.is_started(self.current))
    }

    /// Whether the sequence is configured.
    pub fn is_initialized(&self) -> bool {
        self.bounds.is_some()
    }

    /// The amount added on every advance, zero if unconfigured.
    pub fn increment(&self) -> u64 {
        self.bounds.unwrap_or_default().increment
    }

    /// The inclusive lower bound, zero if unconfigured.
    pub fn minvalue(&self) -> u64 {
        self.bounds.unwrap_or_default().minvalue
    }

    /// The inclusive upper bound, zero if unconfigured.
    pub fn maxvalue(&self) -> u64 {
        self.bounds.unwrap_or_default().maxvalue
    }

    /// The raw fields, regardless of whether the sequence is started.
    pub fn state(&self) -> State {
        self.bounds.unwrap_or_default().state(self.current)
    }

    /// Encode the state of a started sequence.
    pub fn dump(&self) -> Result<OpaqueState, Error> {
        if !self.is_started() {
            return Err(Error::NotStarted);
        }
        self.state().encode().map_err(Error::Encode)
    }

    /// Configure an unconfigured sequence from a dumped state, trusting the
    /// fields as they are.
    pub fn load(&mut self, data: &[u8]) -> Result<(), Error> {
        self.load_with(data, LoadMode::Trusted)
    }

    /// Configure an unconfigured sequence from a dumped state.
    pub fn load_with(&mut self, data: &[u8], mode: LoadMode) -> Result<(), Error> {
        if self.bounds.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let state = decode_state(data, mode)?;
        self.current = state.current;
        self.bounds = Some(Bounds::from(&state));

        debug!(message = "Sequence loaded", ?state, ?mode);
        Ok(())
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.is_started().then_some(self.current);
        self.bounds.unwrap_or_default().describe(f, current)
    }
}
