//! Atomic sequence implementation, safe for concurrent use.

use core::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use primitives_sequence_state::{OpaqueState, State};
use tracing::{debug, trace, warn};

use crate::{decode_state, Bounds, Error, LoadMode, Params, Sequence};

/// A [`Sequence`] that can be advanced, updated, restarted and read through
/// a shared reference from many threads at once.
///
/// Configuration ([`AtomicSequence::init`], [`AtomicSequence::init_with`] and
/// [`AtomicSequence::load`]) takes `&mut self`, so it always happens before
/// the sequence is shared. After that the bounds never change and only the
/// position moves, each move being a single atomic transition.
#[derive(Debug, Default)]
pub struct AtomicSequence {
    /// The last value handed out.
    current: AtomicU64,
    /// The configuration, `None` until initialized.
    bounds: Option<Bounds>,
}

impl AtomicSequence {
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
        *self.current.get_mut() = bounds.pre_start()?;
        self.bounds = Some(bounds);

        debug!(
            message = "Atomic sequence initialized",
            increment = bounds.increment,
            minvalue = bounds.minvalue,
            maxvalue = bounds.maxvalue,
        );
        Ok(())
    }

    /// Advance the sequence and return the new value.
    ///
    /// The move and the value it produced are one atomic transition: no two
    /// callers ever get the same value, and the caller whose move crosses
    /// the upper bound is the one that gets the first error. The exhaustion
    /// is sticky, see [`Sequence::advance`].
    pub fn advance(&self) -> Result<u64, Error> {
        let bounds = self.bounds.ok_or(Error::NotInitialized)?;

        let previous = match self.current.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |current| Some(bounds.step_from(current)),
        ) {
            Ok(previous) | Err(previous) => previous,
        };
        let value = bounds.step_from(previous);

        if previous <= bounds.maxvalue && value > bounds.maxvalue {
            warn!(
                message = "Atomic sequence exhausted",
                current = value,
                maxvalue = bounds.maxvalue,
            );
        }

        bounds.check(value)
    }

    /// Reset the sequence to its unstarted position.
    pub fn restart(&self) -> Result<(), Error> {
        let bounds = self.bounds.ok_or(Error::NotInitialized)?;
        let pre_start = bounds.pre_start()?;
        self.current.store(pre_start, Ordering::Release);

        debug!(message = "Atomic sequence restarted", current = pre_start);
        Ok(())
    }

    /// Move the sequence to `value` directly.
    ///
    /// The comparison with the current position and the move are one atomic
    /// transition, so a concurrent advance is never undone. A sequence with
    /// a zero step has no direction and accepts any value.
    pub fn update(&self, value: u64) -> Result<(), Error> {
        let bounds = self.bounds.ok_or(Error::NotInitialized)?;

        let previous = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (bounds.increment == 0 || value >= current).then_some(value)
            })
            .map_err(|current| Error::NonMonotonic { current, value })?;

        trace!(message = "Atomic sequence updated", from = previous, to = value);
        Ok(())
    }

    /// The last value handed out.
    pub fn current(&self) -> Result<u64, Error> {
        let bounds = self.bounds.ok_or(Error::NotInitialized)?;
        let current = self.current.load(Ordering::Acquire);
        if !bounds.is_started(current) {
            return Err(Error::NotStarted);
        }
        Ok(current)
    }

    /// Whether the sequence is configured and has handed out values.
    pub fn is_started(&self) -> bool {
        self.bounds
            .is_some_and(|bounds| bounds.is_started(self.current.load(Ordering::Acquire)))
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

    /// The raw fields at this instant, regardless of whether the sequence is
    /// started.
    pub fn state(&self) -> State {
        self.bounds
            .unwrap_or_default()
            .state(self.current.load(Ordering::Acquire))
    }

    /// Encode the state of a started sequence.
    ///
    /// The position is read once, so the check and the encoded state agree.
    pub fn dump(&self) -> Result<OpaqueState, Error> {
        let bounds = self.bounds.ok_or(Error::NotStarted)?;
        let state = bounds.state(self.current.load(Ordering::Acquire));
        if !bounds.is_started(state.current) {
            return Err(Error::NotStarted);
        }
        state.encode().map_err(Error::Encode)
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
        *self.current.get_mut() = state.current;
        self.bounds = Some(Bounds::from(&state));

        debug!(message = "Atomic sequence loaded", ?state, ?mode);
        Ok(())
    }
}

impl fmt::Display for AtomicSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current.load(Ordering::Acquire);
        let started = self.bounds.is_some_and(|bounds| bounds.is_started(current));
        self.bounds
            .unwrap_or_default()
            .describe(f, started.then_some(current))
    }
}

impl From<Sequence> for AtomicSequence {
    fn from(seq: Sequence) -> Self {
        Self {
            current: AtomicU64::new(seq.current),
            bounds: seq.bounds,
        }
    }
}

impl From<AtomicSequence> for Sequence {
    fn from(seq: AtomicSequence) -> Self {
        Self {
            current: seq.current.into_inner(),
            bounds: seq.bounds,
        }
    }
}
