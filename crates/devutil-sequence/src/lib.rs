//! Sequence development utilities.

pub use primitives_sequence_state::OpaqueState;
pub use sequence::{Error, LoadMode, Params, Sequence};
use tracing::{info, warn};

/// The input required to run the sequence devutil.
#[derive(Debug, Default)]
pub struct Input {
    /// The parameters to configure a fresh sequence with.
    pub params: Params,
    /// A previously dumped state to resume from, takes precedence over
    /// the `params`.
    pub state: Option<OpaqueState>,
    /// How to treat the dumped state.
    pub load_mode: LoadMode,
    /// The amount of values to draw.
    pub count: u64,
}

/// The output produced from this utility.
#[derive(Debug)]
pub struct Output {
    /// The values drawn from the sequence, stops early if the sequence is
    /// exhausted.
    pub values: Vec<u64>,
    /// The human readable representation of the sequence afterwards.
    pub description: String,
    /// The dumped state afterwards, if the sequence is started.
    pub state: Option<OpaqueState>,
}

/// Run the sequence devutil logic, producing an output for a given input.
pub fn make(input: Input) -> Result<Output, anyhow::Error> {
    let Input {
        params,
        state,
        load_mode,
        count,
    } = input;

    let mut seq = match state {
        Some(state) => Sequence::from_state(&state, load_mode)?,
        None => Sequence::with_params(params)?,
    };

    let mut values = Vec::new();
    for _ in 0..count {
        match seq.advance() {
            Ok(value) => values.push(value),
            Err(err @ (Error::AboveMaximum { .. } | Error::BelowMinimum { .. })) => {
                warn!(message = "Stopped drawing values", drawn = values.len(), %err);
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let state = match seq.dump() {
        Ok(state) => Some(state),
        Err(Error::NotStarted) => None,
        Err(err) => return Err(err.into()),
    };

    info!(message = "Sequence devutil done", %seq);

    Ok(Output {
        values,
        description: seq.to_string(),
        state,
    })
}
