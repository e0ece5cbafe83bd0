use thiserror::Error;

/// This is the error type for the fallible edges of the deck_calc
/// library: reading and writing saved calculators and waiting on
/// background work. The probability core itself never fails.
#[derive(Error, Debug)]
pub enum DeckCalcError {
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[cfg(feature = "serde")]
    #[error("Unable to read or write the saved calculator: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
    #[error("Background computation stopped before reporting a result")]
    WorkerLost,
}
