use crate::data::{Signal, Timescale, ValueChange};
use crate::error::*;

/// A fully parsed waveform: signal table, per-signal change logs, the
/// declared timescale and the observed time bounds.
///
/// Built once by a loader and never mutated afterwards. A host serving
/// concurrent queries can share it behind an `Arc` and swap the reference
/// wholesale when a new file is loaded; in-flight readers keep their
/// stable snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformDocument {
    timescale: Option<Timescale>,
    signals: Vec<Signal>,
    changes: Vec<Vec<ValueChange>>,
    time_range: (u64, u64),
}

impl WaveformDocument {
    pub(crate) fn new(
        timescale: Option<Timescale>,
        signals: Vec<Signal>,
        changes: Vec<Vec<ValueChange>>,
        time_range: (u64, u64),
    ) -> Self {
        debug_assert_eq!(signals.len(), changes.len());

        Self {
            timescale,
            signals,
            changes,
            time_range,
        }
    }

    pub fn timescale(&self) -> Option<&Timescale> {
        self.timescale.as_ref()
    }

    /// All signals in declaration order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    /// Change log of the signal at `index`, sorted by construction.
    pub fn changes_of(&self, index: usize) -> &[ValueChange] {
        &self.changes[index]
    }

    pub fn index_of_path(&self, path: &str) -> Option<usize> {
        self.signals.iter().position(|s| s.path == path)
    }

    pub fn signal_by_path(&self, path: &str) -> Result<&Signal> {
        self.index_of_path(path)
            .map(|i| &self.signals[i])
            .ok_or_else(|| Error::SignalNotFound(path.to_string()))
    }

    /// Minimum and maximum observed timestamp. O(1).
    pub fn time_range(&self) -> (u64, u64) {
        self.time_range
    }
}
