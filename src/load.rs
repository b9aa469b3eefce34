pub mod vcd;

use crate::document::WaveformDocument;
use crate::error::*;

use std::path::Path;

/// Seam between file formats and the query layer. The built-in VCD loader
/// implements this; an FST reader backed by the native library plugs in as
/// a second implementation producing the same document shape.
pub trait WaveformLoader {
    fn load_waveform(&self, path: &Path) -> Result<WaveformDocument>;
}
