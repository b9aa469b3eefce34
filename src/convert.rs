use crate::error::*;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

pub const DEFAULT_TOOL: &str = "simvisdbutil";

/// Wrapper around the external waveform database converter. The tool is
/// treated as opaque: success means a VCD file exists at the output path
/// afterwards. Failures are surfaced, never retried.
pub struct Converter {
    tool: String,
}

impl Converter {
    pub fn new() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
        }
    }

    pub fn with_tool(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    /// Convert `input` to VCD. Without an explicit `output`, the result is
    /// placed next to the input with a `.vcd` extension. Returns the
    /// output path.
    pub fn convert_to_vcd(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        if !input.exists() {
            return Err(Error::FileAccess {
                path: input.display().to_string(),
                source: std::io::Error::new(ErrorKind::NotFound, "no such file"),
            });
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("vcd"));

        let run = Command::new(&self.tool)
            .arg(input)
            .arg("-VCD")
            .arg("-OUTPUT")
            .arg(&output)
            .arg("-OVERWRITE")
            .arg("-NOCOPYRIGHT")
            .output();

        let out = match run {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ConversionToolUnavailable(self.tool.clone()))
            }
            other => other?,
        };

        if !out.status.success() {
            return Err(Error::ConversionFailed {
                tool: self.tool.clone(),
                code: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        if !output.exists() {
            return Err(Error::ConversionFailed {
                tool: self.tool.clone(),
                code: out.status.code(),
                stderr: "tool reported success but produced no output file".to_string(),
            });
        }

        info!(input = %input.display(), output = %output.display(), "converted waveform to VCD");
        Ok(output)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
