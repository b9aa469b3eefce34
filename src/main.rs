use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use waveq::convert::Converter;
use waveq::float::{self, FloatFormat};
use waveq::formatting::ValueFormat;
use waveq::load::{vcd::VcdLoader, WaveformLoader};
use waveq::WaveformDocument;

/// Inspect VCD waveform traces from the command line.
#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List signals declared in a waveform file
    Signals {
        input: PathBuf,

        /// Only list signals whose full path matches this pattern
        pattern: Option<String>,

        /// Interpret the pattern as a regular expression
        #[clap(long)]
        regex: bool,
    },

    /// Print the recorded time range
    Range { input: PathBuf },

    /// Print value changes of selected signals within a time window
    Values {
        input: PathBuf,

        /// Full hierarchical signal paths
        #[clap(required = true)]
        signals: Vec<String>,

        /// Start of the time window, in document time units
        #[clap(short, long, default_value = "0")]
        start: u64,

        /// End of the time window; defaults to the last recorded timestamp
        #[clap(short, long)]
        end: Option<u64>,

        /// Output format: bin, hex or dec
        #[clap(short, long, default_value = "bin")]
        format: String,
    },

    /// Decode an IEEE 754 bit pattern into a number
    Decode {
        bits: String,

        /// Float format: float32, float16 or bfloat16
        #[clap(short, long, default_value = "float32")]
        format: String,

        /// Input is a binary string instead of hex
        #[clap(long)]
        binary: bool,
    },

    /// Encode a number into an IEEE 754 bit pattern
    Encode {
        value: f64,

        /// Float format: float32, float16 or bfloat16
        #[clap(short, long, default_value = "float32")]
        format: String,

        /// Emit a binary string instead of hex
        #[clap(long)]
        binary: bool,
    },

    /// Convert a proprietary waveform database to VCD with the external tool
    Convert {
        input: PathBuf,
        output: Option<PathBuf>,
    },
}

fn load(input: &Path) -> Result<WaveformDocument> {
    // an FST reader would dispatch here on extension; only VCD is built in
    match input.extension().and_then(|e| e.to_str()) {
        Some("vcd") => Ok(VcdLoader::new().load_waveform(input)?),
        _ => bail!("unsupported file format: '{}'", input.display()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    match opts.command {
        Cmd::Signals {
            input,
            pattern,
            regex,
        } => {
            let doc = load(&input)?;
            for sig in doc.list_signals(pattern.as_deref(), regex)? {
                println!("{:<40} kind={:<9} width={}", sig.path, sig.kind, sig.width);
            }
        }

        Cmd::Range { input } => {
            let doc = load(&input)?;
            let (min, max) = doc.time_range();
            match doc.timescale() {
                Some(ts) => println!("{} to {} (timescale {})", min, max, ts),
                None => println!("{} to {}", min, max),
            }
        }

        Cmd::Values {
            input,
            signals,
            start,
            end,
            format,
        } => {
            let doc = load(&input)?;
            let format: ValueFormat = format.parse()?;
            let end = end.unwrap_or_else(|| doc.time_range().1);

            let reply = doc.signal_values(&signals, start, end, format);

            for name in &reply.not_found {
                eprintln!("error: {}", waveq::Error::SignalNotFound(name.clone()));
            }
            for warning in &reply.warnings {
                eprintln!("warning: {}", warning);
            }
            for window in &reply.signals {
                println!("{}:", window.path);
                for (t, v) in &window.values {
                    println!("  {:>10}: {}", t, v);
                }
            }
        }

        Cmd::Decode {
            bits,
            format,
            binary,
        } => {
            let format: FloatFormat = format.parse()?;
            let value = if binary {
                float::bin_to_float(&bits, format)?
            } else {
                float::hex_to_float(&bits, format)?
            };
            println!("{}", value);
        }

        Cmd::Encode {
            value,
            format,
            binary,
        } => {
            let format: FloatFormat = format.parse()?;
            let text = if binary {
                float::float_to_bin(value, format)
            } else {
                float::float_to_hex(value, format)
            };
            println!("{}", text);
        }

        Cmd::Convert { input, output } => {
            let path = Converter::new().convert_to_vcd(&input, output.as_deref())?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}
