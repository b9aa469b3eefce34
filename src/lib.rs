pub mod convert;
pub mod data;
pub mod document;
pub mod error;
pub mod float;
pub mod formatting;
pub mod load;
pub mod query;

pub use document::WaveformDocument;
pub use error::{Error, Result};
