//! Wire format module - marker classification and the token reader.
//!
//! Implements the subset of the self-describing binary serialization
//! actually produced by the gaze engine. Decoding only; this crate never
//! encodes records.

mod marker;
mod reader;

pub use marker::{Marker, FLOAT64, MAP16, MAX_FIXSTR_LEN, UINT16};
pub use reader::WireReader;
