//! Marker byte classification for the wire format.
//!
//! Every value on the wire is prefixed by a single marker byte identifying
//! its type and, for fixed-size containers and strings, its declared
//! length. Only the subset of markers actually produced by the gaze engine
//! is recognized:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────────────────────┐
//! │ Byte range   │ Marker       │ Payload                      │
//! ├──────────────┼──────────────┼──────────────────────────────┤
//! │ 0x00..=0x7f  │ PosFixInt    │ none (value in marker)       │
//! │ 0x80..=0x8f  │ FixMap       │ 2×len values                 │
//! │ 0x90..=0x9f  │ FixArray     │ len values                   │
//! │ 0xa0..=0xbf  │ FixStr       │ len bytes UTF-8              │
//! │ 0xcb         │ Float64      │ 8 bytes BE                   │
//! │ 0xcd         │ UInt16       │ 2 bytes BE                   │
//! │ 0xde         │ Map16        │ 2-byte BE entry count        │
//! │ 0xe0..=0xff  │ NegFixInt    │ none (value in marker)       │
//! └──────────────┴──────────────┴──────────────────────────────┘
//! ```
//!
//! Any other marker byte is [`Marker::Unsupported`] and is rejected
//! wherever a typed read encounters it.

/// Marker byte for a 64-bit float value.
pub const FLOAT64: u8 = 0xcb;

/// Marker byte for a 16-bit unsigned integer value.
pub const UINT16: u8 = 0xcd;

/// Marker byte for a map with a 16-bit entry count.
pub const MAP16: u8 = 0xde;

/// Maximum text length encodable as a fixstr.
pub const MAX_FIXSTR_LEN: usize = 31;

/// Classified marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Small non-negative integer embedded in the marker byte (0..=127).
    PosFixInt(u8),
    /// Small negative integer embedded in the marker byte (-32..=-1).
    NegFixInt(i8),
    /// Map with an embedded entry count (0..=15).
    FixMap(usize),
    /// Array with an embedded element count (0..=15).
    FixArray(usize),
    /// Short raw string with an embedded byte length (0..=31).
    FixStr(usize),
    /// 64-bit big-endian IEEE 754 float follows.
    Float64,
    /// 16-bit big-endian unsigned integer follows.
    UInt16,
    /// Map whose 16-bit big-endian entry count follows.
    Map16,
    /// Marker outside the supported subset.
    Unsupported(u8),
}

impl Marker {
    /// Classify a single marker byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00..=0x7f => Marker::PosFixInt(byte),
            0x80..=0x8f => Marker::FixMap((byte & 0x0f) as usize),
            0x90..=0x9f => Marker::FixArray((byte & 0x0f) as usize),
            0xa0..=0xbf => Marker::FixStr((byte & 0x1f) as usize),
            FLOAT64 => Marker::Float64,
            UINT16 => Marker::UInt16,
            MAP16 => Marker::Map16,
            0xe0..=0xff => Marker::NegFixInt(byte as i8),
            other => Marker::Unsupported(other),
        }
    }

    /// Check whether this marker opens a short raw string.
    #[inline]
    pub fn is_fixstr(&self) -> bool {
        matches!(self, Marker::FixStr(_))
    }
}
