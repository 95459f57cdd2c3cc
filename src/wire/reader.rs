//! Token reader with strict marker validation.
//!
//! [`WireReader`] reads self-describing tokens sequentially from a record
//! payload and returns strongly-typed values, failing immediately on any
//! marker the current read does not expect. There is no recovery once a
//! marker mismatch occurs: byte alignment is lost, so the error aborts
//! decoding of the entire record.
//!
//! # Example
//!
//! ```
//! use pupil_client::wire::WireReader;
//!
//! // fixstr "ok" followed by positive fixint 7
//! let mut reader = WireReader::new(&[0xa2, b'o', b'k', 0x07]);
//! assert_eq!(reader.read_str().unwrap(), "ok");
//! assert_eq!(reader.read_f64().unwrap(), 7.0);
//! ```

use super::marker::Marker;
use crate::error::{PupilError, Result};
use crate::geometry::{Circle3d, Ellipse, Point2d, Point3d, Sphere};

/// Sequential token reader over a single record payload.
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader over a complete record payload.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Consume exactly `len` bytes.
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(PupilError::Protocol(
                "unexpected end of record".to_string(),
            ));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read and classify the next marker byte.
    ///
    /// An exhausted payload is a protocol error: every typed read expects
    /// a marker to be present.
    pub fn read_marker(&mut self) -> Result<Marker> {
        let byte = self.take(1)?[0];
        Ok(Marker::from_byte(byte))
    }

    /// Classify the next marker byte without consuming it.
    ///
    /// Returns `None` when the payload is exhausted. Used by the record
    /// key loop, where end of input terminates the record without error.
    pub fn peek_marker(&self) -> Option<Marker> {
        self.data.get(self.pos).map(|&b| Marker::from_byte(b))
    }

    /// Expect the 16-bit-length map marker that opens a record.
    ///
    /// Returns the declared entry count, which the record loop does not
    /// use for control flow. A fixmap here is a marker mismatch: the
    /// record container is always map16 irrespective of field count.
    pub fn expect_map16(&mut self) -> Result<u16> {
        match self.read_marker()? {
            Marker::Map16 => {
                let bytes = self.take(2)?;
                Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
            }
            other => Err(PupilError::Protocol(format!(
                "expected map16 marker, found {:?}",
                other
            ))),
        }
    }

    /// Read a short raw string.
    ///
    /// Only the fixstr marker is accepted; the payload must be valid
    /// UTF-8. Returned as a zero-copy slice of the record payload.
    pub fn read_str(&mut self) -> Result<&'a str> {
        match self.read_marker()? {
            Marker::FixStr(len) => {
                let bytes = self.take(len)?;
                std::str::from_utf8(bytes)
                    .map_err(|_| PupilError::Protocol("invalid UTF-8 in string".to_string()))
            }
            other => Err(PupilError::Protocol(format!(
                "expected fixstr marker, found {:?}",
                other
            ))),
        }
    }

    /// Read a short raw string and require it to equal a literal.
    ///
    /// Used to validate constant fields such as the record topic.
    pub fn expect_str(&mut self, expected: &str) -> Result<()> {
        let value = self.read_str()?;
        if value != expected {
            return Err(PupilError::Protocol(format!(
                "expected string {:?}, found {:?}",
                expected, value
            )));
        }
        Ok(())
    }

    /// Read a double-precision value.
    ///
    /// Accepts a float64 marker or a positive fixint, since the engine
    /// compactly encodes small fraction-free values as integers.
    pub fn read_f64(&mut self) -> Result<f64> {
        match self.read_marker()? {
            Marker::Float64 => {
                let bytes = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Ok(f64::from_be_bytes(raw))
            }
            Marker::PosFixInt(value) => Ok(f64::from(value)),
            other => Err(PupilError::Protocol(format!(
                "expected float64 marker, found {:?}",
                other
            ))),
        }
    }

    /// Read a signed integer.
    ///
    /// Accepts a positive or negative fixint, or a uint16. Values carried
    /// in the uint16 form are plain magnitudes (0..=65535), never
    /// sign-extended.
    pub fn read_i32(&mut self) -> Result<i32> {
        match self.read_marker()? {
            Marker::PosFixInt(value) => Ok(i32::from(value)),
            Marker::NegFixInt(value) => Ok(i32::from(value)),
            Marker::UInt16 => {
                let bytes = self.take(2)?;
                Ok(i32::from(u16::from_be_bytes([bytes[0], bytes[1]])))
            }
            other => Err(PupilError::Protocol(format!(
                "expected integer marker, found {:?}",
                other
            ))),
        }
    }

    /// Read a 2D point encoded as a fixed-length array of two doubles.
    pub fn read_point2d(&mut self) -> Result<Point2d> {
        self.expect_fixarray()?;
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        Ok(Point2d::new(x, y))
    }

    /// Read a 3D point encoded as a fixed-length array of three doubles.
    pub fn read_point3d(&mut self) -> Result<Point3d> {
        self.expect_fixarray()?;
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        let z = self.read_f64()?;
        Ok(Point3d::new(x, y, z))
    }

    /// Read a sphere encoded as a fixmap of `center` and `radius`.
    ///
    /// Exactly the declared number of key/value pairs is read; which keys
    /// actually appear is not separately verified, so a map filling the
    /// declared count with a duplicate key leaves the omitted field at its
    /// default with no error. Any key outside the known set is a protocol
    /// error.
    pub fn read_sphere(&mut self) -> Result<Sphere> {
        self.expect_fixmap(2, "sphere")?;
        let mut sphere = Sphere::default();
        for _ in 0..2 {
            let key = self.read_str()?;
            match key {
                "center" => sphere.center = self.read_point3d()?,
                "radius" => sphere.radius = self.read_f64()?,
                other => {
                    return Err(PupilError::Protocol(format!(
                        "unrecognized key {:?} in sphere map",
                        other
                    )))
                }
            }
        }
        Ok(sphere)
    }

    /// Read an ellipse encoded as a fixmap of `center`, `angle` and `axes`.
    ///
    /// Same key-presence permissiveness as [`read_sphere`](Self::read_sphere).
    pub fn read_ellipse(&mut self) -> Result<Ellipse> {
        self.expect_fixmap(3, "ellipse")?;
        let mut ellipse = Ellipse::default();
        for _ in 0..3 {
            let key = self.read_str()?;
            match key {
                "center" => ellipse.center = self.read_point2d()?,
                "angle" => ellipse.angle = self.read_f64()?,
                "axes" => ellipse.axes = self.read_point2d()?,
                other => {
                    return Err(PupilError::Protocol(format!(
                        "unrecognized key {:?} in ellipse map",
                        other
                    )))
                }
            }
        }
        Ok(ellipse)
    }

    /// Read an oriented circle encoded as a fixmap of `center`, `radius`
    /// and `normal`.
    ///
    /// Same key-presence permissiveness as [`read_sphere`](Self::read_sphere).
    pub fn read_circle3d(&mut self) -> Result<Circle3d> {
        self.expect_fixmap(3, "circle")?;
        let mut circle = Circle3d::default();
        for _ in 0..3 {
            let key = self.read_str()?;
            match key {
                "center" => circle.center = self.read_point3d()?,
                "radius" => circle.radius = self.read_f64()?,
                "normal" => circle.normal = self.read_point3d()?,
                other => {
                    return Err(PupilError::Protocol(format!(
                        "unrecognized key {:?} in circle map",
                        other
                    )))
                }
            }
        }
        Ok(circle)
    }

    /// Expect a fixarray marker. The declared element count is not
    /// separately validated; the caller reads a fixed number of elements.
    fn expect_fixarray(&mut self) -> Result<()> {
        match self.read_marker()? {
            Marker::FixArray(_) => Ok(()),
            other => Err(PupilError::Protocol(format!(
                "expected fixarray marker, found {:?}",
                other
            ))),
        }
    }

    /// Expect a fixmap marker declaring exactly `expected` entries.
    fn expect_fixmap(&mut self, expected: usize, name: &str) -> Result<()> {
        match self.read_marker()? {
            Marker::FixMap(len) if len == expected => Ok(()),
            Marker::FixMap(len) => Err(PupilError::Protocol(format!(
                "{} map declares {} entries, expected {}",
                name, len, expected
            ))),
            other => Err(PupilError::Protocol(format!(
                "expected fixmap marker, found {:?}",
                other
            ))),
        }
    }
}
