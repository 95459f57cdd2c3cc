//! Pupil detection frames and record decoding.
//!
//! A [`PupilFrame`] is one decoded measurement event describing the
//! estimated eye/pupil state at a point in time. One frame is produced per
//! qualifying network message by [`PupilFrame::from_record`].
//!
//! Which fields are meaningfully populated depends on the upstream
//! detection method: 2D detections set `ellipse`, `diameter` and
//! `normalized_position`; 3D detections additionally set `sphere`,
//! `circle_3d`, `diameter_3d`, `theta`, `phi` and the model metadata.
//! Fields not written by a record keep their zero-value defaults; there is
//! no presence bitmap.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Circle3d, Ellipse, Point2d, Sphere};
use crate::wire::WireReader;

/// Topic literal identifying the pupil telemetry stream.
pub const PUPIL_TOPIC: &str = "pupil";

/// One decoded pupil detection event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PupilFrame {
    /// Detector/model index.
    pub id: i32,
    /// Identifier of the detection algorithm, e.g. a 2D or 3D variant tag.
    pub method: String,
    /// Device clock timestamp, in seconds.
    pub timestamp: f64,
    /// Detection confidence, nominally 0..1.
    pub confidence: f64,
    /// 3D eye-model index.
    pub model_id: i32,
    /// Device clock timestamp at which the 3D eye model was fit.
    pub model_birth_timestamp: f64,
    /// Confidence of the 3D eye-model fit.
    pub model_confidence: f64,
    /// Pupil center in image-normalized coordinates (0..1).
    pub normalized_position: Point2d,
    /// Pupil diameter in pixels (2D detections).
    pub diameter: f64,
    /// Pupil diameter in physical units (3D detections).
    pub diameter_3d: f64,
    /// Spherical gaze-direction angle.
    pub theta: f64,
    /// Spherical gaze-direction angle.
    pub phi: f64,
    /// Fitted eyeball sphere (3D detections).
    pub sphere: Sphere,
    /// Fitted pupil ellipse in image coordinates (2D detections).
    pub ellipse: Ellipse,
    /// Eyeball sphere projected into image coordinates.
    pub projected_sphere: Ellipse,
    /// Pupil circle in eye-model coordinates (3D detections).
    pub circle_3d: Circle3d,
}

impl PupilFrame {
    /// Decode one complete record payload into a frame.
    ///
    /// The record is always a map16 container irrespective of field count.
    /// After the container marker, keys are read while the next token is a
    /// short text token; the first non-text token or the end of the
    /// payload terminates the record without error (the declared map
    /// length never controls the loop). The `topic` field must decode to
    /// [`PUPIL_TOPIC`].
    ///
    /// # Errors
    ///
    /// Returns a protocol error on any marker mismatch, a wrong topic
    /// literal, or an unrecognized key inside a sub-structure. On error
    /// the frame under construction is discarded entirely; no partial
    /// frame is ever returned.
    pub fn from_record(payload: &[u8]) -> Result<PupilFrame> {
        let mut reader = WireReader::new(payload);
        reader.expect_map16()?;

        let mut builder = FrameBuilder::default();
        while reader.peek_marker().is_some_and(|marker| marker.is_fixstr()) {
            let key = reader.read_str()?;
            builder.apply(key, &mut reader)?;
        }
        Ok(builder.finish())
    }
}

/// Accumulates fields while a record decodes.
///
/// Yields the immutable frame only on full success; a decode error drops
/// the builder and with it everything accumulated so far.
#[derive(Debug, Default)]
struct FrameBuilder {
    frame: PupilFrame,
}

impl FrameBuilder {
    /// Dispatch one field by name into the matching decoder call.
    ///
    /// The name set is closed and known at design time. Unknown keys
    /// invoke no decoder and raise no error; there is no generic
    /// skip-value primitive, so well-formed records must contain only
    /// known keys.
    fn apply(&mut self, key: &str, reader: &mut WireReader<'_>) -> Result<()> {
        let frame = &mut self.frame;
        match key {
            "topic" => reader.expect_str(PUPIL_TOPIC)?,
            "id" => frame.id = reader.read_i32()?,
            "method" => frame.method = reader.read_str()?.to_owned(),
            "timestamp" => frame.timestamp = reader.read_f64()?,
            "confidence" => frame.confidence = reader.read_f64()?,
            "model_id" => frame.model_id = reader.read_i32()?,
            "model_birth_timestamp" => frame.model_birth_timestamp = reader.read_f64()?,
            "model_confidence" => frame.model_confidence = reader.read_f64()?,
            "norm_pos" => frame.normalized_position = reader.read_point2d()?,
            "diameter" => frame.diameter = reader.read_f64()?,
            "diameter_3d" => frame.diameter_3d = reader.read_f64()?,
            "theta" => frame.theta = reader.read_f64()?,
            "phi" => frame.phi = reader.read_f64()?,
            "sphere" => frame.sphere = reader.read_sphere()?,
            "ellipse" => frame.ellipse = reader.read_ellipse()?,
            "projected_sphere" => frame.projected_sphere = reader.read_ellipse()?,
            "circle_3d" => frame.circle_3d = reader.read_circle3d()?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> PupilFrame {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point2d, Point3d};

    struct RecordBuilder {
        buf: Vec<u8>,
        fields: u16,
    }

    /// Builds record payloads byte by byte for decode tests.
    impl RecordBuilder {
        fn new() -> Self {
            Self {
                buf: Vec::new(),
                fields: 0,
            }
        }

        fn key(mut self, name: &str) -> Self {
            self.push_str(name);
            self.fields += 1;
            self
        }

        fn str_field(mut self, name: &str, value: &str) -> Self {
            self = self.key(name);
            self.push_str(value);
            self
        }

        fn f64_field(mut self, name: &str, value: f64) -> Self {
            self = self.key(name);
            self.buf.push(0xcb);
            self.buf.extend_from_slice(&value.to_be_bytes());
            self
        }

        fn fixint_field(mut self, name: &str, value: u8) -> Self {
            self = self.key(name);
            self.buf.push(value);
            self
        }

        fn raw(mut self, bytes: &[u8]) -> Self {
            self.buf.extend_from_slice(bytes);
            self
        }

        fn push_str(&mut self, value: &str) {
            self.buf.push(0xa0 | value.len() as u8);
            self.buf.extend_from_slice(value.as_bytes());
        }

        /// Prepend the map16 container with the actual field count.
        fn build(self) -> Vec<u8> {
            let fields = self.fields;
            self.build_with_declared_count(fields)
        }

        fn build_with_declared_count(self, count: u16) -> Vec<u8> {
            let mut record = vec![0xde];
            record.extend_from_slice(&count.to_be_bytes());
            record.extend_from_slice(&self.buf);
            record
        }
    }

    fn f64_token(value: f64) -> Vec<u8> {
        let mut buf = vec![0xcb];
        buf.extend_from_slice(&value.to_be_bytes());
        buf
    }

    fn point2d_token(x: f64, y: f64) -> Vec<u8> {
        let mut buf = vec![0x92];
        buf.extend(f64_token(x));
        buf.extend(f64_token(y));
        buf
    }

    fn point3d_token(x: f64, y: f64, z: f64) -> Vec<u8> {
        let mut buf = vec![0x93];
        buf.extend(f64_token(x));
        buf.extend(f64_token(y));
        buf.extend(f64_token(z));
        buf
    }

    #[test]
    fn test_basic_record_with_zero_defaults() {
        let record = RecordBuilder::new()
            .str_field("topic", "pupil")
            .fixint_field("id", 5)
            .str_field("method", "3d c++")
            .f64_field("timestamp", 1.0)
            .f64_field("confidence", 0.9)
            .build();

        let frame = PupilFrame::from_record(&record).unwrap();
        assert_eq!(frame.id, 5);
        assert_eq!(frame.method, "3d c++");
        assert_eq!(frame.timestamp, 1.0);
        assert_eq!(frame.confidence, 0.9);

        // every unset field keeps its zero default
        assert_eq!(frame.model_id, 0);
        assert_eq!(frame.diameter, 0.0);
        assert_eq!(frame.normalized_position, Point2d::default());
        assert_eq!(frame.sphere, Sphere::default());
        assert_eq!(frame.ellipse, Ellipse::default());
        assert_eq!(frame.projected_sphere, Ellipse::default());
        assert_eq!(frame.circle_3d, Circle3d::default());
    }

    #[test]
    fn test_wrong_topic_is_protocol_error() {
        let record = RecordBuilder::new()
            .str_field("topic", "not-pupil")
            .build();

        let err = PupilFrame::from_record(&record).unwrap_err();
        assert!(err.to_string().contains("not-pupil"));
    }

    #[test]
    fn test_record_requires_map16_container() {
        // fixmap container must be rejected even though it is also a map
        let record = [0x81, 0xa5, b't', b'o', b'p', b'i', b'c', 0xa5, b'p', b'u', b'p', b'i', b'l'];
        assert!(PupilFrame::from_record(&record).is_err());
    }

    #[test]
    fn test_empty_record_yields_default_frame() {
        let record = RecordBuilder::new().build();
        let frame = PupilFrame::from_record(&record).unwrap();
        assert_eq!(frame, PupilFrame::default());
    }

    #[test]
    fn test_declared_count_does_not_control_loop() {
        // declared count of zero, fields still decoded until end of input
        let record = RecordBuilder::new()
            .fixint_field("id", 3)
            .build_with_declared_count(0);

        let frame = PupilFrame::from_record(&record).unwrap();
        assert_eq!(frame.id, 3);
    }

    #[test]
    fn test_loop_ends_at_first_non_text_token() {
        // trailing non-text token ends the record without error
        let record = RecordBuilder::new()
            .fixint_field("id", 9)
            .raw(&[0x05])
            .build();

        let frame = PupilFrame::from_record(&record).unwrap();
        assert_eq!(frame.id, 9);
    }

    #[test]
    fn test_full_3d_record() {
        let mut record = RecordBuilder::new()
            .str_field("topic", "pupil")
            .fixint_field("id", 1)
            .str_field("method", "pye3d 0.3.0 real-time")
            .f64_field("timestamp", 1234.5)
            .f64_field("confidence", 0.87)
            .fixint_field("model_id", 2)
            .f64_field("model_birth_timestamp", 1200.0)
            .f64_field("model_confidence", 0.95)
            .key("norm_pos")
            .raw(&point2d_token(0.4, 0.6))
            .f64_field("diameter", 42.0)
            .f64_field("diameter_3d", 3.1)
            .f64_field("theta", 1.4)
            .f64_field("phi", -1.2);

        record = record.key("sphere").raw(&{
            let mut buf = vec![0x82];
            buf.push(0xa6);
            buf.extend_from_slice(b"center");
            buf.extend(point3d_token(1.0, 2.0, 3.0));
            buf.push(0xa6);
            buf.extend_from_slice(b"radius");
            buf.extend(f64_token(12.0));
            buf
        });

        let ellipse_map = {
            let mut buf = vec![0x83];
            buf.push(0xa6);
            buf.extend_from_slice(b"center");
            buf.extend(point2d_token(200.0, 100.0));
            buf.push(0xa5);
            buf.extend_from_slice(b"angle");
            buf.extend(f64_token(30.0));
            buf.push(0xa4);
            buf.extend_from_slice(b"axes");
            buf.extend(point2d_token(50.0, 40.0));
            buf
        };
        record = record.key("ellipse").raw(&ellipse_map);
        record = record.key("projected_sphere").raw(&ellipse_map);

        record = record.key("circle_3d").raw(&{
            let mut buf = vec![0x83];
            buf.push(0xa6);
            buf.extend_from_slice(b"center");
            buf.extend(point3d_token(1.0, 1.5, 2.0));
            buf.push(0xa6);
            buf.extend_from_slice(b"radius");
            buf.extend(f64_token(2.5));
            buf.push(0xa6);
            buf.extend_from_slice(b"normal");
            buf.extend(point3d_token(0.0, 0.0, 1.0));
            buf
        });

        let frame = PupilFrame::from_record(&record.build()).unwrap();
        assert_eq!(frame.method, "pye3d 0.3.0 real-time");
        assert_eq!(frame.model_id, 2);
        assert_eq!(frame.normalized_position, Point2d::new(0.4, 0.6));
        assert_eq!(frame.theta, 1.4);
        assert_eq!(frame.phi, -1.2);
        assert_eq!(frame.sphere, Sphere::new(Point3d::new(1.0, 2.0, 3.0), 12.0));
        assert_eq!(frame.ellipse, frame.projected_sphere);
        assert_eq!(
            frame.circle_3d,
            Circle3d::new(Point3d::new(1.0, 1.5, 2.0), 2.5, Point3d::new(0.0, 0.0, 1.0))
        );
    }

    #[test]
    fn test_sub_structure_error_discards_whole_frame() {
        // valid fields first, then a sphere with an unknown key
        let record = RecordBuilder::new()
            .str_field("topic", "pupil")
            .fixint_field("id", 5)
            .key("sphere")
            .raw(&{
                let mut buf = vec![0x82];
                buf.push(0xa6);
                buf.extend_from_slice(b"middle");
                buf.extend(point3d_token(1.0, 2.0, 3.0));
                buf.push(0xa6);
                buf.extend_from_slice(b"radius");
                buf.extend(f64_token(1.0));
                buf
            })
            .build();

        let err = PupilFrame::from_record(&record).unwrap_err();
        assert!(err.to_string().contains("unrecognized key"));
    }

    #[test]
    fn test_id_from_uint16_magnitude() {
        let record = RecordBuilder::new()
            .key("id")
            .raw(&[0xcd, 0xd3, 0x2d]) // 54061
            .build();

        let frame = PupilFrame::from_record(&record).unwrap();
        assert_eq!(frame.id, 54061);
    }
}
