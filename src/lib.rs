//! # pupil-client
//!
//! Client for live pupil detection telemetry from Pupil Capture.
//!
//! Connects to the gaze engine over ZeroMQ, decodes its compact
//! self-describing binary records into typed [`PupilFrame`] values and
//! exposes them as a continuous, cancellable sequence.
//!
//! ## Architecture
//!
//! - **Control handshake** (REQ): a single `"SUB_PORT"` request discovers
//!   the ephemeral port on which the engine publishes telemetry
//! - **Telemetry** (SUB): multipart messages on the `"pupil"` topic, each
//!   carrying one binary record decoded into one frame
//!
//! ## Example
//!
//! ```ignore
//! use pupil_client::PupilCapture;
//!
//! #[tokio::main]
//! async fn main() -> pupil_client::Result<()> {
//!     let mut stream = PupilCapture::new().start();
//!     while let Some(frame) = stream.next_frame().await {
//!         let frame = frame?;
//!         println!("{} @ {}: {:?}", frame.method, frame.timestamp, frame.ellipse);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod frame;
pub mod geometry;
pub mod wire;

mod client;

pub use client::{CaptureStream, PupilCapture, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{PupilError, Result};
pub use frame::{PupilFrame, PUPIL_TOPIC};
pub use geometry::{Circle3d, Ellipse, Point2d, Point3d, Sphere};
