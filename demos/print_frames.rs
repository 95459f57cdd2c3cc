//! Prints live pupil frames from a local Pupil Capture instance.
//!
//! Run Pupil Capture with Pupil Remote enabled on the default port, then:
//!
//! ```text
//! cargo run --example print_frames
//! ```

use pupil_client::PupilCapture;

#[tokio::main]
async fn main() -> pupil_client::Result<()> {
    tracing_subscriber::fmt::init();

    let mut stream = PupilCapture::new().start();
    while let Some(frame) = stream.next_frame().await {
        let frame = frame?;
        println!(
            "[{:.4}] id={} method={:?} confidence={:.2} diameter={:.1}px",
            frame.timestamp, frame.id, frame.method, frame.confidence, frame.diameter
        );
    }
    Ok(())
}
