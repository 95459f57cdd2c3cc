//! Gaze-engine client - control handshake, subscription and capture loop.
//!
//! [`PupilCapture`] configures the connection and [`PupilCapture::start`]
//! spawns the client worker, which:
//! 1. Connects a request socket to the control endpoint
//! 2. Sends `"SUB_PORT"` and parses the ephemeral subscribe port
//! 3. Releases the request socket
//! 4. Connects a subscribe socket and registers the `"pupil"` topic prefix
//! 5. Receives multipart messages, decodes records and emits frames
//!    until cancelled or a decode error terminates the sequence
//!
//! # Example
//!
//! ```ignore
//! use pupil_client::PupilCapture;
//!
//! #[tokio::main]
//! async fn main() -> pupil_client::Result<()> {
//!     let mut stream = PupilCapture::new().host("localhost").port(50020).start();
//!     while let Some(frame) = stream.next_frame().await {
//!         println!("confidence {}", frame?.confidence);
//!     }
//!     Ok(())
//! }
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use zeromq::{ReqSocket, Socket, SocketRecv, SocketSend, SubSocket, ZmqMessage};

use crate::error::{PupilError, Result};
use crate::frame::{PupilFrame, PUPIL_TOPIC};

/// Default host name of the control endpoint.
pub const DEFAULT_HOST: &str = "localhost";

/// Default control port of Pupil Remote.
pub const DEFAULT_PORT: u16 = 50020;

/// Command text requesting the active subscribe port.
const SUB_PORT_COMMAND: &str = "SUB_PORT";

/// Capacity of the frame output channel.
///
/// Frames are emitted strictly in receipt order; a full channel applies
/// backpressure to the worker rather than reordering or dropping. Queuing
/// policy under slow consumption belongs to the downstream host.
const FRAME_CHANNEL_CAPACITY: usize = 32;

/// Connection configuration for a capture client.
///
/// Use the fluent setters to override the defaults, then call
/// [`start`](Self::start) to begin the capture lifecycle.
#[derive(Debug, Clone)]
pub struct PupilCapture {
    host: String,
    port: u16,
}

impl PupilCapture {
    /// Create a configuration with the default control endpoint
    /// (`localhost:50020`).
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Set the host name of the gaze engine.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the control port of the gaze engine.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Start the capture worker and return the frame sequence.
    ///
    /// Each capture owns exactly one dedicated worker task performing the
    /// handshake and receive loop; the caller only observes emitted frames
    /// and the eventual completion or error of the sequence.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(self) -> CaptureStream {
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let worker_cancel = cancel.clone();
        let worker = tokio::spawn(async move {
            if let Err(e) = run_capture(&self.host, self.port, &frame_tx, worker_cancel).await {
                tracing::error!("capture terminated: {}", e);
                let _ = frame_tx.send(Err(e)).await;
            }
        });

        CaptureStream {
            frames: frame_rx,
            cancel,
            worker,
        }
    }
}

impl Default for PupilCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// A live, cancellable sequence of decoded pupil frames.
///
/// Completes without error after [`cancel`](Self::cancel) (or drop), and
/// with a terminal `Err` item if the handshake fails or a record cannot
/// be decoded. Also usable as a [`Stream`] of `Result<PupilFrame>`.
pub struct CaptureStream {
    frames: mpsc::Receiver<Result<PupilFrame>>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

impl CaptureStream {
    /// Receive the next frame, in network receipt order.
    ///
    /// Returns `None` once the sequence has completed.
    pub async fn next_frame(&mut self) -> Option<Result<PupilFrame>> {
        self.frames.recv().await
    }

    /// Signal cancellation to the capture worker.
    ///
    /// Cancellation is cooperative: the worker observes it at the receive
    /// call, completes the sequence without error and releases the
    /// subscribe socket.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the worker to release its sockets.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.frames.close();
        let _ = (&mut self.worker).await;
    }
}

impl Stream for CaptureStream {
    type Item = Result<PupilFrame>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.frames.poll_recv(cx)
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Handshake and receive loop, run on the capture worker.
async fn run_capture(
    host: &str,
    port: u16,
    frames: &mpsc::Sender<Result<PupilFrame>>,
    cancel: CancellationToken,
) -> Result<()> {
    let sub_port = request_sub_port(host, port).await?;
    tracing::debug!(host, port = sub_port, "discovered subscribe port");

    let mut subscribe = SubSocket::new();
    subscribe
        .connect(&format!("tcp://{}:{}", host, sub_port))
        .await?;
    subscribe.subscribe(PUPIL_TOPIC).await?;
    tracing::debug!(topic = PUPIL_TOPIC, "subscription registered");

    loop {
        let message = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            received = subscribe.recv() => received?,
        };

        // part 0: topic text, part 1: record payload
        if message.len() < 2 {
            tracing::trace!(parts = message.len(), "discarding short message");
            continue;
        }
        let Some(payload) = message.get(1) else {
            continue;
        };

        let frame = PupilFrame::from_record(payload)?;
        if frames.send(Ok(frame)).await.is_err() {
            // consumer dropped the sequence
            return Ok(());
        }
    }
}

/// Discover the ephemeral subscribe port via the control endpoint.
///
/// The request socket lives only for this exchange and is released on
/// every exit path, including the configuration error one.
async fn request_sub_port(host: &str, port: u16) -> Result<u16> {
    let mut request = ReqSocket::new();
    request.connect(&format!("tcp://{}:{}", host, port)).await?;
    request
        .send(ZmqMessage::from(SUB_PORT_COMMAND.to_string()))
        .await?;
    let reply = request.recv().await?;
    parse_sub_port(&reply)
}

/// Parse a control reply as a UTF-8 decimal port number.
fn parse_sub_port(reply: &ZmqMessage) -> Result<u16> {
    let payload = reply
        .get(0)
        .ok_or_else(|| PupilError::Configuration("missing control reply payload".to_string()))?;
    let text = std::str::from_utf8(payload).map_err(|_| {
        PupilError::Configuration("control reply is not UTF-8 text".to_string())
    })?;
    text.parse::<u16>().map_err(|_| {
        PupilError::Configuration(format!(
            "invalid subscribe port {:?} received from the control endpoint",
            text
        ))
    })
}
