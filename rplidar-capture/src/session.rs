//! Orchestrates one bounded capture or live-view run.
//!
//! ```text
//! Idle -> Connecting -> Streaming -> (Stopped | Expired | Failed)
//! ```
//!
//! The loop alternates "pull a frame from the source" and "push it to
//! the sink". The stop flag is observed between frames only, so a frame
//! is never half-written.

use crate::error::CaptureError;
use crate::sink::Sink;
use crate::source::{FramePoll, SampleSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    /// Explicit stop request or source exhaustion.
    Stopped,
    /// Configured duration elapsed.
    Expired,
    Failed,
}

/// Cooperative cancellation flag, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What a finished session did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub state: SessionState,
    pub frames: u64,
    pub samples: u64,
    pub elapsed: Duration,
}

pub struct Session {
    state: SessionState,
    /// `None` = unbounded live view.
    duration: Option<Duration>,
    retry_budget: u32,
    stop: StopHandle,
}

impl Session {
    pub fn new(duration: Option<Duration>, retry_budget: u32) -> Session {
        Session {
            state: SessionState::Idle,
            duration,
            retry_budget,
            stop: StopHandle::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// A handle that makes `run` return `Stopped` at the next frame boundary.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Pulls frames from `source` into `sink` until a terminal transition.
    ///
    /// The sink is always given a chance to flush; a frame it accepted is
    /// either durable or the whole run errors.
    pub fn run(
        &mut self,
        source: &mut dyn SampleSource,
        sink: &mut dyn Sink,
    ) -> Result<SessionSummary, CaptureError> {
        self.state = SessionState::Connecting;
        let started = Instant::now();
        let mut frames: u64 = 0;
        let mut samples: u64 = 0;
        let mut consecutive_timeouts: u32 = 0;

        let outcome = loop {
            if self.stop.stop_requested() {
                break Ok(SessionState::Stopped);
            }
            match source.next_frame() {
                Err(e) => break Err(e),
                Ok(FramePoll::EndOfStream) => break Ok(SessionState::Stopped),
                Ok(FramePoll::TimedOut) => {
                    consecutive_timeouts += 1;
                    warn!(
                        "no frame within timeout ({}/{})",
                        consecutive_timeouts, self.retry_budget
                    );
                    if consecutive_timeouts >= self.retry_budget {
                        break Err(CaptureError::Timeout(consecutive_timeouts));
                    }
                }
                Ok(FramePoll::Frame(frame)) => {
                    consecutive_timeouts = 0;
                    if self.state == SessionState::Connecting {
                        self.state = SessionState::Streaming;
                        info!("first frame obtained, streaming");
                    }
                    if let Err(e) = sink.accept(&frame) {
                        break Err(e);
                    }
                    frames += 1;
                    samples += frame.len() as u64;
                    if let Some(duration) = self.duration {
                        if started.elapsed() >= duration {
                            break Ok(SessionState::Expired);
                        }
                    }
                }
            }
        };

        let finish_result = sink.finish();
        match outcome {
            Err(e) => {
                self.state = SessionState::Failed;
                if let Err(finish_err) = finish_result {
                    warn!("sink flush after failure also failed: {finish_err}");
                }
                Err(e)
            }
            Ok(_) if finish_result.is_err() => {
                // accepted frames could not be persisted
                self.state = SessionState::Failed;
                Err(finish_result.unwrap_err())
            }
            Ok(terminal) => {
                self.state = terminal;
                info!("session finished: {:?}, {} frames", terminal, frames);
                Ok(SessionSummary {
                    state: terminal,
                    frames,
                    samples,
                    elapsed: started.elapsed(),
                })
            }
        }
    }
}
