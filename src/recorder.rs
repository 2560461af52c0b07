// Bar-aligned audio capture session
//
// start() opens the capture sink, lets the transport run for an exact
// number of bars, then closes the sink. The transport always ends in the
// state it started in, and the session flag never leaks on failure.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::backend::{AudioClip, CaptureError, CaptureSink, Transport};

pub const BEATS_PER_BAR: u32 = 4;

/// Floor for the tempo used in duration math; transports are free to
/// report any bpm, including zero or NaN.
const MIN_BPM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Idle,
    Recording,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("a recording session is already running")]
    AlreadyRecording,
    #[error("engine is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Coordinates one timed capture at a time.
///
/// Cheap to clone; clones share the same session, so a handle can be held
/// across the capture wait while the engine itself stays mutable.
#[derive(Clone)]
pub struct Recorder {
    status: Rc<Cell<RecordStatus>>,
    initialized: Rc<Cell<bool>>,
    transport: Rc<RefCell<dyn Transport>>,
    sink: Rc<RefCell<dyn CaptureSink>>,
}

impl Recorder {
    pub fn new(
        initialized: Rc<Cell<bool>>,
        transport: Rc<RefCell<dyn Transport>>,
        sink: Rc<RefCell<dyn CaptureSink>>,
    ) -> Self {
        Self {
            status: Rc::new(Cell::new(RecordStatus::Idle)),
            initialized,
            transport,
            sink,
        }
    }

    pub fn status(&self) -> RecordStatus {
        self.status.get()
    }

    /// Exact capture length for a bar count at a tempo, 4 beats per bar.
    /// Non-finite or sub-1 bpm values clamp to 1 bpm so the result is
    /// always a finite duration.
    pub fn capture_duration(bpm: f64, bars: u32) -> Duration {
        let bpm = if bpm.is_finite() { bpm.max(MIN_BPM) } else { MIN_BPM };
        Duration::from_secs_f64(60.0 / bpm * f64::from(BEATS_PER_BAR) * f64::from(bars))
    }

    /// Record `bars` bars and return the encoded clip.
    ///
    /// Suspends for the capture duration; sequencing and user input keep
    /// interleaving while the wait is pending. There is no cancellation:
    /// the wait runs to completion even if the transport is stopped
    /// externally in the meantime.
    pub async fn start(&self, bars: u32) -> Result<AudioClip, RecordError> {
        if !self.initialized.get() {
            return Err(RecordError::NotInitialized);
        }
        if self.status.get() == RecordStatus::Recording {
            return Err(RecordError::AlreadyRecording);
        }

        let bpm = self.transport.borrow().bpm();
        let target = Self::capture_duration(bpm, bars);
        let was_running = self.transport.borrow().is_running();

        self.sink.borrow_mut().start()?;
        self.status.set(RecordStatus::Recording);
        if !was_running {
            self.transport.borrow_mut().start();
        }
        log::info!(
            "recording {} bars at {} bpm ({:.2}s)",
            bars,
            bpm,
            target.as_secs_f64()
        );

        // No borrow is held across this await; ticks and mutations run
        // freely underneath the pending wait.
        tokio::time::sleep(target).await;

        let stopped = self.sink.borrow_mut().stop();

        // Reset before surfacing anything: the session must never stay
        // flagged as recording, and the transport ends as it began.
        self.status.set(RecordStatus::Idle);
        if !was_running {
            self.transport.borrow_mut().stop();
        }

        let clip = stopped?;
        if clip.is_empty() {
            return Err(RecordError::Capture(CaptureError::Empty));
        }
        log::info!("capture complete: {} bytes", clip.data.len());
        Ok(clip)
    }
}
