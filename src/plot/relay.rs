//! Plot relay: owns the render worker and feeds it points

use super::buffer::ShareBuffer;
use super::window::WindowProcess;
use super::{PlotAgent, PlotLabel, PlotPoint};
use crate::config::PlotOptions;
use crate::error::{MeasureError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How long `close()` waits for the worker thread to wind down
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything a render worker receives when it starts
#[derive(Debug, Clone)]
pub struct RenderLink {
    /// Points appended by the relay; the worker is the only reader
    pub buffer: Arc<ShareBuffer>,
    /// Rendering options, fixed for the worker's lifetime
    pub options: PlotOptions,
    terminate: Arc<AtomicBool>,
}

impl RenderLink {
    /// Take all points appended since the last drain
    pub fn drain(&self) -> Vec<PlotPoint> {
        self.buffer.drain()
    }

    /// The relay asked the window to stop refreshing
    pub fn is_finished(&self) -> bool {
        self.buffer.is_finished()
    }

    /// The relay was closed; the worker must tear down now
    pub fn should_terminate(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }
}

/// The isolated consumer of plot points.
///
/// `run` is called once, on a dedicated thread, and should return promptly
/// once [`RenderLink::should_terminate`] is set. Returning at any other time
/// means the window went away on its own.
pub trait RenderWorker: Send + 'static {
    fn run(self: Box<Self>, link: RenderLink);
}

/// Lifecycle of the render worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    NotStarted,
    Running,
    Stopped,
}

enum Worker {
    NotStarted(Box<dyn RenderWorker>),
    Running {
        handle: JoinHandle<()>,
        buffer: Arc<ShareBuffer>,
        terminate: Arc<AtomicBool>,
    },
    /// `closed` is true when the relay itself terminated the worker
    Stopped { closed: bool },
}

/// Active plot agent backed by a render worker
pub struct PlotRelay {
    options: PlotOptions,
    worker: Worker,
}

impl PlotRelay {
    pub fn new(worker: Box<dyn RenderWorker>) -> Self {
        Self {
            options: PlotOptions::default(),
            worker: Worker::NotStarted(worker),
        }
    }

    /// A relay rendering in a plot window process of this executable.
    ///
    /// The executable's `main` must hand `plot-window` invocations to
    /// [`crate::viewer::run_if_requested`].
    pub fn window() -> Result<Self> {
        Ok(Self::new(Box::new(WindowProcess::current_exe()?)))
    }

    pub fn options(&self) -> &PlotOptions {
        &self.options
    }

    pub fn state(&self) -> RelayState {
        match &self.worker {
            Worker::NotStarted(_) => RelayState::NotStarted,
            Worker::Running { .. } => RelayState::Running,
            Worker::Stopped { .. } => RelayState::Stopped,
        }
    }

    /// Points queued but not yet taken by the worker
    pub fn pending_points(&self) -> usize {
        match &self.worker {
            Worker::Running { buffer, .. } => buffer.len(),
            _ => 0,
        }
    }
}

impl PlotAgent for PlotRelay {
    fn configure(&mut self, options: PlotOptions) -> Result<()> {
        if !matches!(self.worker, Worker::NotStarted(_)) {
            return Err(MeasureError::PlotAgent(
                "plot options must be set before the plot window starts".to_string(),
            ));
        }
        options.check().map_err(MeasureError::PlotAgent)?;
        self.options = options;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let worker = match std::mem::replace(&mut self.worker, Worker::Stopped { closed: true }) {
            Worker::NotStarted(worker) => worker,
            other => {
                self.worker = other;
                return Err(MeasureError::PlotAgent(
                    "the plot window has already been started".to_string(),
                ));
            }
        };

        let buffer = Arc::new(ShareBuffer::new());
        let terminate = Arc::new(AtomicBool::new(false));
        let link = RenderLink {
            buffer: Arc::clone(&buffer),
            options: self.options.clone(),
            terminate: Arc::clone(&terminate),
        };

        let handle = std::thread::Builder::new()
            .name("plot-relay".to_string())
            .spawn(move || worker.run(link))?;

        tracing::debug!("Plot window started with {:?}", self.options);
        self.worker = Worker::Running {
            handle,
            buffer,
            terminate,
        };
        Ok(())
    }

    fn plot(&self, x: f64, y: f64, label: PlotLabel) {
        if let Worker::Running { handle, buffer, .. } = &self.worker {
            if !handle.is_finished() {
                buffer.push(PlotPoint { x, y, label });
            }
        }
    }

    fn stop_renewal(&self) {
        if let Worker::Running { buffer, .. } = &self.worker {
            buffer.set_finished();
        }
    }

    fn close(&mut self) {
        if !matches!(self.worker, Worker::Running { .. }) {
            return;
        }
        let Worker::Running {
            handle,
            buffer,
            terminate,
        } = std::mem::replace(&mut self.worker, Worker::Stopped { closed: true })
        else {
            return;
        };
        if handle.is_finished() {
            // The window already went away on its own
            self.worker = Worker::Stopped { closed: false };
        }

        buffer.set_finished();
        terminate.store(true, Ordering::Release);

        let deadline = Instant::now() + CLOSE_TIMEOUT;
        while !handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        if handle.is_finished() {
            if handle.join().is_err() {
                tracing::warn!("Plot window worker panicked");
            }
        } else {
            tracing::warn!("Plot window worker did not stop within {:?}", CLOSE_TIMEOUT);
        }
        tracing::debug!("Plot window closed");
    }

    fn is_alive(&self) -> bool {
        matches!(&self.worker, Worker::Running { handle, .. } if !handle.is_finished())
    }

    fn is_forcibly_closed(&self) -> bool {
        match &self.worker {
            Worker::NotStarted(_) => false,
            Worker::Running { handle, .. } => handle.is_finished(),
            Worker::Stopped { closed } => !closed,
        }
    }
}

impl Drop for PlotRelay {
    fn drop(&mut self) {
        self.close();
    }
}
