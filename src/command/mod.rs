//! Operator command listener
//!
//! A background thread watches operator input for the lifetime of the
//! session. Input is only read while the measurement is updating; before
//! that, waiting lines are discarded, and once the measurement has finished
//! the thread exits.
//!
//! Typed commands are handed over through a single slot: the listener holds
//! back further input until the measurement loop has taken the current
//! command with [`CommandReceiver::get_command`], so every command is
//! delivered exactly once.
//!
//! # Example
//!
//! ```ignore
//! let state = Arc::new(MeasurementState::new());
//! let mut commands = CommandReceiver::new(Arc::clone(&state), Box::new(StdinInput::spawn()?));
//! commands.initialize()?;
//!
//! state.set_step(MeasurementStep::UPDATE);
//! loop {
//!     if commands.get_command().as_deref() == Some("stop") {
//!         break;
//!     }
//!     // measure...
//! }
//! state.set_step(MeasurementStep::END);
//! ```

pub mod input;

pub use input::{ChannelInput, InputSource, StdinInput};

use crate::config::DEFAULT_POLL_INTERVAL_MS;
use crate::error::Result;
use crate::state::MeasurementState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

type CommandSlot = Arc<Mutex<Option<String>>>;

fn lock_slot(slot: &Mutex<Option<String>>) -> MutexGuard<'_, Option<String>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Receives operator commands on a background thread
pub struct CommandReceiver {
    state: Arc<MeasurementState>,
    slot: CommandSlot,
    poll_interval: Duration,
    input: Option<Box<dyn InputSource>>,
    handle: Option<JoinHandle<()>>,
}

impl CommandReceiver {
    pub fn new(state: Arc<MeasurementState>, input: Box<dyn InputSource>) -> Self {
        Self {
            state,
            slot: Arc::new(Mutex::new(None)),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            input: Some(input),
            handle: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Start the listener thread. Only the first call has an effect.
    pub fn initialize(&mut self) -> Result<()> {
        let Some(input) = self.input.take() else {
            tracing::warn!("Command listener already initialized");
            return Ok(());
        };

        let listener = Listener {
            input,
            state: Arc::clone(&self.state),
            slot: Arc::clone(&self.slot),
            poll_interval: self.poll_interval,
        };

        let handle = std::thread::Builder::new()
            .name("command-listener".to_string())
            .spawn(move || listener.run())?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Take the pending command, leaving the slot empty
    pub fn get_command(&self) -> Option<String> {
        lock_slot(&self.slot).take()
    }

    /// Whether the listener thread has been started and is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait up to `timeout` for the listener thread to exit.
    ///
    /// Returns true when the thread has exited (or was never started).
    pub fn join(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.handle = Some(handle);
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }

        if handle.join().is_err() {
            tracing::error!("Command listener panicked");
        }
        true
    }
}

/// State owned by the listener thread
struct Listener {
    input: Box<dyn InputSource>,
    state: Arc<MeasurementState>,
    slot: CommandSlot,
    poll_interval: Duration,
}

impl Listener {
    fn run(mut self) {
        tracing::debug!("Command listener started");
        let mut input_open = true;

        while !self.state.has_finished() {
            if input_open && self.input.has_pending() {
                input_open = if self.state.is_measuring() {
                    self.receive()
                } else {
                    self.discard()
                };
            }
            std::thread::sleep(self.poll_interval);
        }

        tracing::debug!("Command listener stopped");
    }

    /// Read one command and wait for it to be taken. Returns false when the
    /// input is exhausted.
    fn receive(&mut self) -> bool {
        let line = match self.input.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("Command input closed");
                return false;
            }
            Err(e) => {
                tracing::debug!("Discarding unreadable command input: {}", e);
                return true;
            }
        };

        let command = line.trim();
        if command.is_empty() {
            return true;
        }

        *lock_slot(&self.slot) = Some(command.to_string());
        tracing::info!("command: {}", command);

        while lock_slot(&self.slot).is_some() && !self.state.has_finished() {
            std::thread::sleep(self.poll_interval);
        }
        true
    }

    fn discard(&mut self) -> bool {
        match self.input.read_line() {
            Ok(Some(line)) => {
                tracing::debug!("Ignoring input outside the measurement: {:?}", line);
                true
            }
            Ok(None) => false,
            Err(_) => true,
        }
    }
}
