//! Line sources for the command listener
//!
//! The listener must be able to ask "is anything waiting?" without blocking,
//! and only then perform a blocking line read. [`StdinInput`] gets there by
//! moving the actual console read onto its own reader thread, which forwards
//! complete lines over a channel.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{self, BufRead};

/// A source of operator input lines
pub trait InputSource: Send + 'static {
    /// Non-blocking check for a waiting line
    fn has_pending(&mut self) -> bool;

    /// Blocking read of one line. `Ok(None)` once input is exhausted.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Lines from the process's standard input
pub struct StdinInput {
    lines: Receiver<io::Result<String>>,
}

impl StdinInput {
    /// Start the stdin reader thread
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = unbounded();
        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                tracing::debug!("stdin reached end of input");
            })?;
        Ok(Self { lines: rx })
    }
}

impl InputSource for StdinInput {
    fn has_pending(&mut self) -> bool {
        !self.lines.is_empty()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.lines.recv() {
            Ok(line) => line.map(Some),
            Err(_) => Ok(None),
        }
    }
}

/// Lines pushed in-process through a channel
pub struct ChannelInput {
    lines: Receiver<String>,
}

impl ChannelInput {
    /// Returns the sender that feeds this input
    pub fn new() -> (Sender<String>, Self) {
        let (tx, rx) = unbounded();
        (tx, Self { lines: rx })
    }
}

impl InputSource for ChannelInput {
    fn has_pending(&mut self) -> bool {
        !self.lines.is_empty()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.recv().ok())
    }
}
