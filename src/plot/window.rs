//! Plot window process
//!
//! The default render worker. It launches this executable again with the
//! `plot-window` subcommand and streams points to the child's stdin as JSON
//! lines, one [`WindowMessage`] per line. The child owns the GUI event loop
//! on its own main thread.

use super::relay::{RenderLink, RenderWorker};
use super::PlotPoint;
use crate::error::{MeasureError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;

/// Subcommand that runs the plot window
pub const PLOT_WINDOW_SUBCOMMAND: &str = "plot-window";

/// How often buffered points are forwarded to the window
const FORWARD_INTERVAL: Duration = Duration::from_millis(50);

/// One line on the window's stdin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowMessage {
    Point(PlotPoint),
    /// Stop refreshing; no more points follow
    Finished,
}

impl WindowMessage {
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Render worker that drives a plot window child process
#[derive(Debug, Clone)]
pub struct WindowProcess {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WindowProcess {
    /// Run `program args... --options <json>`
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The window subcommand of the running executable
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| {
            MeasureError::PlotAgent(format!("cannot locate the plot window executable: {}", e))
        })?;
        Ok(Self::new(exe, [PLOT_WINDOW_SUBCOMMAND]))
    }

    fn spawn(&self, link: &RenderLink) -> Result<Child> {
        let options = serde_json::to_string(&link.options)?;
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg("--options")
            .arg(options)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                MeasureError::PlotAgent(format!(
                    "failed to launch plot window {}: {}",
                    self.program.display(),
                    e
                ))
            })?;
        tracing::debug!("Plot window process {} started", child.id());
        Ok(child)
    }
}

impl RenderWorker for WindowProcess {
    fn run(self: Box<Self>, link: RenderLink) {
        let mut child = match self.spawn(&link) {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("{}", e);
                return;
            }
        };
        let Some(stdin) = child.stdin.take() else {
            tracing::error!("Plot window process has no stdin");
            let _ = child.kill();
            let _ = child.wait();
            return;
        };

        let mut pipe = Pipe {
            stdin: BufWriter::new(stdin),
            finished_sent: false,
        };

        loop {
            if link.should_terminate() {
                // Hand over what is left before tearing the window down
                let _ = pipe.forward(&link);
                if let Err(e) = child.kill() {
                    tracing::debug!("Plot window already gone: {}", e);
                }
                break;
            }

            match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::info!("Plot window closed ({})", status);
                    break;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Lost track of plot window: {}", e);
                    break;
                }
            }

            if let Err(e) = pipe.forward(&link) {
                // The window closed its end; wait for the process itself
                tracing::debug!("Plot window stopped reading: {}", e);
                break;
            }

            std::thread::sleep(FORWARD_INTERVAL);
        }

        drop(pipe);
        if let Err(e) = child.wait() {
            tracing::warn!("Failed to reap plot window process: {}", e);
        }
    }
}

struct Pipe {
    stdin: BufWriter<ChildStdin>,
    finished_sent: bool,
}

impl Pipe {
    /// Send buffered points, then the finished marker once
    fn forward(&mut self, link: &RenderLink) -> Result<()> {
        for point in link.drain() {
            self.send(&WindowMessage::Point(point))?;
        }
        if link.is_finished() && !self.finished_sent {
            self.send(&WindowMessage::Finished)?;
            self.finished_sent = true;
        }
        self.stdin.flush()?;
        Ok(())
    }

    fn send(&mut self, message: &WindowMessage) -> Result<()> {
        self.stdin.write_all(message.to_line()?.as_bytes())?;
        Ok(())
    }
}
