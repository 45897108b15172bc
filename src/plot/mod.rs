//! Plot relay
//!
//! The measurement loop hands plot points to a [`PlotAgent`]. With plotting
//! enabled this is a [`PlotRelay`], which appends points to a shared buffer
//! read by an isolated render worker (by default a separate plot window
//! process, see [`WindowProcess`]). With plotting disabled it is a
//! [`NoPlotAgent`], so the measurement code never branches on whether a
//! window exists.
//!
//! # Architecture
//!
//! ```text
//! measurement thread ──plot()──▶ ShareBuffer ◀──drain()── relay worker thread
//!                                 + finished                    │ JSON lines
//!                                                               ▼
//!                                                 plot window process (stdin)
//! ```

pub mod buffer;
pub mod relay;
pub mod window;

pub use buffer::ShareBuffer;
pub use relay::{PlotRelay, RelayState, RenderLink, RenderWorker};
pub use window::{WindowMessage, WindowProcess};

use crate::config::PlotOptions;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when the caller gives none
pub const DEFAULT_LABEL: &str = "default";

/// Grouping key of a plotted point. Points with equal labels share a colour
/// and, in line mode, a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlotLabel {
    Number(f64),
    Text(String),
}

impl Default for PlotLabel {
    fn default() -> Self {
        PlotLabel::Text(DEFAULT_LABEL.to_string())
    }
}

impl fmt::Display for PlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotLabel::Number(v) => write!(f, "{}", v),
            PlotLabel::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for PlotLabel {
    fn from(v: &str) -> Self {
        PlotLabel::Text(v.to_string())
    }
}

impl From<String> for PlotLabel {
    fn from(v: String) -> Self {
        PlotLabel::Text(v)
    }
}

impl From<f64> for PlotLabel {
    fn from(v: f64) -> Self {
        PlotLabel::Number(v)
    }
}

impl From<i32> for PlotLabel {
    fn from(v: i32) -> Self {
        PlotLabel::Number(v as f64)
    }
}

/// One point sent to the plot window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub label: PlotLabel,
}

impl PlotPoint {
    pub fn new(x: f64, y: f64, label: impl Into<PlotLabel>) -> Self {
        Self {
            x,
            y,
            label: label.into(),
        }
    }
}

/// What the measurement loop can do with a plot window
pub trait PlotAgent: Send {
    /// Set rendering options; only valid before [`start`](PlotAgent::start)
    fn configure(&mut self, options: PlotOptions) -> Result<()>;

    /// Launch the render worker
    fn start(&mut self) -> Result<()>;

    /// Queue a point. Never blocks beyond a single append.
    fn plot(&self, x: f64, y: f64, label: PlotLabel);

    /// Stop refreshing the window but leave it open
    fn stop_renewal(&self);

    /// Terminate the render worker
    fn close(&mut self);

    fn is_alive(&self) -> bool;

    /// Whether the window went away on its own (e.g. closed by the operator)
    fn is_forcibly_closed(&self) -> bool;
}

/// Plotting disabled: every call is a no-op
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlotAgent;

impl PlotAgent for NoPlotAgent {
    fn configure(&mut self, _options: PlotOptions) -> Result<()> {
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn plot(&self, _x: f64, _y: f64, _label: PlotLabel) {}

    fn stop_renewal(&self) {}

    fn close(&mut self) {}

    fn is_alive(&self) -> bool {
        false
    }

    fn is_forcibly_closed(&self) -> bool {
        false
    }
}
