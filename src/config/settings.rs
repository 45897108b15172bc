//! Plot window settings
//!
//! [`PlotOptions`] is chosen before the plot window starts and handed to the
//! window process by value. It controls:
//!
//! - **Line / points**: connect points of the same label with a line
//! - **Log axes**: log10 scaling of either axis
//! - **Renew interval**: how often the window redraws (seconds)
//! - **Legend**: one entry per label
//! - **Flow width**: 0 shows the full history; a positive width shows a
//!   sliding x-window of that width following the newest point

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rendering options for the plot window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Connect points with a line
    pub line: bool,

    /// Log-scaled x axis
    pub xlog: bool,

    /// Log-scaled y axis
    pub ylog: bool,

    /// Redraw cadence in seconds (>= 0)
    pub renew_interval: f64,

    /// Show a legend keyed by label
    pub legend: bool,

    /// Width of the visible x range; 0 keeps the full history (>= 0)
    pub flow_width: f64,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            line: false,
            xlog: false,
            ylog: false,
            renew_interval: 1.0,
            legend: false,
            flow_width: 0.0,
        }
    }
}

impl PlotOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(mut self, line: bool) -> Self {
        self.line = line;
        self
    }

    pub fn with_log_axes(mut self, xlog: bool, ylog: bool) -> Self {
        self.xlog = xlog;
        self.ylog = ylog;
        self
    }

    pub fn with_renew_interval(mut self, seconds: f64) -> Self {
        self.renew_interval = seconds;
        self
    }

    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    pub fn with_flow_width(mut self, width: f64) -> Self {
        self.flow_width = width;
        self
    }

    /// Check numeric ranges.
    ///
    /// The error message names the offending option. Values are never
    /// clamped.
    pub fn check(&self) -> Result<(), String> {
        check_non_negative("renew_interval", self.renew_interval)?;
        check_non_negative("flow_width", self.flow_width)?;
        Ok(())
    }

    /// Whether the window shows a sliding x range
    pub fn is_flowing(&self) -> bool {
        self.flow_width > 0.0
    }

    /// Redraw cadence as a duration (assumes the options were checked)
    pub fn renew_duration(&self) -> Duration {
        Duration::from_secs_f64(self.renew_interval.max(0.0))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} must be a finite number, got {}", name, value));
    }
    if value < 0.0 {
        return Err(format!("{} must be >= 0, got {}", name, value));
    }
    Ok(())
}
