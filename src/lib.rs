//! # measure-rs: measurement session orchestration
//!
//! Coordinates a long-running instrument measurement: a step state machine,
//! a data file that can be written to before it exists, an operator command
//! listener that never interrupts the measurement cadence, and a relay that
//! hands plot points to a separate plot window without blocking.
//!
//! ## Architecture
//!
//! - **State**: the current [`MeasurementStep`], shared atomically
//! - **File**: deferred-creation data file, flushed on every write
//! - **Command**: background listener thread with a single command slot
//! - **Plot**: shared point buffer drained by a render worker, which by
//!   default drives a plot window child process (`plot-window` subcommand)
//! - **Session**: the composition root the measurement loop talks to
//!
//! ## Configuration
//!
//! Session settings are read from `session.toml` in the platform config
//! directory under `measure-rs`:
//!
//! - **Linux**: `~/.config/measure-rs/`
//! - **macOS**: `~/Library/Application Support/measure-rs/`
//! - **Windows**: `%APPDATA%\measure-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use measure_rs::{record, Flow, Measurement, MeasurementSession, Result, SessionConfig};
//!
//! struct Sweep {
//!     voltage: f64,
//! }
//!
//! impl Measurement for Sweep {
//!     fn start(&mut self, session: &mut MeasurementSession) -> Result<()> {
//!         session.set_label("V,I")?;
//!         session.set_file(None)
//!     }
//!
//!     fn update(&mut self, session: &mut MeasurementSession) -> Result<Flow> {
//!         if session.get_command().as_deref() == Some("stop") || self.voltage > 1.0 {
//!             return Ok(Flow::Break);
//!         }
//!         let current = self.voltage * 1e-3;
//!         session.plot(self.voltage, current);
//!         session.save(&record![self.voltage, current])?;
//!         self.voltage += 0.01;
//!         Ok(Flow::Continue)
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     // The plot window is this executable started again; hand over first
//!     if measure_rs::viewer::run_if_requested()? {
//!         return Ok(());
//!     }
//!     let mut session = MeasurementSession::new(SessionConfig::load_or_default(), true)?;
//!     session.run(&mut Sweep { voltage: 0.0 })
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod plot;
pub mod session;
pub mod state;
pub mod viewer;

// Re-export commonly used types
pub use command::{ChannelInput, CommandReceiver, InputSource, StdinInput};
pub use config::{PlotOptions, SessionConfig};
pub use error::{MeasureError, Result, ResultExt};
pub use file::{DataRecord, Field, FileWriter};
pub use plot::{NoPlotAgent, PlotAgent, PlotLabel, PlotPoint, PlotRelay};
pub use session::{Flow, Measurement, MeasurementSession};
pub use state::{MeasurementState, MeasurementStep};
