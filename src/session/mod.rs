//! Measurement session
//!
//! [`MeasurementSession`] owns every collaborator of a measurement: the
//! shared step state, the data file, the operator command listener and the
//! plot agent. A measurement drives it either by hand (`begin`, the
//! forwarding methods, `finish`) or by implementing [`Measurement`] and
//! handing itself to [`MeasurementSession::run`].

mod measurement;

pub use measurement::{Flow, Measurement};

use crate::command::{CommandReceiver, InputSource, StdinInput};
use crate::config::{PlotOptions, SessionConfig};
use crate::error::{Result, ResultExt};
use crate::file::{Field, FileChooser, FileWriter, SystemClipboard};
use crate::plot::{NoPlotAgent, PlotAgent, PlotLabel, PlotRelay};
use crate::state::{MeasurementState, MeasurementStep};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How many poll intervals `finish` waits for the listener to exit
const LISTENER_EXIT_POLLS: u32 = 10;

pub struct MeasurementSession {
    config: SessionConfig,
    state: Arc<MeasurementState>,
    file: FileWriter,
    commands: CommandReceiver,
    plot: Box<dyn PlotAgent>,
}

impl MeasurementSession {
    /// Session reading commands from stdin, with a plot window process when
    /// `plotting` is set. See [`crate::viewer::run_if_requested`] for what
    /// the calling binary needs to do then.
    pub fn new(config: SessionConfig, plotting: bool) -> Result<Self> {
        let file = FileWriter::new(config.data_dir.clone())
            .with_clipboard(Box::new(SystemClipboard));
        let input = StdinInput::spawn().context("Failed to start the stdin reader")?;
        let plot: Box<dyn PlotAgent> = if plotting {
            Box::new(PlotRelay::window()?)
        } else {
            Box::new(NoPlotAgent)
        };
        Self::with_parts(config, file, Box::new(input), plot)
    }

    /// Session built from the given collaborators.
    ///
    /// The config's delimiter and poll interval are applied to `file` and
    /// the listener, and its plot options are passed to `plot`.
    pub fn with_parts(
        config: SessionConfig,
        file: FileWriter,
        input: Box<dyn InputSource>,
        mut plot: Box<dyn PlotAgent>,
    ) -> Result<Self> {
        config.validate()?;
        plot.configure(config.plot.clone())?;

        let state = Arc::new(MeasurementState::new());
        let commands = CommandReceiver::new(Arc::clone(&state), input)
            .with_poll_interval(config.poll_interval());
        let file = file.with_delimiter(config.delimiter.clone());

        Ok(Self {
            config,
            state,
            file,
            commands,
            plot,
        })
    }

    /// Replace the file chooser used when no path is given
    pub fn with_chooser(mut self, chooser: Box<dyn FileChooser>) -> Self {
        self.file.set_chooser(chooser);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start the plot window and the command listener, and create the
    /// configured output file if there is one
    pub fn begin(&mut self) -> Result<()> {
        self.plot.start().context("Failed to start the plot window")?;
        self.commands.initialize()?;

        if let Some(path) = self.config.output_file.clone() {
            self.file.set_file(Some(&path))?;
        }
        tracing::info!("Measurement session started");
        Ok(())
    }

    /// Enter AFTER and release everything `begin` acquired.
    ///
    /// Every resource is released even if an earlier one fails; the first
    /// error is returned.
    pub fn finish(&mut self) -> Result<()> {
        self.set_step(MeasurementStep::AFTER);

        let wait = self.commands.poll_interval() * LISTENER_EXIT_POLLS;
        if !self.commands.join(wait) {
            tracing::warn!("Command listener still running after {:?}", wait);
        }

        let mut result = Ok(());
        if self.file.is_open() {
            result = self.file.close();
        } else if self.file.pending_len() > 0 {
            tracing::warn!(
                "{} bytes were written but no data file was ever created",
                self.file.pending_len()
            );
        }

        self.plot.close();
        tracing::info!("Measurement session finished");
        result
    }

    pub fn set_step(&self, step: MeasurementStep) {
        self.state.set_step(step);
    }

    /// The current step
    pub fn state(&self) -> MeasurementStep {
        self.state.current_step()
    }

    /// The step state shared with the listener thread
    pub fn shared_state(&self) -> Arc<MeasurementState> {
        Arc::clone(&self.state)
    }

    /// Take the operator's pending command, if any
    pub fn get_command(&self) -> Option<String> {
        self.commands.get_command()
    }

    pub fn is_listening(&self) -> bool {
        self.commands.is_running()
    }

    /// Plot a point under the default label
    pub fn plot(&self, x: f64, y: f64) {
        self.plot.plot(x, y, PlotLabel::default());
    }

    pub fn plot_labeled(&self, x: f64, y: f64, label: impl Into<PlotLabel>) {
        self.plot.plot(x, y, label.into());
    }

    /// Write one record line; see [`record!`](crate::record)
    pub fn save(&mut self, fields: &[Field]) -> Result<()> {
        self.file.save(fields)
    }

    pub fn write(&mut self, text: &str) -> Result<()> {
        self.file.write(text)
    }

    pub fn set_label(&mut self, label: &str) -> Result<()> {
        self.file.set_label(label)
    }

    pub fn set_file(&mut self, path: Option<&Path>) -> Result<()> {
        self.file.set_file(path)
    }

    /// Create `<name>.txt` in the data directory, optionally in its own folder
    pub fn create_file(&mut self, name: &str, own_folder: bool) -> Result<PathBuf> {
        self.file.create_in_data_dir(name, own_folder)
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.file.filepath()
    }

    pub fn configure_plot(&mut self, options: PlotOptions) -> Result<()> {
        self.plot.configure(options)
    }

    pub fn is_plot_window_alive(&self) -> bool {
        self.plot.is_alive()
    }

    pub fn is_plot_window_forcibly_closed(&self) -> bool {
        self.plot.is_forcibly_closed()
    }

    /// Freeze the plot window; it stays open
    pub fn stop_renewal(&self) {
        self.plot.stop_renewal();
    }
}

impl Drop for MeasurementSession {
    fn drop(&mut self) {
        // The listener exits on the finished state; don't leave it polling
        if !self.state.has_finished() {
            self.state.set_step(MeasurementStep::AFTER);
        }
    }
}
