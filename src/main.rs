//! measure-rs command line entry point
//!
//! - `measure-rs run` runs a demo voltage sweep against a simulated diode,
//!   with live plotting and operator commands (`stop`, `pause`, `resume`)
//! - `measure-rs plot-window` is the plot window process started by the
//!   plot relay; it is not meant to be run by hand

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use measure_rs::config::{LogConfig, PlotOptions, SessionConfig};
use measure_rs::plot::window::PLOT_WINDOW_SUBCOMMAND;
use measure_rs::{logging, record, viewer, Flow, Measurement, MeasurementSession};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "measure-rs")]
#[command(about = "Measurement session runner with live plotting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo sweep against a simulated instrument
    Run {
        /// Session config file (TOML); defaults to the platform config location
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data file to create; asks with a dialog when omitted
        #[arg(long)]
        output: Option<PathBuf>,

        /// Do not open a plot window
        #[arg(long)]
        no_plot: bool,

        /// Number of sweep points
        #[arg(long, default_value = "200", value_parser = clap::value_parser!(u32).range(1..))]
        points: u32,

        /// Delay between points in milliseconds
        #[arg(long, default_value = "50")]
        interval_ms: u64,
    },

    /// Plot window process (started by the session)
    #[command(name = PLOT_WINDOW_SUBCOMMAND, hide = true)]
    PlotWindow {
        /// Plot options as JSON
        #[arg(long)]
        options: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            no_plot,
            points,
            interval_ms,
        } => {
            let mut config = match config {
                Some(path) => SessionConfig::load(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => SessionConfig::load_or_default(),
            };
            if output.is_some() {
                config.output_file = output;
            }
            let _guard = logging::init(&config.log);

            let plotting = config.plotting && !no_plot;
            let mut session = MeasurementSession::new(config, plotting)?;
            let mut sweep = DiodeSweep::new(points, Duration::from_millis(interval_ms));

            tracing::info!("Starting sweep of {} points; type 'stop' to end early", points);
            session.run(&mut sweep)?;
            tracing::info!("Sweep finished after {} points", sweep.taken);
        }
        Commands::PlotWindow { options } => {
            let _guard = logging::init(&LogConfig::default());
            let options: PlotOptions =
                serde_json::from_str(&options).context("Invalid plot window options")?;
            viewer::run(options)?;
        }
    }

    Ok(())
}

/// Saturation current of the simulated diode (A)
const SATURATION_CURRENT: f64 = 1e-12;
/// Thermal voltage at room temperature (V)
const THERMAL_VOLTAGE: f64 = 0.02585;
/// Sweep end voltage (V)
const MAX_VOLTAGE: f64 = 0.7;

const WINDOW_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Forward-bias sweep of a simulated diode
struct DiodeSweep {
    points: u32,
    interval: Duration,
    taken: u32,
    paused: bool,
    window_closed: bool,
}

impl DiodeSweep {
    fn new(points: u32, interval: Duration) -> Self {
        Self {
            points,
            interval,
            taken: 0,
            paused: false,
            window_closed: false,
        }
    }

    fn voltage(&self) -> f64 {
        if self.points <= 1 {
            return 0.0;
        }
        MAX_VOLTAGE * self.taken as f64 / (self.points - 1) as f64
    }

    fn current(voltage: f64) -> f64 {
        SATURATION_CURRENT * ((voltage / THERMAL_VOLTAGE).exp() - 1.0)
    }

    /// Returns true when the sweep should end
    fn handle(&mut self, command: &str) -> bool {
        match command {
            "stop" => return true,
            "pause" => {
                self.paused = true;
                tracing::info!("Paused; type 'resume' to continue");
            }
            "resume" => {
                self.paused = false;
                tracing::info!("Resumed");
            }
            other => tracing::warn!("Unknown command '{}' (stop, pause, resume)", other),
        }
        false
    }
}

impl Measurement for DiodeSweep {
    fn start(&mut self, session: &mut MeasurementSession) -> measure_rs::Result<()> {
        session.set_label("# simulated diode forward sweep")?;
        session.set_label("step,voltage (V),current (A)")?;
        if session.filepath().is_none() {
            session.set_file(None)?;
        }
        Ok(())
    }

    fn update(&mut self, session: &mut MeasurementSession) -> measure_rs::Result<Flow> {
        if let Some(command) = session.get_command() {
            if self.handle(&command) {
                return Ok(Flow::Break);
            }
        }
        if !self.window_closed && session.is_plot_window_forcibly_closed() {
            self.window_closed = true;
            tracing::info!("Plot window was closed; measurement continues");
        }

        std::thread::sleep(self.interval);
        if self.paused {
            return Ok(Flow::Continue);
        }

        let voltage = self.voltage();
        let current = Self::current(voltage);
        session.plot_labeled(voltage, current, "I");
        session.save(&record![self.taken, voltage, current])?;

        self.taken += 1;
        Ok(if self.taken >= self.points {
            Flow::Break
        } else {
            Flow::Continue
        })
    }

    fn finish_measure(&mut self, session: &mut MeasurementSession) -> measure_rs::Result<()> {
        session.stop_renewal();
        Ok(())
    }

    fn end(&mut self, session: &mut MeasurementSession) -> measure_rs::Result<()> {
        if session.is_plot_window_alive() {
            tracing::info!("Close the plot window to exit");
            while session.is_plot_window_alive() {
                std::thread::sleep(WINDOW_POLL_INTERVAL);
            }
        }
        Ok(())
    }
}
