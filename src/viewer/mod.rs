//! Plot window
//!
//! Runs in its own process (`measure-rs plot-window --options <json>`) so the
//! GUI event loop owns the main thread. Points arrive on stdin as
//! [`WindowMessage`] JSON lines and are grouped into one series per label.
//! New data is applied once per renewal interval until the `finished`
//! message arrives; after that the window stays open but stops refreshing.
//!
//! Binaries other than `measure-rs` that open a session with plotting must
//! call [`run_if_requested`] first thing in `main`, because the window is
//! started as the same executable.

mod series;

pub use series::SeriesSet;

use crate::config::PlotOptions;
use crate::error::{MeasureError, Result};
use crate::plot::window::PLOT_WINDOW_SUBCOMMAND;
use crate::plot::{PlotPoint, WindowMessage};
use crossbeam_channel::{Receiver, TryRecvError};
use egui_plot::{Corner, Legend, Line, Plot, PlotBounds, PlotPoints, Points};
use std::io::BufRead;
use std::time::{Duration, Instant};

const WINDOW_TITLE: &str = "measure-rs plot";

/// Open the plot window and block until the operator closes it
pub fn run(options: PlotOptions) -> Result<()> {
    options.check().map_err(MeasureError::PlotAgent)?;
    let messages = spawn_stdin_reader()?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([320.0, 240.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    let app = PlotWindow::new(options, messages);
    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| MeasureError::PlotAgent(format!("plot window failed: {}", e)))
}

/// Run the plot window if this process was started as one.
///
/// Returns `true` once the window has been closed, or `false` right away
/// when the command line is not `plot-window --options <json>`.
pub fn run_if_requested() -> Result<bool> {
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());
    match requested_options(args) {
        Some(options) => {
            run(options?)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Plot options from a `plot-window` command line, `None` for any other
fn requested_options(mut args: impl Iterator<Item = String>) -> Option<Result<PlotOptions>> {
    if args.next().as_deref() != Some(PLOT_WINDOW_SUBCOMMAND) {
        return None;
    }
    let flag = args.next();
    let options = match (flag.as_deref(), args.next()) {
        (Some("--options"), Some(json)) => serde_json::from_str(&json).map_err(MeasureError::from),
        _ => Err(MeasureError::PlotAgent(format!(
            "usage: {} --options <json>",
            PLOT_WINDOW_SUBCOMMAND
        ))),
    };
    Some(options)
}

fn spawn_stdin_reader() -> Result<Receiver<WindowMessage>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::Builder::new()
        .name("plot-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Plot input failed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match WindowMessage::from_line(&line) {
                    Ok(message) => {
                        if tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Skipping malformed plot message: {}", e),
                }
            }
        })?;
    Ok(rx)
}

struct PlotWindow {
    options: PlotOptions,
    messages: Receiver<WindowMessage>,
    /// Received but not yet shown
    incoming: Vec<PlotPoint>,
    series: SeriesSet,
    last_renewal: Instant,
    finished: bool,
}

impl PlotWindow {
    fn new(options: PlotOptions, messages: Receiver<WindowMessage>) -> Self {
        let series = SeriesSet::new(options.xlog, options.ylog);
        Self {
            options,
            messages,
            incoming: Vec::new(),
            series,
            last_renewal: Instant::now(),
            finished: false,
        }
    }

    /// Collect waiting messages and apply them when the renewal interval
    /// has elapsed (or the stream ended)
    fn receive(&mut self) {
        loop {
            match self.messages.try_recv() {
                Ok(WindowMessage::Point(point)) => self.incoming.push(point),
                Ok(WindowMessage::Finished) => {
                    self.finished = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }

        if self.finished || self.last_renewal.elapsed() >= self.options.renew_duration() {
            for point in self.incoming.drain(..) {
                self.series.push(&point);
            }
            self.last_renewal = Instant::now();
        }
    }

    fn show_plot(&self, ui: &mut egui::Ui) {
        let mut plot = Plot::new("measurement_plot")
            .x_axis_label(axis_label("x", self.options.xlog))
            .y_axis_label(axis_label("y", self.options.ylog));

        if self.options.legend {
            plot = plot.legend(Legend::default().position(Corner::RightTop));
        }
        if self.options.xlog {
            plot = plot.x_axis_formatter(|mark, _range| log_tick(mark.value));
        }
        if self.options.ylog {
            plot = plot.y_axis_formatter(|mark, _range| log_tick(mark.value));
        }

        let bounds = self.series.flow_bounds(self.options.flow_width);
        let line = self.options.line;
        let series = &self.series;

        plot.show(ui, |plot_ui| {
            if let Some((x_min, x_max)) = bounds {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [x_min, f64::NEG_INFINITY],
                    [x_max, f64::INFINITY],
                ));
                plot_ui.set_auto_bounds(egui::Vec2b::new(false, true));
            }

            for (label, points) in series.iter() {
                if line {
                    plot_ui.line(Line::new(label, PlotPoints::from(points.to_vec())));
                } else {
                    plot_ui.points(Points::new(label, PlotPoints::from(points.to_vec())).radius(2.5));
                }
            }
        });
    }
}

impl eframe::App for PlotWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.finished {
            self.receive();
        }

        egui::CentralPanel::default().show(ctx, |ui| self.show_plot(ui));

        if !self.finished {
            let wait = self
                .options
                .renew_duration()
                .min(Duration::from_millis(100));
            ctx.request_repaint_after(wait);
        }
    }
}

fn axis_label(axis: &str, log: bool) -> String {
    if log {
        format!("log10({})", axis)
    } else {
        axis.to_string()
    }
}

fn log_tick(exponent: f64) -> String {
    format!("{:.3e}", 10f64.powf(exponent))
}
