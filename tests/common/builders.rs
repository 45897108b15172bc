//! Test data builders for creating sessions

use super::TEST_POLL;
use crossbeam_channel::Sender;
use measure_rs::file::NoClipboard;
use measure_rs::plot::{NoPlotAgent, PlotAgent};
use measure_rs::{ChannelInput, FileWriter, MeasurementSession, SessionConfig};
use std::path::{Path, PathBuf};

/// Builder for sessions fed from an in-process command channel
pub struct SessionBuilder {
    config: SessionConfig,
    plot: Box<dyn PlotAgent>,
}

impl SessionBuilder {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            config: SessionConfig {
                data_dir: data_dir.to_path_buf(),
                poll_interval_ms: TEST_POLL.as_millis() as u64,
                plotting: false,
                ..Default::default()
            },
            plot: Box::new(NoPlotAgent),
        }
    }

    pub fn output_file(mut self, path: PathBuf) -> Self {
        self.config.output_file = Some(path);
        self
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.config.delimiter = delimiter.to_string();
        self
    }

    pub fn plot(mut self, plot: Box<dyn PlotAgent>) -> Self {
        self.plot = plot;
        self
    }

    /// The session plus the sender standing in for the operator's console
    pub fn build(self) -> (Sender<String>, MeasurementSession) {
        let file = FileWriter::new(self.config.data_dir.clone())
            .with_clipboard(Box::new(NoClipboard));
        let (operator, input) = ChannelInput::new();
        let session = MeasurementSession::with_parts(self.config, file, Box::new(input), self.plot)
            .expect("valid test session");
        (operator, session)
    }
}
