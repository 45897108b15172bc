//! Step-driven measurement runner

use super::MeasurementSession;
use crate::error::Result;
use crate::state::MeasurementStep;

/// What the run loop does after an `update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Break,
}

/// A measurement procedure.
///
/// Each hook runs in its own step: `start` in START, `update` repeatedly in
/// UPDATE (the only step in which operator commands are read),
/// `finish_measure` in FINISH_MEASURE, `end` in END and `after` in AFTER,
/// once the data file and plot window have been released.
pub trait Measurement {
    fn start(&mut self, _session: &mut MeasurementSession) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, session: &mut MeasurementSession) -> Result<Flow>;

    fn finish_measure(&mut self, _session: &mut MeasurementSession) -> Result<()> {
        Ok(())
    }

    fn end(&mut self, _session: &mut MeasurementSession) -> Result<()> {
        Ok(())
    }

    fn after(&mut self, _session: &mut MeasurementSession) -> Result<()> {
        Ok(())
    }
}

fn keep_first(outcome: &mut Result<()>, next: Result<()>) {
    if let Err(e) = next {
        if outcome.is_ok() {
            *outcome = Err(e);
        } else {
            tracing::error!("Further error while finishing: {}", e);
        }
    }
}

impl MeasurementSession {
    /// Run `measurement` through every step.
    ///
    /// The closing steps always run, so the file and plot window are
    /// released even when a hook fails; the first error is returned.
    pub fn run<M: Measurement + ?Sized>(&mut self, measurement: &mut M) -> Result<()> {
        self.set_step(MeasurementStep::READY);
        let mut outcome = self.begin();

        if outcome.is_ok() {
            self.set_step(MeasurementStep::START);
            outcome = measurement.start(self);
        }

        if outcome.is_ok() {
            self.set_step(MeasurementStep::UPDATE);
            outcome = self.update_until_break(measurement);
        }

        self.set_step(MeasurementStep::FINISH_MEASURE);
        let next = measurement.finish_measure(self);
        keep_first(&mut outcome, next);

        self.set_step(MeasurementStep::END);
        let next = measurement.end(self);
        keep_first(&mut outcome, next);

        let next = self.finish();
        keep_first(&mut outcome, next);
        let next = measurement.after(self);
        keep_first(&mut outcome, next);

        if let Err(e) = &outcome {
            tracing::error!("Measurement failed: {}", e);
        }
        outcome
    }

    fn update_until_break<M: Measurement + ?Sized>(&mut self, measurement: &mut M) -> Result<()> {
        let mut updates = 0u64;
        loop {
            updates += 1;
            if measurement.update(self)? == Flow::Break {
                break;
            }
        }
        tracing::debug!("Update loop ended after {} updates", updates);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ChannelInput;
    use crate::config::SessionConfig;
    use crate::error::MeasureError;
    use crate::file::{FileWriter, NoClipboard};
    use crate::plot::NoPlotAgent;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        steps: Vec<(&'static str, MeasurementStep)>,
        updates: usize,
        fail_in_start: bool,
    }

    impl Measurement for Recorder {
        fn start(&mut self, session: &mut MeasurementSession) -> Result<()> {
            self.steps.push(("start", session.state()));
            if self.fail_in_start {
                return Err(MeasureError::File("instrument offline".to_string()));
            }
            Ok(())
        }

        fn update(&mut self, session: &mut MeasurementSession) -> Result<Flow> {
            self.updates += 1;
            assert_eq!(session.state(), MeasurementStep::UPDATE);
            Ok(if self.updates < 3 { Flow::Continue } else { Flow::Break })
        }

        fn finish_measure(&mut self, session: &mut MeasurementSession) -> Result<()> {
            self.steps.push(("finish_measure", session.state()));
            Ok(())
        }

        fn end(&mut self, session: &mut MeasurementSession) -> Result<()> {
            self.steps.push(("end", session.state()));
            Ok(())
        }

        fn after(&mut self, session: &mut MeasurementSession) -> Result<()> {
            self.steps.push(("after", session.state()));
            Ok(())
        }
    }

    fn session(dir: &TempDir) -> MeasurementSession {
        let config = SessionConfig {
            data_dir: dir.path().to_path_buf(),
            poll_interval_ms: 5,
            ..Default::default()
        };
        let (_tx, input) = ChannelInput::new();
        MeasurementSession::with_parts(
            config,
            FileWriter::new(dir.path()).with_clipboard(Box::new(NoClipboard)),
            Box::new(input),
            Box::new(NoPlotAgent),
        )
        .unwrap()
    }

    #[test]
    fn test_hooks_run_in_step_order() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let mut recorder = Recorder::default();

        session.run(&mut recorder).unwrap();

        assert_eq!(recorder.updates, 3);
        assert_eq!(
            recorder.steps,
            vec![
                ("start", MeasurementStep::START),
                ("finish_measure", MeasurementStep::FINISH_MEASURE),
                ("end", MeasurementStep::END),
                ("after", MeasurementStep::AFTER),
            ]
        );
    }

    #[test]
    fn test_failed_start_still_reaches_after() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let mut recorder = Recorder {
            fail_in_start: true,
            ..Default::default()
        };

        let err = session.run(&mut recorder).unwrap_err();
        assert!(err.to_string().contains("instrument offline"));
        assert_eq!(recorder.updates, 0);
        assert_eq!(recorder.steps.last(), Some(&("after", MeasurementStep::AFTER)));
        assert!(!session.is_listening());
    }
}
