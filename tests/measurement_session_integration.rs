//! Integration tests for a full measurement session
//!
//! These tests drive a session the way a measurement loop does:
//! - Step transitions and the command listener
//! - Plot points reaching the render worker
//! - Header and records landing in the data file

mod common;

use common::builders::SessionBuilder;
use common::mock_helpers::{ClosedWindow, CollectingWorker};
use common::{test_timeout, wait_until, SCHEDULING_SLACK, TEST_POLL};
use measure_rs::plot::PlotRelay;
use measure_rs::{record, Flow, Measurement, MeasurementSession, MeasurementStep, PlotPoint, Result};
use serial_test::serial;
use std::time::Instant;
use tempfile::TempDir;

#[test]
#[serial]
fn test_operator_stop_scenario() {
    let dir = TempDir::new().unwrap();
    let (seen, worker) = CollectingWorker::new();
    let (operator, mut session) = SessionBuilder::new(dir.path())
        .plot(Box::new(PlotRelay::new(worker)))
        .build();

    assert_eq!(session.state(), MeasurementStep::READY);
    session.begin().unwrap();
    session.set_step(MeasurementStep::START);
    session.set_step(MeasurementStep::UPDATE);
    assert!(session.is_plot_window_alive());

    for i in 0..5 {
        session.plot_labeled(i as f64, (i * 10) as f64, "T1");
    }

    operator.send("stop".to_string()).unwrap();
    let mut stop = None;
    assert!(wait_until(test_timeout(), || {
        stop = session.get_command();
        stop.is_some()
    }));
    assert_eq!(stop.as_deref(), Some("stop"));
    assert_eq!(session.get_command(), None);

    session.set_step(MeasurementStep::END);
    let ended = Instant::now();
    assert!(wait_until(test_timeout(), || !session.is_listening()));
    // One poll interval, plus wake-up latency
    assert!(ended.elapsed() <= TEST_POLL + SCHEDULING_SLACK);

    session.finish().unwrap();
    assert!(!session.is_plot_window_alive());
    assert!(!session.is_plot_window_forcibly_closed());

    let expected: Vec<PlotPoint> = (0..5)
        .map(|i| PlotPoint::new(i as f64, (i * 10) as f64, "T1"))
        .collect();
    assert_eq!(*seen.lock().unwrap(), expected);
}

#[test]
#[serial]
fn test_commands_typed_before_update_are_dropped() {
    let dir = TempDir::new().unwrap();
    let (operator, mut session) = SessionBuilder::new(dir.path()).build();
    session.begin().unwrap();
    session.set_step(MeasurementStep::START);

    operator.send("too early".to_string()).unwrap();
    std::thread::sleep(TEST_POLL * 5);
    session.set_step(MeasurementStep::UPDATE);
    std::thread::sleep(TEST_POLL * 5);
    assert_eq!(session.get_command(), None);

    session.finish().unwrap();
}

#[test]
#[serial]
fn test_closed_window_is_reported() {
    let dir = TempDir::new().unwrap();
    let (_operator, mut session) = SessionBuilder::new(dir.path())
        .plot(Box::new(PlotRelay::new(Box::new(ClosedWindow))))
        .build();
    session.begin().unwrap();

    assert!(wait_until(test_timeout(), || !session.is_plot_window_alive()));
    assert!(session.is_plot_window_forcibly_closed());
    // Plotting after the window is gone is harmless
    session.plot(1.0, 2.0);
    session.finish().unwrap();
}

/// Counts up until told to stop, saving each value
struct Counter {
    saved: u32,
}

impl Measurement for Counter {
    fn start(&mut self, session: &mut MeasurementSession) -> Result<()> {
        session.set_label("n;square")
    }

    fn update(&mut self, session: &mut MeasurementSession) -> Result<Flow> {
        if session.get_command().as_deref() == Some("stop") || self.saved == 3 {
            return Ok(Flow::Break);
        }
        session.save(&record![self.saved, self.saved * self.saved])?;
        session.plot(self.saved as f64, (self.saved * self.saved) as f64);
        self.saved += 1;
        Ok(Flow::Continue)
    }
}

#[test]
#[serial]
fn test_run_writes_header_and_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("counter.txt");
    let (_operator, mut session) = SessionBuilder::new(dir.path())
        .output_file(path.clone())
        .delimiter(";")
        .build();

    session.run(&mut Counter { saved: 0 }).unwrap();

    assert_eq!(session.state(), MeasurementStep::AFTER);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "n;square\n0;0\n1;1\n2;4\n"
    );
}

#[test]
#[serial]
fn test_run_fails_when_output_exists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taken.txt");
    std::fs::write(&path, "keep me").unwrap();

    let (_operator, mut session) = SessionBuilder::new(dir.path())
        .output_file(path.clone())
        .build();

    assert!(session.run(&mut Counter { saved: 0 }).is_err());
    assert_eq!(session.state(), MeasurementStep::AFTER);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
}
