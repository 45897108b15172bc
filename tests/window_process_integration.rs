//! Integration tests for the plot window process worker
//!
//! A shell child stands in for the viewer: it records its stdin to a file,
//! so the tests see exactly the lines a real window would read.

#![cfg(unix)]

mod common;

use common::{test_timeout, wait_until};
use measure_rs::plot::{PlotAgent, PlotRelay, RelayState, WindowMessage, WindowProcess};
use measure_rs::PlotPoint;
use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Longest `close()` may take when the worker shuts down cleanly
const CLOSE_BOUND: Duration = Duration::from_secs(2);

/// Child that copies stdin into `path`, then lingers until killed
fn recording_window(path: &Path) -> Box<WindowProcess> {
    Box::new(WindowProcess::new(
        "sh",
        [
            OsString::from("-c"),
            OsString::from("cat > \"$0\"; exec sleep 30"),
            path.as_os_str().to_os_string(),
        ],
    ))
}

/// Complete lines the child has received so far
fn received(path: &Path) -> Vec<WindowMessage> {
    let text = std::fs::read_to_string(path).unwrap_or_default();
    text.split_inclusive('\n')
        .filter(|line| line.ends_with('\n'))
        .filter_map(|line| WindowMessage::from_line(line).ok())
        .collect()
}

fn finished_count(messages: &[WindowMessage]) -> usize {
    messages
        .iter()
        .filter(|m| **m == WindowMessage::Finished)
        .count()
}

#[test]
fn test_points_then_finished_reach_child() {
    let dir = TempDir::new().unwrap();
    let stdin_copy = dir.path().join("stdin.jsonl");
    let mut relay = PlotRelay::new(recording_window(&stdin_copy));
    relay.start().unwrap();
    assert!(relay.is_alive());

    for i in 0..3 {
        relay.plot(i as f64, (i * 2) as f64, "T1".into());
    }
    relay.stop_renewal();

    assert!(wait_until(test_timeout(), || {
        finished_count(&received(&stdin_copy)) > 0
    }));
    // Several more forward ticks must not repeat the marker
    std::thread::sleep(Duration::from_millis(200));

    let expected: Vec<WindowMessage> = (0..3)
        .map(|i| WindowMessage::Point(PlotPoint::new(i as f64, (i * 2) as f64, "T1")))
        .chain(std::iter::once(WindowMessage::Finished))
        .collect();
    assert_eq!(received(&stdin_copy), expected);
    assert!(relay.is_alive());

    relay.close();
    assert_eq!(relay.state(), RelayState::Stopped);
    assert!(!relay.is_forcibly_closed());
}

#[test]
fn test_close_kills_lingering_child() {
    let dir = TempDir::new().unwrap();
    let stdin_copy = dir.path().join("stdin.jsonl");
    let mut relay = PlotRelay::new(recording_window(&stdin_copy));
    relay.start().unwrap();
    relay.plot(1.0, 1.0, "T1".into());
    assert!(wait_until(test_timeout(), || !received(&stdin_copy).is_empty()));

    let started = Instant::now();
    relay.close();
    // The child sleeps for 30 s; only a kill lets the worker finish in time
    assert!(started.elapsed() < CLOSE_BOUND);
    assert!(!relay.is_alive());
    assert!(!relay.is_forcibly_closed());
}

#[test]
fn test_child_exiting_on_its_own_is_forced_close() {
    let mut relay = PlotRelay::new(Box::new(WindowProcess::new(
        "true",
        std::iter::empty::<OsString>(),
    )));
    relay.start().unwrap();

    assert!(wait_until(test_timeout(), || !relay.is_alive()));
    assert!(relay.is_forcibly_closed());

    relay.close();
    assert!(relay.is_forcibly_closed());
}

#[test]
fn test_missing_viewer_reports_closed_window() {
    let mut relay = PlotRelay::new(Box::new(WindowProcess::new(
        "/nonexistent/measure-rs-viewer",
        std::iter::empty::<OsString>(),
    )));
    relay.start().unwrap();

    assert!(wait_until(test_timeout(), || !relay.is_alive()));
    assert!(relay.is_forcibly_closed());
    relay.plot(1.0, 1.0, "T1".into());
    assert_eq!(relay.pending_points(), 0);
}
