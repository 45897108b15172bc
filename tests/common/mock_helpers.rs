//! Stand-ins for the plot window and the operator

use measure_rs::plot::{PlotPoint, RenderLink, RenderWorker};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Points seen by a [`CollectingWorker`]
pub type Collected = Arc<Mutex<Vec<PlotPoint>>>;

/// Render worker that records every point it drains, in order
pub struct CollectingWorker {
    seen: Collected,
}

impl CollectingWorker {
    pub fn new() -> (Collected, Box<Self>) {
        let seen = Collected::default();
        (Arc::clone(&seen), Box::new(Self { seen }))
    }
}

impl RenderWorker for CollectingWorker {
    fn run(self: Box<Self>, link: RenderLink) {
        loop {
            let terminate = link.should_terminate();
            let points = link.drain();
            self.seen.lock().unwrap().extend(points);
            if terminate {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Render worker whose window the operator closes right away
pub struct ClosedWindow;

impl RenderWorker for ClosedWindow {
    fn run(self: Box<Self>, _link: RenderLink) {}
}
