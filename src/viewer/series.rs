//! Per-label point series shown by the plot window

use crate::plot::{PlotLabel, PlotPoint};
use std::collections::HashMap;

/// Hashable identity of a [`PlotLabel`]; numbers and text never collide
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LabelKey {
    Number(u64),
    Text(String),
}

impl From<&PlotLabel> for LabelKey {
    fn from(label: &PlotLabel) -> Self {
        match label {
            // -0.0 and 0.0 are the same label
            PlotLabel::Number(v) if *v == 0.0 => LabelKey::Number(0f64.to_bits()),
            PlotLabel::Number(v) => LabelKey::Number(v.to_bits()),
            PlotLabel::Text(v) => LabelKey::Text(v.clone()),
        }
    }
}

/// Points grouped by label, in first-seen label order.
///
/// On a log axis values are stored as `log10(v)`; points with a
/// non-positive coordinate on such an axis cannot be shown and are dropped.
#[derive(Debug, Default)]
pub struct SeriesSet {
    xlog: bool,
    ylog: bool,
    index: HashMap<LabelKey, usize>,
    series: Vec<(String, Vec<[f64; 2]>)>,
    /// Largest x seen, in data units
    x_max: Option<f64>,
}

impl SeriesSet {
    pub fn new(xlog: bool, ylog: bool) -> Self {
        Self {
            xlog,
            ylog,
            ..Default::default()
        }
    }

    pub fn push(&mut self, point: &PlotPoint) {
        let (Some(x), Some(y)) = (scale(point.x, self.xlog), scale(point.y, self.ylog)) else {
            tracing::trace!("Dropping point outside the log domain: {:?}", point);
            return;
        };

        let key = LabelKey::from(&point.label);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.series.push((point.label.to_string(), Vec::new()));
                self.index.insert(key, self.series.len() - 1);
                self.series.len() - 1
            }
        };
        self.series[slot].1.push([x, y]);
        self.x_max = Some(self.x_max.map_or(point.x, |m| m.max(point.x)));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[[f64; 2]])> {
        self.series
            .iter()
            .map(|(label, points)| (label.as_str(), points.as_slice()))
    }

    pub fn label_count(&self) -> usize {
        self.series.len()
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|(_, points)| points.len()).sum()
    }

    /// Visible x range when only the latest `flow_width` of x is shown.
    ///
    /// `None` means "fit everything": flowing is off or there is no data yet.
    pub fn flow_bounds(&self, flow_width: f64) -> Option<(f64, f64)> {
        if flow_width <= 0.0 {
            return None;
        }
        let x_max = self.x_max?;
        let x_min = x_max - flow_width;
        if !self.xlog {
            return Some((x_min, x_max));
        }
        // The window is in data units; on a log axis it must stay positive
        (x_min > 0.0).then(|| (x_min.log10(), x_max.log10()))
    }
}

fn scale(value: f64, log: bool) -> Option<f64> {
    if !log {
        return Some(value);
    }
    (value > 0.0).then(|| value.log10())
}
