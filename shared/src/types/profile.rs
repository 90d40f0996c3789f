//! Utilization record data structures
//!
//! These types hold the metrics extracted for each sampled kernel launch and the
//! time series built from them, suitable for CSV/JSON export and charting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Utilization metrics reported by the detailed profiler for one launch.
///
/// A field is `None` when the profiler output did not contain the matching
/// "GPU Speed Of Light" row. That is a compatibility problem, never a zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricPair {
    /// Memory throughput, percent of peak
    pub memory: Option<f64>,

    /// SM throughput, percent of peak
    pub sm: Option<f64>,
}

impl MetricPair {
    pub fn new(memory: Option<f64>, sm: Option<f64>) -> Self {
        Self { memory, sm }
    }

    /// Both metrics were found
    pub fn is_complete(&self) -> bool {
        self.memory.is_some() && self.sm.is_some()
    }

    /// Names of the metrics that were not found
    pub fn missing(&self) -> Vec<UtilizationMetric> {
        let mut missing = Vec::new();
        if self.memory.is_none() {
            missing.push(UtilizationMetric::Memory);
        }
        if self.sm.is_none() {
            missing.push(UtilizationMetric::Sm);
        }
        missing
    }

    /// Look up a metric by kind
    pub fn get(&self, metric: UtilizationMetric) -> Option<f64> {
        match metric {
            UtilizationMetric::Memory => self.memory,
            UtilizationMetric::Sm => self.sm,
        }
    }
}

/// The two utilization metrics tracked over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtilizationMetric {
    Memory,
    Sm,
}

impl UtilizationMetric {
    pub const ALL: [UtilizationMetric; 2] = [UtilizationMetric::Memory, UtilizationMetric::Sm];

    /// Metric name as printed by Nsight Compute in the Speed Of Light section
    pub fn ncu_metric_name(&self) -> &'static str {
        match self {
            Self::Memory => "Memory [%]",
            Self::Sm => "SM [%]",
        }
    }
}

impl fmt::Display for UtilizationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "Memory"),
            Self::Sm => write!(f, "SM"),
        }
    }
}

/// One row of the utilization time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    /// Sample time in seconds, on the trace clock
    #[serde(rename = "Time (s)", alias = "Timestamp (s)")]
    pub time_s: f64,

    #[serde(rename = "Memory (%)")]
    pub memory: Option<f64>,

    #[serde(rename = "SM (%)")]
    pub sm: Option<f64>,
}

impl RecordRow {
    pub fn new(time_s: f64, metrics: MetricPair) -> Self {
        Self {
            time_s,
            memory: metrics.memory,
            sm: metrics.sm,
        }
    }

    pub fn metrics(&self) -> MetricPair {
        MetricPair::new(self.memory, self.sm)
    }
}

/// A metric value in long form, one per (time, metric) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time_s: f64,
    pub metric: UtilizationMetric,
    pub value: f64,
}

/// Utilization time series, ordered by sample time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub rows: Vec<RecordRow>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row
    pub fn push(&mut self, time_s: f64, metrics: MetricPair) {
        self.rows.push(RecordRow::new(time_s, metrics));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows with at least one absent metric
    pub fn incomplete_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| !r.metrics().is_complete())
            .count()
    }

    /// Reshape the two metric columns into (time, metric, value) observations.
    ///
    /// Absent values are dropped.
    pub fn long_form(&self) -> Vec<Observation> {
        let mut out = Vec::with_capacity(self.rows.len() * 2);
        for metric in UtilizationMetric::ALL {
            for row in &self.rows {
                if let Some(value) = row.metrics().get(metric) {
                    out.push(Observation {
                        time_s: row.time_s,
                        metric,
                        value,
                    });
                }
            }
        }
        out
    }
}

impl FromIterator<RecordRow> for Record {
    fn from_iter<I: IntoIterator<Item = RecordRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_pair_missing() {
        let complete = MetricPair::new(Some(40.0), Some(75.5));
        assert!(complete.is_complete());
        assert!(complete.missing().is_empty());

        let partial = MetricPair::new(None, Some(12.0));
        assert!(!partial.is_complete());
        assert_eq!(partial.missing(), vec![UtilizationMetric::Memory]);

        let empty = MetricPair::default();
        assert_eq!(
            empty.missing(),
            vec![UtilizationMetric::Memory, UtilizationMetric::Sm]
        );
    }

    #[test]
    fn test_ncu_metric_names() {
        assert_eq!(UtilizationMetric::Memory.ncu_metric_name(), "Memory [%]");
        assert_eq!(UtilizationMetric::Sm.ncu_metric_name(), "SM [%]");
    }

    #[test]
    fn test_record_incomplete_rows() {
        let mut record = Record::new();
        record.push(0.1, MetricPair::new(Some(10.0), Some(20.0)));
        record.push(0.2, MetricPair::new(None, Some(30.0)));
        record.push(0.3, MetricPair::default());

        assert_eq!(record.len(), 3);
        assert_eq!(record.incomplete_rows(), 2);
    }

    #[test]
    fn test_long_form_drops_absent_values() {
        let mut record = Record::new();
        record.push(1.0, MetricPair::new(Some(10.0), Some(20.0)));
        record.push(2.0, MetricPair::new(None, Some(30.0)));

        let obs = record.long_form();
        assert_eq!(obs.len(), 3);

        let memory: Vec<_> = obs
            .iter()
            .filter(|o| o.metric == UtilizationMetric::Memory)
            .collect();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory[0].time_s, 1.0);

        let sm: Vec<_> = obs
            .iter()
            .filter(|o| o.metric == UtilizationMetric::Sm)
            .map(|o| (o.time_s, o.value))
            .collect();
        assert_eq!(sm, vec![(1.0, 20.0), (2.0, 30.0)]);
    }

    #[test]
    fn test_record_row_serializes_with_csv_headers() {
        let row = RecordRow::new(0.5, MetricPair::new(Some(1.0), None));
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["Time (s)"], 0.5);
        assert_eq!(json["Memory (%)"], 1.0);
        assert!(json["SM (%)"].is_null());
    }
}
