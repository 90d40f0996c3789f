//! Nsight Compute CSV output parsing
//!
//! `ncu --csv` prints its own log lines first, then one CSV row per collected
//! metric. Only the "GPU Speed Of Light" throughput rows are of interest here.

use helicorder_shared::types::profile::{MetricPair, UtilizationMetric};
use tracing::debug;

/// Section holding the throughput summary
pub const SPEED_OF_LIGHT_SECTION: &str = "GPU Speed Of Light";

/// First header cell of the CSV payload
const CSV_HEADER_MARKER: &str = "\"ID\"";

const SECTION_COLUMN: &str = "Section Name";
const METRIC_NAME_COLUMN: &str = "Metric Name";
const METRIC_VALUE_COLUMN: &str = "Metric Value";

/// Extract memory and SM throughput from `ncu --csv` output.
///
/// Never fails: anything that cannot be found or parsed is left as `None`
/// for the caller to report. When a metric appears more than once the last
/// parsable value wins.
pub fn parse_speed_of_light(output: &str) -> MetricPair {
    let mut pair = MetricPair::default();

    let Some(start) = output.find(CSV_HEADER_MARKER) else {
        debug!("No CSV payload in profiler output");
        return pair;
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(output[start..].as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            debug!("Unreadable CSV header in profiler output: {}", e);
            return pair;
        }
    };
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (Some(section_col), Some(name_col), Some(value_col)) = (
        column(SECTION_COLUMN),
        column(METRIC_NAME_COLUMN),
        column(METRIC_VALUE_COLUMN),
    ) else {
        debug!("Profiler CSV lacks section/metric columns: {:?}", headers);
        return pair;
    };

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping malformed profiler CSV row: {}", e);
                continue;
            }
        };

        if record.get(section_col) != Some(SPEED_OF_LIGHT_SECTION) {
            continue;
        }

        let (Some(name), Some(raw)) = (record.get(name_col), record.get(value_col)) else {
            continue;
        };
        let Some(metric) = UtilizationMetric::ALL
            .into_iter()
            .find(|m| m.ncu_metric_name() == name)
        else {
            continue;
        };

        match parse_metric_value(raw) {
            Some(value) => match metric {
                UtilizationMetric::Memory => pair.memory = Some(value),
                UtilizationMetric::Sm => pair.sm = Some(value),
            },
            None => debug!("Unparsable value {:?} for {}", raw, name),
        }
    }

    pair
}

/// Parse a metric cell, tolerating thousands separators
pub fn parse_metric_value(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
