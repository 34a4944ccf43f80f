//! Selection helpers over the raw table.
//!
//! These answer "what can be selected?" before a pipeline run: distinct pumps,
//! stage counts for a pump, test types for a pump/stage, and the measured
//! speed range used to suggest a rated speed.

use std::collections::BTreeSet;

use crate::domain::{COMMON_SPEEDS, SpeedSummary, TestTable};

/// Distinct pump identities, sorted.
pub fn pumps(table: &TestTable) -> Vec<String> {
    table
        .points()
        .iter()
        .map(|p| p.pump.as_str())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct stage counts recorded for any of `pumps`, sorted.
pub fn stages(table: &TestTable, pumps: &[String]) -> Vec<u32> {
    table
        .points()
        .iter()
        .filter(|p| pumps.contains(&p.pump))
        .filter_map(|p| p.stages)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct test types for `pump` at `stages`, sorted.
pub fn test_types(table: &TestTable, pump: &str, stages: u32) -> Vec<String> {
    table
        .points()
        .iter()
        .filter(|p| p.pump == pump && p.stages == Some(stages))
        .filter_map(|p| p.test_type.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Range and mean of valid measured speeds for `pump` at `stages`.
///
/// `None` when no row has a positive speed.
pub fn speed_summary(table: &TestTable, pump: &str, stages: u32) -> Option<SpeedSummary> {
    let speeds: Vec<f64> = table
        .points()
        .iter()
        .filter(|p| p.pump == pump && p.stages == Some(stages))
        .filter_map(|p| p.valid_speed())
        .collect();
    if speeds.is_empty() {
        return None;
    }

    let min = speeds.iter().copied().fold(f64::INFINITY, f64::min);
    let max = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
    Some(SpeedSummary {
        min,
        max,
        mean,
        common: COMMON_SPEEDS.to_vec(),
    })
}
