//! Worst-case recovery summary over the exposure-relevant window.

use std::collections::BTreeMap;

use crate::model::{AssayMethod, Observation, ToleranceSummary};

/// Closed concentration interval considered exposure-relevant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceWindow {
    /// Inclusive lower bound, µg/mL.
    pub low: f64,
    /// Inclusive upper bound, µg/mL.
    pub high: f64,
}

impl ToleranceWindow {
    /// Construct a window from its inclusive bounds.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether a concentration falls inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

impl Default for ToleranceWindow {
    /// The conventional exposure-relevant window, 10-200 µg/mL.
    fn default() -> Self {
        Self::new(10.0, 200.0)
    }
}

/// Compute the minimum recovery per (publication, method) inside `window`.
///
/// The aggregation is a minimum, not a mean: the summary is a
/// conservative worst-case view of assay performance in the window.
/// Groups with no observations in the window are absent; an input with no
/// rows in the window yields an empty vector (the writer still emits the
/// correct schema). Output order is deterministic (sorted by publication,
/// then method).
pub fn summarize_tolerance(
    observations: &[Observation],
    window: ToleranceWindow,
) -> Vec<ToleranceSummary> {
    let mut groups: BTreeMap<(String, AssayMethod), f64> = BTreeMap::new();

    for obs in observations {
        if !window.contains(obs.drug_conc_ug_per_ml) {
            continue;
        }
        let key = (obs.publication_id.clone(), obs.assay_method.clone());
        groups
            .entry(key)
            .and_modify(|min| *min = min.min(obs.recovery_pct))
            .or_insert(obs.recovery_pct);
    }

    groups
        .into_iter()
        .map(|((publication_id, assay_method), min_recovery_window)| ToleranceSummary {
            publication_id,
            assay_method,
            min_recovery_window,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(publication_id: &str, method: AssayMethod, conc: f64, recovery: f64) -> Observation {
        Observation {
            publication_id: publication_id.to_string(),
            assay_method: method,
            drug_conc_ug_per_ml: conc,
            recovery_pct: recovery,
            source_file: "test.csv".to_string(),
        }
    }

    #[test]
    fn test_minimum_per_group() {
        let observations = vec![
            obs("p1", AssayMethod::Standard, 10.0, 95.0),
            obs("p1", AssayMethod::Standard, 50.0, 88.0),
            obs("p1", AssayMethod::PandA, 50.0, 99.0),
            obs("p2", AssayMethod::Standard, 100.0, 70.0),
        ];

        let summary = summarize_tolerance(&observations, ToleranceWindow::default());
        assert_eq!(summary.len(), 3);

        let p1_std = summary
            .iter()
            .find(|s| s.publication_id == "p1" && s.assay_method == AssayMethod::Standard)
            .unwrap();
        assert_eq!(p1_std.min_recovery_window, 88.0);
    }

    #[test]
    fn test_window_is_closed_interval() {
        let observations = vec![
            obs("p1", AssayMethod::Standard, 5.0, 10.0),   // below: excluded
            obs("p1", AssayMethod::Standard, 10.0, 90.0),  // at low edge: included
            obs("p1", AssayMethod::Standard, 200.0, 85.0), // at high edge: included
            obs("p1", AssayMethod::Standard, 201.0, 5.0),  // above: excluded
        ];

        let summary = summarize_tolerance(&observations, ToleranceWindow::default());
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].min_recovery_window, 85.0);
    }

    #[test]
    fn test_empty_window_yields_empty_summary() {
        let observations = vec![obs("p1", AssayMethod::Standard, 5.0, 90.0)];
        let summary = summarize_tolerance(&observations, ToleranceWindow::default());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_deterministic_order() {
        let observations = vec![
            obs("p2", AssayMethod::Standard, 50.0, 80.0),
            obs("p1", AssayMethod::PandA, 50.0, 80.0),
            obs("p1", AssayMethod::Standard, 50.0, 80.0),
        ];

        let summary = summarize_tolerance(&observations, ToleranceWindow::default());
        assert_eq!(summary[0].publication_id, "p1");
        assert_eq!(summary[0].assay_method, AssayMethod::Standard);
        assert_eq!(summary[1].assay_method, AssayMethod::PandA);
        assert_eq!(summary[2].publication_id, "p2");
    }
}
