//! Pass/alert flagging of normalized observations.

use crate::model::{Flag, FlaggedObservation, Observation};

/// Flag each observation as PASS (`recovery_pct >= cutoff`) or ALERT.
///
/// Pure and stateless; re-derivable from the normalized table at any
/// time. The comparison is inclusive, so a row exactly at the cutoff is
/// a PASS. Use [`crate::model::DEFAULT_CUTOFF`] for the conventional
/// 80% threshold.
pub fn pass_alert_flag(observations: &[Observation], cutoff: f64) -> Vec<FlaggedObservation> {
    observations
        .iter()
        .map(|obs| FlaggedObservation {
            observation: obs.clone(),
            flag: if obs.recovery_pct >= cutoff {
                Flag::Pass
            } else {
                Flag::Alert
            },
        })
        .collect()
}
