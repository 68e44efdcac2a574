//! Unit and label normalization for raw literature rows.
//!
//! Coercion policy: the two numeric fields are parsed as `f64`; values
//! that fail to parse (or parse to NaN) count as missing, and a row
//! missing either field is dropped. Dropped rows are never repaired.
//! Clipping of `recovery_pct` into `[0, 100]` happens after the drop, so
//! it can never rescue a dropped row.

use log::{debug, info};
use serde::Serialize;

use crate::loader::RawObservation;
use crate::model::{AssayMethod, Observation};

/// Row accounting for one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    /// Rows received from the loader.
    pub rows_in: usize,
    /// Rows surviving numeric coercion.
    pub rows_kept: usize,
    /// Rows dropped because a numeric field was unparseable or missing.
    pub rows_dropped: usize,
    /// Rows whose `recovery_pct` was clipped into `[0, 100]`.
    pub recovery_clipped: usize,
}

fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Normalize a batch of raw rows into [`Observation`]s.
///
/// Per row:
/// 1. Coerce `recovery_pct` and `drug_conc_ug_per_mL` to numbers; drop
///    the row if either is missing after coercion.
/// 2. Clip `recovery_pct` into `[0, 100]`.
/// 3. Canonicalize the assay method label via
///    [`AssayMethod::canonicalize`]; unmapped labels pass through.
pub fn normalize_units(records: Vec<RawObservation>) -> (Vec<Observation>, NormalizeStats) {
    let mut stats = NormalizeStats {
        rows_in: records.len(),
        ..Default::default()
    };

    let mut observations = Vec::with_capacity(records.len());
    for record in records {
        let recovery = parse_numeric(&record.recovery_pct);
        let conc = parse_numeric(&record.drug_conc_ug_per_ml);

        let (Some(recovery_pct), Some(drug_conc_ug_per_ml)) = (recovery, conc) else {
            stats.rows_dropped += 1;
            debug!(
                "Dropping row from {} (publication {}): unparseable numeric field",
                record.source_file, record.publication_id
            );
            continue;
        };

        let clipped = recovery_pct.clamp(0.0, 100.0);
        if clipped != recovery_pct {
            stats.recovery_clipped += 1;
        }

        observations.push(Observation {
            publication_id: record.publication_id,
            assay_method: AssayMethod::canonicalize(&record.assay_method),
            drug_conc_ug_per_ml,
            recovery_pct: clipped,
            source_file: record.source_file,
        });
    }

    stats.rows_kept = observations.len();
    info!(
        "Normalized {} rows: kept {}, dropped {}, clipped {}",
        stats.rows_in, stats.rows_kept, stats.rows_dropped, stats.recovery_clipped
    );

    (observations, stats)
}
