//! Core row types for the harmonized recovery tables.
//!
//! Every table in the pipeline is a plain `Vec` of one of these row types.
//! Transforms never mutate rows in place; each stage produces a new vector.

use std::fmt;

/// Default pass/alert cutoff on `recovery_pct`. Ties go to PASS.
pub const DEFAULT_CUTOFF: f64 = 80.0;

/// Canonical assay method vocabulary.
///
/// Labels arriving from literature CSVs are spelled inconsistently; the
/// fixed map in [`AssayMethod::canonicalize`] folds the known variants into
/// the two canonical names. Anything outside the map passes through
/// unchanged as [`AssayMethod::Other`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssayMethod {
    /// Conventional drug-tolerance assay.
    Standard,
    /// Precipitation-and-acid (PandA) assay variant.
    PandA,
    /// Unrecognized label, preserved verbatim.
    Other(String),
}

impl AssayMethod {
    /// Fold a raw label into the canonical vocabulary.
    ///
    /// The map is intentionally a fixed list of observed spellings rather
    /// than a case-insensitive match: unknown casings are surfaced as
    /// [`AssayMethod::Other`] so they show up in the output instead of
    /// being silently merged.
    pub fn canonicalize(raw: &str) -> Self {
        match raw.trim() {
            "PandA" | "PANDA" | "Panda" | "pandA" => Self::PandA,
            "Standard" | "standard" | "STD" => Self::Standard,
            other => Self::Other(other.to_string()),
        }
    }

    /// Canonical string form, as written to output tables.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Standard => "Standard",
            Self::PandA => "PandA",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for AssayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass/alert status derived from `recovery_pct` against a cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Recovery at or above the cutoff.
    Pass,
    /// Recovery below the cutoff.
    Alert,
}

impl Flag {
    /// String form used in the `flag` output column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Alert => "ALERT",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance tag distinguishing literature rows from simulated rows in
/// the bin-aligned comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Row derived from a published literature source.
    Literature,
    /// Row derived from a simulation report.
    Simulation,
}

impl SourceKind {
    /// String form used in the `source` output column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literature => "literature",
            Self::Simulation => "simulation",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized literature observation.
///
/// Invariants (enforced by [`crate::normalize::normalize_units`]):
/// - `recovery_pct` is finite and within `[0, 100]`.
/// - `drug_conc_ug_per_ml` is a parsed number.
///
/// Rows violating these are dropped during normalization, never repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Identifier of the publication the row was extracted from.
    pub publication_id: String,
    /// Canonicalized assay method label.
    pub assay_method: AssayMethod,
    /// Drug concentration in µg/mL.
    pub drug_conc_ug_per_ml: f64,
    /// Measured recovery, percent of reference concentration.
    pub recovery_pct: f64,
    /// Name of the CSV file the row came from.
    pub source_file: String,
}

/// An [`Observation`] with its derived pass/alert status.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedObservation {
    /// The underlying normalized observation.
    pub observation: Observation,
    /// PASS iff `recovery_pct >= cutoff`.
    pub flag: Flag,
}

/// A simulated recovery data point loaded from a simulation report.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryPoint {
    /// Assay method, inferred from the report file name.
    pub assay_method: AssayMethod,
    /// Free drug concentration in µg/mL.
    pub drug_conc_ug_per_ml: f64,
    /// Simulated recovery percent.
    pub recovery_pct: f64,
}

/// Worst-case recovery per publication and method inside the
/// exposure-relevant concentration window.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceSummary {
    /// Publication identifier (first half of the grouping key).
    pub publication_id: String,
    /// Assay method (second half of the grouping key).
    pub assay_method: AssayMethod,
    /// Minimum `recovery_pct` observed inside the window.
    pub min_recovery_window: f64,
}

/// Mean recovery per (method, concentration bin, source).
#[derive(Debug, Clone, PartialEq)]
pub struct BinAlignedRow {
    /// Assay method the bin belongs to.
    pub assay_method: AssayMethod,
    /// Human-readable bin label, e.g. `"(10, 50]"`.
    pub bin: String,
    /// Lower edge of the bin.
    pub bin_lower: f64,
    /// Upper edge of the bin.
    pub bin_upper: f64,
    /// Mean `recovery_pct` over rows falling in the bin.
    pub mean_recovery_pct: f64,
    /// Whether the rows came from literature or simulation.
    pub source: SourceKind,
}
