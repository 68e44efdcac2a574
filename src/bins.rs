//! Concentration binning and literature-vs-simulation alignment.
//!
//! Concentrations are bucketed into fixed-edge bins; the first bin is a
//! closed interval (lowest edge inclusive), every other bin is half-open
//! `(lo, hi]`. Values outside `[min edge, max edge]` are excluded
//! silently, and bins with zero rows for a method are simply absent from
//! the output - no interpolation, no zero-filling, no smoothing.

use std::collections::BTreeMap;

use crate::model::{AssayMethod, BinAlignedRow, Observation, RecoveryPoint, SourceKind};

/// Conventional concentration bin edges in µg/mL.
pub const DEFAULT_BIN_EDGES: [f64; 7] = [0.1, 1.0, 10.0, 50.0, 100.0, 200.0, 800.0];

/// Errors from constructing a [`BinEdges`] set.
#[derive(Debug, thiserror::Error)]
pub enum BinError {
    /// Fewer than two edges were supplied.
    #[error("Need at least two bin edges, got {0}")]
    TooFewEdges(usize),

    /// An edge is not strictly greater than its predecessor.
    #[error("Bin edges must be strictly increasing (violated at index {0})")]
    NotIncreasing(usize),

    /// An edge is NaN or infinite.
    #[error("Bin edge at index {0} is not a finite number")]
    NotFinite(usize),
}

/// A validated, strictly increasing set of bin edges.
#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// Validate and wrap a set of edges.
    pub fn new(edges: Vec<f64>) -> Result<Self, BinError> {
        if edges.len() < 2 {
            return Err(BinError::TooFewEdges(edges.len()));
        }
        for (i, edge) in edges.iter().enumerate() {
            if !edge.is_finite() {
                return Err(BinError::NotFinite(i));
            }
            if i > 0 && *edge <= edges[i - 1] {
                return Err(BinError::NotIncreasing(i));
            }
        }
        Ok(Self { edges })
    }

    /// Number of bins (one fewer than the number of edges).
    pub fn num_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Lower and upper edge of bin `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_bins()`.
    pub fn bounds(&self, index: usize) -> (f64, f64) {
        (self.edges[index], self.edges[index + 1])
    }

    /// Assign a concentration to a bin.
    ///
    /// The first bin includes its lower edge; all bins include their
    /// upper edge. Returns `None` for values outside the edge range and
    /// for non-finite values.
    pub fn assign(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if value < first || value > last {
            return None;
        }
        if value == first {
            return Some(0);
        }
        // value is in (first, last]; find i with edges[i] < value <= edges[i+1].
        for i in 0..self.num_bins() {
            if value > self.edges[i] && value <= self.edges[i + 1] {
                return Some(i);
            }
        }
        None
    }

    /// Human-readable label for bin `index`, e.g. `"(10, 50]"`.
    ///
    /// The first bin is rendered with a closed lower bound, `"[0.1, 1]"`.
    pub fn label(&self, index: usize) -> String {
        let (lo, hi) = self.bounds(index);
        if index == 0 {
            format!("[{lo}, {hi}]")
        } else {
            format!("({lo}, {hi}]")
        }
    }
}

impl Default for BinEdges {
    fn default() -> Self {
        // The constant is known-good; skip revalidation.
        Self {
            edges: DEFAULT_BIN_EDGES.to_vec(),
        }
    }
}

fn bin_table<'a, I>(rows: I, edges: &BinEdges, source: SourceKind) -> Vec<BinAlignedRow>
where
    I: Iterator<Item = (&'a AssayMethod, f64, f64)>,
{
    let mut groups: BTreeMap<(AssayMethod, usize), (f64, usize)> = BTreeMap::new();

    for (method, conc, recovery) in rows {
        let Some(bin) = edges.assign(conc) else {
            continue;
        };
        let entry = groups.entry((method.clone(), bin)).or_insert((0.0, 0));
        entry.0 += recovery;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((assay_method, index), (sum, count))| {
            let (bin_lower, bin_upper) = edges.bounds(index);
            BinAlignedRow {
                bin: edges.label(index),
                assay_method,
                bin_lower,
                bin_upper,
                mean_recovery_pct: sum / count as f64,
                source,
            }
        })
        .collect()
}

/// Bin both tables by concentration and compute mean recovery per
/// (method, bin), tagging provenance.
///
/// The output is the literature aggregation followed by the simulation
/// aggregation, concatenated row-wise. Within each source, rows are
/// sorted by method and bin.
pub fn align_bins(
    literature: &[Observation],
    simulation: &[RecoveryPoint],
    edges: &BinEdges,
) -> Vec<BinAlignedRow> {
    let mut out = bin_table(
        literature
            .iter()
            .map(|o| (&o.assay_method, o.drug_conc_ug_per_ml, o.recovery_pct)),
        edges,
        SourceKind::Literature,
    );
    out.extend(bin_table(
        simulation
            .iter()
            .map(|p| (&p.assay_method, p.drug_conc_ug_per_ml, p.recovery_pct)),
        edges,
        SourceKind::Simulation,
    ));
    out
}
