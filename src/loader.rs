//! CSV ingestion for literature sources and simulation reports.
//!
//! Two entry points:
//!
//! - [`load_all_sources`] reads every `literature_sources/*.csv` under a
//!   source directory into one combined record list, tagging each row with
//!   its origin file. Numeric fields are kept as raw strings here so that
//!   coercion semantics live entirely in [`crate::normalize`].
//! - [`load_sim_recovery`] reads the optional simulation reports
//!   (`recovery_standard.csv` / `recovery_panda.csv`), accepting the
//!   aliased column headers the simulator exports.
//!
//! A missing source directory or an empty glob is a fatal, user-visible
//! precondition failure; the error names the expected path.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::model::{AssayMethod, RecoveryPoint};
use crate::schema::columns;

/// Subdirectory of the source directory holding literature CSVs.
pub const LITERATURE_SUBDIR: &str = "literature_sources";

/// Simulation report file names probed by [`load_sim_recovery`].
pub const SIM_CANDIDATES: [&str; 2] = ["recovery_standard.csv", "recovery_panda.csv"];

/// Errors that can occur during CSV ingestion.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The literature directory is missing or contains no CSV files.
    #[error("No CSVs in {0}")]
    NoSources(PathBuf),

    /// I/O failure reading a source file or directory.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("CSV parsing error in {path}: {source}")]
    Csv {
        /// File being parsed.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from a source file's header.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn {
        /// The missing column name.
        column: String,
        /// File whose header was inspected.
        path: PathBuf,
    },
}

/// A literature row as read from disk, before numeric coercion.
///
/// The two numeric fields stay raw strings so that unparseable values can
/// be coerced to missing (and the row dropped) by the normalizer rather
/// than aborting the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    /// Publication identifier, verbatim.
    pub publication_id: String,
    /// Assay method label, verbatim (canonicalized later).
    pub assay_method: String,
    /// Drug concentration field, unparsed.
    pub drug_conc_ug_per_ml: String,
    /// Recovery field, unparsed.
    pub recovery_pct: String,
    /// Name of the CSV file the row came from.
    pub source_file: String,
}

fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    path: &Path,
) -> Result<usize, LoaderError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| LoaderError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })
}

fn field(record: &csv::StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").to_string()
}

/// Load and combine all literature source CSVs under `src_dir`.
///
/// Reads `src_dir/literature_sources/*.csv` in sorted order for
/// deterministic output, tagging every row with its origin file name.
/// Each file must carry the columns `publication_id`, `assay_method`,
/// `drug_conc_ug_per_mL`, and `recovery_pct`.
///
/// # Errors
///
/// [`LoaderError::NoSources`] if the directory is missing or holds no CSV
/// files; [`LoaderError::MissingColumn`] if a file lacks a required header.
pub fn load_all_sources(src_dir: &Path) -> Result<Vec<RawObservation>, LoaderError> {
    let lit_dir = src_dir.join(LITERATURE_SUBDIR);
    if !lit_dir.is_dir() {
        return Err(LoaderError::NoSources(lit_dir));
    }

    let entries = std::fs::read_dir(&lit_dir).map_err(|source| LoaderError::Io {
        path: lit_dir.clone(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(LoaderError::NoSources(lit_dir));
    }

    let mut rows = Vec::new();
    for path in &files {
        let count = load_literature_file(path, &mut rows)?;
        debug!("Loaded {} rows from {}", count, path.display());
    }

    info!(
        "Loaded {} rows from {} literature source file(s)",
        rows.len(),
        files.len()
    );
    Ok(rows)
}

fn load_literature_file(
    path: &Path,
    rows: &mut Vec<RawObservation>,
) -> Result<usize, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let publication_idx = column_index(&headers, columns::PUBLICATION_ID, path)?;
    let method_idx = column_index(&headers, columns::ASSAY_METHOD, path)?;
    let conc_idx = column_index(&headers, columns::DRUG_CONC_UG_PER_ML, path)?;
    let recovery_idx = column_index(&headers, columns::RECOVERY_PCT, path)?;

    let source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut count = 0;
    for record in reader.records() {
        let record = record.map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        rows.push(RawObservation {
            publication_id: field(&record, publication_idx),
            assay_method: field(&record, method_idx),
            drug_conc_ug_per_ml: field(&record, conc_idx),
            recovery_pct: field(&record, recovery_idx),
            source_file: source_file.clone(),
        });
        count += 1;
    }

    Ok(count)
}

/// Load simulated recovery points from a simulation report directory.
///
/// Probes for `recovery_standard.csv` and `recovery_panda.csv`; the assay
/// method is inferred from the file name (a "standard" substring means
/// Standard, otherwise PandA). Column headers may be the canonical
/// `drug_conc_ug_per_mL` / `recovery_pct` or the simulator's short forms
/// `drug_ugmL` / `recovery`.
///
/// Both files absent is not an error: the simulation comparison is
/// optional, and an empty vector is returned.
///
/// Rows with unparseable numeric fields are skipped, mirroring the
/// coercion-to-missing policy of the normalizer.
pub fn load_sim_recovery(sim_dir: &Path) -> Result<Vec<RecoveryPoint>, LoaderError> {
    let mut points = Vec::new();

    for name in SIM_CANDIDATES {
        let path = sim_dir.join(name);
        if !path.is_file() {
            continue;
        }

        let method = if name.contains("standard") {
            AssayMethod::Standard
        } else {
            AssayMethod::PandA
        };

        let count = load_sim_file(&path, method, &mut points)?;
        debug!("Loaded {} simulation rows from {}", count, path.display());
    }

    info!("Loaded {} simulation recovery point(s)", points.len());
    Ok(points)
}

fn load_sim_file(
    path: &Path,
    method: AssayMethod,
    points: &mut Vec<RecoveryPoint>,
) -> Result<usize, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    // Accept the simulator's aliased headers alongside the canonical ones.
    let conc_idx = column_index(&headers, columns::DRUG_CONC_UG_PER_ML, path)
        .or_else(|_| column_index(&headers, "drug_ugmL", path))
        .map_err(|_| LoaderError::MissingColumn {
            column: columns::DRUG_CONC_UG_PER_ML.to_string(),
            path: path.to_path_buf(),
        })?;
    let recovery_idx = column_index(&headers, columns::RECOVERY_PCT, path)
        .or_else(|_| column_index(&headers, "recovery", path))
        .map_err(|_| LoaderError::MissingColumn {
            column: columns::RECOVERY_PCT.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut count = 0;
    let mut skipped = 0;
    for record in reader.records() {
        let record = record.map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let conc = record.get(conc_idx).and_then(parse_numeric);
        let recovery = record.get(recovery_idx).and_then(parse_numeric);

        match (conc, recovery) {
            (Some(drug_conc_ug_per_ml), Some(recovery_pct)) => {
                points.push(RecoveryPoint {
                    assay_method: method.clone(),
                    drug_conc_ug_per_ml,
                    recovery_pct,
                });
                count += 1;
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(
            "Skipped {} unparseable simulation row(s) in {}",
            skipped,
            path.display()
        );
    }

    Ok(count)
}

fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_all_sources_combines_files() {
        let dir = tempdir().unwrap();
        let lit = dir.path().join(LITERATURE_SUBDIR);
        fs::create_dir_all(&lit).unwrap();

        let header = "publication_id,assay_method,drug_conc_ug_per_mL,recovery_pct\n";
        write_csv(&lit, "a.csv", &format!("{header}p1,Standard,10,95\np1,Standard,50,88\np2,PANDA,100,70\n"));
        write_csv(&lit, "b.csv", &format!("{header}p3,STD,1,99\np3,STD,10,90\np3,pandA,10,60\n"));

        let rows = load_all_sources(dir.path()).unwrap();
        assert_eq!(rows.len(), 6);

        let sources: std::collections::BTreeSet<_> =
            rows.iter().map(|r| r.source_file.as_str()).collect();
        assert_eq!(sources.len(), 2);
        assert!(sources.contains("a.csv"));
        assert!(sources.contains("b.csv"));

        // Sorted file order: a.csv rows come first.
        assert_eq!(rows[0].publication_id, "p1");
        assert_eq!(rows[0].recovery_pct, "95");
    }

    #[test]
    fn test_missing_directory_fails_loudly() {
        let dir = tempdir().unwrap();
        let err = load_all_sources(dir.path()).unwrap_err();
        match err {
            LoaderError::NoSources(path) => {
                assert!(path.ends_with(LITERATURE_SUBDIR));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_directory_fails_loudly() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(LITERATURE_SUBDIR)).unwrap();
        assert!(matches!(
            load_all_sources(dir.path()),
            Err(LoaderError::NoSources(_))
        ));
    }

    #[test]
    fn test_missing_column_names_file_and_column() {
        let dir = tempdir().unwrap();
        let lit = dir.path().join(LITERATURE_SUBDIR);
        fs::create_dir_all(&lit).unwrap();
        write_csv(&lit, "bad.csv", "publication_id,assay_method,recovery_pct\np1,Standard,90\n");

        let err = load_all_sources(dir.path()).unwrap_err();
        match err {
            LoaderError::MissingColumn { column, path } => {
                assert_eq!(column, columns::DRUG_CONC_UG_PER_ML);
                assert!(path.ends_with("bad.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sim_loader_infers_method_and_aliases() {
        let dir = tempdir().unwrap();
        write_csv(
            dir.path(),
            "recovery_standard.csv",
            "drug_ugmL,recovery\n10,95\n100,85\n",
        );
        write_csv(
            dir.path(),
            "recovery_panda.csv",
            "drug_conc_ug_per_mL,recovery_pct\n10,99\n",
        );

        let points = load_sim_recovery(dir.path()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].assay_method, AssayMethod::Standard);
        assert_eq!(points[0].drug_conc_ug_per_ml, 10.0);
        assert_eq!(points[2].assay_method, AssayMethod::PandA);
        assert_eq!(points[2].recovery_pct, 99.0);
    }

    #[test]
    fn test_sim_loader_empty_when_no_reports() {
        let dir = tempdir().unwrap();
        let points = load_sim_recovery(dir.path()).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_sim_loader_skips_unparseable_rows() {
        let dir = tempdir().unwrap();
        write_csv(
            dir.path(),
            "recovery_standard.csv",
            "drug_ugmL,recovery\n10,95\nnot_a_number,85\n50,\n",
        );

        let points = load_sim_recovery(dir.path()).unwrap();
        assert_eq!(points.len(), 1);
    }
}
