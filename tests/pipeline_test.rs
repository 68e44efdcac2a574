//! Integration tests for recovlit
//!
//! These tests verify the full pipeline from CSV input to Parquet output.

use std::fs::{self, File};

use arrow::array::{Float64Array, StringArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use tempfile::tempdir;

use recovlit::pipeline::{self, PipelineConfig, BIN_ALIGNMENT_FILE, HARMONIZED_FILE, TOLERANCE_FILE};
use recovlit::schema::{columns, KEY_FORMAT_VERSION};
use recovlit::tolerance::ToleranceWindow;

const HEADER: &str = "publication_id,assay_method,drug_conc_ug_per_mL,recovery_pct\n";

fn setup_sources(root: &std::path::Path) {
    let lit = root.join("literature_sources");
    fs::create_dir_all(&lit).unwrap();

    // Mixed labels, a clip case, and a dirty row.
    fs::write(
        lit.join("smith2021.csv"),
        format!(
            "{HEADER}\
             smith2021,Standard,10,95\n\
             smith2021,Standard,50,88\n\
             smith2021,PANDA,100,105\n"
        ),
    )
    .unwrap();
    fs::write(
        lit.join("zhou2023.csv"),
        format!(
            "{HEADER}\
             zhou2023,STD,1,99\n\
             zhou2023,pandA,10,62\n\
             zhou2023,pandA,n/a,70\n"
        ),
    )
    .unwrap();
}

fn setup_sim(root: &std::path::Path) {
    fs::write(
        root.join("recovery_standard.csv"),
        "drug_ugmL,recovery\n10,97\n100,91\n",
    )
    .unwrap();
    fs::write(
        root.join("recovery_panda.csv"),
        "drug_conc_ug_per_mL,recovery_pct\n10,99\n",
    )
    .unwrap();
}

/// Full run: two literature files plus simulation reports.
#[test]
fn test_full_pipeline_run() {
    let dir = tempdir().unwrap();
    setup_sources(dir.path());
    let sim = dir.path().join("sim");
    fs::create_dir_all(&sim).unwrap();
    setup_sim(&sim);

    let out = dir.path().join("out");
    let stats = pipeline::run(dir.path(), Some(&sim), &out, &PipelineConfig::default()).unwrap();

    assert_eq!(stats.source_files, 2);
    assert_eq!(stats.normalize.rows_in, 6);
    assert_eq!(stats.normalize.rows_kept, 5);
    assert_eq!(stats.normalize.rows_dropped, 1);
    assert_eq!(stats.normalize.recovery_clipped, 1);
    assert_eq!(stats.passes, 4);
    assert_eq!(stats.alerts, 1);
    assert_eq!(stats.sim_rows, 3);

    // Harmonized table: verify rows, schema width, and footer metadata.
    let file = File::open(out.join(HARMONIZED_FILE)).unwrap();
    let reader = SerializedFileReader::new(file).unwrap();
    let metadata = reader.metadata().file_metadata();
    assert_eq!(metadata.num_rows(), 5);
    assert_eq!(metadata.schema_descr().num_columns(), 6);

    let kv = metadata.key_value_metadata().unwrap();
    assert!(kv.iter().any(|entry| entry.key == KEY_FORMAT_VERSION));
}

/// Clipped and canonicalized values land in the harmonized output.
#[test]
fn test_harmonized_values() {
    let dir = tempdir().unwrap();
    setup_sources(dir.path());

    let out = dir.path().join("out");
    pipeline::run(dir.path(), None, &out, &PipelineConfig::default()).unwrap();

    let file = File::open(out.join(HARMONIZED_FILE)).unwrap();
    let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.next().unwrap().unwrap();

    let schema = batch.schema();
    let method_idx = schema.index_of(columns::ASSAY_METHOD).unwrap();
    let recovery_idx = schema.index_of(columns::RECOVERY_PCT).unwrap();
    let flag_idx = schema.index_of(columns::FLAG).unwrap();

    let methods = batch
        .column(method_idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    let recoveries = batch
        .column(recovery_idx)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    let flags = batch
        .column(flag_idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();

    // Row 2 of smith2021: "PANDA" at 105% recovery -> clipped, canonical, PASS.
    assert_eq!(methods.value(2), "PandA");
    assert_eq!(recoveries.value(2), 100.0);
    assert_eq!(flags.value(2), "PASS");

    // zhou2023 pandA row at 62% -> ALERT.
    assert_eq!(flags.value(4), "ALERT");

    for i in 0..batch.num_rows() {
        assert!(recoveries.value(i) >= 0.0 && recoveries.value(i) <= 100.0);
    }
}

/// A window with no observations still yields a correctly-shaped table.
#[test]
fn test_empty_tolerance_window_output() {
    let dir = tempdir().unwrap();
    setup_sources(dir.path());

    let config = PipelineConfig {
        // No observation sits in [500, 600].
        window: ToleranceWindow::new(500.0, 600.0),
        ..Default::default()
    };

    let out = dir.path().join("out");
    let stats = pipeline::run(dir.path(), None, &out, &config).unwrap();
    assert_eq!(stats.tolerance_groups, 0);

    let file = File::open(out.join(TOLERANCE_FILE)).unwrap();
    let reader = SerializedFileReader::new(file).unwrap();
    let metadata = reader.metadata().file_metadata();
    assert_eq!(metadata.num_rows(), 0);

    let column_names: Vec<_> = metadata
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(
        column_names,
        vec![
            columns::PUBLICATION_ID,
            columns::ASSAY_METHOD,
            columns::MIN_RECOVERY_WINDOW
        ]
    );
}

/// Bin alignment carries both provenance tags when simulation data exists.
#[test]
fn test_bin_alignment_sources() {
    let dir = tempdir().unwrap();
    setup_sources(dir.path());
    let sim = dir.path().join("sim");
    fs::create_dir_all(&sim).unwrap();
    setup_sim(&sim);

    let out = dir.path().join("out");
    pipeline::run(dir.path(), Some(&sim), &out, &PipelineConfig::default()).unwrap();

    let file = File::open(out.join(BIN_ALIGNMENT_FILE)).unwrap();
    let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.next().unwrap().unwrap();

    let source_idx = batch.schema().index_of(columns::SOURCE).unwrap();
    let sources = batch
        .column(source_idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();

    let mut seen: Vec<&str> = (0..batch.num_rows()).map(|i| sources.value(i)).collect();
    seen.dedup();
    assert_eq!(seen, vec!["literature", "simulation"]);
}

/// Without a simulation directory the alignment table is literature-only.
#[test]
fn test_pipeline_without_simulation() {
    let dir = tempdir().unwrap();
    setup_sources(dir.path());

    let out = dir.path().join("out");
    let stats = pipeline::run(dir.path(), None, &out, &PipelineConfig::default()).unwrap();

    assert_eq!(stats.sim_rows, 0);
    assert!(stats.bin_rows > 0);
}
