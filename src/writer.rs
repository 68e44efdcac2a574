//! # Parquet Writer Module
//!
//! Serializes the derived tables to Parquet via Apache Arrow.
//!
//! ## Design Principles
//!
//! 1. **One file per table**: each derived view (harmonized, tolerance
//!    summary, bin alignment) is its own Parquet file with its own schema.
//!
//! 2. **Self-describing files**: the Parquet footer carries the format
//!    version, the logical table name, and a creation timestamp.
//!
//! 3. **Correct empty shapes**: an empty table still produces a file with
//!    the full schema and zero rows, so downstream readers see the
//!    declared columns.
//!
//! 4. **Configurable compression**: ZSTD (default), Snappy, or none.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, StringBuilder};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;

use crate::model::{BinAlignedRow, FlaggedObservation, ToleranceSummary};
use crate::schema::{
    create_bin_alignment_schema_arc, create_harmonized_schema_arc, create_tolerance_schema_arc,
    KEY_CREATED, KEY_FORMAT_VERSION, KEY_TABLE_NAME, RECOVLIT_FORMAT_VERSION,
};

/// Errors that can occur during writing.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O failure creating the output file or its parent directories.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow array or batch construction failure.
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet serialization failure.
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),
}

/// Compression options for output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD compression (recommended, best compression ratio).
    Zstd(i32),
    /// Snappy compression (faster, slightly larger files).
    Snappy,
    /// No compression.
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        // ZSTD level 3 is a good balance of speed and compression for
        // tables this size.
        Self::Zstd(3)
    }
}

/// Configuration for the Parquet writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression type to use.
    pub compression: CompressionType,

    /// Target row group size (rows per group). Literature tables are
    /// small, so this rarely matters, but it keeps large simulation
    /// exports well-formed.
    pub row_group_size: usize,

    /// Whether to write column statistics.
    pub write_statistics: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::default(),
            row_group_size: 100_000,
            write_statistics: true,
        }
    }
}

impl WriterConfig {
    fn to_writer_properties(&self, metadata: &HashMap<String, String>) -> WriterProperties {
        let compression = match self.compression {
            CompressionType::Zstd(level) => {
                Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or(ZstdLevel::default()))
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        };

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();

        WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size)
            .set_key_value_metadata(Some(kv_metadata))
            .build()
    }
}

/// A row type that can be serialized as one Parquet table.
pub trait RecoveryTable: Sized {
    /// Logical table name recorded in the Parquet footer.
    const TABLE_NAME: &'static str;

    /// The Arrow schema for this table.
    fn table_schema() -> Arc<Schema>;

    /// Convert a slice of rows into a single record batch.
    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, WriterError>;
}

impl RecoveryTable for FlaggedObservation {
    const TABLE_NAME: &'static str = "harmonized";

    fn table_schema() -> Arc<Schema> {
        create_harmonized_schema_arc()
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, WriterError> {
        let mut publication_id = StringBuilder::new();
        let mut assay_method = StringBuilder::new();
        let mut drug_conc = Float64Builder::with_capacity(rows.len());
        let mut recovery = Float64Builder::with_capacity(rows.len());
        let mut source_file = StringBuilder::new();
        let mut flag = StringBuilder::new();

        for row in rows {
            let obs = &row.observation;
            publication_id.append_value(&obs.publication_id);
            assay_method.append_value(obs.assay_method.as_str());
            drug_conc.append_value(obs.drug_conc_ug_per_ml);
            recovery.append_value(obs.recovery_pct);
            source_file.append_value(&obs.source_file);
            flag.append_value(row.flag.as_str());
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(publication_id.finish()),
            Arc::new(assay_method.finish()),
            Arc::new(drug_conc.finish()),
            Arc::new(recovery.finish()),
            Arc::new(source_file.finish()),
            Arc::new(flag.finish()),
        ];

        Ok(RecordBatch::try_new(Self::table_schema(), arrays)?)
    }
}

impl RecoveryTable for ToleranceSummary {
    const TABLE_NAME: &'static str = "tolerance_summary";

    fn table_schema() -> Arc<Schema> {
        create_tolerance_schema_arc()
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, WriterError> {
        let mut publication_id = StringBuilder::new();
        let mut assay_method = StringBuilder::new();
        let mut min_recovery = Float64Builder::with_capacity(rows.len());

        for row in rows {
            publication_id.append_value(&row.publication_id);
            assay_method.append_value(row.assay_method.as_str());
            min_recovery.append_value(row.min_recovery_window);
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(publication_id.finish()),
            Arc::new(assay_method.finish()),
            Arc::new(min_recovery.finish()),
        ];

        Ok(RecordBatch::try_new(Self::table_schema(), arrays)?)
    }
}

impl RecoveryTable for BinAlignedRow {
    const TABLE_NAME: &'static str = "bin_alignment";

    fn table_schema() -> Arc<Schema> {
        create_bin_alignment_schema_arc()
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, WriterError> {
        let mut assay_method = StringBuilder::new();
        let mut bin = StringBuilder::new();
        let mut bin_lower = Float64Builder::with_capacity(rows.len());
        let mut bin_upper = Float64Builder::with_capacity(rows.len());
        let mut mean_recovery = Float64Builder::with_capacity(rows.len());
        let mut source = StringBuilder::new();

        for row in rows {
            assay_method.append_value(row.assay_method.as_str());
            bin.append_value(&row.bin);
            bin_lower.append_value(row.bin_lower);
            bin_upper.append_value(row.bin_upper);
            mean_recovery.append_value(row.mean_recovery_pct);
            source.append_value(row.source.as_str());
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(assay_method.finish()),
            Arc::new(bin.finish()),
            Arc::new(bin_lower.finish()),
            Arc::new(bin_upper.finish()),
            Arc::new(mean_recovery.finish()),
            Arc::new(source.finish()),
        ];

        Ok(RecordBatch::try_new(Self::table_schema(), arrays)?)
    }
}

/// Write a table to a Parquet file, creating parent directories as needed.
///
/// An empty `rows` slice writes a schema-only file with zero rows, so the
/// output always has the declared columns. Returns the number of rows
/// written.
pub fn write_table<T: RecoveryTable>(
    rows: &[T],
    path: &Path,
    config: &WriterConfig,
) -> Result<usize, WriterError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut metadata = HashMap::new();
    metadata.insert(KEY_FORMAT_VERSION.to_string(), RECOVLIT_FORMAT_VERSION.to_string());
    metadata.insert(KEY_TABLE_NAME.to_string(), T::TABLE_NAME.to_string());
    metadata.insert(KEY_CREATED.to_string(), Utc::now().to_rfc3339());

    let props = config.to_writer_properties(&metadata);
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, T::table_schema(), Some(props))?;

    if !rows.is_empty() {
        writer.write(&T::to_record_batch(rows)?)?;
    }
    writer.close()?;

    debug!(
        "Wrote {} row(s) of table '{}' to {}",
        rows.len(),
        T::TABLE_NAME,
        path.display()
    );
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssayMethod, Flag, Observation, SourceKind};
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::tempdir;

    fn flagged(recovery: f64, flag: Flag) -> FlaggedObservation {
        FlaggedObservation {
            observation: Observation {
                publication_id: "p1".to_string(),
                assay_method: AssayMethod::Standard,
                drug_conc_ug_per_ml: 10.0,
                recovery_pct: recovery,
                source_file: "a.csv".to_string(),
            },
            flag,
        }
    }

    #[test]
    fn test_write_harmonized_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("harmonized.parquet");

        let rows = vec![flagged(95.0, Flag::Pass), flagged(60.0, Flag::Alert)];
        let written = write_table(&rows, &path, &WriterConfig::default()).unwrap();
        assert_eq!(written, 2);

        let file = File::open(&path).unwrap();
        let reader = SerializedFileReader::new(file).unwrap();
        let metadata = reader.metadata();
        assert_eq!(metadata.file_metadata().num_rows(), 2);
        assert_eq!(metadata.file_metadata().schema_descr().num_columns(), 6);

        let kv = metadata.file_metadata().key_value_metadata().unwrap();
        let table = kv.iter().find(|kv| kv.key == KEY_TABLE_NAME).unwrap();
        assert_eq!(table.value.as_deref(), Some("harmonized"));
    }

    #[test]
    fn test_empty_table_has_schema_and_zero_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tolerance_summary.parquet");

        let rows: Vec<ToleranceSummary> = Vec::new();
        let written = write_table(&rows, &path, &WriterConfig::default()).unwrap();
        assert_eq!(written, 0);

        let file = File::open(&path).unwrap();
        let reader = SerializedFileReader::new(file).unwrap();
        let metadata = reader.metadata();
        assert_eq!(metadata.file_metadata().num_rows(), 0);
        assert_eq!(metadata.file_metadata().schema_descr().num_columns(), 3);
    }

    #[test]
    fn test_write_bin_alignment_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin_alignment.parquet");

        let rows = vec![BinAlignedRow {
            assay_method: AssayMethod::PandA,
            bin: "(10, 50]".to_string(),
            bin_lower: 10.0,
            bin_upper: 50.0,
            mean_recovery_pct: 92.5,
            source: SourceKind::Simulation,
        }];

        write_table(&rows, &path, &WriterConfig::default()).unwrap();

        let file = File::open(&path).unwrap();
        let reader = SerializedFileReader::new(file).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 1);
    }

    #[test]
    fn test_compression_variants() {
        let dir = tempdir().unwrap();
        let rows = vec![flagged(95.0, Flag::Pass)];

        for (name, compression) in [
            ("zstd.parquet", CompressionType::Zstd(3)),
            ("snappy.parquet", CompressionType::Snappy),
            ("plain.parquet", CompressionType::Uncompressed),
        ] {
            let config = WriterConfig {
                compression,
                ..Default::default()
            };
            let path = dir.path().join(name);
            write_table(&rows, &path, &config).unwrap();
            assert!(path.is_file());
        }
    }
}
