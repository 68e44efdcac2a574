//! # recovlit Schema Definitions
//!
//! Apache Arrow schemas for the three output tables, plus the column-name
//! constants shared by the writer and the aggregation modules.
//!
//! ## Tables
//!
//! | Table | Columns |
//! |-------|---------|
//! | harmonized | publication_id, assay_method, drug_conc_ug_per_mL, recovery_pct, source_file, flag |
//! | tolerance_summary | publication_id, assay_method, min_recovery_window |
//! | bin_alignment | assay_method, bin, bin_lower, bin_upper, mean_recovery_pct, source |
//!
//! All numeric columns are Float64. Concentrations are µg/mL, recovery is
//! percent of the reference concentration. Column names match the source
//! CSV headers verbatim (including the `ug_per_mL` capitalization) so the
//! outputs line up with the literature extraction sheets.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaBuilder};

/// recovlit output format version - follows semantic versioning.
pub const RECOVLIT_FORMAT_VERSION: &str = "1.0.0";

/// Metadata key for the format version in the Parquet footer.
pub const KEY_FORMAT_VERSION: &str = "recovlit:format_version";

/// Metadata key for the logical table name in the Parquet footer.
pub const KEY_TABLE_NAME: &str = "recovlit:table";

/// Metadata key for the file creation timestamp (RFC 3339).
pub const KEY_CREATED: &str = "recovlit:created";

/// Column names as constants for type safety.
pub mod columns {
    /// Identifier of the source publication.
    pub const PUBLICATION_ID: &str = "publication_id";
    /// Canonicalized assay method label.
    pub const ASSAY_METHOD: &str = "assay_method";
    /// Drug concentration in µg/mL (header spelling from the source CSVs).
    pub const DRUG_CONC_UG_PER_ML: &str = "drug_conc_ug_per_mL";
    /// Recovery as a percentage of the reference concentration.
    pub const RECOVERY_PCT: &str = "recovery_pct";
    /// Provenance: name of the CSV file the row came from.
    pub const SOURCE_FILE: &str = "source_file";
    /// PASS/ALERT status column.
    pub const FLAG: &str = "flag";
    /// Minimum recovery inside the tolerance window.
    pub const MIN_RECOVERY_WINDOW: &str = "min_recovery_window";
    /// Concentration bin label.
    pub const BIN: &str = "bin";
    /// Lower edge of the concentration bin.
    pub const BIN_LOWER: &str = "bin_lower";
    /// Upper edge of the concentration bin.
    pub const BIN_UPPER: &str = "bin_upper";
    /// Mean recovery over the bin.
    pub const MEAN_RECOVERY_PCT: &str = "mean_recovery_pct";
    /// Provenance: literature vs simulation.
    pub const SOURCE: &str = "source";
}

fn with_table_metadata(schema: Schema, description: &str) -> Schema {
    let mut metadata = std::collections::HashMap::new();
    metadata.insert(
        KEY_FORMAT_VERSION.to_string(),
        RECOVLIT_FORMAT_VERSION.to_string(),
    );
    metadata.insert(
        "recovlit:schema_description".to_string(),
        description.to_string(),
    );
    schema.with_metadata(metadata)
}

/// Creates the schema for the harmonized observation table.
///
/// One row per literature observation that survived normalization, with
/// its derived pass/alert flag.
///
/// # Example
///
/// ```
/// use recovlit::schema::create_harmonized_schema;
///
/// let schema = create_harmonized_schema();
/// assert_eq!(schema.fields().len(), 6);
/// ```
pub fn create_harmonized_schema() -> Schema {
    let mut builder = SchemaBuilder::new();

    builder.push(Field::new(columns::PUBLICATION_ID, DataType::Utf8, false));
    builder.push(Field::new(columns::ASSAY_METHOD, DataType::Utf8, false));
    builder.push(Field::new(columns::DRUG_CONC_UG_PER_ML, DataType::Float64, false));
    builder.push(Field::new(columns::RECOVERY_PCT, DataType::Float64, false));
    builder.push(Field::new(columns::SOURCE_FILE, DataType::Utf8, false));
    builder.push(Field::new(columns::FLAG, DataType::Utf8, false));

    with_table_metadata(
        builder.finish(),
        "Normalized literature drug-recovery observations with pass/alert flags",
    )
}

/// Creates the schema for the tolerance summary table.
///
/// One row per (publication, method) group with at least one observation
/// inside the exposure-relevant window. An empty input produces a file
/// with this schema and zero rows.
pub fn create_tolerance_schema() -> Schema {
    let mut builder = SchemaBuilder::new();

    builder.push(Field::new(columns::PUBLICATION_ID, DataType::Utf8, false));
    builder.push(Field::new(columns::ASSAY_METHOD, DataType::Utf8, false));
    builder.push(Field::new(columns::MIN_RECOVERY_WINDOW, DataType::Float64, false));

    with_table_metadata(
        builder.finish(),
        "Worst-case recovery per publication and method inside the tolerance window",
    )
}

/// Creates the schema for the literature-vs-simulation bin alignment table.
pub fn create_bin_alignment_schema() -> Schema {
    let mut builder = SchemaBuilder::new();

    builder.push(Field::new(columns::ASSAY_METHOD, DataType::Utf8, false));
    builder.push(Field::new(columns::BIN, DataType::Utf8, false));
    builder.push(Field::new(columns::BIN_LOWER, DataType::Float64, false));
    builder.push(Field::new(columns::BIN_UPPER, DataType::Float64, false));
    builder.push(Field::new(columns::MEAN_RECOVERY_PCT, DataType::Float64, false));
    builder.push(Field::new(columns::SOURCE, DataType::Utf8, false));

    with_table_metadata(
        builder.finish(),
        "Mean recovery per concentration bin, literature vs simulation",
    )
}

/// Returns an Arc-wrapped harmonized schema for shared ownership.
pub fn create_harmonized_schema_arc() -> Arc<Schema> {
    Arc::new(create_harmonized_schema())
}

/// Returns an Arc-wrapped tolerance schema for shared ownership.
pub fn create_tolerance_schema_arc() -> Arc<Schema> {
    Arc::new(create_tolerance_schema())
}

/// Returns an Arc-wrapped bin alignment schema for shared ownership.
pub fn create_bin_alignment_schema_arc() -> Arc<Schema> {
    Arc::new(create_bin_alignment_schema())
}

/// Validates that a schema is compatible with the harmonized table format.
///
/// Returns `Ok(())` if the schema contains all required columns with
/// correct types, or an error describing the incompatibility.
pub fn validate_harmonized_schema(schema: &Schema) -> Result<(), SchemaValidationError> {
    let required_columns = [
        (columns::PUBLICATION_ID, DataType::Utf8),
        (columns::ASSAY_METHOD, DataType::Utf8),
        (columns::DRUG_CONC_UG_PER_ML, DataType::Float64),
        (columns::RECOVERY_PCT, DataType::Float64),
        (columns::SOURCE_FILE, DataType::Utf8),
        (columns::FLAG, DataType::Utf8),
    ];

    for (name, expected_type) in required_columns {
        match schema.field_with_name(name) {
            Ok(field) => {
                if field.data_type() != &expected_type {
                    return Err(SchemaValidationError::TypeMismatch {
                        column: name.to_string(),
                        expected: format!("{:?}", expected_type),
                        found: format!("{:?}", field.data_type()),
                    });
                }
            }
            Err(_) => {
                return Err(SchemaValidationError::MissingColumn(name.to_string()));
            }
        }
    }

    Ok(())
}

/// Errors that can occur during schema validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    /// A required column is absent.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A required column has the wrong Arrow type.
    #[error("Type mismatch for column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Expected Arrow type.
        expected: String,
        /// Type actually found.
        found: String,
    },
}
