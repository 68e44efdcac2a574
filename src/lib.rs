//! # recovlit - Drug-Recovery Literature Harmonization
//!
//! `recovlit` ingests literature-derived drug-recovery CSV data,
//! normalizes units and labels, flags pass/alert status, summarizes
//! tolerance windows, and compares against simulated recovery data binned
//! by concentration. Outputs are Apache Parquet tables readable by any
//! columnar tool.
//!
//! ## Key Features
//!
//! - **Coercion-to-missing cleaning**: unparseable numeric values drop
//!   the row rather than aborting the run; recovery is clipped into
//!   `[0, 100]` after the drop.
//!
//! - **Canonical assay vocabulary**: a fixed spelling map folds the
//!   observed label variants into `Standard` / `PandA`; anything else
//!   passes through unchanged.
//!
//! - **Conservative tolerance summary**: per (publication, method)
//!   minimum recovery inside a closed exposure-relevant window - a
//!   worst-case view, deliberately not a mean.
//!
//! - **Literature vs simulation alignment**: mean recovery per fixed
//!   concentration bin, tagged with provenance, with no interpolation or
//!   zero-filling.
//!
//! - **Self-describing Parquet output**: footer metadata carries the
//!   format version, table name, and creation timestamp; empty tables
//!   keep their declared schema.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recovlit::pipeline::{self, PipelineConfig};
//! use std::path::Path;
//!
//! let stats = pipeline::run(
//!     Path::new("data"),            // contains literature_sources/*.csv
//!     Some(Path::new("sim_reports")),
//!     Path::new("out"),
//!     &PipelineConfig::default(),
//! )?;
//! println!("kept {} rows", stats.normalize.rows_kept);
//! # Ok::<(), recovlit::pipeline::PipelineError>(())
//! ```
//!
//! This writes into `out/`:
//!
//! ```text
//! out/
//! ├── harmonized.parquet          # normalized observations + flags
//! ├── tolerance_summary.parquet   # worst-case recovery per group
//! ├── bin_alignment.parquet       # literature vs simulation by bin
//! └── run_summary.json            # row accounting for the run
//! ```
//!
//! ## Architecture
//!
//! The library is a chain of pure table transforms:
//!
//! - [`loader`]: CSV ingestion with provenance tagging
//! - [`normalize`]: numeric coercion, clipping, label canonicalization
//! - [`flag`]: pass/alert derivation against a cutoff
//! - [`tolerance`]: closed-window worst-case summary
//! - [`bins`]: fixed-edge binning and source alignment
//! - [`schema`] / [`writer`]: Arrow schemas and Parquet serialization
//! - [`pipeline`]: orchestration and run accounting
//! - [`config`]: optional TOML configuration file

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod bins;
pub mod config;
pub mod flag;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod tolerance;
pub mod writer;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::bins::{align_bins, BinEdges, BinError, DEFAULT_BIN_EDGES};
    pub use crate::config::{Config, ConfigError};
    pub use crate::flag::pass_alert_flag;
    pub use crate::loader::{load_all_sources, load_sim_recovery, LoaderError, RawObservation};
    pub use crate::model::{
        AssayMethod, BinAlignedRow, Flag, FlaggedObservation, Observation, RecoveryPoint,
        SourceKind, ToleranceSummary, DEFAULT_CUTOFF,
    };
    pub use crate::normalize::{normalize_units, NormalizeStats};
    pub use crate::pipeline::{PipelineConfig, PipelineError, PipelineStats};
    pub use crate::schema::{
        columns, create_bin_alignment_schema, create_harmonized_schema, create_tolerance_schema,
        validate_harmonized_schema, RECOVLIT_FORMAT_VERSION,
    };
    pub use crate::tolerance::{summarize_tolerance, ToleranceWindow};
    pub use crate::writer::{write_table, CompressionType, RecoveryTable, WriterConfig, WriterError};
}
