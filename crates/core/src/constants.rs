/// Attribute carrying the pre-restore identity of a position or trade
pub const REGRESSION_ID_ATTRIBUTE: &str = "regressionId";

/// Type-less identifier of the persisted id mapping record
pub const ID_MAPPINGS_IDENTIFIER: &str = "idMappings";

/// Default tolerance for numeric comparisons
pub const DEFAULT_DELTA: f64 = 1e-6;

/// Default directory holding golden copies
pub const DEFAULT_GOLDEN_COPY_DIR: &str = "golden_copy";

/// Version stamped into every golden copy
pub const GOLDEN_COPY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension written by the JSON codec
pub const JSON_FILE_EXTENSION: &str = ".json";

/// Suffix of an archive that is still being written
pub const PARTIAL_ARCHIVE_SUFFIX: &str = ".partial";
