//! Error types for featureio

use thiserror::Error;

/// Result type alias for featureio operations
pub type Result<T> = std::result::Result<T, FioError>;

#[derive(Debug, Error)]
pub enum FioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} does not exist")]
    MissingFasta(String),

    /// The `.fai` next to a FASTA file is absent
    #[error("No {0} found! Indexed fasta files require an index. See `featureio fa index` for help.")]
    MissingIndex(String),

    #[error("Malformed fasta index record. Expected 5 fields but got {fields}. Offending line was:\n{line}")]
    MalformedIndex { fields: usize, line: String },

    #[error("Malformed fasta {path}: {msg}")]
    MalformedFasta { path: String, msg: String },

    #[error("Non-unique sequence name {name} in {path}")]
    DuplicateName { name: String, path: String },

    #[error("Key collision: sequence name {0} appears more than once.")]
    KeyCollision(String),

    #[error("No such sequence {name} in {source_name}")]
    NotFound { name: String, source_name: String },

    /// 0-based half-open coordinates outside of a sequence
    #[error("Invalid range {start}-{end} for {name} of length {length}")]
    OutOfRange {
        name: String,
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("Incorrect feature on line {line}: {msg}")]
    MalformedFeature { line: usize, msg: String },

    #[error("Unknown format {format}. Should be one of {valid}")]
    UnknownFormat { format: String, valid: String },
}
