use crate::container::ContainerError;
use crate::ids::{RecordId, RecordKind, SourceId, UnknownSubsystem};
use crate::payload::PayloadError;

/// Errors that can occur while indexing or querying a raw data file
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The container could not be opened
    #[error("File open failure: {file}: {source}")]
    OpenFailure {
        /// File that was being opened
        file: String,
        /// Underlying container failure
        #[source]
        source: ContainerError,
    },

    /// Declared record type disagrees with the layout's record prefix
    #[error("Bad record type: file declares {declared}, layout expects {expected}")]
    SchemaMismatch {
        /// Value of the `record_type` attribute
        declared: String,
        /// Record prefix from the file layout
        expected: String,
    },

    /// A trigger-record accessor was used on a time-slice file or vice versa
    #[error("Wrong record type requested: {requested}, file holds {actual}")]
    WrongRecordTypeRequested {
        /// Kind the caller asked for
        requested: RecordKind,
        /// Record prefix of the file
        actual: String,
    },

    /// The record id is not among the file's records
    #[error("Record ID not found: {0}")]
    RecordNotFound(RecordId),

    /// A path expected to be a group is not one
    #[error("Invalid group: {0}")]
    InvalidGroup(String),

    /// A path expected to be a dataset is not one
    #[error("Invalid dataset: {path} in {file}")]
    InvalidDataset {
        /// Dataset path
        path: String,
        /// File being read
        file: String,
    },

    /// The operation needs a newer schema version
    #[error("Incompatible file layout version {version}, supported range is {min}..={max}")]
    IncompatibleVersion {
        /// Version of the file
        version: u32,
        /// Oldest supported version
        min: u32,
        /// Newest supported version
        max: u32,
    },

    /// The record has no dataset for the source id
    #[error("No dataset for source id {source_id} in record {record}")]
    SourceIdNotFound {
        /// Record that was searched
        record: RecordId,
        /// Source id that was requested
        source_id: SourceId,
    },

    /// A root child carries the record prefix but no parseable number
    #[error("Invalid record group name: {0}")]
    InvalidRecordName(String),

    /// Subsystem name could not be resolved
    #[error(transparent)]
    UnknownSubsystem(#[from] UnknownSubsystem),

    /// Failure reported by the container
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Payload parser rejected a dataset
    #[error("Cannot parse payload at {path}: {source}")]
    Payload {
        /// Dataset path
        path: String,
        /// Parser failure
        #[source]
        source: PayloadError,
    },

    /// Configuration file could not be read
    #[error("Cannot read config file {path}: {source}")]
    ConfigRead {
        /// Config file path
        path: String,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}
