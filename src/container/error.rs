/// Errors raised by a [`Container`](super::Container) implementation
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The container could not be opened
    #[error("cannot open container {path}: {source}")]
    Open {
        /// Location that was opened
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// JSON snapshot could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No group or dataset exists at the path
    #[error("no object at path: {0}")]
    NotFound(String),

    /// The path resolves to a dataset where a group was expected
    #[error("not a group: {0}")]
    NotAGroup(String),

    /// The path resolves to a group where a dataset was expected
    #[error("not a dataset: {0}")]
    NotADataset(String),

    /// An attribute exists but holds a value of another type
    #[error("attribute {name} on {path} is not {expected}")]
    AttributeType {
        /// Object carrying the attribute
        path: String,
        /// Attribute name
        name: String,
        /// Type that was requested
        expected: &'static str,
    },

    /// Caller supplied a buffer of the wrong length
    #[error("buffer for {path} holds {actual} bytes, dataset holds {expected}")]
    BufferSize {
        /// Dataset path
        path: String,
        /// Dataset byte size
        expected: usize,
        /// Buffer length
        actual: usize,
    },

    /// An object would be created on top of an incompatible one
    #[error("path conflict: {0}")]
    PathConflict(String),
}
