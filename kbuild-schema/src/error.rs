use kbuild_core::TreeError;
use thiserror::Error;

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON")]
    Parse(#[source] serde_json::Error),

    #[error("invalid reference '{0}': only local references starting with '#/' are supported")]
    InvalidRef(String),

    #[error("reference '{0}' does not point to a schema node")]
    UnresolvedRef(String),

    #[error("reference cycle detected while resolving '{0}'")]
    RefCycle(String),

    #[error("unknown schema property '{0}'")]
    UnknownProperty(String),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{name}' expects JSON text")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("the schema itself is invalid: {0}")]
    InvalidSchema(String),

    #[error("configuration does not match the schema:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
