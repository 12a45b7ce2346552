use std::path::PathBuf;

use kbuild_schema::SchemaError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{}'", path.display())]
    #[diagnostic(help("pass the configuration file with '--config <path>'"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {filename}")]
    #[diagnostic(code(kbuild::parse_error))]
    Parse {
        filename: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("'{}' has no [{section}] section", path.display())]
    #[diagnostic(
        code(kbuild::missing_section),
        help("add a [{section}] table with at least 'inputDir'")
    )]
    MissingSection { path: PathBuf, section: String },

    #[error("invalid configuration")]
    #[diagnostic(code(kbuild::schema))]
    Schema(#[source] SchemaError),

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(kbuild::invalid_config))]
    Invalid { message: String },

    #[error("failed to scan '{}' for specifications", path.display())]
    #[diagnostic(code(kbuild::scan))]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a parse error from a toml error with source context
    pub fn parse(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            filename: filename.to_string(),
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    /// Create an invalid-configuration error
    pub fn invalid(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Invalid {
            message: message.into(),
        })
    }
}

impl From<SchemaError> for Box<Error> {
    fn from(err: SchemaError) -> Self {
        Box::new(Error::Schema(err))
    }
}
