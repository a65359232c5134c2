use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The input directory could not be enumerated
    #[error("Failed to list directory: {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file is not a PDF lopdf can load
    #[error("Failed to parse PDF: {name}")]
    Parse {
        name: String,
        #[source]
        source: lopdf::Error,
    },

    #[error("Failed to serialize {name}")]
    Serialize {
        name: String,
        #[source]
        source: lopdf::Error,
    },

    /// Internal invariant violation; the classifier never produces these
    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// The document structure is unusable (no catalog, no page tree, ...)
    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Background task failed")]
    Task(#[from] tokio::task::JoinError),
}
