use std::{io, path::PathBuf, result::Result as StdResult, string::FromUtf8Error};

use thiserror::Error;

/// A shared `Result` type for `viewer-build`.
pub type Result<T> = StdResult<T, Error>;

/// Errors for `viewer-build`.
#[derive(Debug, Error)]
pub enum Error {
    /// A filesystem error.
    #[error("io error at {path}: {source}")]
    Io {
        /// The relevant path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A file that should be UTF-8 was not.
    #[error("utf-8 error at {path}: {source}")]
    Utf8 {
        /// The relevant path.
        path: PathBuf,
        /// The underlying error.
        source: FromUtf8Error,
    },

    /// The default configuration could not be read or is not valid JSON.
    #[error("invalid default config {path}:\n{}", source.pretty())]
    InvalidConfig {
        /// The config file.
        path: PathBuf,
        /// The underlying read or parse error.
        source: viewer_config::Error,
    },

    /// The default configuration is the JSON literal `null`.
    #[error("default config {path} is null; embed a real configuration")]
    NullConfig {
        /// The config file.
        path: PathBuf,
    },

    /// A module was listed more than once.
    #[error("module {name} is listed more than once")]
    DuplicateModule {
        /// The repeated module name.
        name: String,
    },

    /// The module list was empty.
    #[error("no modules to bundle")]
    NoModules,

    /// The engine name cannot be referenced from script.
    #[error("engine name {name:?} is not a valid script identifier")]
    InvalidEngineName {
        /// The rejected name.
        name: String,
    },

    /// The async runtime for `resolve` could not be started.
    #[error("failed to start runtime: {source}")]
    Runtime {
        /// The underlying error.
        source: io::Error,
    },

    /// The HTTP client could not be created.
    #[error("{0}")]
    Transport(#[from] viewer_bootstrap::TransportError),

    /// The resolver ended on the setup surface.
    #[error("no configuration resolved (state: {state})")]
    Unresolved {
        /// Final state name.
        state: &'static str,
    },
}
