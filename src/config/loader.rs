//! Reading query files from disk or memory.
//!
//! Loading goes TOML -> [`QueryConfig`] -> validation. The `compile_*`
//! entry points go one step further and build the [`PredicateQuery`], so a
//! bad capture name or regex in a file is reported against that file.

use crate::config::schema::{QueryConfig, ValidationError};
use crate::ts::{PredicateCursor, PredicateQuery, TreeSitterError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read query file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse query file{}: {source}", location(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("invalid query file{}: {source}", location(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },

    #[error("query file{} does not compile: {source}", location(.path))]
    Compile {
        path: Option<PathBuf>,
        #[source]
        source: TreeSitterError,
    },
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}

impl ConfigError {
    /// The file the error came from, when loaded from disk.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Toml { path, .. } | Self::Validation { path, .. } | Self::Compile { path, .. } => {
                path.as_deref()
            }
        }
    }

    fn at(mut self, file: &Path) -> Self {
        if let Self::Toml { path, .. } | Self::Validation { path, .. } | Self::Compile { path, .. } =
            &mut self
        {
            path.get_or_insert_with(|| file.to_path_buf());
        }
        self
    }
}

/// A query file together with its compiled query.
#[derive(Debug)]
pub struct CompiledQuery {
    pub config: QueryConfig,
    pub query: PredicateQuery,
}

impl CompiledQuery {
    /// A cursor carrying the file's `[cursor]` settings.
    pub fn cursor(&self) -> PredicateCursor {
        PredicateCursor::with_config(&self.config.cursor)
    }
}

pub fn load_from_str(input: &str) -> Result<QueryConfig, ConfigError> {
    let config: QueryConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<QueryConfig, ConfigError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading query file");
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.at(path))
}

/// Load, validate and compile a query file held in memory.
pub fn compile_from_str(input: &str) -> Result<CompiledQuery, ConfigError> {
    compile(load_from_str(input)?)
}

/// Load, validate and compile a query file from disk.
pub fn compile_from_path(path: impl AsRef<Path>) -> Result<CompiledQuery, ConfigError> {
    let path = path.as_ref();
    compile(load_from_path(path)?).map_err(|error| error.at(path))
}

fn compile(config: QueryConfig) -> Result<CompiledQuery, ConfigError> {
    let query = config
        .compile()
        .map_err(|source| ConfigError::Compile { path: None, source })?;
    Ok(CompiledQuery { config, query })
}
