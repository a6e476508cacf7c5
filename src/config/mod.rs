//! Query files and cursor/provider settings, loaded from TOML.

pub mod loader;
pub mod schema;

pub use loader::{
    compile_from_path, compile_from_str, load_from_path, load_from_str, CompiledQuery, ConfigError,
};
pub use schema::{
    CursorConfig, PredicateKind, PredicateSpec, ProviderConfig, QueryConfig, ValidationError,
    ValidationIssue,
};
