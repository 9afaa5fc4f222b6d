//! Template reader errors.

use std::path::PathBuf;

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported template format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Include not found: {name} (searched {searched:?})")]
    IncludeNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Include cycle through {path}")]
    IncludeCycle { path: PathBuf },

    #[error("Missing key: {path}")]
    MissingKey { path: String },

    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },

    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}
