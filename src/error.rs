use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning an export into a variant set
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read archive {path}: {details}")]
    Archive { path: PathBuf, details: String },

    #[error("No valid variants found in genome file")]
    EmptyInput,
}

/// Errors raised while loading a reference table
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Invalid reference table: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid tab-separated table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' not found")]
    MissingColumn(String),
}

/// Errors surfaced by a full analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),
}

impl AnalysisError {
    pub fn is_empty_input(&self) -> bool {
        matches!(self, AnalysisError::Parse(ParseError::EmptyInput))
    }
}
