//! Error types for the assessment engine and its collaborators

use thiserror::Error;

/// Failure reported by a pricing catalog provider
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read pricing catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pricing catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by a metrics sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// The same customer and document code were already recorded
    #[error("assessment already recorded for {customer_id}/{document_code}")]
    Conflict {
        customer_id: String,
        document_code: String,
    },

    #[error("metrics sink unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the assessor entry point
#[derive(Debug, Error)]
pub enum AssessError {
    #[error("unknown source kind: {0}")]
    UnknownSource(String),

    #[error("pricing catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Conflict(SinkError),

    #[error("failed to record assessment metrics: {0}")]
    Persistence(SinkError),
}

impl AssessError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AssessError::UnknownSource(_) => "unknown_source",
            AssessError::Catalog(_) => "catalog_unavailable",
            AssessError::Conflict(_) => "duplicate_submission",
            AssessError::Persistence(_) => "persistence_failed",
        }
    }
}
