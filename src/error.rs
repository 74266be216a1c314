//! Error types for feed and tessellation computation.

use thiserror::Error;

/// Errors that can occur while building, loading or querying feeds and tessellations.
#[derive(Debug, Error)]
pub enum Error {
    /// A Voronoi cell was dropped or collapsed, usually because two input
    /// positions are coincident or nearly so.
    #[error("degenerate input at cell {cell}: {message}")]
    DegenerateInput { cell: usize, message: String },

    /// A stored tessellation violates its structural invariants.
    #[error("inconsistent tessellation: {0}")]
    InconsistentTessellation(String),

    /// No tessellation with this name has been built.
    #[error("tessellation not found: {0}")]
    TessellationNotFound(String),

    /// A configuration value makes a scoring or filtering formula undefined.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
