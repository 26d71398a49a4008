use std::path::PathBuf;

pub type Result<T, E = StatsError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("player not found: {name}")]
    NotFound { name: String },

    #[error(
        "ambiguous player name {name:?}: {} candidates, none matched ({})",
        .candidates.len(),
        .candidates.join(", ")
    )]
    AmbiguousMatch {
        name: String,
        candidates: Vec<String>,
    },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("http request failed: {0}")]
    Http(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("sqlite error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl StatsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }
}
