#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid edge `{id}`: {reason}")]
    InvalidInput { id: String, reason: String },

    #[error("duplicate edge id: {id}")]
    DuplicateNode { id: String },

    #[error("unknown node id: {id}")]
    UnknownNode { id: String },

    #[error("invalid options: {reason}")]
    InvalidOptions { reason: String },

    #[error(transparent)]
    Graph(#[from] mingle_graph::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_input(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
